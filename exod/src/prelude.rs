//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use exod::prelude::*;
//! ```

// Input
pub use crate::{Event, GoodTimeInterval, Observation};

// Running
pub use crate::{
    BoxSumMode, Detection, DetectionRun, Detector, DetectorConfig, ProgressCallback, RunError,
    RunProgress, RunStage,
};

// Results
pub use crate::{GlobalThreshold, Source, VariabilityGrid};

// Placement
pub use crate::{FocalPlaneGeometry, GeometryError, HeaderKeywords, SkyPosition};
