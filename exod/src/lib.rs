//! Exod - detection of time-variable sources in X-ray event lists.
//!
//! This library finds sources whose brightness changes during an
//! observation:
//! - Per-pixel variability over good-time-filtered time windows
//! - A global adaptive threshold across all sensors
//! - Box scanning for variable areas and reduction to sources
//! - Placement of sources on the sensor mosaic and the sky
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use exod::{Detector, DetectorConfig, Observation};
//!
//! let observation = Observation::from_unsorted(events, gti)?;
//! let detector = Detector::from_config(DetectorConfig::default())?;
//! let mut run = detector.run(&observation)?;
//! run.locate_sources(&FocalPlaneGeometry::from_header(&header, extent)?)?;
//!
//! println!("Found {} variable sources", run.source_count());
//! ```

pub mod areas;
mod config;
mod error;
mod event;
pub mod geometry;
mod grid;
pub(crate) mod math;
mod pipeline;
mod progress;
pub mod sources;
pub mod synthetic;
mod threshold;
pub mod variability;

#[cfg(test)]
pub mod testing;

pub mod prelude;

// ============================================================================
// Observation data
// ============================================================================

pub use event::{validate_gti, Event, GoodTimeInterval, Observation};
pub use grid::{GridShape, PixelGrid, VariabilityGrid, SENSOR_COUNT};

// ============================================================================
// Configuration and errors
// ============================================================================

pub use config::{BoxSumMode, DetectorConfig};
pub use error::{
    ConfigError, GeometryError, InputError, RunError, SensorError, SensorFailure,
    VariabilityError, WindowPlanError,
};

// ============================================================================
// Detection stages
// ============================================================================

pub use areas::{detect_areas, AreaDetector, VariableArea};
pub use sources::{light_curve, reduce, BadPixelList, DetectedPixel, LightCurve, Reduction, Source};
pub use threshold::{global_threshold, GlobalThreshold, THRESHOLD_FLOOR};
pub use variability::{
    compute_variability, VariabilityEstimator, VariabilityOutcome, VariabilityStatus, WindowPlan,
};

// ============================================================================
// Geometry
// ============================================================================

pub use geometry::{
    assemble_mosaic, data_transformation, mosaic_position, transform, Extent,
    FocalPlaneGeometry, HeaderKeywords, SkyPosition, Wcs,
};

// ============================================================================
// Orchestration
// ============================================================================

pub use pipeline::{Detection, DetectionRun, Detector, SensorSummary};
pub use progress::{ProgressCallback, RunProgress, RunStage};
