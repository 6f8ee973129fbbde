//! Error types for detection runs.

use thiserror::Error;

use crate::grid::GridShape;
use crate::progress::RunStage;

/// Invalid detector parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("window duration must be finite and positive, got {0}")]
    WindowDuration(f64),
    #[error("good time ratio must be in (0, 1], got {0}")]
    GoodTimeRatio(f64),
    #[error("box size must be at least 1")]
    BoxSize,
    #[error("detection level must be finite and positive, got {0}")]
    DetectionLevel(f64),
    #[error("max workers must be at least 1")]
    MaxWorkers,
    #[error("window duration yields {windows} windows, more than the {max} allowed")]
    TooManyWindows { windows: f64, max: usize },
    #[error("failed to load configuration: {0}")]
    File(#[from] common::config_file::ConfigFileError),
}

/// Malformed observation data. Fatal for the whole run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("expected {expected} sensors, got {actual}")]
    SensorCount { expected: usize, actual: usize },
    #[error("observation contains no events")]
    NoEvents,
    #[error("good time interval {index} has a non-finite bound")]
    NonFiniteGti { index: usize },
    #[error("good time interval {index} stops ({stop}) before it starts ({start})")]
    InvertedGti { index: usize, start: f64, stop: f64 },
    #[error("good time interval {index} starts before interval {previous} stops")]
    UnorderedGti { index: usize, previous: usize },
    #[error("observation span [{start}, {end}] is not finite")]
    NonFiniteSpan { start: f64, end: f64 },
    #[error("event {index} of sensor {sensor} has a non-finite time")]
    NonFiniteTime { sensor: usize, index: usize },
    #[error("events of sensor {sensor} are not time-sorted at index {index}")]
    UnsortedEvents { sensor: usize, index: usize },
    #[error("event {index} in sensor {sensor}'s list is tagged with sensor {tagged}")]
    SensorMismatch {
        sensor: usize,
        index: usize,
        tagged: usize,
    },
}

/// Failure confined to one sensor's work.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SensorError {
    #[error("event {index} at ({x}, {y}) lies outside the {shape} grid")]
    EventOutsideGrid {
        index: usize,
        x: i32,
        y: i32,
        shape: GridShape,
    },
    #[error("grid shape {actual} does not match expected {expected}")]
    ShapeMismatch {
        expected: GridShape,
        actual: GridShape,
    },
    #[error("cell ({x}, {y}) holds invalid variability {value}")]
    InvalidCell { x: usize, y: usize, value: f64 },
}

/// A sensor failure tagged with where it happened.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("sensor {sensor} failed during {stage}: {error}")]
pub struct SensorFailure {
    pub sensor: usize,
    pub stage: RunStage,
    #[source]
    pub error: SensorError,
}

/// Window parameters or observation bounds that cannot be tiled.
#[derive(Debug, Error)]
pub enum WindowPlanError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Failure of a single-sensor variability computation.
#[derive(Debug, Error)]
pub enum VariabilityError {
    #[error("cannot plan windows: {0}")]
    Plan(#[from] WindowPlanError),
    #[error(transparent)]
    Sensor(#[from] SensorError),
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
    #[error(transparent)]
    WorkerPool(#[from] common::parallel::WorkerPoolError),
    #[error("{} sensor(s) failed: {}", .0.len(), describe_failures(.0))]
    SensorFailures(Vec<SensorFailure>),
}

impl From<WindowPlanError> for RunError {
    fn from(err: WindowPlanError) -> Self {
        match err {
            WindowPlanError::Config(err) => Self::Config(err),
            WindowPlanError::Input(err) => Self::Input(err),
        }
    }
}

fn describe_failures(failures: &[SensorFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Problems placing detections in the focal plane or on the sky. Fatal for
/// the mapping step only.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("header keyword '{0}' is missing")]
    MissingKeyword(String),
    #[error("header keyword '{keyword}' is not finite: {value}")]
    NonFiniteKeyword { keyword: String, value: f64 },
    #[error("rotation angle {angle} deg has no finite rectified size")]
    DegenerateRotation { angle: f64 },
    #[error("extent min {min:?} is not below max {max:?}")]
    InvalidExtent { min: [f64; 2], max: [f64; 2] },
    #[error("legal limits [{min}, {max}] are empty")]
    EmptyLimits { min: f64, max: f64 },
    #[error("projected footprint is empty ({rows}x{cols})")]
    EmptyFootprint { rows: i64, cols: i64 },
    #[error("mosaic needs {expected} grids, got {actual}")]
    MosaicSensorCount { expected: usize, actual: usize },
    #[error("grid for sensor {sensor} is {actual}, expected {expected}")]
    MosaicShape {
        sensor: usize,
        expected: GridShape,
        actual: GridShape,
    },
    #[error("sensor {0} is not part of the mosaic")]
    UnknownSensor(usize),
}
