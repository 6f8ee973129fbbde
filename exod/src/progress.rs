//! Progress reporting for detection runs.

use std::sync::Arc;

/// Stage of a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum RunStage {
    /// Per-sensor variability grids.
    #[strum(serialize = "variability")]
    Variability,
    /// Global median across all grids.
    #[strum(serialize = "threshold")]
    Threshold,
    /// Per-sensor box scan.
    #[strum(serialize = "area detection")]
    AreaDetection,
    /// Areas to sources.
    #[strum(serialize = "reduction")]
    Reduction,
}

/// Progress information for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunProgress {
    /// Completed steps within the stage.
    pub current: usize,
    /// Total steps within the stage.
    pub total: usize,
    pub stage: RunStage,
}

/// Optional observer invoked as sensors complete. May be called from worker
/// threads, in completion order.
#[derive(Clone, Default)]
pub struct ProgressCallback(Option<Arc<dyn Fn(RunProgress) + Send + Sync>>);

impl ProgressCallback {
    pub fn new(f: impl Fn(RunProgress) + Send + Sync + 'static) -> Self {
        Self(Some(Arc::new(f)))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }

    pub fn report(&self, current: usize, total: usize, stage: RunStage) {
        if let Some(f) = &self.0 {
            f(RunProgress {
                current,
                total,
                stage,
            });
        }
    }
}

impl std::fmt::Debug for ProgressCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            None => write!(f, "ProgressCallback::None"),
            Some(_) => write!(f, "ProgressCallback::Some(...)"),
        }
    }
}
