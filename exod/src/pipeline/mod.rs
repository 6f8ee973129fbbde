//! Run orchestration.
//!
//! A run is two fork-join stages over the sensors with the global threshold
//! as a barrier between them:
//!
//! 1. Variability grids, one per sensor, on the worker pool
//! 2. Global median of every cell of every grid, floored at 0.75
//! 3. Box scan of each grid against the threshold, on the worker pool
//! 4. Reduction of the areas of all sensors to sources
//!
//! Results are gathered in sensor order. A sensor that fails does not stop
//! its siblings; once a stage completes, every failure is reported together.


use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use common::parallel::WorkerPool;

use crate::areas::{AreaDetector, VariableArea};
use crate::config::DetectorConfig;
use crate::error::{GeometryError, InputError, RunError, SensorError, SensorFailure};
use crate::event::Observation;
use crate::geometry::FocalPlaneGeometry;
use crate::grid::{GridShape, VariabilityGrid, SENSOR_COUNT};
use crate::progress::{ProgressCallback, RunStage};
use crate::sources::{light_curve, reduce, BadPixelList, LightCurve, Reduction, Source};
use crate::threshold::{global_threshold, GlobalThreshold};
use crate::variability::{VariabilityEstimator, VariabilityStatus, WindowPlan};

/// Per-sensor bookkeeping of the variability stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSummary {
    pub status: VariabilityStatus,
    pub events_counted: usize,
    pub events_skipped: usize,
}

/// Threshold, areas and sources computed from a set of grids.
#[derive(Debug, Clone)]
pub struct Detection {
    pub threshold: GlobalThreshold,
    /// Variable areas per sensor, in emission order.
    pub areas: Vec<Vec<VariableArea>>,
    pub reduction: Reduction,
}

impl Detection {
    pub fn sources(&self) -> &[Source] {
        &self.reduction.sources
    }

    pub fn source_count(&self) -> usize {
        self.reduction.sources.len()
    }

    pub fn source(&self, id: u32) -> Option<&Source> {
        self.reduction.sources.iter().find(|source| source.id == id)
    }

    /// The cells of the area that became source `id`.
    pub fn source_area(&self, id: u32) -> Option<VariableArea> {
        let area = VariableArea::from_cells(
            self.reduction
                .detected_pixels
                .iter()
                .filter(|pixel| pixel.source_id == Some(id))
                .map(|pixel| (pixel.x, pixel.y)),
        );
        (!area.is_empty()).then_some(area)
    }

    /// Places every source on the mosaic and the sky. Nothing is changed
    /// when any source cannot be placed.
    pub fn locate_sources(&mut self, geometry: &FocalPlaneGeometry) -> Result<(), GeometryError> {
        let placements = self
            .reduction
            .sources
            .iter()
            .map(|source| geometry.place(source.sensor, source.center))
            .collect::<Result<Vec<_>, _>>()?;

        for (source, placement) in self.reduction.sources.iter_mut().zip(placements) {
            source.placement = Some(placement);
        }
        Ok(())
    }
}

/// Everything produced by [`Detector::run`].
#[derive(Debug, Clone)]
pub struct DetectionRun {
    /// Time windows shared by all sensors.
    pub plan: WindowPlan,
    /// Variability grids, indexed by sensor.
    pub grids: Vec<VariabilityGrid>,
    pub sensors: Vec<SensorSummary>,
    pub detection: Detection,
}

impl DetectionRun {
    pub fn sources(&self) -> &[Source] {
        self.detection.sources()
    }

    pub fn source_count(&self) -> usize {
        self.detection.source_count()
    }

    pub fn threshold(&self) -> GlobalThreshold {
        self.detection.threshold
    }

    pub fn locate_sources(&mut self, geometry: &FocalPlaneGeometry) -> Result<(), GeometryError> {
        self.detection.locate_sources(geometry)
    }

    /// Light curve of source `id` from the events of `observation`, which
    /// must be the observation this run was computed from.
    pub fn light_curve(&self, observation: &Observation, id: u32) -> Option<LightCurve> {
        let source = self.detection.source(id)?;
        let area = self.detection.source_area(id)?;
        Some(light_curve(
            observation.sensor_events(source.sensor),
            &self.plan,
            &area,
        ))
    }
}

/// Detects variable sources in observations.
///
/// # Example
///
/// ```rust,ignore
/// use exod::{Detector, DetectorConfig};
///
/// let detector = Detector::from_config(DetectorConfig::default().with_box_size(3))?;
/// let run = detector.run(&observation)?;
/// for source in run.sources() {
///     println!("{} on sensor {} at {}", source.id, source.sensor, source.center);
/// }
/// ```
#[derive(Debug)]
pub struct Detector {
    config: DetectorConfig,
    bad_pixels: BadPixelList,
    progress: ProgressCallback,
    pool: WorkerPool,
}

impl Detector {
    /// Validates `config` and starts a pool of `config.max_workers` threads.
    pub fn from_config(config: DetectorConfig) -> Result<Self, RunError> {
        config.validate()?;
        let pool = WorkerPool::new(config.max_workers)?;
        Ok(Self {
            config,
            bad_pixels: BadPixelList::default(),
            progress: ProgressCallback::none(),
            pool,
        })
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_bad_pixels(mut self, bad_pixels: BadPixelList) -> Self {
        self.bad_pixels = bad_pixels;
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn bad_pixels(&self) -> &BadPixelList {
        &self.bad_pixels
    }

    pub fn run(&self, observation: &Observation) -> Result<DetectionRun, RunError> {
        let started = Instant::now();
        let (t_start, t_end) = observation.time_span();
        let plan = WindowPlan::new(
            observation.gti(),
            t_start,
            t_end,
            self.config.window_duration,
            self.config.good_time_ratio,
        )?;
        tracing::info!(
            events = observation.event_count(),
            t_start,
            t_end,
            windows = plan.len(),
            accepted = plan.accepted_count(),
            "starting detection run"
        );
        if plan.accepted_count() < 2 {
            tracing::warn!(
                accepted = plan.accepted_count(),
                "fewer than two usable time windows, grids stay at baseline"
            );
        }

        let estimator = VariabilityEstimator::new(plan, GridShape::SENSOR);
        let total = observation.sensors().len();
        let completed = AtomicUsize::new(0);
        let results = self
            .pool
            .map_ordered(observation.sensors(), |sensor, events| {
                let result = estimator.estimate(events);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                self.progress.report(done, total, RunStage::Variability);
                result.map_err(|error| SensorFailure {
                    sensor,
                    stage: RunStage::Variability,
                    error,
                })
            });
        let outcomes = collect_sensor_results(results)?;

        let mut grids = Vec::with_capacity(outcomes.len());
        let mut sensors = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            sensors.push(SensorSummary {
                status: outcome.status,
                events_counted: outcome.events_counted,
                events_skipped: outcome.events_skipped,
            });
            grids.push(outcome.grid);
        }
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "variability stage done"
        );

        let detection = self.detect(&grids);
        tracing::info!(
            sources = detection.source_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "detection run done"
        );

        Ok(DetectionRun {
            plan: estimator.plan().clone(),
            grids,
            sensors,
            detection,
        })
    }

    /// Threshold, area detection and reduction on grids computed earlier,
    /// with this detector's parameters. Grids are indexed by sensor.
    pub fn detect_from_grids(&self, grids: &[VariabilityGrid]) -> Result<Detection, RunError> {
        if grids.len() != SENSOR_COUNT {
            return Err(InputError::SensorCount {
                expected: SENSOR_COUNT,
                actual: grids.len(),
            }
            .into());
        }

        let failures: Vec<SensorFailure> = grids
            .iter()
            .enumerate()
            .filter_map(|(sensor, grid)| {
                validate_grid(grid).err().map(|error| SensorFailure {
                    sensor,
                    stage: RunStage::Threshold,
                    error,
                })
            })
            .collect();
        if !failures.is_empty() {
            return Err(sensor_failures(failures));
        }

        Ok(self.detect(grids))
    }

    fn detect(&self, grids: &[VariabilityGrid]) -> Detection {
        self.progress.report(0, 1, RunStage::Threshold);
        let threshold = global_threshold(grids);
        self.progress.report(1, 1, RunStage::Threshold);
        tracing::info!(
            median = threshold.median,
            lower_limit = threshold.lower_limit,
            "global threshold"
        );

        let detector = AreaDetector::new(
            self.config.box_size,
            self.config.detection_level,
            self.config.box_sum,
        );
        let total = grids.len();
        let completed = AtomicUsize::new(0);
        let areas = self.pool.map_ordered(grids, |sensor, grid| {
            let areas = detector.detect(grid, threshold.lower_limit);
            tracing::debug!(sensor, areas = areas.len(), "areas detected");
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            self.progress.report(done, total, RunStage::AreaDetection);
            areas
        });

        let reduction = reduce(&areas, &self.bad_pixels);
        self.progress.report(1, 1, RunStage::Reduction);
        if reduction.sources.is_empty() {
            tracing::warn!(
                excluded_areas = reduction.excluded_areas,
                "no variable sources detected"
            );
        }

        Detection {
            threshold,
            areas,
            reduction,
        }
    }
}

/// A grid handed in from outside must have the sensor shape and hold only
/// finite, non-negative cells.
fn validate_grid(grid: &VariabilityGrid) -> Result<(), SensorError> {
    if grid.shape() != GridShape::SENSOR {
        return Err(SensorError::ShapeMismatch {
            expected: GridShape::SENSOR,
            actual: grid.shape(),
        });
    }
    match grid
        .cells()
        .find(|(_, value)| !(value.is_finite() && *value >= 0.0))
    {
        Some(((x, y), value)) => Err(SensorError::InvalidCell { x, y, value }),
        None => Ok(()),
    }
}

fn collect_sensor_results<T>(
    results: Vec<Result<T, SensorFailure>>,
) -> Result<Vec<T>, RunError> {
    let mut values = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(failure) => failures.push(failure),
        }
    }
    if failures.is_empty() {
        Ok(values)
    } else {
        Err(sensor_failures(failures))
    }
}

fn sensor_failures(failures: Vec<SensorFailure>) -> RunError {
    for failure in &failures {
        tracing::warn!(
            sensor = failure.sensor,
            stage = %failure.stage,
            error = %failure.error,
            "sensor failed"
        );
    }
    RunError::SensorFailures(failures)
}
