//! Tiling of the observation span into fixed-duration time windows.

use crate::config::{check_good_time_ratio, check_window_duration};
use crate::error::{ConfigError, InputError, WindowPlanError};
use crate::event::{validate_gti, GoodTimeInterval};

/// Upper bound on the number of windows one plan may hold.
pub const MAX_WINDOWS: usize = 1 << 24;

/// One time window and how much of it is good time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub index: usize,
    pub start: f64,
    pub duration: f64,
    /// Seconds of the window covered by good time intervals.
    pub good_time: f64,
    /// `good_time / duration`, in `[0, 1]`.
    pub projection_ratio: f64,
    /// Whether the window reaches the good time ratio and is used.
    pub accepted: bool,
}

impl TimeWindow {
    pub fn stop(&self) -> f64 {
        self.start + self.duration
    }
}

/// Windows cut by the edges of one good time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GtiEdges {
    pub start_window: Option<usize>,
    pub stop_window: Option<usize>,
}

/// Windows of equal duration tiling `[start, stop)` from the earliest event.
///
/// When the last window would reach more than `good_time_ratio` of a window
/// past the latest event it is dropped, and `stop` moves back accordingly.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPlan {
    start: f64,
    stop: f64,
    duration: f64,
    windows: Vec<TimeWindow>,
}

impl WindowPlan {
    /// Tiles `[t_start, t_end]`. Fails on parameters no detector config
    /// would accept, a malformed GTI, or a span that is not finite.
    pub fn new(
        gti: &[GoodTimeInterval],
        t_start: f64,
        t_end: f64,
        window_duration: f64,
        good_time_ratio: f64,
    ) -> Result<Self, WindowPlanError> {
        check_window_duration(window_duration)?;
        check_good_time_ratio(good_time_ratio)?;
        validate_gti(gti)?;
        if !(t_start.is_finite() && t_end.is_finite()) {
            return Err(InputError::NonFiniteSpan {
                start: t_start,
                end: t_end,
            }
            .into());
        }

        let span = (t_end - t_start).max(0.0);
        let needed = (span / window_duration).ceil();
        if needed > MAX_WINDOWS as f64 {
            return Err(ConfigError::TooManyWindows {
                windows: needed,
                max: MAX_WINDOWS,
            }
            .into());
        }
        let mut count = needed as usize;
        let stop = t_start + count as f64 * window_duration;
        if count > 0 && (stop - t_end) / window_duration > good_time_ratio {
            count -= 1;
        }

        let windows = (0..count)
            .map(|index| {
                let start = t_start + index as f64 * window_duration;
                let stop = t_start + (index + 1) as f64 * window_duration;
                let good_time = good_time_in(gti, start, stop, window_duration);
                let projection_ratio = good_time / window_duration;
                TimeWindow {
                    index,
                    start,
                    duration: window_duration,
                    good_time,
                    projection_ratio,
                    accepted: projection_ratio >= good_time_ratio,
                }
            })
            .collect();

        Ok(Self {
            start: t_start,
            stop: t_start + count as f64 * window_duration,
            duration: window_duration,
            windows,
        })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    /// Effective end of the tiled span.
    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Window containing `time`. Windows are half-open except the last one,
    /// which also takes an event landing exactly on the effective stop.
    pub fn window_index(&self, time: f64) -> Option<usize> {
        if self.windows.is_empty() || time < self.start || time > self.stop {
            return None;
        }
        let index = ((time - self.start) / self.duration).floor() as usize;
        Some(index.min(self.windows.len() - 1))
    }

    pub fn accepted(&self) -> impl Iterator<Item = &TimeWindow> + '_ {
        self.windows.iter().filter(|w| w.accepted)
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted().count()
    }

    pub fn accepted_starts(&self) -> Vec<f64> {
        self.accepted().map(|w| w.start).collect()
    }

    /// For each interval, the windows strictly straddling its start and its
    /// stop. An edge falling on a window boundary, or outside the plan,
    /// straddles nothing.
    pub fn edge_windows(&self, gti: &[GoodTimeInterval]) -> Vec<GtiEdges> {
        let straddling = |t: f64| self.windows.iter().position(|w| w.start < t && t < w.stop());
        gti.iter()
            .map(|interval| GtiEdges {
                start_window: straddling(interval.start),
                stop_window: straddling(interval.stop),
            })
            .collect()
    }

    /// For each window, its position among the accepted windows.
    pub(crate) fn accepted_slots(&self) -> Vec<Option<usize>> {
        let mut next = 0;
        self.windows
            .iter()
            .map(|w| {
                w.accepted.then(|| {
                    next += 1;
                    next - 1
                })
            })
            .collect()
    }
}

/// Good time within `[start, stop)`, clipped at interval edges. A window
/// fully inside one interval gets exactly `duration`.
fn good_time_in(gti: &[GoodTimeInterval], start: f64, stop: f64, duration: f64) -> f64 {
    let mut good = 0.0;
    for interval in gti {
        if interval.start <= start && interval.stop >= stop {
            return duration;
        }
        good += interval.overlap(start, stop);
    }
    good.min(duration)
}
