//! Deterministic synthetic observations.
//!
//! Every sensor gets a steady background: events evenly spaced in time,
//! spread over the grid by a fixed stride so no pixel repeats within a
//! sensor. Bursts add a run of events on one pixel.
//!
//! At the default rate most 3x3 neighbourhoods see at least one background
//! event, which keeps the grid median at 1 and the threshold off its floor.
//! Sparser or clumped backgrounds drop the median to the floor, where single
//! background excursions can pass the detection level.
//!
//! ```rust,ignore
//! use exod::synthetic::{Burst, SyntheticObservation};
//!
//! let observation = SyntheticObservation::default()
//!     .with_burst(Burst::new(3, 30, 100, 420.0, 50))
//!     .build()?;
//! ```

use crate::error::InputError;
use crate::event::{Event, GoodTimeInterval, Observation};
use crate::grid::{GridShape, SENSOR_COUNT};

/// Row and column strides of the background pattern. Both are coprime with
/// the sensor dimensions.
const ROW_STRIDE: usize = 5;
const COL_STRIDE: usize = 37;

/// Events on a single pixel at a fixed rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub sensor: usize,
    pub x: i32,
    pub y: i32,
    pub start: f64,
    pub count: usize,
    /// Seconds between consecutive events.
    pub spacing: f64,
}

impl Burst {
    /// `count` events one second apart from `start`.
    pub fn new(sensor: usize, x: i32, y: i32, start: f64, count: usize) -> Self {
        Self {
            sensor,
            x,
            y,
            start,
            count,
            spacing: 1.0,
        }
    }

    pub fn events(&self) -> impl Iterator<Item = Event> + '_ {
        (0..self.count).map(move |i| {
            Event::new(
                self.start + i as f64 * self.spacing,
                self.x,
                self.y,
                self.sensor,
            )
        })
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticObservation {
    /// Length of the observation in seconds, starting at 0.
    pub duration: f64,
    pub events_per_sensor: usize,
    pub bursts: Vec<Burst>,
    /// Defaults to one interval covering the whole observation.
    pub gti: Option<Vec<GoodTimeInterval>>,
}

impl Default for SyntheticObservation {
    fn default() -> Self {
        Self {
            duration: 1000.0,
            events_per_sensor: 1000,
            bursts: Vec::new(),
            gti: None,
        }
    }
}

impl SyntheticObservation {
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_events_per_sensor(mut self, count: usize) -> Self {
        self.events_per_sensor = count;
        self
    }

    pub fn with_burst(mut self, burst: Burst) -> Self {
        self.bursts.push(burst);
        self
    }

    pub fn with_gti(mut self, gti: Vec<GoodTimeInterval>) -> Self {
        self.gti = Some(gti);
        self
    }

    /// Background events of one sensor, time-sorted.
    pub fn background_events(&self, sensor: usize) -> Vec<Event> {
        let step = self.duration / self.events_per_sensor as f64;
        let shape = GridShape::SENSOR;
        (0..self.events_per_sensor)
            .map(|k| {
                Event::new(
                    (k as f64 + 0.5) * step,
                    ((ROW_STRIDE * k) % shape.rows) as i32,
                    ((COL_STRIDE * k) % shape.cols) as i32,
                    sensor,
                )
            })
            .collect()
    }

    pub fn build(&self) -> Result<Observation, InputError> {
        let mut sensors: Vec<Vec<Event>> = (0..SENSOR_COUNT)
            .map(|sensor| self.background_events(sensor))
            .collect();
        for burst in &self.bursts {
            let events = sensors
                .get_mut(burst.sensor)
                .ok_or(InputError::SensorCount {
                    expected: SENSOR_COUNT,
                    actual: burst.sensor + 1,
                })?;
            events.extend(burst.events());
        }
        for events in &mut sensors {
            events.sort_by(|a, b| a.time.total_cmp(&b.time));
        }

        let gti = self
            .gti
            .clone()
            .unwrap_or_else(|| vec![GoodTimeInterval::new(0.0, self.duration)]);
        Observation::new(sensors, gti)
    }
}

/// `count` events on every pixel of the `size` x `size` patch whose lowest
/// corner is `(x, y)`.
pub fn patch_bursts(
    sensor: usize,
    x: i32,
    y: i32,
    size: i32,
    start: f64,
    count: usize,
) -> impl Iterator<Item = Burst> {
    (x..x + size).flat_map(move |bx| {
        (y..y + size).map(move |by| Burst::new(sensor, bx, by, start, count))
    })
}

/// Steady background on all sensors plus 50 events on pixel (30, 100) of
/// sensor 3 between t = 420 s and t = 469 s.
pub fn burst_scenario() -> SyntheticObservation {
    SyntheticObservation::default().with_burst(Burst::new(3, 30, 100, 420.0, 50))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_pixels_do_not_repeat() {
        let events = SyntheticObservation::default().background_events(0);
        let mut pixels: Vec<(i32, i32)> = events.iter().map(|e| (e.x, e.y)).collect();
        pixels.sort_unstable();
        pixels.dedup();
        assert_eq!(pixels.len(), 1000);
    }

    #[test]
    fn test_background_times_evenly_spaced() {
        let events = SyntheticObservation::default().background_events(5);
        assert_eq!(events[0].time, 0.5);
        assert_eq!(events[999].time, 999.5);
        assert!(events.iter().all(|e| e.sensor == 5));
    }

    #[test]
    fn test_build_merges_burst_in_time_order() {
        let observation = burst_scenario().build().unwrap();
        assert_eq!(observation.event_count(), 12 * 1000 + 50);
        let sensor = observation.sensor_events(3);
        assert_eq!(sensor.len(), 1050);
        assert!(sensor.windows(2).all(|w| w[0].time <= w[1].time));
        let on_pixel = |events: &[Event]| events.iter().filter(|e| (e.x, e.y) == (30, 100)).count();
        assert_eq!(on_pixel(sensor), on_pixel(observation.sensor_events(0)) + 50);
        assert_eq!(observation.gti(), &[GoodTimeInterval::new(0.0, 1000.0)]);
    }

    #[test]
    fn test_patch_bursts_cover_the_patch() {
        let bursts: Vec<Burst> = patch_bursts(3, 28, 98, 5, 420.0, 20).collect();
        assert_eq!(bursts.len(), 25);
        assert_eq!((bursts[0].x, bursts[0].y), (28, 98));
        assert_eq!((bursts[24].x, bursts[24].y), (32, 102));
        assert!(bursts.iter().all(|b| b.sensor == 3 && b.count == 20));
    }

    #[test]
    fn test_burst_on_unknown_sensor_rejected() {
        let result = SyntheticObservation::default()
            .with_burst(Burst::new(12, 0, 0, 1.0, 3))
            .build();
        assert!(matches!(result, Err(InputError::SensorCount { .. })));
    }
}
