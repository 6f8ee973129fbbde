//! Detector events, good time intervals and validated observations.

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::grid::SENSOR_COUNT;

/// One detected photon. Pixel coordinates are 0-based within the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: f64,
    pub x: i32,
    pub y: i32,
    pub sensor: usize,
}

impl Event {
    pub fn new(time: f64, x: i32, y: i32, sensor: usize) -> Self {
        Self { time, x, y, sensor }
    }
}

/// A span of time during which the instrument recorded usable data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoodTimeInterval {
    pub start: f64,
    pub stop: f64,
}

impl GoodTimeInterval {
    pub fn new(start: f64, stop: f64) -> Self {
        Self { start, stop }
    }

    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }

    /// Length of the overlap with `[start, stop)`, zero when disjoint.
    pub fn overlap(&self, start: f64, stop: f64) -> f64 {
        (self.stop.min(stop) - self.start.max(start)).max(0.0)
    }
}

/// Checks that intervals have finite bounds, are not inverted, and are
/// ordered without overlap.
pub fn validate_gti(gti: &[GoodTimeInterval]) -> Result<(), InputError> {
    for (index, interval) in gti.iter().enumerate() {
        if !interval.start.is_finite() || !interval.stop.is_finite() {
            return Err(InputError::NonFiniteGti { index });
        }
        if interval.stop < interval.start {
            return Err(InputError::InvertedGti {
                index,
                start: interval.start,
                stop: interval.stop,
            });
        }
        if index > 0 && interval.start < gti[index - 1].stop {
            return Err(InputError::UnorderedGti {
                index,
                previous: index - 1,
            });
        }
    }
    Ok(())
}

fn validate_sensor_events(sensor: usize, events: &[Event]) -> Result<(), InputError> {
    let mut previous = f64::NEG_INFINITY;
    for (index, event) in events.iter().enumerate() {
        if event.sensor != sensor {
            return Err(InputError::SensorMismatch {
                sensor,
                index,
                tagged: event.sensor,
            });
        }
        if !event.time.is_finite() {
            return Err(InputError::NonFiniteTime { sensor, index });
        }
        if event.time < previous {
            return Err(InputError::UnsortedEvents { sensor, index });
        }
        previous = event.time;
    }
    Ok(())
}

/// Per-sensor, time-sorted event lists and the global GTI list of one
/// observation. Construction validates everything the engine relies on.
#[derive(Debug, Clone)]
pub struct Observation {
    sensors: Vec<Vec<Event>>,
    gti: Vec<GoodTimeInterval>,
}

impl Observation {
    pub fn new(sensors: Vec<Vec<Event>>, gti: Vec<GoodTimeInterval>) -> Result<Self, InputError> {
        if sensors.len() != SENSOR_COUNT {
            return Err(InputError::SensorCount {
                expected: SENSOR_COUNT,
                actual: sensors.len(),
            });
        }
        validate_gti(&gti)?;
        for (sensor, events) in sensors.iter().enumerate() {
            validate_sensor_events(sensor, events)?;
        }
        if sensors.iter().all(Vec::is_empty) {
            return Err(InputError::NoEvents);
        }
        Ok(Self { sensors, gti })
    }

    /// Groups an unordered event list by sensor and sorts each group by time.
    pub fn from_unsorted(
        events: impl IntoIterator<Item = Event>,
        gti: Vec<GoodTimeInterval>,
    ) -> Result<Self, InputError> {
        let mut sensors = vec![Vec::new(); SENSOR_COUNT];
        for event in events {
            if event.sensor >= SENSOR_COUNT {
                return Err(InputError::SensorCount {
                    expected: SENSOR_COUNT,
                    actual: event.sensor + 1,
                });
            }
            sensors[event.sensor].push(event);
        }
        for events in &mut sensors {
            events.sort_by(|a: &Event, b: &Event| a.time.total_cmp(&b.time));
        }
        Self::new(sensors, gti)
    }

    pub fn sensors(&self) -> &[Vec<Event>] {
        &self.sensors
    }

    pub fn sensor_events(&self, sensor: usize) -> &[Event] {
        &self.sensors[sensor]
    }

    pub fn gti(&self) -> &[GoodTimeInterval] {
        &self.gti
    }

    pub fn event_count(&self) -> usize {
        self.sensors.iter().map(Vec::len).sum()
    }

    /// Earliest and latest event time across all sensors.
    pub fn time_span(&self) -> (f64, f64) {
        let mut start = f64::INFINITY;
        let mut end = f64::NEG_INFINITY;
        for events in &self.sensors {
            if let (Some(first), Some(last)) = (events.first(), events.last()) {
                start = start.min(first.time);
                end = end.max(last.time);
            }
        }
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_sensors() -> Vec<Vec<Event>> {
        vec![Vec::new(); SENSOR_COUNT]
    }

    #[test]
    fn test_overlap_clips() {
        let gti = GoodTimeInterval::new(10.0, 20.0);
        assert_eq!(gti.overlap(0.0, 15.0), 5.0);
        assert_eq!(gti.overlap(12.0, 30.0), 8.0);
        assert_eq!(gti.overlap(0.0, 100.0), 10.0);
        assert_eq!(gti.overlap(20.0, 30.0), 0.0);
        assert_eq!(gti.overlap(30.0, 40.0), 0.0);
    }

    #[test]
    fn test_validate_gti_rejects_inverted() {
        let gti = [GoodTimeInterval::new(5.0, 1.0)];
        assert!(matches!(
            validate_gti(&gti),
            Err(InputError::InvertedGti { index: 0, .. })
        ));
    }

    #[test]
    fn test_validate_gti_rejects_overlap() {
        let gti = [
            GoodTimeInterval::new(0.0, 10.0),
            GoodTimeInterval::new(5.0, 20.0),
        ];
        assert_eq!(
            validate_gti(&gti),
            Err(InputError::UnorderedGti {
                index: 1,
                previous: 0
            })
        );
    }

    #[test]
    fn test_validate_gti_accepts_touching() {
        let gti = [
            GoodTimeInterval::new(0.0, 10.0),
            GoodTimeInterval::new(10.0, 20.0),
        ];
        assert!(validate_gti(&gti).is_ok());
        assert!(validate_gti(&[]).is_ok());
    }

    #[test]
    fn test_validate_gti_rejects_nan() {
        let gti = [GoodTimeInterval::new(0.0, f64::NAN)];
        assert_eq!(
            validate_gti(&gti),
            Err(InputError::NonFiniteGti { index: 0 })
        );
    }

    #[test]
    fn test_observation_requires_all_sensors() {
        let result = Observation::new(vec![vec![Event::new(0.0, 1, 1, 0)]], Vec::new());
        assert!(matches!(
            result,
            Err(InputError::SensorCount {
                expected: SENSOR_COUNT,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_observation_rejects_no_events() {
        assert!(matches!(
            Observation::new(empty_sensors(), Vec::new()),
            Err(InputError::NoEvents)
        ));
    }

    #[test]
    fn test_observation_rejects_unsorted() {
        let mut sensors = empty_sensors();
        sensors[2] = vec![Event::new(5.0, 0, 0, 2), Event::new(4.0, 0, 0, 2)];
        assert_eq!(
            Observation::new(sensors, Vec::new()).unwrap_err(),
            InputError::UnsortedEvents {
                sensor: 2,
                index: 1
            }
        );
    }

    #[test]
    fn test_observation_rejects_mislabelled_event() {
        let mut sensors = empty_sensors();
        sensors[1] = vec![Event::new(0.0, 0, 0, 3)];
        assert_eq!(
            Observation::new(sensors, Vec::new()).unwrap_err(),
            InputError::SensorMismatch {
                sensor: 1,
                index: 0,
                tagged: 3
            }
        );
    }

    #[test]
    fn test_from_unsorted_groups_and_sorts() {
        let events = vec![
            Event::new(3.0, 1, 1, 4),
            Event::new(1.0, 2, 2, 4),
            Event::new(2.0, 0, 0, 0),
        ];
        let obs = Observation::from_unsorted(events, Vec::new()).unwrap();
        assert_eq!(obs.event_count(), 3);
        let times: Vec<f64> = obs.sensor_events(4).iter().map(|e| e.time).collect();
        assert_eq!(times, vec![1.0, 3.0]);
        assert_eq!(obs.time_span(), (1.0, 3.0));
    }
}
