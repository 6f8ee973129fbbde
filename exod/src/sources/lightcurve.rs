//! Light curves of detected areas over the accepted time windows.

use crate::areas::VariableArea;
use crate::event::Event;
use crate::math::median_f64_mut;
use crate::variability::WindowPlan;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightCurvePoint {
    /// Index of the window within the plan.
    pub window: usize,
    pub start: f64,
    pub good_time: f64,
    pub counts: u32,
    /// Counts per second of good time.
    pub rate: f64,
    /// Poisson error on `rate`.
    pub error: f64,
}

/// Direction of the largest departure from the median rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Excursion {
    Peak,
    Dip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightCurve {
    /// One point per accepted window.
    pub points: Vec<LightCurvePoint>,
    /// Median over windows with a non-zero rate.
    pub median_rate: f64,
    /// The dominant excursion and the index of its point.
    pub extremum: Option<(Excursion, usize)>,
}

/// Counts the events falling on `area`'s cells in each accepted window.
///
/// Windows without events are kept as points but do not enter the median
/// or the excursion, the way empty bins are dropped before plotting.
pub fn light_curve(events: &[Event], plan: &WindowPlan, area: &VariableArea) -> LightCurve {
    let accepted: Vec<_> = plan.accepted().copied().collect();
    let mut slot_of = vec![None; plan.len()];
    for (slot, window) in accepted.iter().enumerate() {
        slot_of[window.index] = Some(slot);
    }

    let mut counts = vec![0u32; accepted.len()];
    for event in events {
        if event.x < 0 || event.y < 0 || !area.contains(event.x as usize, event.y as usize) {
            continue;
        }
        if let Some(slot) = plan.window_index(event.time).and_then(|w| slot_of[w]) {
            counts[slot] += 1;
        }
    }

    let points: Vec<LightCurvePoint> = accepted
        .iter()
        .zip(&counts)
        .map(|(window, &counts)| LightCurvePoint {
            window: window.index,
            start: window.start,
            good_time: window.good_time,
            counts,
            rate: counts as f64 / window.good_time,
            error: (counts as f64).sqrt() / window.good_time,
        })
        .collect();

    let lit: Vec<usize> = (0..points.len())
        .filter(|&i| points[i].rate > 0.0)
        .collect();
    if lit.is_empty() {
        return LightCurve {
            points,
            median_rate: 0.0,
            extremum: None,
        };
    }

    let mut rates: Vec<f64> = lit.iter().map(|&i| points[i].rate).collect();
    let median_rate = median_f64_mut(&mut rates);

    let (max, min) = lit.iter().fold((lit[0], lit[0]), |(hi, lo), &i| {
        let rate = points[i].rate;
        (
            if rate > points[hi].rate { i } else { hi },
            if rate < points[lo].rate { i } else { lo },
        )
    });

    let extremum = if points[max].rate - median_rate > median_rate - points[min].rate {
        (Excursion::Peak, max)
    } else {
        (Excursion::Dip, min)
    };

    LightCurve {
        points,
        median_rate,
        extremum: Some(extremum),
    }
}
