use super::*;
use crate::error::{ConfigError, InputError, WindowPlanError};
use crate::grid::GridShape;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn gti(intervals: &[(f64, f64)]) -> Vec<GoodTimeInterval> {
    intervals
        .iter()
        .map(|&(start, stop)| GoodTimeInterval::new(start, stop))
        .collect()
}

/// One event per second at `(x, y)` for times in `[from, to)`.
fn steady_events(from: usize, to: usize, x: i32, y: i32) -> Vec<Event> {
    (from..to)
        .map(|t| Event::new(t as f64 + 0.5, x, y, 0))
        .collect()
}

fn sorted(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(|a, b| a.time.total_cmp(&b.time));
    events
}

// ============================================================================
// Window plan
// ============================================================================

#[test]
fn test_plan_exact_tiling() {
    let plan = WindowPlan::new(&gti(&[(0.0, 1000.0)]), 0.0, 1000.0, 100.0, 0.9).unwrap();
    assert_eq!(plan.len(), 10);
    assert_eq!(plan.stop(), 1000.0);
    assert_eq!(plan.windows()[3].start, 300.0);
}

#[test]
fn test_plan_drops_mostly_empty_last_window() {
    // ceil(10.05) = 11 windows would end 95 s past the last event.
    let plan = WindowPlan::new(&gti(&[(0.0, 2000.0)]), 0.0, 1005.0, 100.0, 0.9).unwrap();
    assert_eq!(plan.len(), 10);
    assert_eq!(plan.stop(), 1000.0);
}

#[test]
fn test_plan_keeps_partially_filled_last_window() {
    let plan = WindowPlan::new(&gti(&[(0.0, 2000.0)]), 0.0, 1050.0, 100.0, 0.9).unwrap();
    assert_eq!(plan.len(), 11);
    assert_eq!(plan.stop(), 1100.0);
}

#[test]
fn test_full_coverage_gives_unit_ratio() {
    let plan = WindowPlan::new(&gti(&[(-10.0, 5000.0)]), 3.7, 3000.0, 97.3, 0.9).unwrap();
    assert!(!plan.is_empty());
    for window in plan.windows() {
        assert_eq!(window.projection_ratio, 1.0, "window {}", window.index);
        assert!(window.accepted);
    }
}

#[test]
fn test_gap_windows_are_clipped() {
    let plan = WindowPlan::new(
        &gti(&[(0.0, 250.0), (450.0, 1000.0)]),
        0.0,
        1000.0,
        100.0,
        0.9,
    )
    .unwrap();
    let ratios: Vec<f64> = plan.windows().iter().map(|w| w.projection_ratio).collect();
    assert_eq!(
        ratios,
        vec![1.0, 1.0, 0.5, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0]
    );
    assert_eq!(plan.accepted_count(), 7);
    assert_eq!(
        plan.accepted_starts(),
        vec![0.0, 100.0, 500.0, 600.0, 700.0, 800.0, 900.0]
    );
}

#[test]
fn test_no_gti_means_dead_time_everywhere() {
    let plan = WindowPlan::new(&[], 0.0, 1000.0, 100.0, 0.9).unwrap();
    assert_eq!(plan.len(), 10);
    assert!(plan.windows().iter().all(|w| w.projection_ratio == 0.0));
    assert_eq!(plan.accepted_count(), 0);
}

#[test]
fn test_edge_windows_strictly_straddle() {
    let intervals = gti(&[(0.0, 250.0), (450.0, 1000.0)]);
    let plan = WindowPlan::new(&intervals, 0.0, 1000.0, 100.0, 0.9).unwrap();
    let edges = plan.edge_windows(&intervals);
    assert_eq!(
        edges,
        vec![
            GtiEdges {
                start_window: None,
                stop_window: Some(2)
            },
            GtiEdges {
                start_window: Some(4),
                stop_window: None
            },
        ]
    );
}

#[test]
fn test_window_index_half_open() {
    let plan = WindowPlan::new(&gti(&[(0.0, 1000.0)]), 0.0, 1000.0, 100.0, 0.9).unwrap();
    assert_eq!(plan.window_index(0.0), Some(0));
    assert_eq!(plan.window_index(99.999), Some(0));
    assert_eq!(plan.window_index(100.0), Some(1));
    assert_eq!(plan.window_index(1000.0), Some(9));
    assert_eq!(plan.window_index(1000.1), None);
    assert_eq!(plan.window_index(-0.1), None);
}

#[test]
fn test_zero_span_has_no_windows() {
    let plan = WindowPlan::new(&gti(&[(0.0, 10.0)]), 5.0, 5.0, 100.0, 0.9).unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.window_index(5.0), None);
}

#[test]
fn test_plan_rejects_bad_window_duration() {
    for duration in [0.0, -100.0, f64::NAN, f64::INFINITY] {
        let err = WindowPlan::new(&gti(&[(0.0, 1000.0)]), 0.0, 1000.0, duration, 0.9).unwrap_err();
        assert!(
            matches!(err, WindowPlanError::Config(ConfigError::WindowDuration(_))),
            "duration {duration}: {err:?}"
        );
    }
}

#[test]
fn test_plan_rejects_bad_good_time_ratio() {
    for ratio in [0.0, -0.5, 1.5, f64::NAN] {
        let err = WindowPlan::new(&gti(&[(0.0, 1000.0)]), 0.0, 1000.0, 100.0, ratio).unwrap_err();
        assert!(
            matches!(err, WindowPlanError::Config(ConfigError::GoodTimeRatio(_))),
            "ratio {ratio}: {err:?}"
        );
    }
}

#[test]
fn test_plan_rejects_inverted_gti() {
    let err = WindowPlan::new(&gti(&[(0.0, 300.0), (600.0, 500.0)]), 0.0, 1000.0, 100.0, 0.9)
        .unwrap_err();
    let WindowPlanError::Input(err) = err else {
        panic!("expected an input error, got {err:?}");
    };
    assert_eq!(
        err,
        InputError::InvertedGti {
            index: 1,
            start: 600.0,
            stop: 500.0
        }
    );
}

#[test]
fn test_plan_rejects_non_finite_span() {
    let err = WindowPlan::new(&gti(&[(0.0, 1000.0)]), 0.0, f64::INFINITY, 100.0, 0.9).unwrap_err();
    assert!(matches!(
        err,
        WindowPlanError::Input(InputError::NonFiniteSpan { .. })
    ));
}

#[test]
fn test_plan_rejects_too_many_windows() {
    let err = WindowPlan::new(&gti(&[(0.0, 1000.0)]), 0.0, 1000.0, 1e-9, 0.9).unwrap_err();
    assert!(matches!(
        err,
        WindowPlanError::Config(ConfigError::TooManyWindows { max: MAX_WINDOWS, .. })
    ));
}

// ============================================================================
// Counting
// ============================================================================

#[test]
fn test_neighbourhood_clipped_at_corner() {
    let shape = GridShape::new(4, 5);
    let mut counts = WindowCounts::new(shape, 2);
    counts.add_neighbourhood(0, 0, 1);

    let mut total = 0;
    for x in 0..shape.rows {
        for y in 0..shape.cols {
            total += counts.pixel(x, y)[1];
            assert_eq!(counts.pixel(x, y)[0], 0);
        }
    }
    assert_eq!(total, 4);
    assert_eq!(counts.pixel(1, 1), &[0, 1]);
    assert_eq!(counts.pixel(2, 2), &[0, 0]);
}

#[test]
fn test_neighbourhood_interior() {
    let shape = GridShape::new(5, 5);
    let mut counts = WindowCounts::new(shape, 1);
    counts.add_neighbourhood(2, 3, 0);
    counts.add_neighbourhood(2, 3, 0);
    assert_eq!(counts.pixel(1, 2), &[2]);
    assert_eq!(counts.pixel(3, 4), &[2]);
    assert_eq!(counts.pixel(0, 3), &[0]);
}

// ============================================================================
// Variability
// ============================================================================

#[test]
fn test_pixel_variability_formula() {
    assert_eq!(pixel_variability(&mut [1.0, 1.0, 11.0]), 10.0);
    // Dip is larger than peak.
    assert_eq!(pixel_variability(&mut [4.0, 4.0, 0.0, 5.0]), 1.0);
    // Zero median falls back to the maximum.
    assert_eq!(pixel_variability(&mut [0.0, 0.0, 3.0]), 3.0);
    assert_eq!(pixel_variability(&mut [0.0, 0.0]), 0.0);
}

#[test]
fn test_zero_events_keep_baseline() {
    let outcome =
        compute_variability(&gti(&[(0.0, 1000.0)]), 100.0, 0.9, 0.0, 1000.0, &[]).unwrap();
    assert_eq!(outcome.status, VariabilityStatus::NoEvents);
    assert!(outcome.grid.pixels().iter().all(|&v| v == 1.0));
}

#[test]
fn test_single_window_is_no_usable_data() {
    let events = steady_events(0, 50, 10, 10);
    let outcome =
        compute_variability(&gti(&[(0.0, 1000.0)]), 100.0, 0.9, 0.0, 50.0, &events).unwrap();
    assert_eq!(outcome.status, VariabilityStatus::NoUsableData);
    assert!(outcome.grid.pixels().iter().all(|&v| v == 1.0));
}

#[test]
fn test_all_windows_rejected_is_no_usable_data() {
    let events = steady_events(0, 1000, 10, 10);
    let outcome = compute_variability(&[], 100.0, 0.9, 0.5, 999.5, &events).unwrap();
    assert_eq!(outcome.status, VariabilityStatus::NoUsableData);
    assert_eq!(outcome.events_counted, 0);
    assert!(outcome.grid.pixels().iter().all(|&v| v == 1.0));
}

#[test]
fn test_steady_source_has_zero_variability() {
    let events = steady_events(0, 1000, 10, 10);
    let outcome =
        compute_variability(&gti(&[(0.0, 2000.0)]), 100.0, 0.9, 0.5, 999.5, &events).unwrap();
    assert_eq!(outcome.status, VariabilityStatus::Computed);
    assert_eq!(outcome.events_counted, 1000);
    assert!(outcome.grid.pixels().iter().all(|&v| v == 0.0));
}

#[test]
fn test_burst_raises_neighbourhood() {
    // One event per window at (10, 10), plus ten more in window 5.
    let mut events: Vec<Event> = (0..10)
        .map(|w| Event::new(w as f64 * 100.0 + 50.0, 10, 10, 0))
        .collect();
    events.extend((0..10).map(|i| Event::new(510.0 + i as f64, 10, 10, 0)));
    let events = sorted(events);

    let outcome =
        compute_variability(&gti(&[(0.0, 1000.0)]), 100.0, 0.9, 0.0, 1000.0, &events).unwrap();
    let grid = &outcome.grid;
    assert_eq!(grid[(10, 10)], 10.0);
    assert_eq!(grid[(9, 11)], 10.0);
    assert_eq!(grid[(12, 10)], 0.0);
    assert_eq!(grid[(0, 0)], 0.0);
}

#[test]
fn test_counts_scaled_by_projection_ratio() {
    // Window 9 is 95% good time: its 19 events count as 20.
    let mut events: Vec<Event> = (0..9)
        .map(|w| Event::new(w as f64 * 100.0 + 50.0, 5, 5, 0))
        .collect();
    events.extend((0..19).map(|i| Event::new(900.0 + i as f64 * 4.0, 5, 5, 0)));
    let events = sorted(events);

    let outcome =
        compute_variability(&gti(&[(0.0, 995.0)]), 100.0, 0.9, 0.0, 1000.0, &events).unwrap();
    assert!((outcome.grid[(5, 5)] - 19.0).abs() < 1e-9);
}

#[test]
fn test_events_in_rejected_windows_are_skipped() {
    let events = steady_events(0, 1000, 20, 20);
    let outcome = compute_variability(
        &gti(&[(0.0, 300.0), (500.0, 1000.0)]),
        100.0,
        0.9,
        0.5,
        999.5,
        &events,
    )
    .unwrap();
    // Windows start at 0.5, so [300.5, 400.5) and [400.5, 500.5) fall below
    // the ratio.
    assert_eq!(outcome.events_skipped, 200);
    assert_eq!(outcome.events_counted, 800);
}

#[test]
fn test_zero_window_duration_is_an_error() {
    let events = steady_events(0, 100, 3, 3);
    let err = compute_variability(&gti(&[(0.0, 1000.0)]), 0.0, 0.9, 0.0, 1000.0, &events)
        .unwrap_err();
    assert!(matches!(
        err,
        VariabilityError::Plan(WindowPlanError::Config(ConfigError::WindowDuration(d))) if d == 0.0
    ));
}

#[test]
fn test_inverted_gti_is_an_error() {
    let events = steady_events(0, 100, 3, 3);
    let err = compute_variability(&gti(&[(500.0, 100.0)]), 100.0, 0.9, 0.0, 1000.0, &events)
        .unwrap_err();
    assert!(matches!(
        err,
        VariabilityError::Plan(WindowPlanError::Input(InputError::InvertedGti { index: 0, .. }))
    ));
}

#[test]
fn test_event_outside_grid_fails() {
    let events = vec![Event::new(1.0, 3, 3, 0), Event::new(2.0, 64, 3, 0)];
    let err = compute_variability(&gti(&[(0.0, 1000.0)]), 100.0, 0.9, 0.0, 1000.0, &events)
        .unwrap_err();
    let VariabilityError::Sensor(err) = err else {
        panic!("expected a sensor error, got {err:?}");
    };
    assert_eq!(
        err,
        SensorError::EventOutsideGrid {
            index: 1,
            x: 64,
            y: 3,
            shape: GridShape::SENSOR
        }
    );
}

#[test]
fn test_random_events_give_finite_non_negative_grid() {
    let mut rng = StdRng::seed_from_u64(7);
    let events = sorted(
        (0..5000)
            .map(|_| {
                Event::new(
                    rng.random_range(0.0..2000.0),
                    rng.random_range(0..64),
                    rng.random_range(0..200),
                    0,
                )
            })
            .collect(),
    );
    let (t0, tf) = (events[0].time, events[events.len() - 1].time);
    let outcome = compute_variability(
        &gti(&[(0.0, 700.0), (760.0, 2000.0)]),
        100.0,
        0.9,
        t0,
        tf,
        &events,
    )
    .unwrap();
    assert_eq!(outcome.status, VariabilityStatus::Computed);
    assert!(outcome
        .grid
        .pixels()
        .iter()
        .all(|&v| v.is_finite() && v >= 0.0));
}
