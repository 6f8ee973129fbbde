use super::*;
use crate::event::{Event, GoodTimeInterval};
use crate::variability::WindowPlan;

fn area(cells: &[(usize, usize)]) -> VariableArea {
    VariableArea::from_cells(cells.iter().copied())
}

// ============================================================================
// Centroid and radius
// ============================================================================

#[test]
fn test_square_center_and_radius() {
    let square = area(&[(5, 5), (5, 6), (6, 5), (6, 6)]);
    let center = area_center(&square);
    assert_eq!(center, DVec2::new(5.5, 5.5));
    assert_eq!(area_radius(&square, center), 1);
}

#[test]
fn test_single_cell_has_zero_radius() {
    let cell = area(&[(3, 9)]);
    let center = area_center(&cell);
    assert_eq!(center, DVec2::new(3.0, 9.0));
    assert_eq!(area_radius(&cell, center), 0);
}

#[test]
fn test_radius_rounds_half_to_even() {
    let cases = [
        (area(&[(0, 0), (0, 1)]), 0),
        (area(&[(0, 0), (0, 3)]), 2),
        (area(&[(0, 0), (0, 5)]), 2),
        (area(&[(0, 0), (0, 7)]), 4),
    ];
    for (a, expected) in cases {
        assert_eq!(area_radius(&a, area_center(&a)), expected, "{a:?}");
    }
}

#[test]
fn test_radius_uses_per_axis_maxima() {
    // Farthest x and farthest y come from different cells.
    let l_shape = area(&[(0, 0), (4, 0), (0, 4)]);
    let center = area_center(&l_shape);
    let dev = DVec2::new(4.0 - center.x, 4.0 - center.y);
    assert_eq!(area_radius(&l_shape, center), dev.length().round() as u32);
}

// ============================================================================
// Reduction
// ============================================================================

#[test]
fn test_ids_follow_sensor_then_emission_order() {
    let mut by_sensor = vec![Vec::new(); 12];
    by_sensor[0] = vec![area(&[(30, 30)]), area(&[(40, 40)])];
    by_sensor[7] = vec![area(&[(1, 1)])];

    let reduction = reduce(&by_sensor, &BadPixelList::default());

    let ids: Vec<(u32, usize)> = reduction.sources.iter().map(|s| (s.id, s.sensor)).collect();
    assert_eq!(ids, vec![(1, 0), (2, 0), (3, 7)]);
    assert_eq!(reduction.sources[1].center, DVec2::new(40.0, 40.0));
    assert_eq!(reduction.excluded_areas, 0);
}

#[test]
fn test_bad_pixels_skip_ids_but_keep_cells() {
    let mut by_sensor = vec![Vec::new(); 12];
    // Center x 12.5 truncates to 12.
    by_sensor[4] = vec![area(&[(12, 50), (13, 50)]), area(&[(14, 50)])];
    by_sensor[10] = vec![area(&[(28, 3), (29, 3)])];

    let reduction = reduce(&by_sensor, &BadPixelList::default());

    assert_eq!(reduction.sources.len(), 1);
    assert_eq!(reduction.sources[0].id, 1);
    assert_eq!(reduction.sources[0].center, DVec2::new(14.0, 50.0));
    assert_eq!(reduction.excluded_areas, 2);

    assert_eq!(reduction.detected_pixels.len(), 5);
    let orphaned = reduction
        .detected_pixels
        .iter()
        .filter(|p| p.source_id.is_none())
        .count();
    assert_eq!(orphaned, 4);
    assert!(reduction.detected_pixels.contains(&DetectedPixel {
        source_id: Some(1),
        sensor: 4,
        x: 14,
        y: 50
    }));
}

#[test]
fn test_bad_pixel_lookup_truncates() {
    let list = BadPixelList::default();
    assert_eq!(list.len(), 5);
    assert!(list.excludes(4, 11.0));
    assert!(list.excludes(4, 13.99));
    assert!(!list.excludes(4, 14.0));
    assert!(!list.excludes(3, 12.0));
    assert!(list.excludes(10, 28.5));
}

#[test]
fn test_empty_bad_pixel_list_keeps_everything() {
    let mut by_sensor = vec![Vec::new(); 12];
    by_sensor[4] = vec![area(&[(12, 50)])];
    let reduction = reduce(&by_sensor, &BadPixelList::empty());
    assert_eq!(reduction.sources.len(), 1);
}

#[test]
fn test_no_areas() {
    let reduction = reduce(&vec![Vec::new(); 12], &BadPixelList::default());
    assert!(reduction.sources.is_empty());
    assert!(reduction.detected_pixels.is_empty());
}

// ============================================================================
// Light curves
// ============================================================================

fn plan() -> WindowPlan {
    WindowPlan::new(&[GoodTimeInterval::new(0.0, 1000.0)], 0.0, 1000.0, 100.0, 0.9).unwrap()
}

fn events_per_window(counts: &[usize], x: i32, y: i32) -> Vec<Event> {
    counts
        .iter()
        .enumerate()
        .flat_map(|(w, &n)| (0..n).map(move |i| Event::new(w as f64 * 100.0 + i as f64, x, y, 0)))
        .collect()
}

#[test]
fn test_light_curve_peak() {
    let events = events_per_window(&[2, 2, 2, 12, 2, 2, 2, 2, 2, 2], 10, 10);
    let curve = light_curve(&events, &plan(), &area(&[(10, 10)]));

    assert_eq!(curve.points.len(), 10);
    assert_eq!(curve.points[3].counts, 12);
    assert!((curve.points[3].rate - 0.12).abs() < 1e-12);
    assert!((curve.median_rate - 0.02).abs() < 1e-12);
    assert_eq!(curve.extremum, Some((Excursion::Peak, 3)));
}

#[test]
fn test_light_curve_dip() {
    let events = events_per_window(&[5, 5, 5, 5, 5, 5, 1, 5, 5, 5], 10, 10);
    let curve = light_curve(&events, &plan(), &area(&[(10, 10)]));
    assert_eq!(curve.extremum, Some((Excursion::Dip, 6)));
}

#[test]
fn test_light_curve_ignores_other_pixels() {
    let events = events_per_window(&[3; 10], 20, 20);
    let curve = light_curve(&events, &plan(), &area(&[(10, 10)]));
    assert!(curve.points.iter().all(|p| p.counts == 0));
    assert_eq!(curve.median_rate, 0.0);
    assert_eq!(curve.extremum, None);
}

#[test]
fn test_light_curve_only_accepted_windows() {
    let plan = WindowPlan::new(
        &[
            GoodTimeInterval::new(0.0, 300.0),
            GoodTimeInterval::new(500.0, 1000.0),
        ],
        0.0,
        1000.0,
        100.0,
        0.9,
    )
    .unwrap();
    let events = events_per_window(&[1; 10], 10, 10);
    let curve = light_curve(&events, &plan, &area(&[(10, 10)]));
    let windows: Vec<usize> = curve.points.iter().map(|p| p.window).collect();
    assert_eq!(windows, vec![0, 1, 2, 5, 6, 7, 8, 9]);
}
