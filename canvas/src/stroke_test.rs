use super::*;

#[allow(clippy::cast_precision_loss)]
fn gap(a: MapPoint, b: MapPoint) -> f64 {
    ((b.x - a.x) as f64).hypot((b.y - a.y) as f64)
}

// --- interpolate ---

#[test]
fn horizontal_drag_is_densely_stamped() {
    let stamps = interpolate(MapPoint::new(0, 0), MapPoint::new(100, 0), 10.0);
    assert!(stamps.len() >= 19, "got {} stamps", stamps.len());
    assert_eq!(stamps.last(), Some(&MapPoint::new(100, 0)));

    let mut prev = MapPoint::new(0, 0);
    for s in &stamps {
        assert!(gap(prev, *s) <= 5.0, "gap {prev:?} -> {s:?}");
        prev = *s;
    }
}

#[test]
fn stamps_never_further_apart_than_brush_diameter() {
    let radius = 4.0;
    let stamps = interpolate(MapPoint::new(3, 7), MapPoint::new(250, -90), radius);
    let mut prev = MapPoint::new(3, 7);
    for s in &stamps {
        assert!(gap(prev, *s) <= radius * 2.0);
        prev = *s;
    }
}

#[test]
fn zero_distance_yields_single_stamp_at_endpoint() {
    let p = MapPoint::new(12, 12);
    assert_eq!(interpolate(p, p, 10.0), vec![p]);
}

#[test]
fn tiny_radius_steps_at_least_one_pixel() {
    let stamps = interpolate(MapPoint::new(0, 0), MapPoint::new(10, 0), 0.0);
    assert_eq!(stamps.len(), 10);
    assert_eq!(stamps[0], MapPoint::new(1, 0));
}

#[test]
fn short_move_rounds_to_one_stamp() {
    let stamps = interpolate(MapPoint::new(0, 0), MapPoint::new(2, 0), 10.0);
    assert_eq!(stamps, vec![MapPoint::new(2, 0)]);
}

#[test]
fn diagonal_drag_ends_on_endpoint() {
    let stamps = interpolate(MapPoint::new(10, 10), MapPoint::new(-30, 50), 6.0);
    assert_eq!(*stamps.last().unwrap(), MapPoint::new(-30, 50));
}

// --- Stroke ---

#[test]
fn stroke_first_sample_stamps_once() {
    let mut stroke = Stroke::new(10, true);
    assert_eq!(stroke.last(), None);
    assert_eq!(stroke.advance(MapPoint::new(5, 5)), vec![MapPoint::new(5, 5)]);
    assert_eq!(stroke.last(), Some(MapPoint::new(5, 5)));
}

#[test]
fn stroke_interpolates_from_previous_sample() {
    let mut stroke = Stroke::new(10, true);
    stroke.advance(MapPoint::new(0, 0));
    let stamps = stroke.advance(MapPoint::new(100, 0));
    assert_eq!(stamps.len(), 20);
    assert_eq!(stroke.last(), Some(MapPoint::new(100, 0)));
}
