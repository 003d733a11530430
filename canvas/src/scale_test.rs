#![allow(clippy::float_cmp)]

use super::*;

fn monitor(name: &str, width_px: u32, width_mm: Option<f64>, is_primary: bool) -> MonitorInfo {
    MonitorInfo {
        name: name.to_string(),
        x: 0,
        y: 0,
        width_px,
        height_px: 1080,
        width_mm,
        height_mm: None,
        is_primary,
    }
}

// --- calculate_scale ---

#[test]
fn calculate_scale_one_inch_tiles_at_96_dpi() {
    let scale = calculate_scale(70, 25.4, 3.78).unwrap();
    assert!((scale - 1.372).abs() < 1e-3, "scale {scale}");
}

#[test]
fn calculate_scale_is_linear_in_density() {
    let a = calculate_scale(100, 10.0, 2.0).unwrap();
    let b = calculate_scale(100, 10.0, 4.0).unwrap();
    assert!((b - 2.0 * a).abs() < 1e-12);
}

#[test]
fn calculate_scale_rejects_zero_tile_pixels() {
    assert_eq!(calculate_scale(0, 25.4, 3.78), Err(ScaleError::InvalidTilePixels));
}

#[test]
fn calculate_scale_rejects_non_positive_tile_size() {
    assert_eq!(calculate_scale(70, 0.0, 3.78), Err(ScaleError::InvalidTileSize(0.0)));
    assert!(calculate_scale(70, -1.0, 3.78).is_err());
    assert!(calculate_scale(70, f64::NAN, 3.78).is_err());
}

#[test]
fn calculate_scale_rejects_non_positive_density() {
    assert_eq!(calculate_scale(70, 25.4, 0.0), Err(ScaleError::InvalidDensity(0.0)));
}

// --- TileSpec ---

#[test]
fn tile_spec_default_is_one_inch_seventy_pixels() {
    let spec = TileSpec::default();
    assert_eq!(spec.tile_pixels, 70);
    assert_eq!(spec.tile_size_mm, 25.4);
}

#[test]
fn tile_spec_presentation_scale_matches_calculate_scale() {
    let spec = TileSpec::new(70, 25.4).unwrap();
    assert_eq!(spec.presentation_scale(3.78).unwrap(), calculate_scale(70, 25.4, 3.78).unwrap());
}

#[test]
fn tile_spec_from_image_width() {
    // 2000 px over 500 mm is 4 px/mm; a 25 mm tile is 100 px.
    let spec = TileSpec::from_image_width(2000, 500.0, 25.0).unwrap();
    assert_eq!(spec.tile_pixels, 100);
    assert_eq!(spec.tile_size_mm, 25.0);
}

#[test]
fn tile_spec_from_tiles_across_rounds() {
    let spec = TileSpec::from_tiles_across(1000, 14, 25.4).unwrap();
    assert_eq!(spec.tile_pixels, 71);
}

#[test]
fn tile_spec_from_tiles_across_rejects_zero() {
    assert!(TileSpec::from_tiles_across(1000, 0, 25.4).is_err());
}

#[test]
fn tile_spec_from_sample_averages_axes() {
    let spec = TileSpec::from_sample(210.0, 216.0, 3, 25.4).unwrap();
    assert_eq!(spec.tile_pixels, 71);
}

#[test]
fn tile_spec_never_rounds_to_zero_pixels() {
    let spec = TileSpec::from_image_width(10, 10_000.0, 1.0).unwrap();
    assert_eq!(spec.tile_pixels, 1);
}

#[test]
fn tile_spec_round_trips_through_json() {
    let spec = TileSpec::new(64, 30.0).unwrap();
    let json = serde_json::to_string(&spec).unwrap();
    let back: TileSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(back, spec);
}

// --- fit_scale ---

#[test]
fn fit_scale_uses_limiting_axis_with_margin() {
    let scale = fit_scale(ViewportSize::new(800, 600), 1000, 800).unwrap();
    assert!((scale - 0.75 * 0.95).abs() < 1e-12);
}

#[test]
fn fit_scale_none_for_empty_viewport_or_map() {
    assert_eq!(fit_scale(ViewportSize::new(0, 600), 1000, 800), None);
    assert_eq!(fit_scale(ViewportSize::new(800, 600), 0, 800), None);
}

// --- MonitorInfo ---

#[test]
fn monitor_ppmm_from_physical_width() {
    let m = monitor("wide", 1920, Some(480.0), false);
    assert_eq!(m.ppmm(), 4.0);
}

#[test]
fn monitor_ppmm_falls_back_when_unknown() {
    assert_eq!(monitor("a", 1920, None, false).ppmm(), DEFAULT_PPMM);
    assert_eq!(monitor("b", 1920, Some(0.0), false).ppmm(), DEFAULT_PPMM);
    assert_eq!(monitor("c", 1920, None, false).ppmm_or(5.0), 5.0);
}

// --- assign_monitors ---

#[test]
fn assign_monitors_empty_is_none() {
    assert_eq!(assign_monitors(&[], None), None);
}

#[test]
fn assign_monitors_single_disables_presentation() {
    let monitors = [monitor("only", 1920, None, true)];
    assert_eq!(assign_monitors(&monitors, None), Some(MonitorAssignment { authoring: 0, presentation: None }));
}

#[test]
fn assign_monitors_picks_first_non_primary() {
    let monitors = [monitor("tv", 1920, None, false), monitor("desk", 2560, None, true), monitor("x", 800, None, false)];
    assert_eq!(assign_monitors(&monitors, None), Some(MonitorAssignment { authoring: 1, presentation: Some(0) }));
}

#[test]
fn assign_monitors_honors_configured_index() {
    let monitors = [monitor("desk", 2560, None, true), monitor("a", 1920, None, false), monitor("b", 1920, None, false)];
    assert_eq!(assign_monitors(&monitors, Some(2)), Some(MonitorAssignment { authoring: 0, presentation: Some(2) }));
}

#[test]
fn assign_monitors_configured_primary_disables_presentation() {
    let monitors = [monitor("desk", 2560, None, true), monitor("a", 1920, None, false)];
    assert_eq!(assign_monitors(&monitors, Some(0)), Some(MonitorAssignment { authoring: 0, presentation: None }));
}

#[test]
fn assign_monitors_ignores_out_of_range_config() {
    let monitors = [monitor("desk", 2560, None, true), monitor("a", 1920, None, false)];
    assert_eq!(assign_monitors(&monitors, Some(9)), Some(MonitorAssignment { authoring: 0, presentation: Some(1) }));
}
