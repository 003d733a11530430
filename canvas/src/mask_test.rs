use super::*;

fn revealed_mask(w: u32, h: u32) -> FogMask {
    let mut mask = FogMask::hidden(w, h);
    mask.reveal_all();
    mask
}

fn value_at(mask: &FogMask, x: i64, y: i64) -> u8 {
    mask.get(MapPoint::new(x, y)).unwrap()
}

// --- Construction ---

#[test]
fn hidden_mask_is_all_zero() {
    let mask = FogMask::hidden(20, 10);
    assert_eq!(mask.dimensions(), (20, 10));
    assert!(mask.image().as_raw().iter().all(|&v| v == HIDDEN));
    assert_eq!(mask.revealed_count(), 0);
}

#[test]
fn get_outside_bounds_is_none() {
    let mask = FogMask::hidden(4, 4);
    assert_eq!(mask.get(MapPoint::new(-1, 0)), None);
    assert_eq!(mask.get(MapPoint::new(4, 0)), None);
    assert_eq!(mask.get(MapPoint::new(0, 4)), None);
    assert_eq!(mask.get(MapPoint::new(3, 3)), Some(HIDDEN));
}

// --- from_stored ---

#[test]
fn from_stored_absent_creates_hidden() {
    let (mask, load) = FogMask::from_stored(None, 8, 6);
    assert_eq!(load, MaskLoad::Created);
    assert_eq!(mask.dimensions(), (8, 6));
    assert_eq!(mask.revealed_count(), 0);
}

#[test]
fn from_stored_wrong_size_is_repaired_hidden() {
    let stored = GrayImage::from_pixel(5, 5, Luma([REVEALED]));
    let (mask, load) = FogMask::from_stored(Some(stored), 8, 6);
    assert_eq!(load, MaskLoad::Repaired { found_width: 5, found_height: 5 });
    assert_eq!(mask.dimensions(), (8, 6));
    assert_eq!(mask.revealed_count(), 0);
}

#[test]
fn from_stored_matching_size_is_restored() {
    let mut stored = GrayImage::from_pixel(4, 4, Luma([HIDDEN]));
    stored.put_pixel(1, 2, Luma([REVEALED]));
    let (mask, load) = FogMask::from_stored(Some(stored), 4, 4);
    assert_eq!(load, MaskLoad::Restored);
    assert!(mask.is_revealed(MapPoint::new(1, 2)));
    assert_eq!(mask.revealed_count(), 1);
}

#[test]
fn from_stored_snaps_stray_values() {
    let mut stored = GrayImage::from_pixel(3, 1, Luma([0]));
    stored.put_pixel(0, 0, Luma([127]));
    stored.put_pixel(1, 0, Luma([128]));
    stored.put_pixel(2, 0, Luma([200]));
    let (mask, _) = FogMask::from_stored(Some(stored), 3, 1);
    assert_eq!(mask.image().as_raw(), &vec![HIDDEN, REVEALED, REVEALED]);
}

// --- apply_brush ---

#[test]
fn brush_reveals_disc() {
    let mut mask = FogMask::hidden(21, 21);
    assert!(mask.apply_brush(10, 10, 3, true));
    assert_eq!(value_at(&mask, 10, 10), REVEALED);
    assert_eq!(value_at(&mask, 13, 10), REVEALED);
    assert_eq!(value_at(&mask, 10, 7), REVEALED);
    // Corner of the bounding box lies outside the disc.
    assert_eq!(value_at(&mask, 13, 13), HIDDEN);
    assert_eq!(value_at(&mask, 14, 10), HIDDEN);
}

#[test]
fn brush_radius_zero_stamps_single_pixel() {
    let mut mask = FogMask::hidden(5, 5);
    mask.apply_brush(2, 2, 0, true);
    assert_eq!(mask.revealed_count(), 1);
    assert!(mask.is_revealed(MapPoint::new(2, 2)));
}

#[test]
fn brush_negative_radius_acts_as_zero() {
    let mut mask = FogMask::hidden(5, 5);
    mask.apply_brush(2, 2, -4, true);
    assert_eq!(mask.revealed_count(), 1);
}

#[test]
fn brush_hide_clears_revealed_pixels() {
    let mut mask = revealed_mask(11, 11);
    assert!(mask.apply_brush(5, 5, 2, false));
    assert_eq!(value_at(&mask, 5, 5), HIDDEN);
    assert_eq!(value_at(&mask, 0, 0), REVEALED);
}

#[test]
fn brush_clips_at_edges() {
    let mut mask = FogMask::hidden(10, 10);
    assert!(mask.apply_brush(0, 0, 3, true));
    assert!(mask.is_revealed(MapPoint::new(0, 0)));
    assert!(mask.is_revealed(MapPoint::new(3, 0)));
}

#[test]
fn brush_fully_outside_is_noop() {
    let mut mask = FogMask::hidden(10, 10);
    assert!(!mask.apply_brush(-50, -50, 3, true));
    assert_eq!(mask.revealed_count(), 0);
}

#[test]
fn huge_radius_reveals_everything() {
    let mut mask = FogMask::hidden(10, 10);
    assert!(mask.apply_brush(5, 5, i64::MAX, true));
    assert_eq!(mask.revealed_count(), 100);
}

#[test]
fn extreme_center_does_not_overflow() {
    let mut mask = FogMask::hidden(10, 10);
    assert!(!mask.apply_brush(i64::MAX, i64::MIN, 50, true));
    assert!(!mask.apply_brush(i64::MIN, i64::MIN, i64::MAX, true));
    assert_eq!(mask.revealed_count(), 0);

    // Far away but with a radius that still reaches the corner.
    assert!(mask.apply_brush(-1_000_000_000, 0, 1_000_000_000, true));
    assert!(mask.is_revealed(MapPoint::new(0, 0)));
    assert!(!mask.is_revealed(MapPoint::new(1, 0)));
}

#[test]
fn brush_is_idempotent() {
    let mut mask = FogMask::hidden(40, 40);
    mask.apply_brush(17, 22, 9, true);
    let first = mask.image().clone();
    assert!(!mask.apply_brush(17, 22, 9, true));
    assert_eq!(mask.image(), &first);
}

// --- apply_rectangle ---

#[test]
fn rectangle_is_inclusive() {
    let mut mask = FogMask::hidden(10, 10);
    mask.apply_rectangle(2, 3, 4, 5, true);
    assert_eq!(mask.revealed_count(), 9);
    assert!(mask.is_revealed(MapPoint::new(4, 5)));
    assert!(!mask.is_revealed(MapPoint::new(5, 5)));
}

#[test]
fn rectangle_normalizes_corners() {
    let mut a = FogMask::hidden(10, 10);
    let mut b = FogMask::hidden(10, 10);
    a.apply_rectangle(1, 1, 6, 4, true);
    b.apply_rectangle(6, 4, 1, 1, true);
    assert_eq!(a, b);
}

#[test]
fn rectangle_clips_to_mask() {
    let mut mask = FogMask::hidden(5, 5);
    mask.apply_rectangle(-10, -10, 100, 1, true);
    assert_eq!(mask.revealed_count(), 10);
}

// --- reveal_all / hide_all ---

#[test]
fn reveal_hide_region_reveal_is_all_revealed() {
    let mut mask = FogMask::hidden(16, 12);
    mask.reveal_all();
    mask.apply_rectangle(2, 2, 9, 7, false);
    mask.reveal_all();
    assert!(mask.image().as_raw().iter().all(|&v| v == REVEALED));
}

#[test]
fn reveal_all_reports_no_change_when_already_revealed() {
    let mut mask = revealed_mask(4, 4);
    assert!(!mask.reveal_all());
    assert!(mask.hide_all());
    assert!(!mask.hide_all());
}

// --- Snapshots ---

#[test]
fn snapshot_is_unaffected_by_later_edits() {
    let mut mask = FogMask::hidden(6, 6);
    let before = mask.snapshot();
    mask.apply_brush(3, 3, 1, true);
    assert!(before.as_raw().iter().all(|&v| v == HIDDEN));
    assert!(mask.is_revealed(MapPoint::new(3, 3)));
}

#[test]
fn noop_edit_keeps_snapshot_shared() {
    let mut mask = FogMask::hidden(6, 6);
    let before = mask.snapshot();
    mask.apply_brush(3, 3, 1, false);
    assert!(Arc::ptr_eq(&before, &mask.snapshot()));
}
