use super::*;
use crate::consts::{HIDDEN, REVEALED};

fn surface(w: u32, h: u32) -> Arc<RgbaImage> {
    Arc::new(RgbaImage::new(w, h))
}

#[test]
fn new_without_stored_mask_is_hidden() {
    let id = Uuid::new_v4();
    let (map, load) = ActiveMap::new(id, surface(8, 6), None, TileSpec::default(), MapPoint::default());
    assert_eq!(load, MaskLoad::Created);
    assert_eq!(map.id(), id);
    assert_eq!(map.dimensions(), (8, 6));
    assert_eq!(map.mask().dimensions(), (8, 6));
    assert_eq!(map.mask().revealed_count(), 0);
}

#[test]
fn new_restores_matching_mask() {
    let stored = GrayImage::from_pixel(8, 6, image::Luma([REVEALED]));
    let (map, load) =
        ActiveMap::new(Uuid::new_v4(), surface(8, 6), Some(stored), TileSpec::default(), MapPoint::new(3, 4));
    assert_eq!(load, MaskLoad::Restored);
    assert_eq!(map.mask().revealed_count(), 48);
    assert_eq!(map.pan(), MapPoint::new(3, 4));
}

#[test]
fn new_repairs_mismatched_mask() {
    let stored = GrayImage::from_pixel(4, 4, image::Luma([REVEALED]));
    let (map, load) =
        ActiveMap::new(Uuid::new_v4(), surface(8, 6), Some(stored), TileSpec::default(), MapPoint::default());
    assert_eq!(load, MaskLoad::Repaired { found_width: 4, found_height: 4 });
    assert_eq!(map.mask().get(MapPoint::new(0, 0)), Some(HIDDEN));
}

#[test]
fn mask_mut_edits_in_place() {
    let (mut map, _) = ActiveMap::new(Uuid::new_v4(), surface(8, 8), None, TileSpec::default(), MapPoint::default());
    assert!(map.mask_mut().apply_brush(4, 4, 0, true));
    assert!(map.mask().is_revealed(MapPoint::new(4, 4)));
}

#[test]
fn setters_update_pan_and_tile() {
    let (mut map, _) = ActiveMap::new(Uuid::new_v4(), surface(8, 8), None, TileSpec::default(), MapPoint::default());
    map.set_pan(MapPoint::new(2, 1));
    map.set_tile(TileSpec::new(50, 20.0).unwrap());
    assert_eq!(map.pan(), MapPoint::new(2, 1));
    assert_eq!(map.tile().tile_pixels, 50);
}
