//! Web Mercator tiling used by the map widget.
//!
//! World pixel space at zoom `z` is a square of `TILE_SIZE * 2^z` pixels with the
//! origin at the north-west corner (lat 85.05°, lng -180°).

use crate::models::{LatLng, ViewportBounds};

pub const TILE_SIZE: f64 = 256.0;

/// Latitude where the Mercator square ends.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

pub const MIN_ZOOM: u8 = 3;
pub const MAX_ZOOM: u8 = 18;

/// Side length of the world square in pixels.
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * f64::from(1u32 << zoom)
}

/// Lat/lng to world pixel coordinates.
pub fn project(point: LatLng, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * size;
    (x, y)
}

/// World pixel coordinates back to lat/lng. `y` is clamped to the world square.
pub fn unproject(x: f64, y: f64, zoom: u8) -> LatLng {
    let size = world_size(zoom);
    let y = y.clamp(0.0, size);
    let lng = x / size * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / size);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Bounds of a `width` x `height` viewport centred on `center`.
pub fn viewport_bounds(center: LatLng, zoom: u8, width: f64, height: f64) -> ViewportBounds {
    let (cx, cy) = project(center, zoom);
    let north_west = unproject(cx - width / 2.0, cy - height / 2.0, zoom);
    let south_east = unproject(cx + width / 2.0, cy + height / 2.0, zoom);
    ViewportBounds {
        north: north_west.lat,
        south: south_east.lat,
        east: south_east.lng.min(180.0),
        west: north_west.lng.max(-180.0),
    }
}

/// A raster tile and where its top-left corner lands in the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSlot {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
    pub left: f64,
    pub top: f64,
}

/// Tiles covering a `width` x `height` viewport centred on world pixel `center`.
///
/// Columns wrap around the antimeridian; rows outside the world square are skipped.
pub fn visible_tiles(center: (f64, f64), zoom: u8, width: f64, height: f64) -> Vec<TileSlot> {
    let tiles_per_side = 1i64 << zoom;
    let origin_x = center.0 - width / 2.0;
    let origin_y = center.1 - height / 2.0;

    let first_col = (origin_x / TILE_SIZE).floor() as i64;
    let last_col = ((origin_x + width) / TILE_SIZE).ceil() as i64 - 1;
    let first_row = ((origin_y / TILE_SIZE).floor() as i64).max(0);
    let last_row = (((origin_y + height) / TILE_SIZE).ceil() as i64 - 1).min(tiles_per_side - 1);

    let mut slots = Vec::new();
    for row in first_row..=last_row {
        for col in first_col..=last_col {
            slots.push(TileSlot {
                x: col.rem_euclid(tiles_per_side) as u32,
                y: row as u32,
                zoom,
                left: col as f64 * TILE_SIZE - origin_x,
                top: row as f64 * TILE_SIZE - origin_y,
            });
        }
    }
    slots
}
