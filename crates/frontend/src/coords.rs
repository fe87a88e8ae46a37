use heatmap_shared::models::LatLng;
use heatmap_shared::projection::{self, world_size};

/// Convert client (viewport) coordinates to container-relative pixel coordinates.
pub fn client_to_container(
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
) -> (f64, f64) {
    (client_x - rect_left, client_y - rect_top)
}

/// Keep a world pixel position inside the Mercator square: x wraps, y clamps.
fn normalize_world(x: f64, y: f64, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    (x.rem_euclid(size), y.clamp(0.0, size))
}

/// Position of `point` inside a `width` x `height` container centred on `center`.
///
/// Picks the world copy closest to the centre so markers near the antimeridian stay visible.
pub fn latlng_to_container(
    point: LatLng,
    center: LatLng,
    zoom: u8,
    width: f64,
    height: f64,
) -> (f64, f64) {
    let size = world_size(zoom);
    let (cx, cy) = projection::project(center, zoom);
    let (px, py) = projection::project(point, zoom);
    let mut dx = px - cx;
    if dx > size / 2.0 {
        dx -= size;
    } else if dx < -size / 2.0 {
        dx += size;
    }
    (width / 2.0 + dx, height / 2.0 + (py - cy))
}

/// Lat/lng under a container-relative pixel.
pub fn container_to_latlng(
    x: f64,
    y: f64,
    center: LatLng,
    zoom: u8,
    width: f64,
    height: f64,
) -> LatLng {
    let (cx, cy) = projection::project(center, zoom);
    let (wx, wy) = normalize_world(cx + x - width / 2.0, cy + y - height / 2.0, zoom);
    projection::unproject(wx, wy, zoom)
}

/// New centre after dragging the map by `(dx, dy)` pixels from `start`.
pub fn drag_center(start: LatLng, zoom: u8, dx: f64, dy: f64) -> LatLng {
    let (cx, cy) = projection::project(start, zoom);
    let (wx, wy) = normalize_world(cx - dx, cy - dy, zoom);
    projection::unproject(wx, wy, zoom)
}

/// New centre so the point under the cursor stays put when zooming from `old_zoom` to `new_zoom`.
pub fn zoom_center_at_cursor(
    center: LatLng,
    old_zoom: u8,
    new_zoom: u8,
    cursor_x: f64,
    cursor_y: f64,
    width: f64,
    height: f64,
) -> LatLng {
    let anchor = container_to_latlng(cursor_x, cursor_y, center, old_zoom, width, height);
    let (ax, ay) = projection::project(anchor, new_zoom);
    let (wx, wy) = normalize_world(
        ax - (cursor_x - width / 2.0),
        ay - (cursor_y - height / 2.0),
        new_zoom,
    );
    projection::unproject(wx, wy, new_zoom)
}

/// Step an integer zoom level by `step`, staying within the supported range.
pub fn step_zoom(zoom: u8, step: i8) -> u8 {
    let next = i16::from(zoom) + i16::from(step);
    next.clamp(
        i16::from(projection::MIN_ZOOM),
        i16::from(projection::MAX_ZOOM),
    ) as u8
}
