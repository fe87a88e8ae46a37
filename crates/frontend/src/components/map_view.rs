use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use heatmap_shared::config::RuntimeConfig;
use heatmap_shared::heat::HeatmapOptions;
use heatmap_shared::models::{LatLng, MapPoint, PointKind, ViewportChange};
use heatmap_shared::projection::{self, TILE_SIZE};

use crate::components::heat_layer::{build_heat_svg, HeatSample};
use crate::coords;

const MAP_CONTAINER_ID: &str = "heatmap-map-container";

/// Movement below this many pixels is a click, not a drag.
const DRAG_THRESHOLD: f64 = 3.0;

/// Accumulated wheel travel needed for one zoom step.
const WHEEL_STEP: f64 = 100.0;

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

/// Get the bounding client rect of the map container element.
fn container_rect() -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(MAP_CONTAINER_ID)?;
    Some(element.get_bounding_client_rect())
}

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// Add `delta` to the running wheel total; once it passes a full step, return the
/// zoom step (+1 in, -1 out) and the leftover.
fn accumulate_wheel(total: f64, delta: f64) -> (Option<i8>, f64) {
    let total = total + delta;
    if total <= -WHEEL_STEP {
        (Some(1), 0.0)
    } else if total >= WHEEL_STEP {
        (Some(-1), 0.0)
    } else {
        (None, total)
    }
}

fn marker_class(kind: PointKind) -> &'static str {
    match kind {
        PointKind::District => "map-marker district",
        PointKind::Locality => "map-marker locality",
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
fn PointMarker(
    point: MapPoint,
    x: f64,
    y: f64,
    on_enter: EventHandler<MapPoint>,
    on_leave: EventHandler<()>,
    on_click: EventHandler<MapPoint>,
) -> Element {
    let class = marker_class(point.kind);
    let title = point.name.clone();
    let enter_point = point.clone();

    rsx! {
        div {
            class: "{class}",
            title: "{title}",
            style: "left:{x}px;top:{y}px;",
            onmouseenter: move |_| on_enter.call(enter_point.clone()),
            onmouseleave: move |_| on_leave.call(()),
            onclick: move |evt: Event<MouseData>| {
                evt.stop_propagation();
                on_click.call(point.clone());
            },
            ondoubleclick: move |evt: Event<MouseData>| evt.stop_propagation(),
        }
    }
}

/// Slippy map with a heat overlay, hoverable markers and an anchored popup slot.
///
/// Shows "Loading..." until `config` is available and the container has been measured.
/// After that, every pan, zoom or resize reports the visible bounds through
/// `on_viewport_change`.
#[component]
pub fn MapView(
    config: Option<RuntimeConfig>,
    points: Vec<MapPoint>,
    on_viewport_change: EventHandler<ViewportChange>,
    on_marker_enter: EventHandler<MapPoint>,
    on_marker_leave: EventHandler<()>,
    on_marker_click: EventHandler<MapPoint>,
    popup_anchor: Option<LatLng>,
    children: Element,
) -> Element {
    match config {
        Some(config) => rsx! {
            MapSurface {
                config,
                points,
                on_viewport_change,
                on_marker_enter,
                on_marker_leave,
                on_marker_click,
                popup_anchor,
                {children}
            }
        },
        None => rsx! {
            div { class: "map-container",
                div { class: "map-loading", "Loading..." }
            }
        },
    }
}

#[component]
fn MapSurface(
    config: RuntimeConfig,
    points: Vec<MapPoint>,
    on_viewport_change: EventHandler<ViewportChange>,
    on_marker_enter: EventHandler<MapPoint>,
    on_marker_leave: EventHandler<()>,
    on_marker_click: EventHandler<MapPoint>,
    popup_anchor: Option<LatLng>,
    children: Element,
) -> Element {
    let initial_center = config.initial_center;
    let initial_zoom = config
        .initial_zoom
        .clamp(projection::MIN_ZOOM, projection::MAX_ZOOM);

    let mut center = use_signal(|| initial_center);
    let mut zoom = use_signal(|| initial_zoom);
    let mut size = use_signal(|| None::<(f64, f64)>);
    let mut wheel_total = use_signal(|| 0.0_f64);

    // Drag state
    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start = use_signal(|| (0.0_f64, 0.0_f64));
    let mut drag_start_center = use_signal(|| initial_center);

    let mut measure = move || {
        if let Some(rect) = container_rect() {
            let next = Some((rect.width(), rect.height()));
            if *size.peek() != next {
                size.set(next);
            }
        }
    };

    // Report bounds whenever the view changes once the container has a size.
    use_effect(move || {
        let Some((w, h)) = *size.read() else { return };
        let c = *center.read();
        let z = *zoom.read();
        let bounds = projection::viewport_bounds(c, z, w, h);
        on_viewport_change.call(ViewportChange {
            bounds,
            zoom: f64::from(z),
        });
    });

    let mut zoom_about = move |step: i8, cursor: Option<(f64, f64)>| {
        let Some((w, h)) = *size.peek() else { return };
        let old_z = *zoom.peek();
        let new_z = coords::step_zoom(old_z, step);
        if new_z == old_z {
            return;
        }
        let (cx, cy) = cursor.unwrap_or((w / 2.0, h / 2.0));
        let next = coords::zoom_center_at_cursor(*center.peek(), old_z, new_z, cx, cy, w, h);
        center.set(next);
        zoom.set(new_z);
    };

    let cur_center = *center.read();
    let cur_zoom = *zoom.read();
    let cur_size = *size.read();
    let container_class = if *is_dragging.read() && *did_drag.read() {
        "map-container dragging"
    } else {
        "map-container"
    };

    let Some((width, height)) = cur_size else {
        return rsx! {
            div {
                id: MAP_CONTAINER_ID,
                class: "{container_class}",
                onmounted: move |_| measure(),
                div { class: "map-loading", "Loading..." }
            }
        };
    };

    let (center_x, center_y) = projection::project(cur_center, cur_zoom);
    let origin_x = center_x - width / 2.0;
    let tiles: Vec<(String, String, f64, f64)> =
        projection::visible_tiles((center_x, center_y), cur_zoom, width, height)
            .into_iter()
            .map(|slot| {
                let col = ((slot.left + origin_x) / TILE_SIZE).round() as i64;
                let key = format!("{}/{}/{}", slot.zoom, col, slot.y);
                let url = config.tile_url(slot.zoom, slot.x, slot.y);
                (key, url, slot.left, slot.top)
            })
            .collect();

    let placed: Vec<(String, MapPoint, f64, f64)> = points
        .iter()
        .map(|p| {
            let (x, y) =
                coords::latlng_to_container(p.position(), cur_center, cur_zoom, width, height);
            (format!("{}-{}-{}", p.kind, p.lat, p.lng), p.clone(), x, y)
        })
        .collect();

    let samples: Vec<HeatSample> = placed
        .iter()
        .map(|(_, p, x, y)| HeatSample {
            x: *x,
            y: *y,
            weight: p.weight,
        })
        .collect();
    let heat_svg = build_heat_svg(&samples, width, height, &HeatmapOptions::default());

    let popup_position = popup_anchor.map(|anchor| {
        coords::latlng_to_container(anchor, cur_center, cur_zoom, width, height)
    });

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",
            onmounted: move |_| measure(),
            onresize: move |_| measure(),

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                let delta_y = wheel_delta_y(evt.data().delta());
                let (step, rest) = accumulate_wheel(*wheel_total.peek(), delta_y);
                wheel_total.set(rest);
                let Some(step) = step else { return };
                let Some(rect) = container_rect() else { return };
                let client = evt.data().client_coordinates();
                let cursor = coords::client_to_container(client.x, client.y, rect.left(), rect.top());
                zoom_about(step, Some(cursor));
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                is_dragging.set(true);
                did_drag.set(false);
                drag_start.set((client.x, client.y));
                drag_start_center.set(*center.peek());
            },

            onmousemove: move |evt: Event<MouseData>| {
                if !*is_dragging.peek() {
                    return;
                }
                let client = evt.client_coordinates();
                let (sx, sy) = *drag_start.peek();
                let dx = client.x - sx;
                let dy = client.y - sy;

                if !*did_drag.peek() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                    did_drag.set(true);
                }
                if *did_drag.peek() {
                    let next = coords::drag_center(*drag_start_center.peek(), *zoom.peek(), dx, dy);
                    center.set(next);
                }
            },

            onmouseup: move |_| {
                is_dragging.set(false);
            },

            onmouseleave: move |_| {
                is_dragging.set(false);
            },

            ondoubleclick: move |evt: Event<MouseData>| {
                evt.prevent_default();
                let Some(rect) = container_rect() else { return };
                let client = evt.client_coordinates();
                let cursor = coords::client_to_container(client.x, client.y, rect.left(), rect.top());
                zoom_about(1, Some(cursor));
            },

            div { class: "map-tiles",
                for (key, url, left, top) in tiles {
                    img {
                        key: "{key}",
                        class: "map-tile",
                        src: "{url}",
                        draggable: "false",
                        alt: "",
                        style: "left:{left}px;top:{top}px;width:{TILE_SIZE}px;height:{TILE_SIZE}px;",
                    }
                }
            }

            div {
                class: "map-heat",
                dangerous_inner_html: "{heat_svg}",
            }

            div { class: "map-markers",
                for (key, point, x, y) in placed {
                    PointMarker {
                        key: "{key}",
                        point,
                        x,
                        y,
                        on_enter: on_marker_enter,
                        on_leave: on_marker_leave,
                        on_click: on_marker_click,
                    }
                }
            }

            if let Some((px, py)) = popup_position {
                div {
                    class: "map-popup-anchor",
                    style: "left:{px}px;top:{py}px;",
                    {children}
                }
            }

            div { class: "map-zoom-controls",
                button {
                    class: "map-zoom-in",
                    title: "Zoom in",
                    disabled: cur_zoom >= projection::MAX_ZOOM,
                    onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                    ondoubleclick: move |evt: Event<MouseData>| evt.stop_propagation(),
                    onclick: move |_| zoom_about(1, None),
                    "+"
                }
                button {
                    class: "map-zoom-out",
                    title: "Zoom out",
                    disabled: cur_zoom <= projection::MIN_ZOOM,
                    onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                    ondoubleclick: move |evt: Event<MouseData>| evt.stop_propagation(),
                    onclick: move |_| zoom_about(-1, None),
                    "−"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_accumulates_until_step() {
        let (step, rest) = accumulate_wheel(0.0, -40.0);
        assert_eq!(step, None);
        assert!((rest + 40.0).abs() < 1e-9);

        let (step, rest) = accumulate_wheel(rest, -80.0);
        assert_eq!(step, Some(1));
        assert_eq!(rest, 0.0);
    }

    #[test]
    fn test_wheel_down_zooms_out() {
        assert_eq!(accumulate_wheel(0.0, 120.0).0, Some(-1));
    }

    #[test]
    fn test_wheel_direction_change_cancels_out() {
        let (_, rest) = accumulate_wheel(0.0, -60.0);
        let (step, rest) = accumulate_wheel(rest, 60.0);
        assert_eq!(step, None);
        assert_eq!(rest, 0.0);
    }

    #[test]
    fn test_marker_class_by_kind() {
        assert_eq!(marker_class(PointKind::District), "map-marker district");
        assert_eq!(marker_class(PointKind::Locality), "map-marker locality");
    }
}
