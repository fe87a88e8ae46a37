use dioxus::prelude::*;
use heatmap_shared::models::{SpanDelta, ViewportBounds};

fn format_zoom(zoom: Option<f64>) -> String {
    zoom.map(|z| z.to_string()).unwrap_or_else(|| "-".to_string())
}

fn format_bounds(bounds: Option<ViewportBounds>) -> String {
    bounds
        .and_then(|b| serde_json::to_string_pretty(&b).ok())
        .unwrap_or_else(|| "-".to_string())
}

fn format_delta(delta: SpanDelta) -> (String, String) {
    (format!("{:.4}", delta.lat), format!("{:.4}", delta.lng))
}

/// Current zoom, raw bounds and their span, plus what the last fetch returned.
#[component]
pub fn DiagnosticsPanel(
    zoom: Option<f64>,
    bounds: Option<ViewportBounds>,
    delta: SpanDelta,
    point_count: usize,
    settling: bool,
) -> Element {
    let zoom_text = format_zoom(zoom);
    let bounds_text = format_bounds(bounds);
    let (delta_lat, delta_lng) = format_delta(delta);

    rsx! {
        aside { class: "diagnostics-panel",
            h2 { "Viewport" }
            dl {
                dt { "Zoom" }
                dd { "{zoom_text}" }
                dt { "Δ lat" }
                dd { "{delta_lat}" }
                dt { "Δ lng" }
                dd { "{delta_lng}" }
                dt { "Points" }
                dd { "{point_count}" }
            }
            if settling {
                p { class: "diagnostics-settling", "Waiting for the map to settle…" }
            }
            h3 { "Bounds" }
            pre { class: "diagnostics-bounds", "{bounds_text}" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_four_decimals() {
        let (lat, lng) = format_delta(SpanDelta {
            lat: 2.123456,
            lng: 0.5,
        });
        assert_eq!(lat, "2.1235");
        assert_eq!(lng, "0.5000");
    }

    #[test]
    fn test_missing_values_render_dash() {
        assert_eq!(format_zoom(None), "-");
        assert_eq!(format_bounds(None), "-");
        assert_eq!(format_zoom(Some(7.0)), "7");
    }

    #[test]
    fn test_bounds_as_json() {
        let text = format_bounds(Some(ViewportBounds {
            north: 21.0,
            south: 18.0,
            east: 78.0,
            west: 73.0,
        }));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["north"], 21.0);
        assert_eq!(parsed["west"], 73.0);
    }
}
