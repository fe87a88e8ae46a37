use std::fmt::Write;

use heatmap_shared::heat::{gradient_color, intensities, HeatmapOptions};

/// Gradient fills are shared between points of similar intensity.
const INTENSITY_BUCKETS: usize = 10;

/// A weighted point already placed in container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatSample {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

fn bucket_for(intensity: f64) -> usize {
    ((intensity * INTENSITY_BUCKETS as f64).ceil() as usize).clamp(1, INTENSITY_BUCKETS)
}

/// Build the heat overlay for a `width` x `height` container as an SVG string.
///
/// Each sample is a radial blob coloured by its intensity; samples further than one
/// radius outside the container are skipped.
pub fn build_heat_svg(
    samples: &[HeatSample],
    width: f64,
    height: f64,
    options: &HeatmapOptions,
) -> String {
    let radius = options.radius_px;
    let weights: Vec<f64> = samples.iter().map(|s| s.weight).collect();
    let levels = intensities(&weights, options.max_intensity);

    let mut svg = String::with_capacity(1024 + samples.len() * 96);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" style="position:absolute;top:0;left:0;pointer-events:none;">"#
    );

    svg.push_str("<defs>");
    for bucket in 1..=INTENSITY_BUCKETS {
        let color = gradient_color(&options.gradient, bucket as f64 / INTENSITY_BUCKETS as f64);
        let _ = write!(
            svg,
            r#"<radialGradient id="heat-{bucket}"><stop offset="0%" stop-color="rgb({r},{g},{b})" stop-opacity="{a}"/><stop offset="100%" stop-color="rgb({r},{g},{b})" stop-opacity="0"/></radialGradient>"#,
            r = color.r,
            g = color.g,
            b = color.b,
            a = color.a,
        );
    }
    svg.push_str("</defs>");

    let _ = write!(svg, r#"<g opacity="{}">"#, options.opacity);
    for (sample, level) in samples.iter().zip(levels) {
        if level <= 0.0 {
            continue;
        }
        let outside = sample.x < -radius
            || sample.y < -radius
            || sample.x > width + radius
            || sample.y > height + radius;
        if outside {
            continue;
        }
        let _ = write!(
            svg,
            r#"<circle cx="{}" cy="{}" r="{radius}" fill="url(#heat-{})"/>"#,
            sample.x,
            sample.y,
            bucket_for(level)
        );
    }
    svg.push_str("</g></svg>");
    svg
}
