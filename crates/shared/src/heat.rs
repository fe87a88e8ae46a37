pub const DEFAULT_RADIUS_PX: f64 = 22.5;
pub const DEFAULT_OPACITY: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Rgba { r, g, b, a }
    }

    fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let channel = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgba {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }
}

/// Transparent green through yellow and orange to red.
pub const DEFAULT_GRADIENT: [Rgba; 4] = [
    Rgba::new(0, 255, 0, 0.0),
    Rgba::new(255, 255, 0, 1.0),
    Rgba::new(255, 165, 0, 1.0),
    Rgba::new(255, 0, 0, 1.0),
];

/// Rendering options for the heat overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapOptions {
    pub radius_px: f64,
    pub opacity: f64,
    pub gradient: Vec<Rgba>,
    /// Weight that maps to full intensity. `None` uses the heaviest point of the batch.
    pub max_intensity: Option<f64>,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        HeatmapOptions {
            radius_px: DEFAULT_RADIUS_PX,
            opacity: DEFAULT_OPACITY,
            gradient: DEFAULT_GRADIENT.to_vec(),
            max_intensity: None,
        }
    }
}

/// Colour at position `t` in `[0, 1]` along evenly spaced gradient stops.
pub fn gradient_color(stops: &[Rgba], t: f64) -> Rgba {
    match stops {
        [] => Rgba::new(0, 0, 0, 0.0),
        [only] => *only,
        _ => {
            let t = t.clamp(0.0, 1.0);
            let scaled = t * (stops.len() - 1) as f64;
            let index = (scaled.floor() as usize).min(stops.len() - 2);
            stops[index].lerp(stops[index + 1], scaled - index as f64)
        }
    }
}

/// Map weights to intensities in `[0, 1]`, clamped at `max_intensity`.
pub fn intensities(weights: &[f64], max_intensity: Option<f64>) -> Vec<f64> {
    let cap = max_intensity
        .filter(|m| *m > 0.0)
        .unwrap_or_else(|| weights.iter().copied().fold(0.0, f64::max));
    if cap <= 0.0 {
        return vec![0.0; weights.len()];
    }
    weights.iter().map(|w| (w / cap).clamp(0.0, 1.0)).collect()
}
