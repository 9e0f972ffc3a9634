//! Colour scales for concentration maps.

use plotters::style::RGBColor;

/// The classic "jet" map: blue through cyan, yellow to red
pub fn jet(fraction: f64) -> RGBColor {
    let v = fraction.clamp(0.0, 1.0);
    let channel = |centre: f64| {
        let intensity = (1.5 - (4.0 * v - centre).abs()).clamp(0.0, 1.0);
        (intensity * 255.0).round() as u8
    };
    RGBColor(channel(3.0), channel(2.0), channel(1.0))
}

/// Logarithmic normalisation onto `[0, 1]`
#[derive(Debug, Clone, Copy)]
pub struct LogNorm {
    log_min: f64,
    log_max: f64,
}

impl LogNorm {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            log_min: min.log10(),
            log_max: max.log10(),
        }
    }

    /// Position of `value` on the scale; values below the minimum, including
    /// zero and negatives, sit at the bottom
    pub fn normalize(&self, value: f64) -> f64 {
        if value <= 0.0 {
            return 0.0;
        }
        ((value.log10() - self.log_min) / (self.log_max - self.log_min)).clamp(0.0, 1.0)
    }
}
