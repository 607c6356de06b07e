//! Marker colours for map points
//!
//! Colours are derived from a hue on a fully saturated, full value wheel.
//! The hue to RGB mapping is pure; randomness only enters through the hue
//! picked by the caller.

use std::fmt;

/// Alpha used when a colour carries none
pub const DEFAULT_ALPHA: f64 = 1.0;

/// RGB colour with optional alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: Option<f64>,
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: None }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha.clamp(0.0, 1.0));
        self
    }

    /// Format as a CSS `rgba(r, g, b, a)` string
    pub fn to_rgba_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            format_alpha(self.alpha.unwrap_or(DEFAULT_ALPHA))
        )
    }
}

/// Fixed-point alpha with at most three decimals and at least one
fn format_alpha(alpha: f64) -> String {
    let mut s = format!("{:.3}", alpha);
    while s.ends_with('0') && !s.ends_with(".0") {
        s.pop();
    }
    s
}

#[inline]
fn channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Convert a hue in [0, 1) to a fully saturated colour
///
/// Red sits at 0, green at 1/3 and blue at 2/3. Hues outside the range are
/// wrapped back into it.
pub fn hue_to_rgb(hue: f64) -> Color {
    let h = hue.rem_euclid(1.0);

    let r = (3.0 - 6.0 * h).abs() - 1.0;
    let g = 2.0 - (2.0 - 6.0 * h).abs();
    let b = 2.0 - (4.0 - 6.0 * h).abs();

    Color::rgb(channel(r), channel(g), channel(b))
}
