//! Numeric and grid helpers shared by the geometry code.
//!
//! All geometry is in document units (points). Conversion to pixels is
//! delegated to a [`UnitConverter`] supplied by the renderer.

use serde::{Deserialize, Serialize};

/// Width and height of a container's content area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A 2D offset, either absolute (from the document origin) or between two
/// containers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle relative to its container's content origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether the rectangle lies entirely inside `size`, anchored at 0/0.
    pub fn fits_in(&self, size: Size) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.right() <= size.width && self.bottom() <= size.height
    }

    pub fn to_pixels(&self, converter: &dyn UnitConverter) -> PixelRect {
        PixelRect {
            left: converter.to_pixel(self.x),
            top: converter.to_pixel(self.y),
            width: converter.to_pixel(self.width),
            height: converter.to_pixel(self.height),
        }
    }
}

/// A rectangle ready for the renderer, every value already a CSS length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelRect {
    pub left: String,
    pub top: String,
    pub width: String,
    pub height: String,
}

/// Converts a document unit value into a pixel string for display.
pub trait UnitConverter {
    fn to_pixel(&self, value: f32) -> String;
}

/// Unscaled conversion: one document unit is one pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointUnits;

impl UnitConverter for PointUnits {
    fn to_pixel(&self, value: f32) -> String {
        format!("{}px", format_number(value))
    }
}

// ─── Grid rounding ───────────────────────────────────────────────────────

/// Round to the nearest multiple of `interval`. Halfway values round up.
pub fn round_to_interval(value: f32, interval: f32) -> f32 {
    if interval <= 0.0 {
        return value;
    }
    (value / interval + 0.5).floor() * interval
}

/// Round down to a multiple of `interval`.
pub fn round_to_lower_interval(value: f32, interval: f32) -> f32 {
    if interval <= 0.0 {
        return value;
    }
    (value / interval).floor() * interval
}

/// Round up to a multiple of `interval`.
pub fn round_to_upper_interval(value: f32, interval: f32) -> f32 {
    if interval <= 0.0 {
        return value;
    }
    (value / interval).ceil() * interval
}

// ─── Text ↔ number ───────────────────────────────────────────────────────

/// Convert user-entered text into a number.
///
/// Accepts a leading numeric prefix (`"12px"` → 12), a comma as decimal
/// separator, and surrounding whitespace. Anything unparsable is 0.
pub fn convert_input_to_number(input: &str) -> f32 {
    let normalized = input.trim().replacen(',', ".", 1);
    let end = normalized
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(normalized.len());
    // Longest parsable prefix: "3e" reads as 3, "1-2" as 1.
    (1..=end)
        .rev()
        .find_map(|i| normalized[..i].parse::<f32>().ok())
        .unwrap_or(0.0)
}

/// Text form of a geometry value as stored in the editable fields.
/// Integral values print without a fraction; `-0` prints as `0`.
pub fn format_number(value: f32) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_rounding() {
        assert_eq!(round_to_interval(147.0, 10.0), 150.0);
        assert_eq!(round_to_interval(73.0, 10.0), 70.0);
        assert_eq!(round_to_interval(75.0, 10.0), 80.0);
        assert_eq!(round_to_lower_interval(79.0, 10.0), 70.0);
        assert_eq!(round_to_upper_interval(71.0, 10.0), 80.0);
        assert_eq!(round_to_upper_interval(70.0, 10.0), 70.0);
    }

    #[test]
    fn zero_interval_is_identity() {
        assert_eq!(round_to_interval(13.3, 0.0), 13.3);
        assert_eq!(round_to_lower_interval(13.3, 0.0), 13.3);
        assert_eq!(round_to_upper_interval(13.3, 0.0), 13.3);
    }

    #[test]
    fn input_conversion() {
        assert_eq!(convert_input_to_number("42"), 42.0);
        assert_eq!(convert_input_to_number(" 12,5 "), 12.5);
        assert_eq!(convert_input_to_number("30px"), 30.0);
        assert_eq!(convert_input_to_number("-4"), -4.0);
        assert_eq!(convert_input_to_number("1e2"), 100.0);
        assert_eq!(convert_input_to_number("3e"), 3.0);
        assert_eq!(convert_input_to_number(""), 0.0);
        assert_eq!(convert_input_to_number("abc"), 0.0);
        assert_eq!(convert_input_to_number("."), 0.0);
        assert_eq!(convert_input_to_number("1-2"), 1.0);
        assert_eq!(convert_input_to_number("-.5mm"), -0.5);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(150.0), "150");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn pixel_conversion_goes_through_converter() {
        let px = Rect::new(10.0, 20.0, 30.5, 40.0).to_pixels(&PointUnits);
        assert_eq!(px.left, "10px");
        assert_eq!(px.width, "30.5px");
    }
}
