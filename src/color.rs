/*
 *  color.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  HSV color model for the gradient hands
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

/// Hue/saturation/value triple, hue in degrees, saturation and value in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl Hsv {
    pub const fn new(hue: f32, saturation: f32, value: f32) -> Self {
        Self { hue, saturation, value }
    }

    /// Convert to 24-bit RGB
    ///
    /// Rounding follows the Skia `HSVToColor` routine used by Android, so
    /// colors match what the platform paints for the same triple.
    pub fn to_rgb(&self) -> Rgb888 {
        let s = self.saturation.clamp(0.0, 1.0);
        let v = self.value.clamp(0.0, 1.0);
        let v_byte = round_to_u8(v * 255.0);

        if s <= f32::EPSILON {
            return Rgb888::new(v_byte, v_byte, v_byte);
        }

        let hx = if self.hue < 0.0 || self.hue >= 360.0 || self.hue.is_nan() {
            0.0
        } else {
            self.hue / 60.0
        };
        let w = hx.floor();
        let f = hx - w;

        let p = round_to_u8((1.0 - s) * v * 255.0);
        let q = round_to_u8((1.0 - s * f) * v * 255.0);
        let t = round_to_u8((1.0 - s * (1.0 - f)) * v * 255.0);

        let (r, g, b) = match w as u32 {
            0 => (v_byte, t, p),
            1 => (q, v_byte, p),
            2 => (p, v_byte, t),
            3 => (p, q, v_byte),
            4 => (t, p, v_byte),
            _ => (v_byte, p, q),
        };
        Rgb888::new(r, g, b)
    }
}

#[inline]
fn round_to_u8(x: f32) -> u8 {
    (x + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Perceived luminance (0-255), Rec. 601 weights
pub fn luminance(c: Rgb888) -> u8 {
    let l = 299 * c.r() as u32 + 587 * c.g() as u32 + 114 * c.b() as u32;
    (l / 1000) as u8
}

/// Collapse to pure black or white for low-bit ambient panels
pub fn to_monochrome(c: Rgb888) -> Rgb888 {
    if luminance(c) >= 64 { Rgb888::WHITE } else { Rgb888::BLACK }
}

/// Parse `#rrggbb` or `rrggbb`
pub fn parse_hex(s: &str) -> Option<Rgb888> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb888::new(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_hues() {
        assert_eq!(Hsv::new(0.0, 1.0, 1.0).to_rgb(), Rgb888::new(255, 0, 0));
        assert_eq!(Hsv::new(120.0, 1.0, 1.0).to_rgb(), Rgb888::new(0, 255, 0));
        assert_eq!(Hsv::new(240.0, 1.0, 1.0).to_rgb(), Rgb888::new(0, 0, 255));
    }

    #[test]
    fn test_half_saturation_rounds_up() {
        // 127.5 rounds to 128 the way Skia does
        assert_eq!(Hsv::new(0.0, 0.5, 1.0).to_rgb(), Rgb888::new(255, 128, 128));
    }

    #[test]
    fn test_gray_when_unsaturated() {
        assert_eq!(Hsv::new(200.0, 0.0, 1.0).to_rgb(), Rgb888::new(255, 255, 255));
        assert_eq!(Hsv::new(200.0, 0.0, 0.0).to_rgb(), Rgb888::new(0, 0, 0));
    }

    #[test]
    fn test_out_of_range_hue_is_red() {
        assert_eq!(Hsv::new(360.0, 1.0, 1.0).to_rgb(), Hsv::new(0.0, 1.0, 1.0).to_rgb());
        assert_eq!(Hsv::new(-10.0, 1.0, 1.0).to_rgb(), Hsv::new(0.0, 1.0, 1.0).to_rgb());
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#0a0a0a"), Some(Rgb888::new(10, 10, 10)));
        assert_eq!(parse_hex("FF8000"), Some(Rgb888::new(255, 128, 0)));
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("zzzzzz"), None);
    }

    #[test]
    fn test_monochrome_threshold() {
        assert_eq!(to_monochrome(Rgb888::new(10, 10, 10)), Rgb888::BLACK);
        assert_eq!(to_monochrome(Rgb888::new(200, 40, 40)), Rgb888::WHITE);
    }
}
