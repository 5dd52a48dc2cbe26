/*
 *  vframebuf.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime-sized framebuffer used as an offscreen draw surface
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;

/// A runtime-sized framebuffer for embedded-graphics.
#[derive(Debug, Clone)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access, row major
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Color at `p`, None outside the buffer
    pub fn pixel(&self, p: Point) -> Option<C> {
        self.idx(p).map(|i| self.buf[i])
    }

    /// Number of pixels not equal to `background`
    pub fn count_not(&self, background: C) -> usize {
        self.buf.iter().filter(|&&c| c != background).count()
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

    #[test]
    fn test_out_of_bounds_pixels_dropped() {
        let mut fb = VarFrameBuf::new(4, 3, Rgb888::BLACK);
        fb.draw_iter([
            Pixel(Point::new(1, 1), Rgb888::RED),
            Pixel(Point::new(-1, 0), Rgb888::RED),
            Pixel(Point::new(4, 0), Rgb888::RED),
        ])
        .unwrap();
        assert_eq!(fb.pixel(Point::new(1, 1)), Some(Rgb888::RED));
        assert_eq!(fb.pixel(Point::new(4, 0)), None);
        assert_eq!(fb.count_not(Rgb888::BLACK), 1);
    }

    #[test]
    fn test_clear() {
        let mut fb = VarFrameBuf::new(2, 2, Rgb888::BLACK);
        fb.clear(Rgb888::BLUE).unwrap();
        assert_eq!(fb.count_not(Rgb888::BLUE), 0);
        assert_eq!(fb.size(), Size::new(2, 2));
    }
}
