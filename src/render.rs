/*
 *  render.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Ring renderer - draws a computed clock frame onto any RGB draw target
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

use embedded_graphics::mono_font::{MonoTextStyle, ascii::FONT_10X20};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Arc, Circle, PrimitiveStyle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::color::to_monochrome;
use crate::error::PresentError;
use crate::geometry::{ClockFrame, Hand, HandGeometry};
use crate::host::{FrameHost, WallClock};
use crate::scheduler::RenderMode;
use crate::vframebuf::VarFrameBuf;

/// Whether the digital time is drawn in the middle of the rings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    None,
    #[default]
    Digital,
}

/// Panel properties reported by a watch host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AmbientProperties {
    /// Panel shows only a few bits per channel in ambient
    pub low_bit_ambient: bool,
    /// Keep lit pixels sparse to avoid OLED burn-in
    pub burn_in_protection: bool,
}

/// Ring layout, matching the watch face proportions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingStyle {
    pub background: Rgb888,
    pub text_color: Rgb888,
    /// Outer ring radius as a fraction of half the short side
    pub outer_fraction: f32,
    /// Per-hand radius relative to the outer ring: seconds, minutes, hours
    pub ring_scale: [f32; 3],
    pub stroke_width: [u32; 3],
    /// Radius of the single ambient ring relative to the outer ring
    pub ambient_scale: f32,
}

impl Default for RingStyle {
    fn default() -> Self {
        Self {
            background: Rgb888::new(0x0a, 0x0a, 0x0a),
            text_color: Rgb888::WHITE,
            outer_fraction: 0.9,
            ring_scale: [1.0, 0.833, 0.583],
            stroke_width: [8, 6, 4],
            ambient_scale: 0.5,
        }
    }
}

fn slot(hand: Hand) -> usize {
    match hand {
        Hand::Seconds => 0,
        Hand::Minutes => 1,
        Hand::Hours => 2,
    }
}

fn dim(c: Rgb888) -> Rgb888 {
    Rgb888::new(c.r() / 4, c.g() / 4, c.b() / 4)
}

/// Draws rings for a frame.
///
/// Interactive and widget frames get all three rings: a dim track, a bright
/// arc sweeping clockwise from twelve o'clock to the hand, and a dot at the
/// hand. Ambient frames get only the hour ring, drawn plain, thinner under
/// burn-in protection and black/white on low-bit panels.
#[derive(Debug, Clone, Default)]
pub struct RingRenderer {
    style: RingStyle,
    time_format: TimeFormat,
    ambient: AmbientProperties,
}

impl RingRenderer {
    pub fn new(style: RingStyle, time_format: TimeFormat) -> Self {
        Self { style, time_format, ambient: AmbientProperties::default() }
    }

    pub fn style(&self) -> &RingStyle {
        &self.style
    }

    pub fn set_ambient_properties(&mut self, props: AmbientProperties) {
        self.ambient = props;
    }

    pub fn ambient_properties(&self) -> AmbientProperties {
        self.ambient
    }

    pub fn render<D>(&self, target: &mut D, frame: &ClockFrame, mode: RenderMode) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        target.clear(self.style.background)?;

        let bounds = target.bounding_box();
        let center = bounds.center();
        let half_short = bounds.size.width.min(bounds.size.height) as f32 / 2.0;
        let outer = half_short * self.style.outer_fraction;

        if mode.is_low_detail() {
            self.draw_ambient_ring(target, center, outer * self.style.ambient_scale, &frame.hours)?;
        } else {
            for hand in frame.hands() {
                let i = slot(hand.hand);
                self.draw_ring(target, center, outer * self.style.ring_scale[i], self.style.stroke_width[i], hand)?;
            }
        }

        if self.time_format == TimeFormat::Digital {
            let text_color = if mode.is_low_detail() && self.ambient.low_bit_ambient {
                to_monochrome(self.style.text_color)
            } else {
                self.style.text_color
            };
            let character_style = MonoTextStyle::new(&FONT_10X20, text_color);
            let text_style = TextStyleBuilder::new()
                .alignment(Alignment::Center)
                .baseline(Baseline::Middle)
                .build();
            Text::with_text_style(&frame.digital_text, center, character_style, text_style).draw(target)?;
        }

        Ok(())
    }

    fn draw_ring<D>(
        &self,
        target: &mut D,
        center: Point,
        radius: f32,
        stroke: u32,
        hand: &HandGeometry,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let diameter = (radius * 2.0).round().max(1.0) as u32;
        let color = hand.color.rgb;

        Circle::with_center(center, diameter)
            .into_styled(PrimitiveStyle::with_stroke(dim(color), stroke))
            .draw(target)?;

        // progress since twelve o'clock is the hue
        let sweep = hand.color.hsv.hue;
        if sweep > 0.0 {
            Arc::with_center(center, diameter, Angle::from_degrees(-90.0), Angle::from_degrees(sweep))
                .into_styled(PrimitiveStyle::with_stroke(color, stroke))
                .draw(target)?;
        }

        let rad = hand.angle.to_radians();
        let tip = Point::new(
            center.x + (radius * rad.cos()).round() as i32,
            center.y + (radius * rad.sin()).round() as i32,
        );
        Circle::with_center(tip, stroke + 4)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(target)?;

        trace!("{:?} ring r={:.1} at {:.2} deg", hand.hand, radius, hand.angle);
        Ok(())
    }

    fn draw_ambient_ring<D>(
        &self,
        target: &mut D,
        center: Point,
        radius: f32,
        hand: &HandGeometry,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let diameter = (radius * 2.0).round().max(1.0) as u32;
        let color = if self.ambient.low_bit_ambient {
            to_monochrome(hand.color.rgb)
        } else {
            hand.color.rgb
        };
        let stroke = if self.ambient.burn_in_protection {
            1
        } else {
            self.style.stroke_width[slot(hand.hand)]
        };
        Circle::with_center(center, diameter)
            .into_styled(PrimitiveStyle::with_stroke(color, stroke))
            .draw(target)
    }
}

/// Draw sink that rasterises every frame into an offscreen RGB canvas
pub struct CanvasHost<C: WallClock> {
    clock: C,
    canvas: VarFrameBuf<Rgb888>,
    renderer: RingRenderer,
    frames: u64,
    last_text: String,
    last_mode: Option<RenderMode>,
    closed: bool,
}

impl<C: WallClock> CanvasHost<C> {
    pub fn new(clock: C, width: u32, height: u32, renderer: RingRenderer) -> Self {
        let background = renderer.style().background;
        Self {
            clock,
            canvas: VarFrameBuf::new(width, height, background),
            renderer,
            frames: 0,
            last_text: String::new(),
            last_mode: None,
            closed: false,
        }
    }

    pub fn canvas(&self) -> &VarFrameBuf<Rgb888> {
        &self.canvas
    }

    pub fn renderer(&self) -> &RingRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut RingRenderer {
        &mut self.renderer
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_text(&self) -> &str {
        &self.last_text
    }

    pub fn last_mode(&self) -> Option<RenderMode> {
        self.last_mode
    }

    /// Simulate the surface being torn down; later frames are refused
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Draw a frame without a clock read, for widget fan-out
    pub fn draw(&mut self, frame: &ClockFrame, mode: RenderMode) -> Result<(), PresentError> {
        if self.closed {
            return Err(PresentError::SurfaceGone);
        }
        // VarFrameBuf draws are infallible
        let Ok(()) = self.renderer.render(&mut self.canvas, frame, mode);
        self.frames += 1;
        self.last_mode = Some(mode);
        self.last_text.clone_from(&frame.digital_text);
        Ok(())
    }
}

impl<C: WallClock> WallClock for CanvasHost<C> {
    fn current_instant(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.clock.current_instant()
    }
}

impl<C: WallClock> FrameHost for CanvasHost<C> {
    fn present_frame(&mut self, frame: &ClockFrame, mode: RenderMode) -> Result<(), PresentError> {
        self.draw(frame, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TimeToGeometryMapper;
    use chrono::{FixedOffset, TimeZone};

    fn frame_at(h: u32, m: u32, s: u32) -> ClockFrame {
        let t = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 6, 1, h, m, s).unwrap();
        TimeToGeometryMapper::new().map(&t)
    }

    fn render(mode: RenderMode, props: AmbientProperties, format: TimeFormat) -> VarFrameBuf<Rgb888> {
        let mut renderer = RingRenderer::new(RingStyle::default(), format);
        renderer.set_ambient_properties(props);
        let mut fb = VarFrameBuf::new(120, 120, Rgb888::BLACK);
        let Ok(()) = renderer.render(&mut fb, &frame_at(3, 15, 30), mode);
        fb
    }

    // 120x120: outer ring radius 54, ambient ring radius 27, centre (60, 60)
    // (bounding box centre of an even size rounds down to 59)

    #[test]
    fn test_interactive_draws_outer_ring() {
        let fb = render(RenderMode::Interactive, AmbientProperties::default(), TimeFormat::None);
        let bg = RingStyle::default().background;
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(bg));
        assert_ne!(fb.pixel(Point::new(59, 59 - 54)), Some(bg));
    }

    #[test]
    fn test_ambient_draws_only_inner_ring() {
        let fb = render(RenderMode::Ambient, AmbientProperties::default(), TimeFormat::None);
        let bg = RingStyle::default().background;
        assert_eq!(fb.pixel(Point::new(59, 59 - 54)), Some(bg));
        assert_ne!(fb.pixel(Point::new(59, 59 - 27)), Some(bg));
    }

    #[test]
    fn test_low_bit_ambient_is_monochrome() {
        let props = AmbientProperties { low_bit_ambient: true, burn_in_protection: false };
        let fb = render(RenderMode::Ambient, props, TimeFormat::Digital);
        let bg = RingStyle::default().background;
        assert!(
            fb.as_slice().iter().all(|&c| c == bg || c == Rgb888::WHITE || c == Rgb888::BLACK),
            "colored pixel on a low-bit panel"
        );
        assert_eq!(fb.pixel(Point::new(59, 59 - 27)), Some(Rgb888::WHITE));
    }

    #[test]
    fn test_burn_in_protection_thins_ring() {
        let thick = render(RenderMode::Ambient, AmbientProperties::default(), TimeFormat::None);
        let props = AmbientProperties { low_bit_ambient: false, burn_in_protection: true };
        let thin = render(RenderMode::Ambient, props, TimeFormat::None);
        let bg = RingStyle::default().background;
        assert!(thin.count_not(bg) < thick.count_not(bg));
    }

    #[test]
    fn test_digital_text_adds_pixels() {
        let bg = RingStyle::default().background;
        let without = render(RenderMode::Ambient, AmbientProperties::default(), TimeFormat::None);
        let with = render(RenderMode::Ambient, AmbientProperties::default(), TimeFormat::Digital);
        assert!(with.count_not(bg) > without.count_not(bg));
    }

    #[test]
    fn test_closed_canvas_refuses_frames() {
        use crate::host::SystemClock;
        let mut host = CanvasHost::new(SystemClock, 64, 64, RingRenderer::default());
        let frame = frame_at(1, 2, 3);
        assert!(host.present_frame(&frame, RenderMode::Interactive).is_ok());
        assert_eq!(host.last_text(), "01:02:03");
        host.close();
        assert_eq!(host.present_frame(&frame, RenderMode::Interactive), Err(PresentError::SurfaceGone));
        assert_eq!(host.frames(), 1);
    }
}
