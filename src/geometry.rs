/*
 *  geometry.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Wall-clock time to hand angles, hand colors and digital text
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

use chrono::{DateTime, TimeZone, Timelike};
use embedded_graphics::pixelcolor::Rgb888;

use crate::color::Hsv;

/// The three time indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Seconds,
    Minutes,
    Hours,
}

impl Hand {
    pub const ALL: [Hand; 3] = [Hand::Seconds, Hand::Minutes, Hand::Hours];

    /// Fixed (saturation, value) pair for this hand's gradient
    pub const fn saturation_value(self) -> (f32, f32) {
        match self {
            Hand::Seconds => (0.8, 0.9),
            Hand::Minutes => (0.7, 0.8),
            Hand::Hours => (0.6, 0.7),
        }
    }
}

/// Wall-clock fields of one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSample {
    pub epoch_millis: i64,
    pub hours24: u32,
    pub hours12: u32,
    pub minutes: u32,
    pub seconds: u32,
    /// Milliseconds within the second (0..=999)
    pub millis: u32,
}

impl ClockSample {
    /// Read the wall-clock fields in the instant's own timezone
    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        let hours24 = instant.hour();
        Self {
            epoch_millis: instant.timestamp_millis(),
            hours24,
            hours12: hours24 % 12,
            minutes: instant.minute(),
            seconds: instant.second(),
            // leap seconds report 1000..=1999, hold the hand at the end of :59
            millis: instant.timestamp_subsec_millis().min(999),
        }
    }

    pub fn seconds_angle(&self) -> f32 {
        let progress = (self.seconds as f32 + self.millis as f32 / 1000.0) / 60.0;
        wrap_degrees(progress * 360.0 - 90.0)
    }

    pub fn minutes_angle(&self) -> f32 {
        let progress = (self.minutes as f32 + self.seconds as f32 / 60.0) / 60.0;
        wrap_degrees(progress * 360.0 - 90.0)
    }

    pub fn hours_angle(&self) -> f32 {
        let progress = (self.hours12 as f32 + self.minutes as f32 / 60.0) / 12.0;
        wrap_degrees(progress * 360.0 - 90.0)
    }

    pub fn angle(&self, hand: Hand) -> f32 {
        match hand {
            Hand::Seconds => self.seconds_angle(),
            Hand::Minutes => self.minutes_angle(),
            Hand::Hours => self.hours_angle(),
        }
    }

    /// Zero-padded 24-hour `HH:MM:SS`
    pub fn digital_text(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hours24, self.minutes, self.seconds)
    }
}

/// Wrap into [0, 360)
///
/// `rem_euclid` on a tiny negative value can round up to exactly 360.0,
/// which is folded back to 0.
#[inline]
pub fn wrap_degrees(degrees: f32) -> f32 {
    let w = degrees.rem_euclid(360.0);
    if w >= 360.0 { 0.0 } else { w }
}

/// Gradient color of a hand, derived from its angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandColor {
    pub hsv: Hsv,
    pub rgb: Rgb888,
}

impl HandColor {
    pub fn for_angle(hand: Hand, angle: f32) -> Self {
        let (saturation, value) = hand.saturation_value();
        let hsv = Hsv::new(wrap_degrees(angle + 90.0), saturation, value);
        Self { hsv, rgb: hsv.to_rgb() }
    }
}

/// Angle and color of one hand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandGeometry {
    pub hand: Hand,
    /// Degrees in [0, 360), 0 pointing right, 270 pointing up
    pub angle: f32,
    pub color: HandColor,
}

impl HandGeometry {
    fn compute(sample: &ClockSample, hand: Hand) -> Self {
        let angle = sample.angle(hand);
        Self { hand, angle, color: HandColor::for_angle(hand, angle) }
    }
}

/// Everything a draw sink needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ClockFrame {
    pub sample: ClockSample,
    pub seconds: HandGeometry,
    pub minutes: HandGeometry,
    pub hours: HandGeometry,
    pub digital_text: String,
}

impl ClockFrame {
    pub fn hand(&self, hand: Hand) -> &HandGeometry {
        match hand {
            Hand::Seconds => &self.seconds,
            Hand::Minutes => &self.minutes,
            Hand::Hours => &self.hours,
        }
    }

    /// Hands ordered outermost (seconds) to innermost (hours)
    pub fn hands(&self) -> [&HandGeometry; 3] {
        [&self.seconds, &self.minutes, &self.hours]
    }
}

/// Pure time → geometry transform shared by every surface.
///
/// Always produces full-precision geometry; how much of it gets drawn
/// (ambient simplification etc.) is decided by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeToGeometryMapper;

impl TimeToGeometryMapper {
    pub const fn new() -> Self {
        Self
    }

    pub fn map<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> ClockFrame {
        self.map_sample(ClockSample::from_instant(instant))
    }

    pub fn map_sample(&self, sample: ClockSample) -> ClockFrame {
        ClockFrame {
            seconds: HandGeometry::compute(&sample, Hand::Seconds),
            minutes: HandGeometry::compute(&sample, Hand::Minutes),
            hours: HandGeometry::compute(&sample, Hand::Hours),
            digital_text: sample.digital_text(),
            sample,
        }
    }
}
