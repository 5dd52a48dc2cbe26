/*
 *  host.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Capabilities a hosting surface offers the engine
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

use chrono::{DateTime, FixedOffset, Local};

use crate::error::PresentError;
use crate::geometry::ClockFrame;
use crate::scheduler::RenderMode;

/// Wall-clock source
pub trait WallClock {
    /// Current local time, millisecond resolution or better
    fn current_instant(&self) -> DateTime<FixedOffset>;
}

/// Host capability set the scheduler drives
///
/// Visibility and mode changes flow the other way (host → scheduler) through
/// the scheduler's own methods.
pub trait FrameHost: WallClock {
    /// Present one computed frame. Called once per tick, synchronously.
    ///
    /// `mode` lets the drawing layer pick its level of detail; the frame
    /// itself is always full fidelity.
    fn present_frame(&mut self, frame: &ClockFrame, mode: RenderMode) -> Result<(), PresentError>;
}

/// System local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn current_instant(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}
