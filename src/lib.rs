/*
 *  lib.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Time-to-colour geometry plus an adaptive, visibility-aware frame
 *  scheduler shared by the wallpaper, watch face and widget surfaces
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

pub mod color;
pub mod config;
pub mod error;
pub mod func_timer;
pub mod geometry;
pub mod host;
pub mod pacer;
pub mod render;
pub mod runtime;
pub mod scheduler;
pub mod surfaces;
pub mod vframebuf;

pub use color::Hsv;
pub use error::PresentError;
pub use geometry::{ClockFrame, ClockSample, Hand, HandColor, HandGeometry, TimeToGeometryMapper};
pub use host::{FrameHost, SystemClock, WallClock};
pub use pacer::Pacer;
pub use render::{AmbientProperties, CanvasHost, RingRenderer, RingStyle, TimeFormat};
pub use runtime::SurfaceDriver;
pub use scheduler::{AdaptiveFrameScheduler, RenderMode, SchedulerState, SchedulerStats, TickOutcome};
