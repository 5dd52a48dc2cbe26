/*
 *  surfaces/mod.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Hosting surfaces - thin adapters from host lifecycle callbacks to the
 *  shared frame scheduler
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

pub mod wallpaper;
pub mod watch_face;
pub mod widget;

pub use wallpaper::WallpaperEngine;
pub use watch_face::{WatchFaceEngine, WatchFaceHost};
pub use widget::{PlacementId, PlacementSink, WidgetBroadcast, WidgetHub};
