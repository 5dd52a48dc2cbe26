/*
 *  surfaces/wallpaper.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Live wallpaper engine - animates while visible, nothing otherwise
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

use log::info;

use crate::host::FrameHost;
use crate::pacer::Pacer;
use crate::runtime::SurfaceDriver;
use crate::scheduler::{AdaptiveFrameScheduler, RenderMode, SchedulerState, SchedulerStats};

/// One live wallpaper instance. Always interactive while visible.
pub struct WallpaperEngine<H: FrameHost + Send + 'static> {
    driver: SurfaceDriver<H>,
    visible: bool,
}

impl<H: FrameHost + Send + 'static> WallpaperEngine<H> {
    pub fn new(host: H, pacer: Pacer) -> Self {
        Self {
            driver: SurfaceDriver::new("wallpaper", AdaptiveFrameScheduler::with_pacer(host, pacer)),
            visible: false,
        }
    }

    pub fn on_visibility_changed(&mut self, visible: bool) {
        self.visible = visible;
        self.driver.on_visibility_changed(visible, RenderMode::Interactive);
    }

    pub fn on_surface_destroyed(&mut self) {
        info!("Wallpaper surface destroyed");
        self.visible = false;
        self.driver.stop();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn state(&self) -> SchedulerState {
        self.driver.state()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.driver.stats()
    }

    pub fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        self.driver.with_host(f)
    }
}
