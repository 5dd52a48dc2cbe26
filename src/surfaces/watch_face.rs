/*
 *  surfaces/watch_face.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Watch face engine - interactive at 60fps, ambient at 1Hz on the second
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

use log::{debug, info};

use crate::host::{FrameHost, WallClock};
use crate::pacer::Pacer;
use crate::render::{AmbientProperties, CanvasHost};
use crate::runtime::SurfaceDriver;
use crate::scheduler::{AdaptiveFrameScheduler, RenderMode, SchedulerState, SchedulerStats};

/// Draw sink of a watch face; also told about the panel's ambient limits
pub trait WatchFaceHost: FrameHost {
    fn apply_ambient_properties(&mut self, props: AmbientProperties);
}

impl<C: WallClock> WatchFaceHost for CanvasHost<C> {
    fn apply_ambient_properties(&mut self, props: AmbientProperties) {
        self.renderer_mut().set_ambient_properties(props);
    }
}

pub struct WatchFaceEngine<H: WatchFaceHost + Send + 'static> {
    driver: SurfaceDriver<H>,
    visible: bool,
    ambient: bool,
    properties: AmbientProperties,
}

impl<H: WatchFaceHost + Send + 'static> WatchFaceEngine<H> {
    pub fn new(host: H, pacer: Pacer) -> Self {
        Self {
            driver: SurfaceDriver::new("watch face", AdaptiveFrameScheduler::with_pacer(host, pacer)),
            visible: false,
            ambient: false,
            properties: AmbientProperties::default(),
        }
    }

    pub fn mode(&self) -> RenderMode {
        if self.ambient { RenderMode::Ambient } else { RenderMode::Interactive }
    }

    pub fn on_properties_changed(&mut self, props: AmbientProperties) {
        debug!("Watch properties: {:?}", props);
        self.properties = props;
        self.driver.with_host_mut(|h| h.apply_ambient_properties(props));
    }

    pub fn on_ambient_mode_changed(&mut self, ambient: bool) {
        if self.ambient == ambient {
            return;
        }
        info!("Watch face ambient: {}", ambient);
        self.ambient = ambient;
        // repaints at once while running; an idle one picks the mode up on show
        self.driver.on_mode_changed(self.mode());
    }

    pub fn on_visibility_changed(&mut self, visible: bool) {
        self.visible = visible;
        let mode = self.mode();
        self.driver.on_visibility_changed(visible, mode);
    }

    /// Minute tick from the system while in ambient
    pub fn on_time_tick(&mut self) -> bool {
        self.driver.redraw_now()
    }

    pub fn on_destroy(&mut self) {
        self.visible = false;
        self.driver.stop();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_ambient(&self) -> bool {
        self.ambient
    }

    pub fn properties(&self) -> AmbientProperties {
        self.properties
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
