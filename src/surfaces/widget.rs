/*
 *  surfaces/widget.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Widget hub - one shared 1Hz scheduler fanned out to every placement
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

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use log::{debug, info, warn};

use crate::error::PresentError;
use crate::geometry::ClockFrame;
use crate::host::{FrameHost, WallClock};
use crate::pacer::Pacer;
use crate::render::CanvasHost;
use crate::runtime::SurfaceDriver;
use crate::scheduler::{AdaptiveFrameScheduler, RenderMode, SchedulerState, SchedulerStats};

pub type PlacementId = u32;

/// A widget placement: passive recipient of the hub's frames
pub trait PlacementSink: Send {
    fn deliver(&mut self, frame: &ClockFrame) -> Result<(), PresentError>;
}

impl<C: WallClock + Send> PlacementSink for CanvasHost<C> {
    fn deliver(&mut self, frame: &ClockFrame) -> Result<(), PresentError> {
        self.draw(frame, RenderMode::WidgetStatic)
    }
}

/// Draw sink of the shared widget scheduler; forwards each frame to every
/// placement. A placement whose sink fails is dropped. With none left the
/// frame is refused, which halts the scheduler.
pub struct WidgetBroadcast<C: WallClock> {
    clock: C,
    placements: BTreeMap<PlacementId, Box<dyn PlacementSink>>,
}

impl<C: WallClock> WidgetBroadcast<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, placements: BTreeMap::new() }
    }

    pub fn ids(&self) -> Vec<PlacementId> {
        self.placements.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

impl<C: WallClock> WallClock for WidgetBroadcast<C> {
    fn current_instant(&self) -> DateTime<FixedOffset> {
        self.clock.current_instant()
    }
}

impl<C: WallClock> FrameHost for WidgetBroadcast<C> {
    fn present_frame(&mut self, frame: &ClockFrame, _mode: RenderMode) -> Result<(), PresentError> {
        self.placements.retain(|id, sink| match sink.deliver(frame) {
            Ok(()) => true,
            Err(e) => {
                warn!("Widget placement {} dropped: {}", id, e);
                false
            }
        });
        if self.placements.is_empty() {
            Err(PresentError::SurfaceGone)
        } else {
            Ok(())
        }
    }
}

/// Process-scoped widget timer.
///
/// Ticks while at least one placement exists: the first placement starts
/// the shared scheduler, removing the last one stops it.
pub struct WidgetHub<C: WallClock + Send + 'static> {
    driver: SurfaceDriver<WidgetBroadcast<C>>,
}

impl<C: WallClock + Send + 'static> WidgetHub<C> {
    pub fn new(clock: C, pacer: Pacer) -> Self {
        let scheduler = AdaptiveFrameScheduler::with_pacer(WidgetBroadcast::new(clock), pacer);
        Self { driver: SurfaceDriver::new("widget hub", scheduler) }
    }

    pub fn add_placement(&mut self, id: PlacementId, sink: Box<dyn PlacementSink>) {
        let replaced = self.driver.with_host_mut(|b| b.placements.insert(id, sink)).is_some();
        if replaced {
            debug!("Widget placement {} replaced", id);
        } else {
            info!("Widget placement {} added", id);
        }
        // also revives a hub halted after its sinks failed
        if self.driver.state() == SchedulerState::Idle {
            self.driver.start(RenderMode::WidgetStatic);
        }
    }

    pub fn remove_placement(&mut self, id: PlacementId) -> bool {
        let (removed, now_empty) = self.driver.with_host_mut(|b| {
            let removed = b.placements.remove(&id).is_some();
            (removed, b.is_empty())
        });
        if removed {
            info!("Widget placement {} removed", id);
        }
        if now_empty {
            self.driver.stop();
        }
        removed
    }

    pub fn placements(&self) -> Vec<PlacementId> {
        self.driver.with_host(|b| b.ids())
    }

    pub fn is_ticking(&self) -> bool {
        self.driver.state() == SchedulerState::Running(RenderMode::WidgetStatic)
    }

    pub fn stats(&self) -> SchedulerStats {
        self.driver.stats()
    }
}
