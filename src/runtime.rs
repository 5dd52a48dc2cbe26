/*
 *  runtime.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Tokio timer task driving one scheduler
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

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, trace};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::func_timer::FunctionTimer;
use crate::host::FrameHost;
use crate::scheduler::{
    AdaptiveFrameScheduler, ArmedTimer, RenderMode, SchedulerState, SchedulerStats, TickOutcome,
};

struct Inner<H: FrameHost> {
    scheduler: AdaptiveFrameScheduler<H>,
    /// Bumped on every start/stop so a superseded timer task retires
    session: u64,
}

struct Shared<H: FrameHost> {
    inner: Mutex<Inner<H>>,
    rearmed: Notify,
}

fn lock<H: FrameHost>(shared: &Shared<H>) -> MutexGuard<'_, Inner<H>> {
    // a panicking draw sink must not wedge stop()
    shared.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Runs one surface's scheduler on real timers.
///
/// Every draw happens with the scheduler lock held, and `stop` takes that
/// lock before invalidating the timer, so once `stop` returns no frame can
/// reach the host until the next `start`.
///
/// Must be used from within a Tokio runtime.
pub struct SurfaceDriver<H: FrameHost + Send + 'static> {
    name: String,
    shared: Arc<Shared<H>>,
    timer: Option<JoinHandle<()>>,
}

impl<H: FrameHost + Send + 'static> SurfaceDriver<H> {
    pub fn new(name: impl Into<String>, scheduler: AdaptiveFrameScheduler<H>) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner { scheduler, session: 0 }),
                rearmed: Notify::new(),
            }),
            timer: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fresh session in `mode`; returns false if the host refused the first frame
    pub fn start(&mut self, mode: RenderMode) -> bool {
        self.restart(|s| s.start(mode))
    }

    /// Host visibility callback
    pub fn on_visibility_changed(&mut self, visible: bool, mode: RenderMode) -> bool {
        self.restart(|s| s.on_visibility_changed(visible, mode))
    }

    /// Repaint in `mode` and re-arm the running session with its cadence
    pub fn on_mode_changed(&mut self, mode: RenderMode) {
        let (armed, running) = {
            let mut inner = lock(&self.shared);
            let armed = inner.scheduler.on_mode_changed(mode);
            (armed, inner.scheduler.is_running())
        };
        if armed.is_some() {
            // wake the timer task so it drops its old deadline
            self.shared.rearmed.notify_one();
        } else if !running {
            self.abort_timer();
        }
    }

    /// Draw one frame now without disturbing the timer
    pub fn redraw_now(&mut self) -> bool {
        lock(&self.shared).scheduler.redraw_now()
    }

    /// Synchronous cancel: no frame is presented after this returns
    pub fn stop(&mut self) {
        {
            let mut inner = lock(&self.shared);
            inner.session += 1;
            inner.scheduler.stop();
        }
        self.abort_timer();
    }

    pub fn state(&self) -> SchedulerState {
        lock(&self.shared).scheduler.state()
    }

    pub fn stats(&self) -> SchedulerStats {
        lock(&self.shared).scheduler.stats()
    }

    pub fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        f(lock(&self.shared).scheduler.host())
    }

    pub fn with_host_mut<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(lock(&self.shared).scheduler.host_mut())
    }

    fn restart(
        &mut self,
        transition: impl FnOnce(&mut AdaptiveFrameScheduler<H>) -> Option<ArmedTimer>,
    ) -> bool {
        let (session, armed) = {
            let mut inner = lock(&self.shared);
            inner.session += 1;
            (inner.session, transition(&mut inner.scheduler))
        };
        self.abort_timer();
        match armed {
            Some(_) => {
                self.spawn_timer(session);
                true
            }
            None => false,
        }
    }

    fn abort_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }

    fn spawn_timer(&mut self, session: u64) {
        let shared = Arc::clone(&self.shared);
        let name = self.name.clone();
        self.timer = Some(tokio::spawn(async move {
            run_timer(shared, session, &name).await;
            debug!("{}: timer task for session {} finished", name, session);
        }));
    }
}

impl<H: FrameHost + Send + 'static> Drop for SurfaceDriver<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_timer<H: FrameHost>(shared: Arc<Shared<H>>, session: u64, name: &str) {
    loop {
        let (armed, wait, budget) = {
            let inner = lock(&shared);
            if inner.session != session {
                return;
            }
            let Some(armed) = inner.scheduler.armed() else {
                return;
            };
            let Some(mode) = inner.scheduler.mode() else {
                return;
            };
            let period = inner.scheduler.pacer().period(mode);
            // a wall clock set back since arming must not stretch the sleep
            let wait = Duration::from_millis(armed.millis_until(inner.scheduler.now_millis())).min(period);
            (armed, wait, period)
        };

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = shared.rearmed.notified() => {
                trace!("{}: re-armed, dropping deadline {}", name, armed.deadline_ms);
                continue;
            }
        }

        let outcome = {
            let mut inner = lock(&shared);
            if inner.session != session {
                return;
            }
            let _timer = FunctionTimer::new("frame", budget);
            inner.scheduler.tick(armed.token)
        };

        match outcome {
            TickOutcome::Presented(_) => {}
            // mode changed between reading the deadline and firing, re-read
            TickOutcome::Stale => {}
            TickOutcome::Halted => return,
        }
    }
}
