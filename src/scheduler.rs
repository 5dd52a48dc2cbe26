/*
 *  scheduler.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Adaptive frame scheduler - decides when a surface redraws based on
 *  visibility and power mode
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

use std::fmt;

use chrono::{DateTime, FixedOffset};
use log::{debug, info, trace, warn};

use crate::geometry::TimeToGeometryMapper;
use crate::host::FrameHost;
use crate::pacer::Pacer;

/// Power/visibility mode a surface is drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Full animation, ~60fps
    Interactive,
    /// Low-power always-on display, 1Hz on the second
    Ambient,
    /// Home screen widget, 1Hz
    WidgetStatic,
}

impl RenderMode {
    /// Whether deadlines snap to wall-clock period boundaries
    pub const fn is_phase_aligned(self) -> bool {
        matches!(self, RenderMode::Ambient)
    }

    /// Whether the drawing layer should show reduced detail
    pub const fn is_low_detail(self) -> bool {
        matches!(self, RenderMode::Ambient)
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Interactive => write!(f, "interactive"),
            RenderMode::Ambient => write!(f, "ambient"),
            RenderMode::WidgetStatic => write!(f, "widget"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running(RenderMode),
}

/// Identifies one armed timer; any state change invalidates older tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// A pending redraw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub token: TimerToken,
    /// Wall-clock deadline, epoch milliseconds
    pub deadline_ms: i64,
}

impl ArmedTimer {
    /// Milliseconds from `now_ms` until due, zero if already late
    pub fn millis_until(&self, now_ms: i64) -> u64 {
        self.deadline_ms.saturating_sub(now_ms).max(0) as u64
    }
}

/// Result of a timer firing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Frame drawn, next timer armed
    Presented(ArmedTimer),
    /// Timer no longer current (stopped, mode changed or restarted); nothing drawn
    Stale,
    /// Draw sink unavailable; scheduler is now idle
    Halted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub frames_presented: u64,
    pub stale_ticks: u64,
    pub halts: u64,
}

/// Drives one hosting surface: owns its mode, its single timer and the
/// mapper → draw sink hand-off.
///
/// The scheduler never sleeps itself. It hands out `ArmedTimer`s and the
/// caller fires `tick` with the matching token once the deadline passes.
pub struct AdaptiveFrameScheduler<H: FrameHost> {
    host: H,
    mapper: TimeToGeometryMapper,
    pacer: Pacer,
    state: SchedulerState,
    armed: Option<ArmedTimer>,
    generation: u64,
    last_frame_ms: Option<i64>,
    stats: SchedulerStats,
}

impl<H: FrameHost> AdaptiveFrameScheduler<H> {
    pub fn new(host: H) -> Self {
        Self::with_pacer(host, Pacer::default())
    }

    pub fn with_pacer(host: H, pacer: Pacer) -> Self {
        Self {
            host,
            mapper: TimeToGeometryMapper::new(),
            pacer,
            state: SchedulerState::Idle,
            armed: None,
            generation: 0,
            last_frame_ms: None,
            stats: SchedulerStats::default(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SchedulerState::Running(_))
    }

    pub fn mode(&self) -> Option<RenderMode> {
        match self.state {
            SchedulerState::Running(mode) => Some(mode),
            SchedulerState::Idle => None,
        }
    }

    /// The pending timer, if running
    pub fn armed(&self) -> Option<ArmedTimer> {
        self.armed
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Wall-clock now, as seen by the host
    pub fn now_millis(&self) -> i64 {
        self.host.current_instant().timestamp_millis()
    }

    /// Begin (or restart) a session in `mode`: draws one frame immediately
    /// and arms the first timer. Returns `None` if the draw sink refused the
    /// frame, in which case the scheduler is idle again.
    pub fn start(&mut self, mode: RenderMode) -> Option<ArmedTimer> {
        if let SchedulerState::Running(previous) = self.state {
            debug!("Scheduler restarting: {} -> {}", previous, mode);
        } else {
            info!("Scheduler started in {} mode", mode);
        }
        self.state = SchedulerState::Running(mode);
        self.armed = None;
        let token = self.next_token();

        let now = self.host.current_instant();
        if !self.present(&now, mode) {
            return None;
        }
        Some(self.arm(token, mode))
    }

    /// Switch the running session to `new_mode`: repaints once in the new
    /// mode, then re-arms with its cadence. Returns `None` if the sink refused
    /// that frame (scheduler now idle). No-op while idle.
    pub fn on_mode_changed(&mut self, new_mode: RenderMode) -> Option<ArmedTimer> {
        match self.state {
            SchedulerState::Idle => {
                debug!("Mode change to {} ignored while idle", new_mode);
                None
            }
            SchedulerState::Running(mode) if mode == new_mode => self.armed,
            SchedulerState::Running(mode) => {
                info!("Render mode changed: {} -> {}", mode, new_mode);
                self.state = SchedulerState::Running(new_mode);
                self.armed = None;
                let token = self.next_token();

                // the old mode's frame must not linger until the next tick
                let now = self.host.current_instant();
                if !self.present(&now, new_mode) {
                    return None;
                }
                Some(self.arm(token, new_mode))
            }
        }
    }

    /// Host visibility callback. Becoming visible always starts a fresh
    /// session, losing visibility cancels the timer before returning.
    pub fn on_visibility_changed(&mut self, visible: bool, mode: RenderMode) -> Option<ArmedTimer> {
        self.stop();
        if visible { self.start(mode) } else { None }
    }

    /// Cancel the pending timer and go idle. Idempotent.
    pub fn stop(&mut self) {
        if let SchedulerState::Running(mode) = self.state {
            info!("Scheduler stopped (was {})", mode);
            self.state = SchedulerState::Idle;
            self.armed = None;
            self.next_token();
        }
    }

    /// Timer fired. Draws and re-arms only if `token` is still current.
    pub fn tick(&mut self, token: TimerToken) -> TickOutcome {
        let mode = match (self.state, self.armed) {
            (SchedulerState::Running(mode), Some(armed)) if armed.token == token => mode,
            _ => {
                trace!("Stale tick {:?} ignored", token);
                self.stats.stale_ticks += 1;
                return TickOutcome::Stale;
            }
        };

        let now = self.host.current_instant();
        if !self.present(&now, mode) {
            return TickOutcome::Halted;
        }
        TickOutcome::Presented(self.arm(token, mode))
    }

    /// Draw one extra frame for the current instant, leaving the armed
    /// timer untouched. Returns false while idle or if the sink failed.
    pub fn redraw_now(&mut self) -> bool {
        match self.state {
            SchedulerState::Running(mode) => {
                let now = self.host.current_instant();
                self.present(&now, mode)
            }
            SchedulerState::Idle => false,
        }
    }

    fn next_token(&mut self) -> TimerToken {
        self.generation = self.generation.wrapping_add(1);
        TimerToken(self.generation)
    }

    /// Deadline is taken from the clock after the draw, so a slow frame
    /// pushes fixed-delay modes back rather than bunching ticks.
    fn arm(&mut self, token: TimerToken, mode: RenderMode) -> ArmedTimer {
        let now_ms = self.now_millis();
        let armed = ArmedTimer {
            token,
            deadline_ms: self.pacer.next_deadline(mode, now_ms),
        };
        trace!("Armed {:?} for {} (+{}ms)", token, armed.deadline_ms, armed.deadline_ms - now_ms);
        self.armed = Some(armed);
        armed
    }

    fn present(&mut self, now: &DateTime<FixedOffset>, mode: RenderMode) -> bool {
        let now_ms = now.timestamp_millis();
        if let Some(last) = self.last_frame_ms {
            if now_ms < last {
                debug!("Wall clock went backwards by {}ms", last - now_ms);
            }
        }

        let frame = self.mapper.map(now);
        match self.host.present_frame(&frame, mode) {
            Ok(()) => {
                self.last_frame_ms = Some(now_ms);
                self.stats.frames_presented += 1;
                true
            }
            Err(e) => {
                warn!("Frame not delivered ({}), halting scheduler", e);
                self.stats.halts += 1;
                self.stop();
                false
            }
        }
    }
}
