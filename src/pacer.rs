/*
 *  pacer.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Redraw cadence per render mode and wall-clock phase alignment
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
use std::time::Duration;

use crate::scheduler::RenderMode;

pub const INTERACTIVE_PERIOD: Duration = Duration::from_millis(16); // ~60fps
pub const AMBIENT_PERIOD: Duration = Duration::from_millis(1000);
pub const WIDGET_PERIOD: Duration = Duration::from_millis(1000);

/// Next multiple of `period_ms` strictly after `now_ms`.
///
/// `now + period - (now mod period)`: lands on the boundary no matter how
/// late the previous tick fired, so ambient seconds never drift.
#[inline]
pub fn phase_aligned_deadline(now_ms: i64, period_ms: i64) -> i64 {
    let period_ms = period_ms.max(1);
    now_ms.saturating_add(period_ms - now_ms.rem_euclid(period_ms))
}

/// Fixed delay from `now_ms`
#[inline]
pub fn fixed_delay_deadline(now_ms: i64, period_ms: i64) -> i64 {
    now_ms.saturating_add(period_ms.max(1))
}

/// Per-mode redraw periods.
///
/// Interactive: fast fixed delay. Ambient: 1Hz, phase aligned to the
/// wall-clock second. Widget: 1Hz fixed delay, its host can't animate
/// smoothly anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    interactive: Duration,
    ambient: Duration,
    widget: Duration,
}

impl Default for Pacer {
    fn default() -> Self {
        Self {
            interactive: INTERACTIVE_PERIOD,
            ambient: AMBIENT_PERIOD,
            widget: WIDGET_PERIOD,
        }
    }
}

impl Pacer {
    pub fn new(interactive: Duration, ambient: Duration, widget: Duration) -> Self {
        let floor = Duration::from_millis(1);
        Self {
            interactive: interactive.max(floor),
            ambient: ambient.max(floor),
            widget: widget.max(floor),
        }
    }

    #[inline]
    pub fn period(&self, mode: RenderMode) -> Duration {
        match mode {
            RenderMode::Interactive => self.interactive,
            RenderMode::Ambient => self.ambient,
            RenderMode::WidgetStatic => self.widget,
        }
    }

    /// Wall-clock deadline (epoch ms) of the frame after `now_ms`
    pub fn next_deadline(&self, mode: RenderMode, now_ms: i64) -> i64 {
        let period_ms = i64::try_from(self.period(mode).as_millis()).unwrap_or(i64::MAX);
        if mode.is_phase_aligned() {
            phase_aligned_deadline(now_ms, period_ms)
        } else {
            fixed_delay_deadline(now_ms, period_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_alignment() {
        assert_eq!(phase_aligned_deadline(1_700_000_000_123, 1000), 1_700_000_001_000);
        assert_eq!(phase_aligned_deadline(1_700_000_000_999, 1000), 1_700_000_001_000);
        // already on a boundary waits a whole period
        assert_eq!(phase_aligned_deadline(1_700_000_000_000, 1000), 1_700_000_001_000);
    }

    #[test]
    fn test_phase_alignment_before_epoch() {
        assert_eq!(phase_aligned_deadline(-1_250, 1000), -1_000);
    }

    #[test]
    fn test_default_periods() {
        let pacer = Pacer::default();
        assert_eq!(pacer.period(RenderMode::Interactive), Duration::from_millis(16));
        assert_eq!(pacer.period(RenderMode::Ambient), Duration::from_millis(1000));
        assert_eq!(pacer.period(RenderMode::WidgetStatic), Duration::from_millis(1000));
    }

    #[test]
    fn test_next_deadline_by_mode() {
        let pacer = Pacer::default();
        let now = 10_437;
        assert_eq!(pacer.next_deadline(RenderMode::Interactive, now), 10_453);
        assert_eq!(pacer.next_deadline(RenderMode::Ambient, now), 11_000);
        assert_eq!(pacer.next_deadline(RenderMode::WidgetStatic, now), 11_437);
    }

    #[test]
    fn test_huge_period_saturates() {
        let huge = Duration::from_millis(u64::MAX);
        let pacer = Pacer::new(huge, huge, Duration::from_millis(i64::MAX as u64));
        let now = 1_700_000_000_000;
        assert_eq!(pacer.next_deadline(RenderMode::Interactive, now), i64::MAX);
        assert_eq!(pacer.next_deadline(RenderMode::WidgetStatic, now), i64::MAX);
        assert!(pacer.next_deadline(RenderMode::Ambient, now) > now);
        assert_eq!(fixed_delay_deadline(i64::MAX - 5, 1000), i64::MAX);
    }
}
