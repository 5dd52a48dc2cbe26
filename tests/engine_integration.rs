/*
 *  tests/engine_integration.rs
 *
 *  Integration tests for the frame scheduler driving a real canvas
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 */

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use embedded_graphics::pixelcolor::Rgb888;

use gradient_clock::config::parse_yaml;
use gradient_clock::{
    AdaptiveFrameScheduler, CanvasHost, RenderMode, RingRenderer, SchedulerState, TickOutcome,
    WallClock,
};

/// Wall clock the test moves by hand
#[derive(Clone)]
struct ManualClock(Arc<Mutex<DateTime<FixedOffset>>>);

impl ManualClock {
    fn at(t: DateTime<FixedOffset>) -> Self {
        Self(Arc::new(Mutex::new(t)))
    }

    fn advance_ms(&self, ms: i64) {
        let mut t = self.0.lock().unwrap();
        *t = *t + Duration::milliseconds(ms);
    }

    fn now_ms(&self) -> i64 {
        self.0.lock().unwrap().timestamp_millis()
    }
}

impl WallClock for ManualClock {
    fn current_instant(&self) -> DateTime<FixedOffset> {
        *self.0.lock().unwrap()
    }
}

fn quarter_past_ten() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 1, 10, 15, 30)
        .unwrap()
        + Duration::milliseconds(250)
}

fn scheduler(clock: &ManualClock) -> AdaptiveFrameScheduler<CanvasHost<ManualClock>> {
    let host = CanvasHost::new(clock.clone(), 96, 96, RingRenderer::default());
    AdaptiveFrameScheduler::new(host)
}

#[test]
fn test_watch_face_session() {
    let clock = ManualClock::at(quarter_past_ten());
    let mut sched = scheduler(&clock);

    let first = sched.start(RenderMode::Interactive).unwrap();
    assert_eq!(first.deadline_ms, clock.now_ms() + 16);
    assert_eq!(sched.host().last_text(), "10:15:30");
    let background = sched.host().renderer().style().background;
    assert!(sched.host().canvas().count_not(background) > 0);

    clock.advance_ms(16);
    let second = match sched.tick(first.token) {
        TickOutcome::Presented(armed) => armed,
        other => panic!("expected a frame, got {:?}", other),
    };
    assert_eq!(sched.host().frames(), 2);

    // ambient repaints now, then lands on the next whole second
    let ambient = sched.on_mode_changed(RenderMode::Ambient).unwrap();
    assert_eq!(ambient.deadline_ms % 1000, 0);
    assert!(ambient.deadline_ms > clock.now_ms());
    assert_eq!(sched.host().frames(), 3);
    assert_eq!(sched.host().last_mode(), Some(RenderMode::Ambient));
    assert_eq!(sched.tick(second.token), TickOutcome::Stale);

    clock.advance_ms(ambient.millis_until(clock.now_ms()) as i64);
    assert!(matches!(sched.tick(ambient.token), TickOutcome::Presented(_)));
    assert_eq!(sched.host().last_mode(), Some(RenderMode::Ambient));
    assert_eq!(sched.host().last_text(), "10:15:31");
}

#[test]
fn test_hidden_surface_ignores_late_timer() {
    let clock = ManualClock::at(quarter_past_ten());
    let mut sched = scheduler(&clock);
    let armed = sched.start(RenderMode::Interactive).unwrap();

    assert!(sched.on_visibility_changed(false, RenderMode::Interactive).is_none());
    clock.advance_ms(100);
    assert_eq!(sched.tick(armed.token), TickOutcome::Stale);
    assert_eq!(sched.host().frames(), 1);
    assert_eq!(sched.state(), SchedulerState::Idle);
}

#[test]
fn test_closed_canvas_halts() {
    let clock = ManualClock::at(quarter_past_ten());
    let mut sched = scheduler(&clock);
    let armed = sched.start(RenderMode::WidgetStatic).unwrap();
    assert_eq!(armed.deadline_ms - clock.now_ms(), 1000);

    sched.host_mut().close();
    clock.advance_ms(armed.millis_until(clock.now_ms()) as i64);
    assert_eq!(sched.tick(armed.token), TickOutcome::Halted);
    assert_eq!(sched.state(), SchedulerState::Idle);
    assert_eq!(sched.stats().halts, 1);

    // a visible host that is gone again cannot restart
    assert!(sched.start(RenderMode::WidgetStatic).is_none());
    assert_eq!(sched.stats().halts, 2);
}

#[test]
fn test_configured_cadence_and_background() {
    let cfg = parse_yaml(
        "pacer:\n  ambient_ms: 2000\n  interactive_ms: 40\n\
         render:\n  background: \"#000000\"\n  time_format: none\n",
    )
    .unwrap();

    let clock = ManualClock::at(quarter_past_ten());
    let renderer = RingRenderer::new(cfg.ring_style(), cfg.time_format());
    let host = CanvasHost::new(clock.clone(), 64, 64, renderer);
    let mut sched = AdaptiveFrameScheduler::with_pacer(host, cfg.pacer());

    let armed = sched.start(RenderMode::Interactive).unwrap();
    assert_eq!(armed.deadline_ms - clock.now_ms(), 40);
    assert_eq!(sched.host().renderer().style().background, Rgb888::new(0, 0, 0));

    let ambient = sched.on_mode_changed(RenderMode::Ambient).unwrap();
    assert_eq!(ambient.deadline_ms % 2000, 0);
    assert!(ambient.deadline_ms - clock.now_ms() <= 2000);
}
