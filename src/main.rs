/*
 *  main.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runs one clock surface against an offscreen canvas until signalled
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

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::{interval_at, sleep, Instant};

use gradient_clock::config::{self, Cli, Config, SurfaceKind};
use gradient_clock::surfaces::{WallpaperEngine, WatchFaceEngine, WidgetHub};
use gradient_clock::{CanvasHost, RenderMode, RingRenderer, SchedulerState, SchedulerStats, SystemClock};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

const REPORT_EVERY: Duration = Duration::from_secs(10);
const TIME_TICK_EVERY: Duration = Duration::from_secs(60);

type Canvas = CanvasHost<SystemClock>;

/// The surface under demonstration
enum Surface {
    Wallpaper(WallpaperEngine<Canvas>),
    Watch(WatchFaceEngine<Canvas>),
    Widget { hub: WidgetHub<SystemClock>, count: u32, size: (u32, u32), renderer: RingRenderer },
}

impl Surface {
    fn build(cfg: &Config) -> Self {
        let (width, height) = cfg.size();
        let renderer = RingRenderer::new(cfg.ring_style(), cfg.time_format());
        let canvas = || CanvasHost::new(SystemClock, width, height, renderer.clone());
        match cfg.surface() {
            SurfaceKind::Wallpaper => Surface::Wallpaper(WallpaperEngine::new(canvas(), cfg.pacer())),
            SurfaceKind::Watch => {
                let mut watch = WatchFaceEngine::new(canvas(), cfg.pacer());
                watch.on_properties_changed(cfg.ambient_properties());
                Surface::Watch(watch)
            }
            SurfaceKind::Widget => Surface::Widget {
                hub: WidgetHub::new(SystemClock, cfg.pacer()),
                count: cfg.placements(),
                size: (width, height),
                renderer: renderer.clone(),
            },
        }
    }

    fn show(&mut self) {
        match self {
            Surface::Wallpaper(w) => w.on_visibility_changed(true),
            Surface::Watch(w) => w.on_visibility_changed(true),
            Surface::Widget { hub, count, size, renderer } => {
                for id in 0..*count {
                    let canvas = CanvasHost::new(SystemClock, size.0, size.1, renderer.clone());
                    hub.add_placement(id, Box::new(canvas));
                }
            }
        }
    }

    fn hide(&mut self) {
        match self {
            Surface::Wallpaper(w) => w.on_surface_destroyed(),
            Surface::Watch(w) => w.on_destroy(),
            Surface::Widget { hub, .. } => {
                for id in hub.placements() {
                    hub.remove_placement(id);
                }
            }
        }
    }

    fn enter_ambient(&mut self) {
        if let Surface::Watch(w) = self {
            w.on_ambient_mode_changed(true);
        }
    }

    fn time_tick(&mut self) {
        if let Surface::Watch(w) = self {
            if w.is_ambient() {
                w.on_time_tick();
            }
        }
    }

    fn state(&self) -> SchedulerState {
        match self {
            Surface::Wallpaper(w) => w.state(),
            Surface::Watch(w) => w.state(),
            Surface::Widget { hub, .. } => {
                if hub.is_ticking() { SchedulerState::Running(RenderMode::WidgetStatic) } else { SchedulerState::Idle }
            }
        }
    }

    fn stats(&self) -> SchedulerStats {
        match self {
            Surface::Wallpaper(w) => w.stats(),
            Surface::Watch(w) => w.stats(),
            Surface::Widget { hub, .. } => hub.stats(),
        }
    }

    fn last_text(&self) -> String {
        match self {
            Surface::Wallpaper(w) => w.with_host(|h| h.last_text().to_string()),
            Surface::Watch(w) => w.with_host(|h| h.last_text().to_string()),
            Surface::Widget { .. } => String::new(),
        }
    }
}

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

/// Resolves on a signal or once the optional run time is spent
async fn shutdown(run_secs: Option<u64>) {
    let limit = async {
        match run_secs {
            Some(secs) => {
                sleep(Duration::from_secs(secs)).await;
                info!("Run time of {}s elapsed", secs);
            }
            None => std::future::pending::<()>().await,
        }
    };
    tokio::select! {
        res = signal_handler() => {
            if let Err(e) = res {
                error!("Signal handler failed: {}", e);
            }
        }
        _ = limit => {}
    }
}

fn report(surface: &Surface) {
    let stats = surface.stats();
    info!(
        "{:?} frames {} stale {} halts {} showing '{}'",
        surface.state(),
        stats.frames_presented,
        stats.stale_ticks,
        stats.halts,
        surface.last_text()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        print!("{}", serde_yaml::to_string(&cfg)?);
        return Ok(());
    }

    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("{} - rings of time", env!("CARGO_PKG_NAME"));
    info!("v.{} built {} ({})", env!("CARGO_PKG_VERSION"), BUILD_DATE, BUILD_PROFILE);

    let mut surface = Surface::build(&cfg);
    info!("Showing {:?} surface at {:?}", cfg.surface(), cfg.size());
    surface.show();

    let stop = shutdown(cfg.run_secs);
    tokio::pin!(stop);

    let ambient_after = cfg.ambient_after();
    let ambient = sleep(ambient_after.unwrap_or_default());
    tokio::pin!(ambient);
    let mut ambient_pending = ambient_after.is_some() && cfg.surface() == SurfaceKind::Watch;

    let mut reports = interval_at(Instant::now() + REPORT_EVERY, REPORT_EVERY);
    let mut time_ticks = interval_at(Instant::now() + TIME_TICK_EVERY, TIME_TICK_EVERY);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = &mut ambient, if ambient_pending => {
                ambient_pending = false;
                surface.enter_ambient();
            }
            _ = time_ticks.tick() => surface.time_tick(),
            _ = reports.tick() => report(&surface),
        }
    }

    surface.hide();
    report(&surface);
    info!("Shutdown complete");
    Ok(())
}
