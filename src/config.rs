use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::color::parse_hex;
use crate::pacer::Pacer;
use crate::render::{AmbientProperties, RingStyle, TimeFormat};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Which hosting surface the demo runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    Wallpaper,
    #[default]
    Watch,
    Widget,
}

/// Top-level app configuration. Every field optional so layers merge cleanly.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub surface: Option<SurfaceKind>,
    /// stop after this many seconds, run until signalled when absent
    pub run_secs: Option<u64>,
    pub pacer: Option<PacerConfig>,
    pub render: Option<RenderConfig>,
    pub watch: Option<WatchConfig>,
    pub widget: Option<WidgetConfig>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct PacerConfig {
    pub interactive_ms: Option<u64>,
    pub ambient_ms: Option<u64>,
    pub widget_ms: Option<u64>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct RenderConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub time_format: Option<TimeFormat>,
    pub background: Option<String>, // "#0a0a0a"
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct WatchConfig {
    pub low_bit_ambient: Option<bool>,
    pub burn_in_protection: Option<bool>,
    /// drop into ambient after this many seconds
    pub ambient_after_secs: Option<u64>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct WidgetConfig {
    pub placements: Option<u32>,
}

pub const DEFAULT_SIZE: u32 = 240;
const MAX_SIZE: u32 = 4096;
const MAX_PERIOD_MS: u64 = 3_600_000;
const MAX_PLACEMENTS: u32 = 64;
const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl Config {
    pub fn surface(&self) -> SurfaceKind {
        self.surface.unwrap_or_default()
    }

    pub fn pacer(&self) -> Pacer {
        let defaults = Pacer::default();
        let pick = |v: Option<u64>, mode| v.map(Duration::from_millis).unwrap_or(defaults.period(mode));
        let p = self.pacer.clone().unwrap_or_default();
        use crate::scheduler::RenderMode::*;
        Pacer::new(
            pick(p.interactive_ms, Interactive),
            pick(p.ambient_ms, Ambient),
            pick(p.widget_ms, WidgetStatic),
        )
    }

    pub fn size(&self) -> (u32, u32) {
        let r = self.render.clone().unwrap_or_default();
        (r.width.unwrap_or(DEFAULT_SIZE), r.height.unwrap_or(DEFAULT_SIZE))
    }

    pub fn time_format(&self) -> TimeFormat {
        self.render.as_ref().and_then(|r| r.time_format).unwrap_or_default()
    }

    pub fn ring_style(&self) -> RingStyle {
        let mut style = RingStyle::default();
        if let Some(bg) = self.render.as_ref().and_then(|r| r.background.as_deref()).and_then(parse_hex) {
            style.background = bg;
        }
        style
    }

    pub fn ambient_properties(&self) -> AmbientProperties {
        let w = self.watch.clone().unwrap_or_default();
        AmbientProperties {
            low_bit_ambient: w.low_bit_ambient.unwrap_or(false),
            burn_in_protection: w.burn_in_protection.unwrap_or(false),
        }
    }

    pub fn ambient_after(&self) -> Option<Duration> {
        self.watch.as_ref().and_then(|w| w.ambient_after_secs).map(Duration::from_secs)
    }

    pub fn placements(&self) -> u32 {
        self.widget.as_ref().and_then(|w| w.placements).unwrap_or(1)
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "gradient-clock", about = "Gradient clock surface runner", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Enable debug log level
    #[arg(long, short = 'v', alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long, value_enum)]
    pub surface: Option<SurfaceKind>,
    #[arg(long)]
    pub run_secs: Option<u64>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    #[arg(long, value_enum)]
    pub time_format: Option<TimeFormat>,
    #[arg(long)]
    pub interactive_ms: Option<u64>,
    #[arg(long)]
    pub ambient_after_secs: Option<u64>,
    #[arg(long, action = ArgAction::Set)]
    pub low_bit_ambient: Option<bool>,
    #[arg(long)]
    pub placements: Option<u32>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: read YAML, merge CLI, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/gradient-clock/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/gradient-clock/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/gradient-clock.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["gradient-clock.yaml", "config.yaml", "config/gradient-clock.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()  { dst.log_level = src.log_level; }
    if src.surface.is_some()    { dst.surface = src.surface; }
    if src.run_secs.is_some()   { dst.run_secs = src.run_secs; }
    if let Some(s) = src.pacer {
        match &mut dst.pacer {
            Some(d) => merge_pacer(d, s),
            None => dst.pacer = Some(s),
        }
    }
    if let Some(s) = src.render {
        match &mut dst.render {
            Some(d) => merge_render(d, s),
            None => dst.render = Some(s),
        }
    }
    if let Some(s) = src.watch {
        match &mut dst.watch {
            Some(d) => merge_watch(d, s),
            None => dst.watch = Some(s),
        }
    }
    if let Some(w) = src.widget {
        if w.placements.is_some() {
            dst.widget.get_or_insert_with(WidgetConfig::default).placements = w.placements;
        }
    }
}

fn merge_pacer(dst: &mut PacerConfig, src: PacerConfig) {
    if src.interactive_ms.is_some() { dst.interactive_ms = src.interactive_ms; }
    if src.ambient_ms.is_some()     { dst.ambient_ms = src.ambient_ms; }
    if src.widget_ms.is_some()      { dst.widget_ms = src.widget_ms; }
}

fn merge_render(dst: &mut RenderConfig, src: RenderConfig) {
    if src.width.is_some()       { dst.width = src.width; }
    if src.height.is_some()      { dst.height = src.height; }
    if src.time_format.is_some() { dst.time_format = src.time_format; }
    if src.background.is_some()  { dst.background = src.background; }
}

fn merge_watch(dst: &mut WatchConfig, src: WatchConfig) {
    if src.low_bit_ambient.is_some()    { dst.low_bit_ambient = src.low_bit_ambient; }
    if src.burn_in_protection.is_some() { dst.burn_in_protection = src.burn_in_protection; }
    if src.ambient_after_secs.is_some() { dst.ambient_after_secs = src.ambient_after_secs; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()  { cfg.log_level = cli.log_level.clone(); }
    if cli.debug                { cfg.log_level = Some("debug".into()); }
    if cli.surface.is_some()    { cfg.surface = cli.surface; }
    if cli.run_secs.is_some()   { cfg.run_secs = cli.run_secs; }

    if cli.interactive_ms.is_some() {
        cfg.pacer.get_or_insert_with(PacerConfig::default).interactive_ms = cli.interactive_ms;
    }

    if cli.width.is_some() || cli.height.is_some() || cli.time_format.is_some() {
        let render = cfg.render.get_or_insert_with(RenderConfig::default);
        if cli.width.is_some()       { render.width = cli.width; }
        if cli.height.is_some()      { render.height = cli.height; }
        if cli.time_format.is_some() { render.time_format = cli.time_format; }
    }

    if cli.ambient_after_secs.is_some() || cli.low_bit_ambient.is_some() {
        let watch = cfg.watch.get_or_insert_with(WatchConfig::default);
        if cli.ambient_after_secs.is_some() { watch.ambient_after_secs = cli.ambient_after_secs; }
        if cli.low_bit_ambient.is_some()    { watch.low_bit_ambient = cli.low_bit_ambient; }
    }

    if cli.placements.is_some() {
        cfg.widget.get_or_insert_with(WidgetConfig::default).placements = cli.placements;
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(level) = cfg.log_level.as_deref() {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "log_level must be one of {}",
                LOG_LEVELS.join("|")
            )));
        }
    }
    if let Some(p) = cfg.pacer.as_ref() {
        for (name, v) in [("interactive_ms", p.interactive_ms), ("ambient_ms", p.ambient_ms), ("widget_ms", p.widget_ms)] {
            if let Some(v) = v {
                if v == 0 || v > MAX_PERIOD_MS {
                    return Err(ConfigError::Validation(format!("pacer {name} must be 1..={MAX_PERIOD_MS}")));
                }
            }
        }
    }
    if let Some(render) = cfg.render.as_ref() {
        for (name, v) in [("width", render.width), ("height", render.height)] {
            if let Some(v) = v {
                if v == 0 || v > MAX_SIZE {
                    return Err(ConfigError::Validation(format!("render {name} must be 1..={MAX_SIZE}")));
                }
            }
        }
        if let Some(bg) = render.background.as_deref() {
            if parse_hex(bg).is_none() {
                return Err(ConfigError::Validation(format!("render background '{bg}' is not #rrggbb")));
            }
        }
    }
    if let Some(n) = cfg.widget.as_ref().and_then(|w| w.placements) {
        if n == 0 || n > MAX_PLACEMENTS {
            return Err(ConfigError::Validation(format!("widget placements must be 1..={MAX_PLACEMENTS}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::Rgb888;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["gradient-clock"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.surface(), SurfaceKind::Watch);
        assert_eq!(cfg.pacer(), Pacer::default());
        assert_eq!(cfg.size(), (DEFAULT_SIZE, DEFAULT_SIZE));
        assert_eq!(cfg.time_format(), TimeFormat::Digital);
        assert_eq!(cfg.placements(), 1);
        assert!(cfg.ambient_after().is_none());
    }

    #[test]
    fn test_yaml_sections() {
        let cfg = parse_yaml(
            "surface: widget\n\
             pacer:\n  interactive_ms: 33\n\
             render:\n  width: 320\n  time_format: none\n  background: \"#102030\"\n\
             watch:\n  low_bit_ambient: true\n  ambient_after_secs: 5\n\
             widget:\n  placements: 3\n",
        )
        .unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.surface(), SurfaceKind::Widget);
        assert_eq!(cfg.pacer().period(crate::scheduler::RenderMode::Interactive), Duration::from_millis(33));
        assert_eq!(cfg.size(), (320, DEFAULT_SIZE));
        assert_eq!(cfg.time_format(), TimeFormat::None);
        assert_eq!(cfg.ring_style().background, Rgb888::new(0x10, 0x20, 0x30));
        assert!(cfg.ambient_properties().low_bit_ambient);
        assert_eq!(cfg.ambient_after(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.placements(), 3);
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut base = parse_yaml("render:\n  width: 100\n  height: 80\n").unwrap();
        merge(&mut base, parse_yaml("render:\n  height: 90\n").unwrap());
        assert_eq!(base.size(), (100, 90));
    }

    #[test]
    fn test_cli_overrides_yaml() {
        let mut cfg = parse_yaml("log_level: warn\nsurface: wallpaper\nrender:\n  width: 100\n").unwrap();
        apply_cli_overrides(&mut cfg, &cli(&["--surface", "watch", "--width", "64", "-v"]));
        assert_eq!(cfg.surface(), SurfaceKind::Watch);
        assert_eq!(cfg.size().0, 64);
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        for yaml in [
            "pacer:\n  ambient_ms: 0\n",
            "render:\n  width: 0\n",
            "render:\n  background: teal\n",
            "widget:\n  placements: 0\n",
            "log_level: loud\n",
        ] {
            let cfg = parse_yaml(yaml).unwrap();
            assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))), "accepted: {yaml}");
        }
    }

    #[test]
    fn test_period_range() {
        for yaml in [
            "pacer:\n  interactive_ms: 18446744073709551615\n",
            "pacer:\n  widget_ms: 9223372036854775807\n",
            "pacer:\n  ambient_ms: 3600001\n",
        ] {
            let cfg = parse_yaml(yaml).unwrap();
            assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))), "accepted: {yaml}");
        }
        let cfg = parse_yaml("pacer:\n  ambient_ms: 3600000\n  interactive_ms: 1\n").unwrap();
        validate(&cfg).unwrap();
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load(&cli(&["--config", "/nonexistent/gradient-clock.yaml"])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
