/*
 *  config.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults <- YAML <- command line
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::constants::*;

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

/// Effective configuration. Every section falls back to its defaults, so a
/// YAML file only needs the keys it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub device: DeviceConfig,
    pub trace: TraceConfig,
    pub timing: TimingConfig,
    pub viewport: ViewportConfig,
    pub layout: LayoutConfig,
    pub palette: PaletteConfig,
    /// per-invocation options, command line only
    #[serde(skip)]
    pub run: RunConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            device: DeviceConfig::default(),
            trace: TraceConfig::default(),
            timing: TimingConfig::default(),
            viewport: ViewportConfig::default(),
            layout: LayoutConfig::default(),
            palette: PaletteConfig::default(),
            run: RunConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub path: PathBuf,
    /// drive the pipeline from the synthetic generator instead of hardware
    pub simulate: bool,
    /// fixed seed for the synthetic generator (random when absent)
    pub seed: Option<u64>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_DEVICE_PATH), simulate: false, seed: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub len: usize,
    pub gain: f64,
    pub grid_lines: usize,
    pub reference_lines: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            len: TRACE_LEN,
            gain: TRACE_GAIN,
            grid_lines: GRID_LINES,
            reference_lines: REFERENCE_LINES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub update_tick_ms: u64,
    pub render_tick_ms: u64,
    pub poll_idle_us: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            update_tick_ms: UPDATE_TICK_MS,
            render_tick_ms: RENDER_TICK_MS,
            poll_idle_us: POLL_IDLE_US,
        }
    }
}

impl TimingConfig {
    pub fn update_tick(&self) -> Duration { Duration::from_millis(self.update_tick_ms) }
    pub fn render_tick(&self) -> Duration { Duration::from_millis(self.render_tick_ms) }
    pub fn poll_idle(&self) -> Duration { Duration::from_micros(self.poll_idle_us) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { width: VIEWPORT_WIDTH, height: VIEWPORT_HEIGHT, title: WINDOW_TITLE.into() }
    }
}

/// Pixel placement of the static furniture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub label_gutter: u32,
    pub trace_offset: u32,
    pub gradient_width: u32,
    pub divider_width: u32,
    pub label_x: i32,
    pub label_baseline_shift: i32,
    pub trace_stroke: u32,
    pub arrow_stroke: u32,
    pub arrow_half_height: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            label_gutter: LABEL_GUTTER,
            trace_offset: TRACE_OFFSET,
            gradient_width: GRADIENT_WIDTH,
            divider_width: DIVIDER_WIDTH,
            label_x: LABEL_X,
            label_baseline_shift: LABEL_BASELINE_SHIFT,
            trace_stroke: TRACE_STROKE,
            arrow_stroke: ARROW_STROKE,
            arrow_half_height: ARROW_HALF_HEIGHT,
        }
    }
}

/// Colors as `[r, g, b]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub background: [u8; 3],
    pub gutter: [u8; 3],
    pub gradient: [u8; 3],
    pub grid: [u8; 3],
    pub ink: [u8; 3],
    pub traces: [[u8; 3]; 3],
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            background: COLOR_BACKGROUND,
            gutter: COLOR_GUTTER,
            gradient: COLOR_GRADIENT,
            grid: COLOR_GRID,
            ink: COLOR_INK,
            traces: COLOR_TRACES,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub headless: bool,
    pub snapshot: Option<PathBuf>,
    pub run_for_secs: Option<u64>,
    pub dump_config: bool,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "memstrip", about = "Real-time MEMS accelerometer strip chart", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Joystick device node, e.g. /dev/input/js0
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub device: Option<PathBuf>,
    /// Use the synthetic motion generator instead of a real sensor
    #[arg(long, action = ArgAction::SetTrue)]
    pub simulate: bool,
    /// Seed for --simulate
    #[arg(long)]
    pub seed: Option<u64>,
    /// Run without a window, rendering into memory
    #[arg(long, action = ArgAction::SetTrue)]
    pub headless: bool,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    #[arg(long)]
    pub trace_len: Option<usize>,
    #[arg(long)]
    pub gain: Option<f64>,
    #[arg(long)]
    pub grid_lines: Option<usize>,
    #[arg(long)]
    pub reference_lines: Option<usize>,
    #[arg(long)]
    pub update_tick_ms: Option<u64>,
    #[arg(long)]
    pub render_tick_ms: Option<u64>,
    #[arg(long)]
    pub poll_idle_us: Option<u64>,
    /// Write the last completed frame as a binary PPM on exit
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,
    /// Stop after this many seconds
    #[arg(long)]
    pub run_for_secs: Option<u64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    resolve(&cli)
}

/// Build the effective config for an already parsed command line.
pub fn resolve(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) YAML file (explicit path or search), defaults fill the gaps
    let mut cfg = if let Some(p) = cli.config.as_ref() {
        if !p.exists() {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        read_yaml(p)?
    } else if let Some(p) = find_config_file() {
        read_yaml(&p)?
    } else {
        Config::default()
    };

    // 2) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 3) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Pretty YAML of the effective config.
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/memstrip/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/memstrip/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/memstrip.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["memstrip.yaml", "config/memstrip.yaml"] {
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
    // an empty file is a valid "all defaults" config
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(s)?)
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if let Some(level) = cli.log_level.as_ref() { cfg.log_level = level.clone(); }

    if let Some(path) = cli.device.as_ref()     { cfg.device.path = path.clone(); }
    if cli.simulate                             { cfg.device.simulate = true; }
    if cli.seed.is_some()                       { cfg.device.seed = cli.seed; }

    if let Some(w) = cli.width                  { cfg.viewport.width = w; }
    if let Some(h) = cli.height                 { cfg.viewport.height = h; }

    if let Some(n) = cli.trace_len              { cfg.trace.len = n; }
    if let Some(g) = cli.gain                   { cfg.trace.gain = g; }
    if let Some(k) = cli.grid_lines             { cfg.trace.grid_lines = k; }
    if let Some(y) = cli.reference_lines        { cfg.trace.reference_lines = y; }

    if let Some(t) = cli.update_tick_ms         { cfg.timing.update_tick_ms = t; }
    if let Some(t) = cli.render_tick_ms         { cfg.timing.render_tick_ms = t; }
    if let Some(t) = cli.poll_idle_us           { cfg.timing.poll_idle_us = t; }

    cfg.run = RunConfig {
        headless: cli.headless,
        snapshot: cli.snapshot.clone(),
        run_for_secs: cli.run_for_secs,
        dump_config: cli.dump_config,
    };
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let fail = |msg: &str| -> Result<(), ConfigError> { Err(ConfigError::Validation(msg.into())) };

    if cfg.trace.len < 2 {
        return fail("trace len must be >= 2");
    }
    if !(cfg.trace.gain.is_finite() && cfg.trace.gain > 0.0) {
        return fail("trace gain must be a positive number");
    }
    if cfg.trace.grid_lines == 0 {
        return fail("trace grid_lines must be >= 1");
    }
    if cfg.trace.reference_lines < 2 {
        return fail("trace reference_lines must be >= 2");
    }
    if cfg.timing.update_tick_ms == 0 || cfg.timing.render_tick_ms == 0 {
        return fail("timing ticks must be > 0");
    }
    if cfg.viewport.width == 0 || cfg.viewport.height == 0 {
        return fail("viewport width/height must be > 0");
    }
    if cfg.layout.label_gutter > cfg.layout.trace_offset {
        return fail("layout label_gutter must not exceed trace_offset");
    }
    Ok(())
}
