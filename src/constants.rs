//! This module contains the default tunables used across the pipeline and the renderer.
//! Every value here can be overridden from the YAML config or the command line.

use embedded_graphics::mono_font::{MonoFont, ascii::FONT_9X18_BOLD};

/// Default joystick node the sensor shows up as.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/input/js0";

/// Number of samples kept per channel (N).
pub const TRACE_LEN: usize = 500;
/// Vertical gain divisor applied to (sample - mean).
pub const TRACE_GAIN: f64 = 30.0;
/// Moving vertical grid lines (K).
pub const GRID_LINES: usize = 10;
/// Fixed horizontal reference lines.
pub const REFERENCE_LINES: usize = 30;

/// The default width of the viewport in pixels.
pub const VIEWPORT_WIDTH: u32 = 1000;
/// The default height of the viewport in pixels.
pub const VIEWPORT_HEIGHT: u32 = 600;
pub const WINDOW_TITLE: &str = "Real Time Acceleration";

// Timings
/// Buffer updater period (125 Hz).
pub const UPDATE_TICK_MS: u64 = 8;
/// Scheduler period (~32 Hz).
pub const RENDER_TICK_MS: u64 = 31;
/// Idle delay between non-blocking device reads.
pub const POLL_IDLE_US: u64 = 10;

// Layout (pixels)
/// Width of the plain label gutter; the divider sits on its right edge.
pub const LABEL_GUTTER: u32 = 100;
/// X offset where trace sample 0 is placed.
pub const TRACE_OFFSET: u32 = 150;
pub const GRADIENT_WIDTH: u32 = 300;
pub const DIVIDER_WIDTH: u32 = 10;
pub const LABEL_X: i32 = 20;
/// Labels sit this far below their row center (baseline).
pub const LABEL_BASELINE_SHIFT: i32 = 10;
pub const TRACE_STROKE: u32 = 3;
pub const ARROW_STROKE: u32 = 5;
pub const ARROW_HALF_HEIGHT: i32 = 10;

/// Bold monospace face used for the channel labels.
pub const LABEL_FONT: &MonoFont<'static> = &FONT_9X18_BOLD;

// Palette ([r, g, b])
pub const COLOR_BACKGROUND: [u8; 3] = [255, 255, 255];
pub const COLOR_GUTTER: [u8; 3] = [230, 153, 77];
pub const COLOR_GRADIENT: [u8; 3] = [153, 153, 153];
pub const COLOR_GRID: [u8; 3] = [204, 204, 204];
pub const COLOR_INK: [u8; 3] = [0, 0, 0];
pub const COLOR_TRACES: [[u8; 3]; 3] = [[255, 0, 0], [0, 255, 0], [0, 0, 255]];
