/*
 *  lib.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Acquisition, trace history, rendering and presentation pipeline
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

pub mod channel;
pub mod config;
pub mod constants;
pub mod shutdown;
pub mod pacer;
pub mod signals;

// acquisition
pub mod sensor;
pub mod sample_cache;
pub mod sample_reader;
pub mod trace_buffer;
pub mod buffer_updater;

// drawing
pub mod vframebuf;
pub mod draw;
pub mod display;

pub mod scheduler;
pub mod pipeline;

pub use channel::{Channel, CHANNEL_COUNT};
pub use config::Config;
pub use pipeline::{Pipeline, PipelineError, SharedState};
pub use shutdown::Shutdown;
