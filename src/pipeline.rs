/*
 *  pipeline.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Owns the shared state and the worker threads built on it
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

use std::io;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use log::{error, info};
use thiserror::Error;

use crate::buffer_updater::BufferUpdater;
use crate::config::{Config, TimingConfig};
use crate::display::compositor::Compositor;
use crate::display::double_buffer::DoubleBuffer;
use crate::display::painter::RenderSettings;
use crate::display::renderer::FrameRenderer;
use crate::display::surface::SurfaceError;
use crate::sample_cache::SampleCache;
use crate::sample_reader::SampleReader;
use crate::scheduler::{RedrawRequest, Scheduler};
use crate::sensor::BoxedDevice;
use crate::shutdown::Shutdown;
use crate::trace_buffer::TraceBuffer;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("cannot start {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
}

/// State shared between the workers, created once at startup.
#[derive(Debug, Clone)]
pub struct SharedState {
    pub cache: Arc<SampleCache>,
    pub trace: Arc<Mutex<TraceBuffer>>,
    pub double_buffer: Arc<DoubleBuffer>,
}

/// Context object tying the workers together. Nothing here is global;
/// every worker gets clones of the `Arc`s it needs and the shutdown token.
pub struct Pipeline {
    shared: SharedState,
    settings: RenderSettings,
    timing: TimingConfig,
    shutdown: Shutdown,
    workers: Vec<(&'static str, JoinHandle<()>)>,
}

impl Pipeline {
    pub fn new(cfg: &Config) -> Result<Self, PipelineError> {
        Self::with_shutdown(cfg, Shutdown::new())
    }

    pub fn with_shutdown(cfg: &Config, shutdown: Shutdown) -> Result<Self, PipelineError> {
        let settings = RenderSettings::from_config(cfg);
        let double_buffer = DoubleBuffer::new(cfg.viewport.width, cfg.viewport.height, settings.palette.background)?;
        let shared = SharedState {
            cache: Arc::new(SampleCache::new()),
            trace: Arc::new(Mutex::new(TraceBuffer::new(cfg.trace.len, cfg.trace.grid_lines))),
            double_buffer: Arc::new(double_buffer),
        };
        Ok(Self { shared, settings, timing: cfg.timing.clone(), shutdown, workers: Vec::new() })
    }

    pub fn shared(&self) -> &SharedState {
        &self.shared
    }

    pub fn shutdown_token(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn sample_reader(&self, device: BoxedDevice) -> SampleReader {
        SampleReader::new(device, Arc::clone(&self.shared.cache), self.timing.poll_idle(), self.shutdown.clone())
    }

    pub fn buffer_updater(&self) -> BufferUpdater {
        BufferUpdater::new(
            Arc::clone(&self.shared.cache),
            Arc::clone(&self.shared.trace),
            self.timing.update_tick(),
            self.shutdown.clone(),
        )
    }

    pub fn frame_renderer(&self) -> FrameRenderer {
        FrameRenderer::new(
            Arc::clone(&self.shared.trace),
            Arc::clone(&self.shared.double_buffer),
            self.settings.clone(),
            self.shutdown.clone(),
        )
    }

    pub fn compositor(&self) -> Compositor {
        Compositor::new(Arc::clone(&self.shared.double_buffer))
    }

    /// Scheduler for the main thread; its first tick starts the renderer.
    pub fn scheduler<R: RedrawRequest>(&self, redraw: R) -> Scheduler<R> {
        Scheduler::new(self.frame_renderer(), self.compositor(), redraw)
    }

    /// Start the sample reader and the buffer updater.
    pub fn start_acquisition(&mut self, device: BoxedDevice) -> Result<(), PipelineError> {
        let reader = self
            .sample_reader(device)
            .spawn()
            .map_err(|source| PipelineError::Spawn { name: "sample-reader", source })?;
        self.workers.push(("sample-reader", reader));

        let updater = self
            .buffer_updater()
            .spawn()
            .map_err(|source| PipelineError::Spawn { name: "buffer-updater", source })?;
        self.workers.push(("buffer-updater", updater));
        info!("acquisition started");
        Ok(())
    }

    /// Trip the token, join every worker and hand back the fatal error, if any.
    pub fn shutdown(mut self) -> Option<String> {
        self.shutdown.trigger();
        for (name, handle) in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("{} panicked", name);
            }
        }
        self.shutdown.failure()
    }
}
