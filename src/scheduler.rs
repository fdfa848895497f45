/*
 *  scheduler.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed-interval tick: trigger the renderer, ask for a redraw
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
use std::sync::Arc;

use embedded_graphics::primitives::Rectangle;
use log::info;

use crate::display::compositor::Compositor;
use crate::display::renderer::{FrameRenderer, RenderHandle, RenderStats};

/// Whatever turns "this area is stale" into an expose on the visible surface.
pub trait RedrawRequest {
    fn request_redraw(&mut self, area: Rectangle);
}

impl<F: FnMut(Rectangle)> RedrawRequest for F {
    fn request_redraw(&mut self, area: Rectangle) {
        self(area)
    }
}

/// Counters reported when a front end stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub frames: u64,
    pub rejected: u64,
    pub published: u64,
}

/// Lives on the main thread next to the compositor.
pub struct Scheduler<R: RedrawRequest> {
    pending: Option<FrameRenderer>,
    handle: Option<RenderHandle>,
    stats: Arc<RenderStats>,
    compositor: Compositor,
    redraw: R,
    ticks: u64,
}

impl<R: RedrawRequest> Scheduler<R> {
    /// The renderer thread is not started until the first tick.
    pub fn new(renderer: FrameRenderer, compositor: Compositor, redraw: R) -> Self {
        let stats = renderer.stats();
        Self { pending: Some(renderer), handle: None, stats, compositor, redraw, ticks: 0 }
    }

    /// One tick: trigger the renderer if idle, then request a full redraw
    /// whether or not a new frame is ready.
    pub fn tick(&mut self) -> io::Result<()> {
        if let Some(renderer) = self.pending.take() {
            self.handle = Some(renderer.spawn()?);
        }
        if let Some(handle) = self.handle.as_ref() {
            handle.try_trigger();
        }
        let area = self.compositor.full_area();
        self.redraw.request_redraw(area);
        self.ticks += 1;
        Ok(())
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn stats(&self) -> Arc<RenderStats> {
        Arc::clone(&self.stats)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.ticks,
            frames: self.stats.frames(),
            rejected: self.stats.rejected(),
            published: self.compositor.buffer().generation(),
        }
    }

    pub fn render_handle(&self) -> Option<&RenderHandle> {
        self.handle.as_ref()
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Stop and join the renderer thread if it was started.
    pub fn shutdown(&mut self) {
        self.pending = None;
        if let Some(mut handle) = self.handle.take() {
            handle.shutdown();
            info!("scheduler stopped after {} ticks", self.ticks);
        }
    }

    pub fn into_redraw(mut self) -> R {
        self.shutdown();
        // Scheduler has no Drop impl, so the field can be moved out
        self.redraw
    }
}
