/*
 *  display/headless.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Window-less front end: scheduler ticks exposing into memory
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

use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::primitives::Rectangle;
use log::{info, warn};

use crate::pacer::Pacer;
use crate::pipeline::Pipeline;
use crate::scheduler::{RedrawRequest, RunSummary};

use super::compositor::Compositor;
use super::error::FrontEndError;
use super::surface::MemorySurface;

/// Stand-in for a visible surface: every redraw request is serviced at once.
pub struct HeadlessView {
    compositor: Compositor,
    surface: MemorySurface,
    exposures: u64,
}

impl HeadlessView {
    pub fn new(compositor: Compositor, fill: Rgb888) -> Result<Self, FrontEndError> {
        let size = compositor.viewport();
        let surface = MemorySurface::new(size.width, size.height, fill)?;
        Ok(Self { compositor, surface, exposures: 0 })
    }

    pub fn surface(&self) -> &MemorySurface {
        &self.surface
    }

    pub fn exposures(&self) -> u64 {
        self.exposures
    }

    /// Expose the whole viewport again.
    pub fn refresh(&mut self) {
        let area = self.compositor.full_area();
        self.request_redraw(area);
    }
}

impl RedrawRequest for HeadlessView {
    fn request_redraw(&mut self, area: Rectangle) {
        let size = self.compositor.viewport();
        if let Err(e) = self.surface.resize(size.width, size.height) {
            warn!("headless surface: {}", e);
        }
        self.compositor.on_expose(&area, &mut self.surface);
        self.exposures += 1;
    }
}

/// Tick until shutdown, or for `run_for` when given. The renderer thread is
/// joined before returning and the view holds the last completed frame.
pub fn run(
    pipeline: &Pipeline,
    tick: Duration,
    run_for: Option<Duration>,
) -> Result<(RunSummary, HeadlessView), FrontEndError> {
    let compositor = pipeline.compositor();
    let fill = compositor.buffer().hold().background();
    let view = HeadlessView::new(compositor, fill)?;
    let mut scheduler = pipeline.scheduler(view);
    let shutdown = pipeline.shutdown_token();

    let viewport = scheduler.compositor().viewport();
    info!("headless {}x{}, tick {:?}", viewport.width, viewport.height, tick);

    let stop_at = run_for.map(|d| Instant::now() + d);
    let mut pacer = Pacer::new(tick);
    loop {
        if stop_at.is_some_and(|t| Instant::now() >= t) {
            info!("run time elapsed");
            break;
        }
        if !pacer.wait(&shutdown) {
            break;
        }
        if let Err(e) = scheduler.tick() {
            scheduler.shutdown();
            return Err(e.into());
        }
    }

    // join the renderer first so a frame still in flight is counted
    scheduler.shutdown();
    let summary = scheduler.summary();
    let mut view = scheduler.into_redraw();
    view.refresh();
    Ok((summary, view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::display::color::Palette;
    use embedded_graphics::prelude::*;

    #[test]
    fn test_headless_run_renders_frames() {
        let mut cfg = Config::default();
        cfg.viewport.width = 800;
        cfg.viewport.height = 240;
        let pipeline = Pipeline::new(&cfg).unwrap();
        let (summary, view) = run(&pipeline, Duration::from_millis(5), Some(Duration::from_millis(120))).unwrap();
        assert!(summary.ticks > 0);
        // every accepted trigger has finished by the time the summary is taken
        assert!(summary.frames >= 1);
        assert_eq!(summary.frames, summary.published);
        assert_eq!(summary.published, pipeline.shared().double_buffer.generation());
        assert_eq!(view.exposures(), summary.ticks + 1);
        // the last frame's gutter made it to the view
        let gutter = Palette::default().gutter;
        assert_eq!(view.surface().pixel(Point::new(5, 5)), Some(gutter));
        pipeline.shutdown();
    }
}
