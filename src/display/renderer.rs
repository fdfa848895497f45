/*
 *  display/renderer.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Triggered off-screen frame renderer with a busy-flag debounce
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
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use embedded_graphics::prelude::*;
use log::{error, info};

use crate::shutdown::Shutdown;
use crate::trace_buffer::TraceBuffer;

use super::double_buffer::DoubleBuffer;
use super::painter::{paint_background, paint_grid, paint_traces, RenderSettings};
use super::surface::{Surface, SurfaceError};

/// Messages understood by the render worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCommand {
    Render,
    Shutdown,
}

/// Set while a render is queued or running.
#[derive(Debug, Default)]
pub struct BusyFlag(AtomicBool);

impl BusyFlag {
    /// Clear -> set. Returns false if it was already set.
    pub fn try_acquire(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Default)]
pub struct RenderStats {
    frames: AtomicU64,
    rejected: AtomicU64,
}

impl RenderStats {
    /// Frames completed and published.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Triggers dropped because a render was already in flight.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

/// Paints frames from the trace window into the double buffer.
pub struct FrameRenderer {
    trace: Arc<Mutex<TraceBuffer>>,
    buffer: Arc<DoubleBuffer>,
    settings: RenderSettings,
    shutdown: Shutdown,
    busy: Arc<BusyFlag>,
    stats: Arc<RenderStats>,
    snapshot: TraceBuffer,
    points: Vec<Point>,
}

impl FrameRenderer {
    pub fn new(
        trace: Arc<Mutex<TraceBuffer>>,
        buffer: Arc<DoubleBuffer>,
        settings: RenderSettings,
        shutdown: Shutdown,
    ) -> Self {
        let snapshot = trace.lock().unwrap_or_else(|e| e.into_inner()).clone();
        let points = Vec::with_capacity(snapshot.len());
        Self {
            trace,
            buffer,
            settings,
            shutdown,
            busy: Arc::new(BusyFlag::default()),
            stats: Arc::new(RenderStats::default()),
            snapshot,
            points,
        }
    }

    pub fn stats(&self) -> Arc<RenderStats> {
        Arc::clone(&self.stats)
    }

    /// One render cycle. Only allocating the frame can fail.
    pub fn render_once(&mut self) -> Result<(), SurfaceError> {
        let viewport = self.buffer.viewport();
        let mut frame = Surface::create(viewport.width, viewport.height, self.settings.palette.background)?;

        let Ok(()) = paint_background(&mut frame, &self.settings);

        {
            let live = self.trace.lock().unwrap_or_else(|e| e.into_inner());
            self.snapshot.clone_from(&live);
        }

        let Ok(()) = paint_grid(&mut frame, &self.snapshot, &self.settings);
        let Ok(()) = paint_traces(&mut frame, &self.snapshot, &self.settings, &mut self.points);

        self.buffer.publish(&frame);
        self.stats.frames.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Start the worker thread; it idles until triggered through the handle.
    pub fn spawn(self) -> io::Result<RenderHandle> {
        let (tx, rx) = mpsc::sync_channel(2);
        // a token tripped elsewhere wakes the worker out of recv()
        let wake_tx = tx.clone();
        self.shutdown.on_trigger(move || {
            let _ = wake_tx.try_send(RenderCommand::Shutdown);
        });
        let busy = Arc::clone(&self.busy);
        let stats = Arc::clone(&self.stats);
        let join = thread::Builder::new()
            .name("frame-renderer".into())
            .spawn(move || self.run(rx))?;
        Ok(RenderHandle { tx, busy, stats, join: Some(join) })
    }

    fn run(mut self, rx: Receiver<RenderCommand>) {
        info!("frame renderer started");
        while !self.shutdown.is_triggered() {
            match rx.recv() {
                Ok(RenderCommand::Render) => {
                    let result = self.render_once();
                    self.busy.release();
                    if let Err(e) = result {
                        error!("frame renderer: {}", e);
                        self.shutdown.fail(e.to_string());
                        break;
                    }
                }
                Ok(RenderCommand::Shutdown) | Err(_) => break,
            }
        }
        info!("frame renderer stopped after {} frames", self.stats.frames());
    }
}

/// Main-thread side of a running renderer.
pub struct RenderHandle {
    tx: SyncSender<RenderCommand>,
    busy: Arc<BusyFlag>,
    stats: Arc<RenderStats>,
    join: Option<JoinHandle<()>>,
}

impl RenderHandle {
    /// Queue a render if none is in flight. Returns whether it was accepted.
    pub fn try_trigger(&self) -> bool {
        if !self.busy.try_acquire() {
            self.stats.rejected.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        match self.tx.try_send(RenderCommand::Render) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.busy.release();
                false
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    pub fn stats(&self) -> Arc<RenderStats> {
        Arc::clone(&self.stats)
    }

    /// Poll until the in-flight render (if any) finishes. False on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.busy.is_set() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }

    /// Stop the worker and join it. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = self.tx.try_send(RenderCommand::Shutdown);
            if join.join().is_err() {
                error!("frame renderer panicked");
            }
        }
    }
}

impl Drop for RenderHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::Rgb888;

    fn renderer(w: u32, h: u32) -> (FrameRenderer, Arc<DoubleBuffer>, Arc<Mutex<TraceBuffer>>) {
        let trace = Arc::new(Mutex::new(TraceBuffer::new(50, 4)));
        let db = Arc::new(DoubleBuffer::new(w, h, Rgb888::WHITE).unwrap());
        let r = FrameRenderer::new(Arc::clone(&trace), Arc::clone(&db), RenderSettings::default(), Shutdown::new());
        (r, db, trace)
    }

    #[test]
    fn test_busy_flag_cas() {
        let flag = BusyFlag::default();
        assert!(flag.try_acquire());
        assert!(!flag.try_acquire());
        assert!(flag.is_set());
        flag.release();
        assert!(flag.try_acquire());
    }

    #[test]
    fn test_render_once_publishes() {
        let (mut r, db, _) = renderer(400, 300);
        r.render_once().unwrap();
        assert_eq!(db.generation(), 1);
        assert_eq!(r.stats().frames(), 1);
        // the gutter is painted
        assert_eq!(db.hold().pixel(Point::new(5, 5)), Some(RenderSettings::default().palette.gutter));
    }

    #[test]
    fn test_trigger_rejected_while_busy() {
        let (r, db, _) = renderer(200, 120);
        let stats = r.stats();
        let handle = r.spawn().unwrap();
        {
            let _held = db.hold();
            assert!(handle.try_trigger());
            assert!(!handle.try_trigger());
            assert!(!handle.try_trigger());
            assert!(handle.is_busy());
        }
        assert!(handle.wait_idle(Duration::from_secs(5)));
        assert_eq!(stats.frames(), 1);
        assert_eq!(stats.rejected(), 2);
        assert_eq!(db.generation(), 1);
    }

    #[test]
    fn test_tripped_token_stops_idle_worker() {
        let token = Shutdown::new();
        let trace = Arc::new(Mutex::new(TraceBuffer::new(20, 2)));
        let db = Arc::new(DoubleBuffer::new(60, 40, Rgb888::WHITE).unwrap());
        let r = FrameRenderer::new(trace, db, RenderSettings::default(), token.clone());
        let mut handle = r.spawn().unwrap();

        token.trigger();
        // the worker leaves recv() on its own, no Shutdown from the handle
        let join = handle.join.take().unwrap();
        join.join().unwrap();
        assert_eq!(handle.stats().frames(), 0);
    }

    #[test]
    fn test_shutdown_joins_worker() {
        let (r, _db, _) = renderer(50, 50);
        let mut handle = r.spawn().unwrap();
        handle.shutdown();
        handle.shutdown();
        // worker is gone, trigger can't be delivered and the flag is handed back
        assert!(!handle.try_trigger());
        assert!(!handle.is_busy());
    }
}
