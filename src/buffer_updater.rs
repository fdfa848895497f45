/*
 *  buffer_updater.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed-rate worker moving the sample cache into the trace window
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
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::info;

use crate::channel::Channel;
use crate::pacer::Pacer;
use crate::sample_cache::SampleCache;
use crate::shutdown::Shutdown;
use crate::trace_buffer::TraceBuffer;

pub struct BufferUpdater {
    cache: Arc<SampleCache>,
    trace: Arc<Mutex<TraceBuffer>>,
    tick: Duration,
    shutdown: Shutdown,
}

impl BufferUpdater {
    pub fn new(cache: Arc<SampleCache>, trace: Arc<Mutex<TraceBuffer>>, tick: Duration, shutdown: Shutdown) -> Self {
        Self { cache, trace, tick, shutdown }
    }

    /// One cycle, under the trace lock from the first shift to the last cursor.
    pub fn cycle(&self) {
        let mut trace = self.trace.lock().unwrap_or_else(|e| e.into_inner());
        let latest = Channel::ALL.map(|ch| self.cache.read(ch));
        trace.update(latest);
    }

    pub fn run(self) {
        info!("buffer updater started, tick {:?}", self.tick);
        let mut pacer = Pacer::new(self.tick);
        while !self.shutdown.is_triggered() {
            self.cycle();
            // lock is already released here
            if !pacer.wait(&self.shutdown) {
                break;
            }
        }
        info!("buffer updater stopped");
    }

    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("buffer-updater".into())
            .spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn updater(len: usize) -> (BufferUpdater, Arc<SampleCache>, Arc<Mutex<TraceBuffer>>) {
        let cache = Arc::new(SampleCache::new());
        let trace = Arc::new(Mutex::new(TraceBuffer::new(len, 2)));
        let u = BufferUpdater::new(Arc::clone(&cache), Arc::clone(&trace), Duration::from_millis(1), Shutdown::new());
        (u, cache, trace)
    }

    #[test]
    fn test_cycle_ingests_cache() {
        let (u, cache, trace) = updater(4);
        cache.publish(Channel::NorthSouth, 9);
        cache.publish(Channel::UpDown, -3);
        u.cycle();
        cache.publish(Channel::NorthSouth, 10);
        u.cycle();
        let t = trace.lock().unwrap();
        assert_eq!(t.samples(Channel::NorthSouth), &[10, 9, 0, 0]);
        assert_eq!(t.samples(Channel::UpDown), &[-3, -3, 0, 0]);
        assert_eq!(t.mean(Channel::NorthSouth), 19.0 / 4.0);
        assert_eq!(t.cursors(), &[2, 0]);
    }

    #[test]
    fn test_thread_runs_until_shutdown() {
        let (u, cache, trace) = updater(16);
        cache.publish(Channel::EastWest, 4);
        let token = u.shutdown.clone();
        let handle = u.spawn().unwrap();
        thread::sleep(Duration::from_millis(40));
        token.trigger();
        handle.join().unwrap();
        let t = trace.lock().unwrap();
        assert_eq!(t.samples(Channel::EastWest)[0], 4);
    }
}
