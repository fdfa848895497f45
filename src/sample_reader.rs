/*
 *  sample_reader.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Background poller: device events -> sample cache
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
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{info, warn};

use crate::sample_cache::SampleCache;
use crate::sensor::BoxedDevice;
use crate::shutdown::Shutdown;

pub struct SampleReader {
    device: BoxedDevice,
    cache: Arc<SampleCache>,
    idle: Duration,
    shutdown: Shutdown,
    warned: bool,
}

impl SampleReader {
    pub fn new(device: BoxedDevice, cache: Arc<SampleCache>, idle: Duration, shutdown: Shutdown) -> Self {
        Self { device, cache, idle, shutdown, warned: false }
    }

    /// One read attempt. Returns true if a value was published.
    pub fn poll_once(&mut self) -> bool {
        match self.device.read_event_nonblocking() {
            Ok(Some(ev)) => match ev.channel() {
                Some(ch) => {
                    self.cache.publish(ch, ev.value);
                    true
                }
                None => false,
            },
            Ok(None) => false,
            Err(e) => {
                if !self.warned {
                    warn!("{}: {} (still polling)", self.device.name(), e);
                    self.warned = true;
                }
                false
            }
        }
    }

    pub fn run(mut self) {
        info!("sample reader started on {}", self.device.name());
        while !self.shutdown.is_triggered() {
            self.poll_once();
            if self.shutdown.wait_timeout(self.idle) {
                break;
            }
        }
        info!("sample reader stopped");
    }

    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("sample-reader".into())
            .spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::sensor::{AxisEvent, DeviceError, SensorDevice};
    use std::collections::VecDeque;

    /// Plays back a fixed list of reads.
    struct Scripted {
        script: VecDeque<Result<Option<AxisEvent>, DeviceError>>,
    }

    impl SensorDevice for Scripted {
        fn name(&self) -> &str { "scripted" }
        fn axis_count(&self) -> u8 { 4 }
        fn button_count(&self) -> u8 { 1 }
        fn set_raw_mode(&mut self) -> Result<(), DeviceError> { Ok(()) }
        fn read_event_nonblocking(&mut self) -> Result<Option<AxisEvent>, DeviceError> {
            self.script.pop_front().unwrap_or(Ok(None))
        }
    }

    fn reader(script: Vec<Result<Option<AxisEvent>, DeviceError>>) -> (SampleReader, Arc<SampleCache>) {
        let cache = Arc::new(SampleCache::new());
        let dev = Box::new(Scripted { script: script.into() });
        let r = SampleReader::new(dev, Arc::clone(&cache), Duration::from_micros(10), Shutdown::new());
        (r, cache)
    }

    #[test]
    fn test_publishes_axis_events() {
        let (mut r, cache) = reader(vec![
            Ok(Some(AxisEvent { axis: 0, value: 11 })),
            Ok(Some(AxisEvent { axis: 2, value: -7 })),
            Ok(Some(AxisEvent { axis: 0, value: 12 })),
        ]);
        assert!(r.poll_once());
        assert!(r.poll_once());
        assert!(r.poll_once());
        assert_eq!(cache.snapshot(), [12, 0, -7]);
    }

    #[test]
    fn test_idle_and_extra_axes_ignored() {
        let (mut r, cache) = reader(vec![
            Ok(None),
            Ok(Some(AxisEvent { axis: 3, value: 99 })),
        ]);
        assert!(!r.poll_once());
        assert!(!r.poll_once());
        assert_eq!(cache.snapshot(), [0, 0, 0]);
    }

    #[test]
    fn test_read_error_keeps_polling() {
        let gone = || Err(DeviceError::Read(io::Error::from_raw_os_error(libc::ENODEV)));
        let (mut r, cache) = reader(vec![
            gone(),
            gone(),
            Ok(Some(AxisEvent { axis: 1, value: 5 })),
        ]);
        assert!(!r.poll_once());
        assert!(r.warned);
        assert!(!r.poll_once());
        assert!(r.poll_once());
        assert_eq!(cache.read(Channel::EastWest), 5);
    }

    #[test]
    fn test_thread_stops_on_shutdown() {
        let (r, _cache) = reader(vec![]);
        let token = r.shutdown.clone();
        let handle = r.spawn().unwrap();
        thread::sleep(Duration::from_millis(5));
        token.trigger();
        handle.join().unwrap();
    }
}
