/*
 *  sample_cache.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Latest raw reading per channel, single writer / many readers, no lock
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

use std::sync::atomic::{AtomicI32, Ordering};

use crate::channel::{Channel, CHANNEL_COUNT};

/// Holds the most recent value published for each channel.
///
/// Only the sample reader writes; the buffer updater reads. Relaxed
/// ordering is enough: a read may lag the last write by one cycle and
/// nothing else is published alongside the value.
#[derive(Debug, Default)]
pub struct SampleCache {
    latest: [AtomicI32; CHANNEL_COUNT],
}

impl SampleCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn publish(&self, channel: Channel, value: i32) {
        self.latest[channel.index()].store(value, Ordering::Relaxed);
    }

    /// Last published value, zero until the first publish.
    #[inline]
    pub fn read(&self, channel: Channel) -> i32 {
        self.latest[channel.index()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> [i32; CHANNEL_COUNT] {
        Channel::ALL.map(|ch| self.read(ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_defaults_to_zero() {
        let cache = SampleCache::new();
        assert_eq!(cache.snapshot(), [0, 0, 0]);
    }

    #[test]
    fn test_last_write_wins() {
        let cache = SampleCache::new();
        cache.publish(Channel::EastWest, 12);
        cache.publish(Channel::EastWest, -340);
        assert_eq!(cache.read(Channel::EastWest), -340);
        assert_eq!(cache.read(Channel::NorthSouth), 0);
        assert_eq!(cache.read(Channel::UpDown), 0);
    }

    #[test]
    fn test_visible_across_threads() {
        let cache = Arc::new(SampleCache::new());
        let writer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for v in 0..=1000 {
                    cache.publish(Channel::UpDown, v);
                }
            })
        };
        writer.join().unwrap();
        assert_eq!(cache.read(Channel::UpDown), 1000);
    }
}
