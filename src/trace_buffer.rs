/*
 *  trace_buffer.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed-length sliding window per channel, rolling mean and grid cursors
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

use crate::channel::{Channel, CHANNEL_COUNT};

/// Sliding window of the last `len` samples of every channel.
///
/// Index 0 is the newest sample. The buffer itself is not synchronized; the
/// pipeline keeps it behind a `Mutex` and the updater holds that lock for a
/// whole [`TraceBuffer::update`], so readers never see a half shifted window.
#[derive(Debug)]
pub struct TraceBuffer {
    samples: [Vec<i32>; CHANNEL_COUNT],
    means: [f64; CHANNEL_COUNT],
    cursors: Vec<usize>,
    len: usize,
}

impl TraceBuffer {
    /// Zero-filled window of `len` samples with `grid_lines` cursors spread
    /// evenly across it.
    pub fn new(len: usize, grid_lines: usize) -> Self {
        let len = len.max(1);
        Self {
            samples: std::array::from_fn(|_| vec![0; len]),
            means: [0.0; CHANNEL_COUNT],
            cursors: (0..grid_lines).map(|k| k * len / grid_lines.max(1)).collect(),
            len,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn samples(&self, channel: Channel) -> &[i32] {
        &self.samples[channel.index()]
    }

    pub fn mean(&self, channel: Channel) -> f64 {
        self.means[channel.index()]
    }

    pub fn cursors(&self) -> &[usize] {
        &self.cursors
    }

    /// One updater cycle: shift every channel, take `latest` at the front,
    /// recompute means, advance cursors.
    pub fn update(&mut self, latest: [i32; CHANNEL_COUNT]) {
        for ch in Channel::ALL {
            self.shift_in(ch, latest[ch.index()]);
        }
        self.recompute_means();
        self.advance_cursors();
    }

    /// `sample[i] <- sample[i-1]` for i = len-1..1, then `sample[0] <- value`.
    pub fn shift_in(&mut self, channel: Channel, value: i32) {
        let window = &mut self.samples[channel.index()];
        window.copy_within(0..self.len - 1, 1);
        window[0] = value;
    }

    pub fn recompute_means(&mut self) {
        for ch in Channel::ALL {
            let sum: i64 = self.samples[ch.index()].iter().map(|&s| s as i64).sum();
            self.means[ch.index()] = sum as f64 / self.len as f64;
        }
    }

    pub fn advance_cursors(&mut self) {
        let len = self.len;
        for c in self.cursors.iter_mut() {
            *c = (*c + 1) % len;
        }
    }
}

// Manual impl so the renderer's snapshot reuses its allocations every frame.
impl Clone for TraceBuffer {
    fn clone(&self) -> Self {
        Self {
            samples: self.samples.clone(),
            means: self.means,
            cursors: self.cursors.clone(),
            len: self.len,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        for (dst, src) in self.samples.iter_mut().zip(source.samples.iter()) {
            dst.clone_from(src);
        }
        self.means = source.means;
        self.cursors.clone_from(&source.cursors);
        self.len = source.len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_zeroed() {
        let buf = TraceBuffer::new(8, 2);
        for ch in Channel::ALL {
            assert_eq!(buf.samples(ch), &[0; 8]);
            assert_eq!(buf.mean(ch), 0.0);
        }
    }

    #[test]
    fn test_shift_invariant() {
        let mut buf = TraceBuffer::new(5, 1);
        for v in 1..=3 {
            buf.update([v, 10 * v, -v]);
        }
        let before: Vec<i32> = buf.samples(Channel::EastWest).to_vec();
        buf.update([4, 40, -4]);
        let after = buf.samples(Channel::EastWest);
        assert_eq!(after[0], 40);
        assert_eq!(&after[1..], &before[..4]);
        assert_eq!(buf.samples(Channel::NorthSouth), &[4, 3, 2, 1, 0]);
        assert_eq!(buf.samples(Channel::UpDown), &[-4, -3, -2, -1, 0]);
    }

    #[test]
    fn test_mean_matches_contents() {
        let mut buf = TraceBuffer::new(4, 1);
        for v in [3, 5, 8, 13, 21] {
            buf.update([v, 0, v * 2]);
        }
        // window now holds 21, 13, 8, 5
        assert_eq!(buf.mean(Channel::NorthSouth), 47.0 / 4.0);
        assert_eq!(buf.mean(Channel::UpDown), 94.0 / 4.0);
        assert_eq!(buf.mean(Channel::EastWest), 0.0);
    }

    #[test]
    fn test_mean_no_overflow() {
        let mut buf = TraceBuffer::new(3, 1);
        for _ in 0..3 {
            buf.update([i32::MAX, i32::MIN, 0]);
        }
        assert_eq!(buf.mean(Channel::NorthSouth), i32::MAX as f64);
        assert_eq!(buf.mean(Channel::EastWest), i32::MIN as f64);
    }

    #[test]
    fn test_cursors_spread_and_in_range() {
        let buf = TraceBuffer::new(500, 10);
        assert_eq!(buf.cursors(), &[0, 50, 100, 150, 200, 250, 300, 350, 400, 450]);

        let buf = TraceBuffer::new(7, 3);
        assert!(buf.cursors().iter().all(|&c| c < 7));
    }

    #[test]
    fn test_cursors_wrap() {
        let mut buf = TraceBuffer::new(4, 2);
        assert_eq!(buf.cursors(), &[0, 2]);
        for _ in 0..3 {
            buf.update([0; CHANNEL_COUNT]);
        }
        assert_eq!(buf.cursors(), &[3, 1]);
        buf.update([0; CHANNEL_COUNT]);
        assert_eq!(buf.cursors(), &[0, 2]);
    }

    #[test]
    fn test_clone_from_copies_everything() {
        let mut live = TraceBuffer::new(6, 3);
        for v in 0..4 {
            live.update([v, v + 1, v + 2]);
        }
        let mut snap = TraceBuffer::new(6, 3);
        snap.clone_from(&live);
        for ch in Channel::ALL {
            assert_eq!(snap.samples(ch), live.samples(ch));
            assert_eq!(snap.mean(ch), live.mean(ch));
        }
        assert_eq!(snap.cursors(), live.cursors());
    }
}
