/*
 *  display/layout.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Sample -> pixel mapping for one frame
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

use embedded_graphics::prelude::*;

use crate::channel::{Channel, CHANNEL_COUNT};

/// Frame geometry, fixed for the duration of one render.
///
/// Columns: `x = scale_x * i + x_offset` with `scale_x = (width - x_offset) / len`,
/// never negative, so a viewport narrower than the offset stacks every
/// sample on the offset column.
///
/// Rows: channel `c` is centered at `(2c + 1) * height / 6` and a sample
/// is drawn `(sample - mean) / gain` pixels below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub x_offset: u32,
    pub len: usize,
    pub gain: f64,
}

impl Geometry {
    pub fn new(size: Size, x_offset: u32, len: usize, gain: f64) -> Self {
        Self { width: size.width, height: size.height, x_offset, len, gain }
    }

    pub fn scale_x(&self) -> f64 {
        let usable = self.width as f64 - self.x_offset as f64;
        (usable / self.len.max(1) as f64).max(0.0)
    }

    #[inline]
    pub fn column_x(&self, index: usize) -> i32 {
        (self.scale_x() * index as f64 + self.x_offset as f64).round() as i32
    }

    pub fn row_center(&self, channel: Channel) -> f64 {
        (2 * channel.index() + 1) as f64 * self.height as f64 / (2 * CHANNEL_COUNT) as f64
    }

    pub fn sample_y(&self, channel: Channel, sample: i32, mean: f64) -> i32 {
        let y = (sample as f64 - mean) / self.gain + self.row_center(channel);
        // keep wild readings in a range the line rasterizer handles cheaply
        let h = self.height as f64;
        y.clamp(-h, 2.0 * h).round() as i32
    }

    /// Horizontal reference line `index` of `count`, spread over the full height.
    pub fn reference_line_y(&self, index: usize, count: usize) -> i32 {
        (index as u64 * self.height as u64 / (count.max(2) - 1) as u64) as i32
    }

    /// Polyline vertices for one channel, written into `out` (cleared first).
    pub fn trace_points(&self, channel: Channel, samples: &[i32], mean: f64, out: &mut Vec<Point>) {
        out.clear();
        out.extend(
            samples
                .iter()
                .enumerate()
                .map(|(i, &s)| Point::new(self.column_x(i), self.sample_y(channel, s, mean))),
        );
    }
}
