/*
 *  sensor/synthetic.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Seeded motion generator standing in for a real sensor (--simulate)
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

use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{AxisEvent, DeviceError, SensorDevice};
use crate::channel::CHANNEL_COUNT;

const NAME: &str = "Synthetic MEMS sensor";

/// Time between two consecutive axis reports.
const EVENT_INTERVAL: Duration = Duration::from_micros(400);

// per axis: resting offset (gravity on U-D), swing, period in reports
const OFFSET: [f64; CHANNEL_COUNT] = [0.0, 0.0, 8_000.0];
const SWING: [f64; CHANNEL_COUNT] = [3_000.0, 2_000.0, 1_500.0];
const PERIOD: [f64; CHANNEL_COUNT] = [2_100.0, 3_300.0, 1_350.0];
const NOISE: i32 = 60;

pub struct SyntheticDevice {
    rng: StdRng,
    seed: u64,
    step: u64,
    next_axis: usize,
    interval: Duration,
    next_due: Instant,
}

impl SyntheticDevice {
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            step: 0,
            next_axis: 0,
            interval: EVENT_INTERVAL,
            next_due: Instant::now(),
        }
    }

    /// Report as fast as polled (tests).
    pub fn unthrottled(mut self) -> Self {
        self.interval = Duration::ZERO;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn sample(&mut self, axis: usize) -> i32 {
        let phase = TAU * (self.step as f64) / PERIOD[axis];
        let clean = OFFSET[axis] + SWING[axis] * phase.sin();
        let noisy = clean.round() as i32 + self.rng.random_range(-NOISE..=NOISE);
        noisy.clamp(i16::MIN as i32, i16::MAX as i32)
    }
}

impl Default for SyntheticDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorDevice for SyntheticDevice {
    fn name(&self) -> &str {
        NAME
    }

    fn axis_count(&self) -> u8 {
        CHANNEL_COUNT as u8
    }

    fn button_count(&self) -> u8 {
        0
    }

    fn set_raw_mode(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn read_event_nonblocking(&mut self) -> Result<Option<AxisEvent>, DeviceError> {
        if !self.interval.is_zero() {
            let now = Instant::now();
            if now < self.next_due {
                return Ok(None);
            }
            self.next_due = now + self.interval;
        }

        let axis = self.next_axis;
        let value = self.sample(axis);
        self.next_axis = (axis + 1) % CHANNEL_COUNT;
        if self.next_axis == 0 {
            self.step += 1;
        }
        Ok(Some(AxisEvent { axis: axis as u8, value }))
    }
}
