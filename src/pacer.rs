/*
 *  pacer.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed-period tick keeper for the updater, scheduler and headless loop
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

use crate::shutdown::Shutdown;

pub struct Pacer {
    next_deadline: Instant,
    period: Duration,
}

// deadlines advance by whole periods so a slow cycle doesn't drift the rate,
// but once we fall a full period behind we re-anchor rather than burst to catch up
impl Pacer {
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_micros(1));
        Self { next_deadline: Instant::now() + period, period }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    #[inline]
    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Returns true if the deadline has passed; if true, it also schedules the next one.
    #[inline]
    pub fn should_tick(&mut self) -> bool {
        let now = Instant::now();
        if now >= self.next_deadline {
            self.advance(now);
            true
        } else {
            false
        }
    }

    /// Block until the next deadline. Returns false if shutdown tripped first.
    pub fn wait(&mut self, shutdown: &Shutdown) -> bool {
        if shutdown.wait_until(self.next_deadline) {
            return false;
        }
        self.advance(Instant::now());
        true
    }

    fn advance(&mut self, now: Instant) {
        self.next_deadline += self.period;
        if self.next_deadline <= now {
            self.next_deadline = now + self.period;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_due_before_period() {
        let mut pacer = Pacer::from_millis(10_000);
        assert!(!pacer.should_tick());
    }

    #[test]
    fn test_due_after_period() {
        let mut pacer = Pacer::from_millis(5);
        std::thread::sleep(Duration::from_millis(6));
        let before = pacer.next_deadline();
        assert!(pacer.should_tick());
        assert!(pacer.next_deadline() > before);
        assert!(!pacer.should_tick());
    }

    #[test]
    fn test_no_burst_after_stall() {
        let mut pacer = Pacer::from_millis(2);
        std::thread::sleep(Duration::from_millis(20));
        assert!(pacer.should_tick());
        // re-anchored to now + period, so not immediately due again
        assert!(!pacer.should_tick());
    }

    #[test]
    fn test_wait_stops_on_shutdown() {
        let shutdown = Shutdown::new();
        let mut pacer = Pacer::from_millis(1);
        assert!(pacer.wait(&shutdown));
        shutdown.trigger();
        assert!(!pacer.wait(&shutdown));
    }
}
