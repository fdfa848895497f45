/*
 *  channel.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  The three motion axes the viewer tracks
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

use std::fmt;

/// Number of channels shown on screen.
pub const CHANNEL_COUNT: usize = 3;

/// One scalar motion axis. The discriminant is the device axis index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    NorthSouth = 0,
    EastWest = 1,
    UpDown = 2,
}

impl Channel {
    pub const ALL: [Channel; CHANNEL_COUNT] = [Channel::NorthSouth, Channel::EastWest, Channel::UpDown];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Row label drawn in the gutter
    pub const fn label(self) -> &'static str {
        match self {
            Channel::NorthSouth => "N-S",
            Channel::EastWest => "E-W",
            Channel::UpDown => "U-D",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for ch in Channel::ALL {
            assert_eq!(Channel::from_index(ch.index()), Some(ch));
        }
        assert_eq!(Channel::from_index(3), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Channel::NorthSouth.to_string(), "N-S");
        assert_eq!(Channel::EastWest.label(), "E-W");
        assert_eq!(Channel::UpDown.label(), "U-D");
    }
}
