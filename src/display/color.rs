/*
 *  display/color.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Resolved drawing palette
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

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

use crate::channel::{Channel, CHANNEL_COUNT};
use crate::config::PaletteConfig;

#[inline]
pub const fn rgb(c: [u8; 3]) -> Rgb888 {
    Rgb888::new(c[0], c[1], c[2])
}

/// Linear blend, `t` = 0 gives `from`, 1 gives `to`.
pub fn lerp(from: Rgb888, to: Rgb888, t: f32) -> Rgb888 {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Rgb888::new(mix(from.r(), to.r()), mix(from.g(), to.g()), mix(from.b(), to.b()))
}

/// Palette with every entry already converted to the raster format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb888,
    pub gutter: Rgb888,
    /// dark end of both gradient bands, the light end is `background`
    pub gradient: Rgb888,
    pub grid: Rgb888,
    /// labels, divider and arrows
    pub ink: Rgb888,
    pub traces: [Rgb888; CHANNEL_COUNT],
}

impl Palette {
    #[inline]
    pub fn trace(&self, channel: Channel) -> Rgb888 {
        self.traces[channel.index()]
    }
}

impl From<&PaletteConfig> for Palette {
    fn from(cfg: &PaletteConfig) -> Self {
        Self {
            background: rgb(cfg.background),
            gutter: rgb(cfg.gutter),
            gradient: rgb(cfg.gradient),
            grid: rgb(cfg.grid),
            ink: rgb(cfg.ink),
            traces: cfg.traces.map(rgb),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from(&PaletteConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_ends_and_middle() {
        let a = Rgb888::new(0, 100, 200);
        let b = Rgb888::new(200, 100, 0);
        assert_eq!(lerp(a, b, 0.0), a);
        assert_eq!(lerp(a, b, 1.0), b);
        assert_eq!(lerp(a, b, 0.5), Rgb888::new(100, 100, 100));
        assert_eq!(lerp(a, b, 7.0), b);
    }

    #[test]
    fn test_default_palette() {
        let p = Palette::default();
        assert_eq!(p.background, Rgb888::WHITE);
        assert_eq!(p.trace(Channel::NorthSouth), Rgb888::RED);
        assert_eq!(p.trace(Channel::EastWest), Rgb888::GREEN);
        assert_eq!(p.trace(Channel::UpDown), Rgb888::BLUE);
    }
}
