/*
 *  vframebuf.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime-sized raster backing every off-screen surface
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

use core::convert::Infallible;
use std::collections::TryReserveError;

use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A runtime-sized framebuffer for embedded-graphics.
#[derive(Debug, Clone)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor> VarFrameBuf<C> {
    /// Allocate `width * height` pixels, reporting failure instead of aborting.
    pub fn try_new(width: u32, height: u32, fill: C) -> Result<Self, TryReserveError> {
        let (w, h) = (width as usize, height as usize);
        let n = w.saturating_mul(h);
        let mut buf = Vec::new();
        buf.try_reserve_exact(n)?;
        buf.resize(n, fill);
        Ok(Self { buf, w, h })
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Clear to a color
    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    pub fn pixel(&self, p: Point) -> Option<C> {
        self.idx(p).map(|i| self.buf[i])
    }

    /// One full row, None below the last row
    pub fn row(&self, y: usize) -> Option<&[C]> {
        if y < self.h {
            Some(&self.buf[y * self.w..(y + 1) * self.w])
        } else {
            None
        }
    }

    /// Part of a row, clipped to the buffer
    pub fn span(&self, x: usize, y: usize, len: usize) -> &[C] {
        match self.row(y) {
            Some(row) if x < self.w => &row[x..(x + len).min(self.w)],
            _ => &[],
        }
    }

    /// Buffer bounds as a rectangle at the origin
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::zero(), OriginDimensions::size(self))
    }

    /// Copy `area` from `src` into the same coordinates here, clipped to both.
    pub fn copy_area_from(&mut self, src: &Self, area: &Rectangle) {
        let clip = area.intersection(&self.bounds()).intersection(&src.bounds());
        if clip.is_zero_sized() {
            return;
        }
        let x0 = clip.top_left.x as usize;
        let w = clip.size.width as usize;
        for y in clip.rows() {
            let y = y as usize;
            let s = y * src.w + x0;
            let d = y * self.w + x0;
            self.buf[d..d + w].copy_from_slice(&src.buf[s..s + w]);
        }
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // colors run row-major over the unclipped area; skip the parts outside the buffer
        let Size { width, height } = area.size;
        if width == 0 || height == 0 { return Ok(()); }

        let mut it = colors.into_iter();
        for p in area.points() {
            let Some(c) = it.next() else { return Ok(()) };
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clip = area.intersection(&self.bounds());
        if clip.is_zero_sized() { return Ok(()); }
        let x0 = clip.top_left.x as usize;
        let w = clip.size.width as usize;
        for y in clip.rows() {
            let base = y as usize * self.w + x0;
            self.buf[base..base + w].fill(color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::Rgb888;

    #[test]
    fn test_fill_solid_clips() {
        let mut fb = VarFrameBuf::try_new(4, 3, Rgb888::BLACK).unwrap();
        let Ok(()) = fb.fill_solid(&Rectangle::new(Point::new(2, 1), Size::new(10, 10)), Rgb888::RED);
        assert_eq!(fb.row(0).unwrap(), &[Rgb888::BLACK; 4]);
        assert_eq!(fb.row(1).unwrap(), &[Rgb888::BLACK, Rgb888::BLACK, Rgb888::RED, Rgb888::RED]);
        assert_eq!(fb.pixel(Point::new(3, 2)), Some(Rgb888::RED));
        assert_eq!(fb.pixel(Point::new(4, 2)), None);
    }

    #[test]
    fn test_fill_contiguous_negative_origin() {
        let mut fb = VarFrameBuf::try_new(3, 3, Rgb888::BLACK).unwrap();
        let area = Rectangle::new(Point::new(-1, -1), Size::new(2, 2));
        let colors = [Rgb888::RED, Rgb888::GREEN, Rgb888::BLUE, Rgb888::WHITE];
        let Ok(()) = fb.fill_contiguous(&area, colors);
        // only the bottom-right color of the 2x2 block lands inside
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(Rgb888::WHITE));
        assert_eq!(fb.pixel(Point::new(1, 0)), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_copy_area_clips_to_both() {
        let mut big = VarFrameBuf::try_new(6, 4, Rgb888::BLACK).unwrap();
        let small = VarFrameBuf::try_new(3, 2, Rgb888::GREEN).unwrap();
        big.copy_area_from(&small, &big.bounds());
        assert_eq!(big.span(0, 0, 6), &[
            Rgb888::GREEN, Rgb888::GREEN, Rgb888::GREEN,
            Rgb888::BLACK, Rgb888::BLACK, Rgb888::BLACK,
        ]);
        assert_eq!(big.pixel(Point::new(0, 2)), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_span_clipped() {
        let fb = VarFrameBuf::try_new(4, 2, Rgb888::BLUE).unwrap();
        assert_eq!(fb.span(2, 1, 10).len(), 2);
        assert!(fb.span(5, 1, 1).is_empty());
        assert!(fb.span(0, 2, 1).is_empty());
    }

    #[test]
    fn test_absurd_size_fails_cleanly() {
        assert!(VarFrameBuf::try_new(u32::MAX, u32::MAX, Rgb888::BLACK).is_err());
    }
}
