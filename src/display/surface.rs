/*
 *  display/surface.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Off-screen raster surfaces and the targets they are exposed into
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
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use thiserror::Error;

use crate::vframebuf::VarFrameBuf;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("cannot allocate a {width}x{height} surface: {source}")]
    Allocation {
        width: u32,
        height: u32,
        #[source]
        source: TryReserveError,
    },
}

/// Something a surface region can be copied onto: the window's pixel
/// buffer, an in-memory capture, a test probe.
pub trait ExposeTarget {
    fn size(&self) -> Size;

    /// Write `pixels` starting at (x, y), left to right on one row.
    /// Callers clip to [`ExposeTarget::size`] first.
    fn write_span(&mut self, x: u32, y: u32, pixels: &[Rgb888]);
}

/// Off-screen raster, the unit frames and the double buffer are made of.
#[derive(Debug, Clone)]
pub struct Surface {
    fb: VarFrameBuf<Rgb888>,
    background: Rgb888,
}

impl Surface {
    /// New surface filled with `background`.
    pub fn create(width: u32, height: u32, background: Rgb888) -> Result<Self, SurfaceError> {
        let fb = VarFrameBuf::try_new(width, height, background)
            .map_err(|source| SurfaceError::Allocation { width, height, source })?;
        Ok(Self { fb, background })
    }

    /// New surface of the given size holding this one's overlapping
    /// top-left rectangle; everything else is background.
    pub fn resized(&self, width: u32, height: u32) -> Result<Self, SurfaceError> {
        let mut next = Self::create(width, height, self.background)?;
        next.paint(self);
        Ok(next)
    }

    /// Copy `frame` onto this surface at the origin, clipped to both.
    pub fn paint(&mut self, frame: &Surface) {
        let area = frame.fb.bounds();
        self.fb.copy_area_from(&frame.fb, &area);
    }

    /// Copy `region` onto `target` at the same coordinates. Returns the
    /// rectangle actually written after clipping to both sides.
    pub fn copy_region(&self, region: &Rectangle, target: &mut dyn ExposeTarget) -> Rectangle {
        let target_area = Rectangle::new(Point::zero(), target.size());
        let clip = region.intersection(&self.fb.bounds()).intersection(&target_area);
        if clip.is_zero_sized() {
            return clip;
        }
        let x = clip.top_left.x as usize;
        let w = clip.size.width as usize;
        for y in clip.rows() {
            target.write_span(x as u32, y as u32, self.fb.span(x, y as usize, w));
        }
        clip
    }

    pub fn width(&self) -> u32 {
        self.fb.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.fb.height() as u32
    }

    pub fn background(&self) -> Rgb888 {
        self.background
    }

    pub fn pixel(&self, p: Point) -> Option<Rgb888> {
        self.fb.pixel(p)
    }

    pub fn row(&self, y: u32) -> Option<&[Rgb888]> {
        self.fb.row(y as usize)
    }

    pub fn full_area(&self) -> Rectangle {
        self.fb.bounds()
    }
}

impl OriginDimensions for Surface {
    fn size(&self) -> Size {
        self.fb.size()
    }
}

impl DrawTarget for Surface {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.fb.draw_iter(pixels)
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.fb.fill_contiguous(area, colors)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fb.fill_solid(area, color)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fb.clear(color)
    }
}

/// Window-less expose target. Used by the headless front end and tests.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    fb: VarFrameBuf<Rgb888>,
    fill: Rgb888,
}

impl MemorySurface {
    pub fn new(width: u32, height: u32, fill: Rgb888) -> Result<Self, SurfaceError> {
        let fb = VarFrameBuf::try_new(width, height, fill)
            .map_err(|source| SurfaceError::Allocation { width, height, source })?;
        Ok(Self { fb, fill })
    }

    /// Follow a viewport change; content is discarded.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if self.fb.width() as u32 != width || self.fb.height() as u32 != height {
            *self = Self::new(width, height, self.fill)?;
        }
        Ok(())
    }

    pub fn pixel(&self, p: Point) -> Option<Rgb888> {
        self.fb.pixel(p)
    }

    pub fn row(&self, y: u32) -> Option<&[Rgb888]> {
        self.fb.row(y as usize)
    }

    /// Binary PPM (P6) of the current content.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.fb.width(), self.fb.height())?;
        let mut line = Vec::with_capacity(self.fb.width() * 3);
        for y in 0..self.fb.height() {
            line.clear();
            if let Some(row) = self.fb.row(y) {
                for c in row {
                    line.extend_from_slice(&[c.r(), c.g(), c.b()]);
                }
            }
            out.write_all(&line)?;
        }
        out.flush()
    }

    pub fn save_ppm(&self, path: &Path) -> io::Result<()> {
        self.write_ppm(BufWriter::new(File::create(path)?))
    }
}

impl ExposeTarget for MemorySurface {
    fn size(&self) -> Size {
        self.fb.size()
    }

    fn write_span(&mut self, x: u32, y: u32, pixels: &[Rgb888]) {
        let row = Rectangle::new(Point::new(x as i32, y as i32), Size::new(pixels.len() as u32, 1));
        let Ok(()) = self.fb.fill_contiguous(&row, pixels.iter().copied());
    }
}

/// RGBA8 byte frame as handed out by `pixels::Pixels::frame_mut`.
pub struct RgbaFrame<'a> {
    bytes: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> RgbaFrame<'a> {
    /// Wrap `bytes`; the height is trimmed to what the slice can actually hold.
    pub fn new(bytes: &'a mut [u8], width: u32, height: u32) -> Self {
        let rows = if width == 0 { 0 } else { bytes.len() / (width as usize * 4) };
        Self { bytes, width, height: height.min(rows as u32) }
    }
}

impl ExposeTarget for RgbaFrame<'_> {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn write_span(&mut self, x: u32, y: u32, pixels: &[Rgb888]) {
        if y >= self.height || x >= self.width {
            return;
        }
        let n = pixels.len().min((self.width - x) as usize);
        let start = (y as usize * self.width as usize + x as usize) * 4;
        let dst = &mut self.bytes[start..start + n * 4];
        for (px, c) in dst.chunks_exact_mut(4).zip(pixels) {
            px.copy_from_slice(&[c.r(), c.g(), c.b(), 0xff]);
        }
    }
}
