/*
 *  display/double_buffer.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  The last completed frame, shared between renderer and compositor
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

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

use super::surface::{ExposeTarget, Surface, SurfaceError};

/// Persistent surface sized to the viewport.
///
/// Publish, expose and resize all go through the one mutex, so a reader
/// only ever sees a whole frame. The viewport is the size of this surface,
/// mirrored in an atomic so it can be read without waiting on the lock.
#[derive(Debug)]
pub struct DoubleBuffer {
    surface: Mutex<Surface>,
    viewport: AtomicU64,
    generation: AtomicU64,
}

#[inline]
fn pack(size: Size) -> u64 {
    (size.width as u64) << 32 | size.height as u64
}

#[inline]
fn unpack(v: u64) -> Size {
    Size::new((v >> 32) as u32, v as u32)
}

impl DoubleBuffer {
    pub fn new(width: u32, height: u32, background: Rgb888) -> Result<Self, SurfaceError> {
        Ok(Self {
            surface: Mutex::new(Surface::create(width, height, background)?),
            viewport: AtomicU64::new(pack(Size::new(width, height))),
            generation: AtomicU64::new(0),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Surface> {
        self.surface.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn viewport(&self) -> Size {
        unpack(self.viewport.load(Ordering::Acquire))
    }

    /// Copy a completed frame in, clipped if the viewport moved under it.
    pub fn publish(&self, frame: &Surface) {
        let mut surface = self.lock();
        surface.paint(frame);
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Reallocate at the new size keeping the overlapping rectangle.
    /// Returns false when the size did not change.
    pub fn resize(&self, width: u32, height: u32) -> Result<bool, SurfaceError> {
        let mut surface = self.lock();
        if surface.size() == Size::new(width, height) {
            return Ok(false);
        }
        let next = surface.resized(width, height)?;
        debug!("double buffer {}x{} -> {}x{}", surface.width(), surface.height(), width, height);
        // old buffer is released here
        *surface = next;
        self.viewport.store(pack(Size::new(width, height)), Ordering::Release);
        Ok(true)
    }

    /// Copy `region` of the last completed frame onto `target`.
    pub fn expose(&self, region: &Rectangle, target: &mut dyn ExposeTarget) -> Rectangle {
        self.lock().copy_region(region, target)
    }

    /// Number of frames published so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Read access for as long as the guard lives. Publishes, exposes and
    /// resizes wait until it is dropped.
    pub fn hold(&self) -> FrameGuard<'_> {
        FrameGuard(self.lock())
    }
}

/// Read-only view of the double buffer, holding its lock.
pub struct FrameGuard<'a>(MutexGuard<'a, Surface>);

impl Deref for FrameGuard<'_> {
    type Target = Surface;

    fn deref(&self) -> &Surface {
        &self.0
    }
}
