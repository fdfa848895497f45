/*
 *  display/compositor.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Window-system facing side of the double buffer
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

use std::sync::Arc;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::info;

use super::double_buffer::DoubleBuffer;
use super::surface::{ExposeTarget, SurfaceError};

/// Services resize and expose events on the main thread.
#[derive(Debug, Clone)]
pub struct Compositor {
    buffer: Arc<DoubleBuffer>,
}

impl Compositor {
    pub fn new(buffer: Arc<DoubleBuffer>) -> Self {
        Self { buffer }
    }

    /// The viewport changed. A render already in flight keeps its own size;
    /// the next tick picks up the new one.
    pub fn on_resize(&self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if self.buffer.resize(width, height)? {
            info!("viewport {}x{}", width, height);
        }
        Ok(())
    }

    /// Copy `region` of the last completed frame to the visible surface.
    pub fn on_expose(&self, region: &Rectangle, target: &mut dyn ExposeTarget) {
        self.buffer.expose(region, target);
    }

    pub fn viewport(&self) -> Size {
        self.buffer.viewport()
    }

    pub fn full_area(&self) -> Rectangle {
        Rectangle::new(Point::zero(), self.viewport())
    }

    pub fn buffer(&self) -> &Arc<DoubleBuffer> {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::surface::{MemorySurface, Surface};
    use embedded_graphics::pixelcolor::Rgb888;

    #[test]
    fn test_resize_then_expose() {
        let db = Arc::new(DoubleBuffer::new(8, 8, Rgb888::WHITE).unwrap());
        let comp = Compositor::new(Arc::clone(&db));

        let mut frame = Surface::create(8, 8, Rgb888::WHITE).unwrap();
        let area = frame.full_area();
        let Ok(()) = frame.fill_solid(&area, Rgb888::GREEN);
        db.publish(&frame);

        comp.on_resize(4, 10).unwrap();
        assert_eq!(comp.viewport(), Size::new(4, 10));

        let mut mem = MemorySurface::new(4, 10, Rgb888::BLACK).unwrap();
        comp.on_expose(&comp.full_area(), &mut mem);
        assert_eq!(mem.pixel(Point::new(3, 7)), Some(Rgb888::GREEN));
        assert_eq!(mem.pixel(Point::new(3, 8)), Some(Rgb888::WHITE));
    }
}
