/*
 *  display/mod.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem: off-screen rendering, double buffer, front ends
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

pub mod color;
pub mod error;
pub mod layout;
pub mod surface;

// frame production
pub mod painter;
pub mod renderer;

// presentation
pub mod compositor;
pub mod double_buffer;

// front ends
pub mod headless;
#[cfg(feature = "window")]
pub mod window;

// Re-exports for convenience
pub use color::Palette;
pub use compositor::Compositor;
pub use double_buffer::DoubleBuffer;
pub use error::FrontEndError;
pub use layout::Geometry;
pub use painter::RenderSettings;
pub use renderer::{FrameRenderer, RenderHandle, RenderStats};
pub use surface::{ExposeTarget, MemorySurface, RgbaFrame, Surface, SurfaceError};
