/*
 *  display/error.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Errors surfaced by the window and headless front ends
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

use std::io;

use thiserror::Error;

use super::surface::SurfaceError;

/// Unified error type for the front ends
#[derive(Debug, Error)]
pub enum FrontEndError {
    /// Viewport (re)allocation failed
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// Renderer thread could not be started
    #[error("cannot start frame renderer: {0}")]
    Spawn(#[from] io::Error),

    #[cfg(feature = "window")]
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[cfg(feature = "window")]
    #[error("pixel surface error: {0}")]
    Pixels(#[from] pixels::Error),

    #[cfg(feature = "window")]
    #[error("pixel buffer resize failed: {0}")]
    Texture(#[from] pixels::TextureError),
}
