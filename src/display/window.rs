/*
 *  display/window.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Desktop window: winit event loop driving the scheduler, pixels presenting
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

use std::rc::Rc;

use embedded_graphics::primitives::Rectangle;
use log::{debug, error, info};
use pixels::{Pixels, SurfaceTexture};
use winit::{
    dpi::PhysicalSize,
    event::{Event, VirtualKeyCode},
    event_loop::{ControlFlow, EventLoop},
    platform::run_return::EventLoopExtRunReturn,
    window::WindowBuilder,
};
use winit_input_helper::WinitInputHelper;

use crate::config::Config;
use crate::pacer::Pacer;
use crate::pipeline::Pipeline;
use crate::scheduler::RunSummary;

use super::error::FrontEndError;
use super::surface::RgbaFrame;

/// Open the window and run the event loop on the calling thread until the
/// window closes or the shutdown token trips. The renderer is joined before
/// this returns.
pub fn run(pipeline: &Pipeline, cfg: &Config) -> Result<RunSummary, FrontEndError> {
    let mut event_loop = EventLoop::new();
    let mut input = WinitInputHelper::new();

    // PhysicalSize so the pixel grid matches the configured viewport
    let window = WindowBuilder::new()
        .with_title(cfg.viewport.title.as_str())
        .with_inner_size(PhysicalSize::new(cfg.viewport.width, cfg.viewport.height))
        .with_resizable(true)
        .build(&event_loop)?;
    let window = Rc::new(window);

    let inner = window.inner_size();
    let (mut buf_w, mut buf_h) = (inner.width.max(1), inner.height.max(1));
    let surface_texture = SurfaceTexture::new(buf_w, buf_h, &*window);
    let mut pixels = Pixels::new(buf_w, buf_h, surface_texture)?;

    let compositor = pipeline.compositor();
    compositor.on_resize(buf_w, buf_h)?;

    let redraw_window = Rc::clone(&window);
    let mut scheduler = pipeline.scheduler(move |_area: Rectangle| redraw_window.request_redraw());
    let shutdown = pipeline.shutdown_token();
    let mut pacer = Pacer::new(cfg.timing.render_tick());
    let mut failure: Option<FrontEndError> = None;

    info!("window {}x{} \"{}\"", buf_w, buf_h, cfg.viewport.title);

    event_loop.run_return(|event, _, control_flow| {
        if shutdown.is_triggered() {
            *control_flow = ControlFlow::Exit;
            return;
        }

        match &event {
            Event::NewEvents(_) => {
                if pacer.should_tick() {
                    if let Err(e) = scheduler.tick() {
                        error!("scheduler: {}", e);
                        failure = Some(e.into());
                        shutdown.trigger();
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                }
            }
            Event::RedrawRequested(_) => {
                let region = compositor.full_area();
                let mut frame = RgbaFrame::new(pixels.frame_mut(), buf_w, buf_h);
                compositor.on_expose(&region, &mut frame);
                if let Err(e) = pixels.render() {
                    error!("pixels.render() failed: {}", e);
                    failure = Some(e.into());
                    shutdown.trigger();
                    *control_flow = ControlFlow::Exit;
                    return;
                }
            }
            _ => {}
        }

        if input.update(&event) {
            if input.key_pressed(VirtualKeyCode::Escape)
                || input.key_pressed(VirtualKeyCode::Q)
                || input.close_requested()
                || input.destroyed()
            {
                info!("window closed");
                shutdown.trigger();
                *control_flow = ControlFlow::Exit;
                return;
            }

            if let Some(size) = input.window_resized() {
                // minimised windows report 0x0
                if size.width > 0 && size.height > 0 && (size.width, size.height) != (buf_w, buf_h) {
                    debug!("resize {}x{} -> {}x{}", buf_w, buf_h, size.width, size.height);
                    let resized = pixels
                        .resize_surface(size.width, size.height)
                        .and_then(|_| pixels.resize_buffer(size.width, size.height))
                        .map_err(FrontEndError::from)
                        .and_then(|_| compositor.on_resize(size.width, size.height).map_err(FrontEndError::from));
                    match resized {
                        Ok(()) => {
                            buf_w = size.width;
                            buf_h = size.height;
                            window.request_redraw();
                        }
                        Err(e) => {
                            error!("resize failed: {}", e);
                            failure = Some(e);
                            shutdown.trigger();
                            *control_flow = ControlFlow::Exit;
                            return;
                        }
                    }
                }
            }
        }

        *control_flow = ControlFlow::WaitUntil(pacer.next_deadline());
    });

    scheduler.shutdown();
    let summary = scheduler.summary();
    match failure {
        Some(e) => Err(e),
        None => Ok(summary),
    }
}
