/*
 *  display/painter.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame composition: bands, rulings, labels, grid and traces
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

use embedded_graphics::{
    mono_font::MonoFont,
    pixelcolor::Rgb888,
    prelude::*,
    primitives::Rectangle,
};

use crate::channel::Channel;
use crate::config::{Config, LayoutConfig};
use crate::constants::LABEL_FONT;
use crate::draw::{draw_arrow, draw_line, draw_polyline, draw_text, fill_horizontal_gradient, fill_rect};
use crate::trace_buffer::TraceBuffer;

use super::color::Palette;
use super::layout::Geometry;

/// Everything the painter needs besides the frame and the trace snapshot.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub layout: LayoutConfig,
    pub palette: Palette,
    pub gain: f64,
    pub reference_lines: usize,
    pub font: &'static MonoFont<'static>,
}

impl RenderSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            layout: cfg.layout.clone(),
            palette: Palette::from(&cfg.palette),
            gain: cfg.trace.gain,
            reference_lines: cfg.trace.reference_lines,
            font: LABEL_FONT,
        }
    }

    pub fn geometry(&self, size: Size, len: usize) -> Geometry {
        Geometry::new(size, self.layout.trace_offset, len, self.gain)
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Static furniture: gutter, both gradient bands, reference lines, labels, divider.
pub fn paint_background<D>(target: &mut D, settings: &RenderSettings) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    let Size { width, height } = target.size();
    let (w, h) = (width as i32, height as i32);
    let l = &settings.layout;
    let p = &settings.palette;

    target.clear(p.background)?;

    fill_rect(target, Rectangle::new(Point::zero(), Size::new(l.label_gutter, height)), p.gutter)?;

    // dark at the divider, fading right
    let left = Rectangle::new(Point::new(l.label_gutter as i32, 0), Size::new(l.gradient_width, height));
    fill_horizontal_gradient(target, left, p.gradient, p.background)?;

    // fading in towards the right edge
    let right = Rectangle::new(Point::new(w - l.gradient_width as i32, 0), Size::new(l.gradient_width, height));
    fill_horizontal_gradient(target, right, p.background, p.gradient)?;

    let geom = settings.geometry(target.size(), 1);
    for i in 0..settings.reference_lines {
        let y = geom.reference_line_y(i, settings.reference_lines).min(h - 1);
        draw_line(target, Point::new(l.label_gutter as i32, y), Point::new(w - 1, y), p.grid, 1)?;
    }

    for ch in Channel::ALL {
        let y = geom.row_center(ch).round() as i32 + l.label_baseline_shift;
        draw_text(target, ch.label(), l.label_x, y, settings.font, p.ink)?;
    }

    let x = l.label_gutter as i32;
    draw_line(target, Point::new(x, 0), Point::new(x, h - 1), p.ink, l.divider_width)?;
    Ok(())
}

/// Moving vertical grid lines, one per cursor.
pub fn paint_grid<D>(target: &mut D, snapshot: &TraceBuffer, settings: &RenderSettings) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    let size = target.size();
    let geom = settings.geometry(size, snapshot.len());
    let bottom = size.height as i32 - 1;
    for &cursor in snapshot.cursors() {
        let x = geom.column_x(cursor);
        draw_line(target, Point::new(x, 0), Point::new(x, bottom), settings.palette.grid, 1)?;
    }
    Ok(())
}

/// One polyline per channel plus the arrow marking its newest sample.
/// `points` is scratch space reused across frames.
pub fn paint_traces<D>(
    target: &mut D,
    snapshot: &TraceBuffer,
    settings: &RenderSettings,
    points: &mut Vec<Point>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    let geom = settings.geometry(target.size(), snapshot.len());
    let l = &settings.layout;
    for ch in Channel::ALL {
        geom.trace_points(ch, snapshot.samples(ch), snapshot.mean(ch), points);
        draw_polyline(target, points, settings.palette.trace(ch), l.trace_stroke)?;

        let newest = snapshot.samples(ch).first().copied().unwrap_or_default();
        let tip = Point::new(l.trace_offset as i32, geom.sample_y(ch, newest, snapshot.mean(ch)));
        draw_arrow(target, tip, l.label_gutter as i32, l.arrow_half_height, settings.palette.ink, l.arrow_stroke)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::surface::Surface;

    fn frame() -> Surface {
        Surface::create(1000, 600, Rgb888::BLACK).unwrap()
    }

    #[test]
    fn test_background_bands() {
        let settings = RenderSettings::default();
        let mut s = frame();
        let Ok(()) = paint_background(&mut s, &settings);
        let p = settings.palette;
        // gutter, away from the labels and the divider
        assert_eq!(s.pixel(Point::new(5, 5)), Some(p.gutter));
        // gradient starts dark right after the divider
        let near = s.pixel(Point::new(110, 5)).unwrap();
        assert!(near.r() < 170);
        // plain middle
        assert_eq!(s.pixel(Point::new(550, 5)), Some(p.background));
        // right band darkens towards the edge
        let edge = s.pixel(Point::new(999, 5)).unwrap();
        assert_eq!(edge, p.gradient);
        // divider
        assert_eq!(s.pixel(Point::new(100, 300)), Some(p.ink));
    }

    #[test]
    fn test_reference_lines_drawn() {
        let settings = RenderSettings::default();
        let mut s = frame();
        let Ok(()) = paint_background(&mut s, &settings);
        // line 1 of 30 on a 600 px frame sits on y = 20
        assert_eq!(s.pixel(Point::new(550, 20)), Some(settings.palette.grid));
        assert_eq!(s.pixel(Point::new(550, 21)), Some(settings.palette.background));
        // last line clamped onto the bottom row
        assert_eq!(s.pixel(Point::new(550, 599)), Some(settings.palette.grid));
    }

    #[test]
    fn test_labels_leave_ink_in_gutter() {
        let settings = RenderSettings::default();
        let mut s = frame();
        let Ok(()) = paint_background(&mut s, &settings);
        for ch in Channel::ALL {
            let center = (2 * ch.index() as i32 + 1) * 100;
            let inked = (center - 10..center + 12).any(|y| {
                (20..60).any(|x| s.pixel(Point::new(x, y)) == Some(settings.palette.ink))
            });
            assert!(inked, "no label ink for {}", ch);
        }
    }

    #[test]
    fn test_grid_at_cursors() {
        let settings = RenderSettings::default();
        let mut s = frame();
        let trace = TraceBuffer::new(500, 10);
        let Ok(()) = paint_grid(&mut s, &trace, &settings);
        // cursor 1 sits at sample 50 -> x = 1.7 * 50 + 150
        assert_eq!(s.pixel(Point::new(235, 300)), Some(settings.palette.grid));
    }

    #[test]
    fn test_flat_trace_on_row_center() {
        let settings = RenderSettings::default();
        let mut s = frame();
        let mut trace = TraceBuffer::new(500, 10);
        for _ in 0..500 {
            trace.update([100, 0, -50]);
        }
        let mut pts = Vec::new();
        let Ok(()) = paint_traces(&mut s, &trace, &settings, &mut pts);
        assert_eq!(s.pixel(Point::new(600, 100)), Some(Rgb888::RED));
        assert_eq!(s.pixel(Point::new(600, 300)), Some(Rgb888::GREEN));
        assert_eq!(s.pixel(Point::new(600, 500)), Some(Rgb888::BLUE));
        // arrow tip
        assert_eq!(s.pixel(Point::new(148, 100)), Some(settings.palette.ink));
    }
}
