/*
 *  draw.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Thin drawing helpers over embedded-graphics primitives
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
    mono_font::{MonoFont, MonoTextStyleBuilder},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Line, PrimitiveStyle, PrimitiveStyleBuilder, Polyline, Rectangle},
    text::{Baseline, Text},
};

use crate::display::color::lerp;

pub fn draw_line<D>(
    target: &mut D,
    start: Point,
    end: Point,
    color: Rgb888,
    width: u32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    Line::new(start, end)
        .into_styled(PrimitiveStyleBuilder::new().stroke_width(width).stroke_color(color).build())
        .draw(target)?;
    Ok(())
}

/// Solid fill, no border.
pub fn fill_rect<D>(target: &mut D, region: Rectangle, color: Rgb888) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    target.fill_solid(&region, color)
}

/// Text with its baseline at `y`.
pub fn draw_text<D>(
    target: &mut D,
    text: &str,
    x: i32,
    y: i32,
    font: &MonoFont,
    color: Rgb888,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    Text::with_baseline(
        text,
        Point::new(x, y),
        MonoTextStyleBuilder::new().font(font).text_color(color).build(),
        Baseline::Alphabetic,
    )
    .draw(target)?;
    Ok(())
}

/// Connected open path through `points`.
pub fn draw_polyline<D>(
    target: &mut D,
    points: &[Point],
    color: Rgb888,
    width: u32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    if points.len() < 2 {
        return Ok(());
    }
    Polyline::new(points)
        .into_styled(PrimitiveStyle::with_stroke(color, width))
        .draw(target)?;
    Ok(())
}

/// Column-by-column blend from `left` at the left edge of `region` to `right`
/// at its right edge.
pub fn fill_horizontal_gradient<D>(
    target: &mut D,
    region: Rectangle,
    left: Rgb888,
    right: Rgb888,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let w = region.size.width;
    if w == 0 || region.size.height == 0 {
        return Ok(());
    }
    let span = (w.max(2) - 1) as f32;
    for col in 0..w {
        let column = Rectangle::new(
            region.top_left + Point::new(col as i32, 0),
            Size::new(1, region.size.height),
        );
        target.fill_solid(&column, lerp(left, right, col as f32 / span))?;
    }
    Ok(())
}

/// Open chevron pointing right with its tip at `tip`, arms reaching back to `back_x`.
pub fn draw_arrow<D>(
    target: &mut D,
    tip: Point,
    back_x: i32,
    half_height: i32,
    color: Rgb888,
    width: u32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let arms = [
        Point::new(back_x, tip.y - half_height),
        tip,
        Point::new(back_x, tip.y + half_height),
    ];
    draw_polyline(target, &arms, color, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vframebuf::VarFrameBuf;
    use embedded_graphics::mono_font::ascii::FONT_6X10;

    fn canvas(w: u32, h: u32) -> VarFrameBuf<Rgb888> {
        VarFrameBuf::try_new(w, h, Rgb888::WHITE).unwrap()
    }

    #[test]
    fn test_gradient_ends() {
        let mut fb = canvas(11, 2);
        let Ok(()) = fill_horizontal_gradient(
            &mut fb,
            Rectangle::new(Point::zero(), Size::new(11, 2)),
            Rgb888::BLACK,
            Rgb888::WHITE,
        );
        assert_eq!(fb.pixel(Point::new(0, 1)), Some(Rgb888::BLACK));
        assert_eq!(fb.pixel(Point::new(10, 1)), Some(Rgb888::WHITE));
        let mid = fb.pixel(Point::new(5, 0)).unwrap();
        assert!(mid.r() > 100 && mid.r() < 155);
    }

    #[test]
    fn test_vertical_line() {
        let mut fb = canvas(8, 8);
        let Ok(()) = draw_line(&mut fb, Point::new(3, 0), Point::new(3, 7), Rgb888::BLACK, 1);
        for y in 0..8 {
            assert_eq!(fb.pixel(Point::new(3, y)), Some(Rgb888::BLACK));
        }
        assert_eq!(fb.pixel(Point::new(4, 4)), Some(Rgb888::WHITE));
    }

    #[test]
    fn test_polyline_passes_through_vertices() {
        let mut fb = canvas(20, 20);
        let pts = [Point::new(1, 1), Point::new(10, 10), Point::new(18, 2)];
        let Ok(()) = draw_polyline(&mut fb, &pts, Rgb888::RED, 1);
        for p in pts {
            assert_eq!(fb.pixel(p), Some(Rgb888::RED));
        }
    }

    #[test]
    fn test_single_point_polyline_draws_nothing() {
        let mut fb = canvas(4, 4);
        let Ok(()) = draw_polyline(&mut fb, &[Point::new(1, 1)], Rgb888::RED, 3);
        assert!(fb.as_slice().iter().all(|&c| c == Rgb888::WHITE));
    }

    #[test]
    fn test_text_leaves_ink() {
        let mut fb = canvas(40, 20);
        let Ok(()) = draw_text(&mut fb, "N-S", 2, 12, &FONT_6X10, Rgb888::BLACK);
        assert!(fb.as_slice().iter().any(|&c| c == Rgb888::BLACK));
    }

    #[test]
    fn test_arrow_tip_and_arms() {
        let mut fb = canvas(60, 40);
        let Ok(()) = draw_arrow(&mut fb, Point::new(50, 20), 10, 10, Rgb888::BLACK, 1);
        assert_eq!(fb.pixel(Point::new(50, 20)), Some(Rgb888::BLACK));
        assert_eq!(fb.pixel(Point::new(10, 10)), Some(Rgb888::BLACK));
        assert_eq!(fb.pixel(Point::new(10, 30)), Some(Rgb888::BLACK));
    }
}
