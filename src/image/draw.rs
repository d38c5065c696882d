//! Drawing API for [`Image`]s.
//!
//! This module contains a collection of freestanding functions that draw shapes onto an
//! [`Image`]. All functions return a *guard object* that allows optional customization of the
//! shape and performs the draw operation when dropped.
//!
//! Unlike plain pixel writes, all drawing operations *alpha-blend* the shape color onto the target,
//! so translucent colors let the underlying pixels show through.
//!
//! # A Note on Pixel Coordinates
//!
//! Coordinates are [`f32`] pixel positions. A pixel at `(x, y)` covers the area from `(x, y)` to
//! `(x + 1, y + 1)`, and filled shapes only write to pixels whose *center* they cover.

use std::{convert::Infallible, thread};

use embedded_graphics::{
    draw_target::DrawTarget,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
};
use itertools::Itertools;
use nalgebra::Point2;

use super::{rect::center_range, Color, Image, Outline};

/// Guard returned by [`line`][line()]; draws the line when dropped and allows customization.
pub struct DrawLine<'a> {
    image: &'a mut Image,
    start: Point2<f32>,
    end: Point2<f32>,
    color: Color,
    stroke_width: f32,
    dash: Option<[f32; 2]>,
}

impl DrawLine<'_> {
    /// Sets the line's color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the line's stroke width.
    ///
    /// By default, a stroke width of 1 is used. Fractional widths are rounded to whole pixels.
    pub fn stroke_width(&mut self, width: f32) -> &mut Self {
        self.stroke_width = width;
        self
    }

    /// Draws the line as a dash pattern of `on` pixels drawn followed by `off` pixels skipped.
    pub fn dash(&mut self, on: f32, off: f32) -> &mut Self {
        self.dash = Some([on, off]);
        self
    }
}

impl Drop for DrawLine<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            return;
        }

        match self.dash {
            Some([on, off]) if on > 0.0 && off >= 0.0 => {
                for (start, end) in dashes(self.start, self.end, on, off) {
                    stroke_segment(self.image, start, end, self.color, self.stroke_width);
                }
            }
            _ => stroke_segment(
                self.image,
                self.start,
                self.end,
                self.color,
                self.stroke_width,
            ),
        }
    }
}

/// Guard returned by [`fill`]; fills the outline when dropped and allows customization.
pub struct DrawFill<'a> {
    image: &'a mut Image,
    outline: &'a Outline,
    color: Color,
}

impl DrawFill<'_> {
    /// Sets the fill color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }
}

impl Drop for DrawFill<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            return;
        }
        fill_polygon(self.image, self.outline.points(), self.color);
    }
}

/// Guard returned by [`stroke`]; traces the outline when dropped and allows customization.
pub struct DrawStroke<'a> {
    image: &'a mut Image,
    outline: &'a Outline,
    color: Color,
    stroke_width: f32,
}

impl DrawStroke<'_> {
    /// Sets the stroke color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the stroke width.
    ///
    /// By default, a stroke width of 1 is used. Fractional widths are rounded to whole pixels.
    pub fn stroke_width(&mut self, width: f32) -> &mut Self {
        self.stroke_width = width;
        self
    }
}

impl Drop for DrawStroke<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            return;
        }
        for (start, end) in self.outline.segments() {
            stroke_segment(self.image, start, end, self.color, self.stroke_width);
        }
    }
}

/// Draws a line onto an image.
pub fn line(image: &mut Image, start: Point2<f32>, end: Point2<f32>) -> DrawLine<'_> {
    DrawLine {
        image,
        start,
        end,
        color: Color::BLUE,
        stroke_width: 1.0,
        dash: None,
    }
}

/// Fills the area enclosed by an [`Outline`], using the non-zero winding rule.
///
/// Open outlines are filled as if they were closed.
pub fn fill<'a>(image: &'a mut Image, outline: &'a Outline) -> DrawFill<'a> {
    DrawFill {
        image,
        outline,
        color: Color::RED,
    }
}

/// Traces the segments of an [`Outline`].
pub fn stroke<'a>(image: &'a mut Image, outline: &'a Outline) -> DrawStroke<'a> {
    DrawStroke {
        image,
        outline,
        color: Color::RED,
        stroke_width: 1.0,
    }
}

fn stroke_segment(
    image: &mut Image,
    start: Point2<f32>,
    end: Point2<f32>,
    color: Color,
    stroke_width: f32,
) {
    let stroke_width = stroke_width.round().max(1.0) as u32;
    let margin = stroke_width as f32;
    let Some((start, end)) = clip_segment(
        start,
        end,
        [-margin, -margin],
        [image.width() as f32 + margin, image.height() as f32 + margin],
    ) else {
        return;
    };

    let to_point = |p: Point2<f32>| Point::new(p.x.round() as i32, p.y.round() as i32);
    match Line::new(to_point(start), to_point(end))
        .into_styled(PrimitiveStyle::with_stroke(color, stroke_width))
        .draw(&mut Target(image))
    {
        Ok(()) => {}
        Err(infallible) => match infallible {},
    }
}

/// Splits the line from `start` to `end` into the sub-segments that are drawn by a dash pattern.
fn dashes(
    start: Point2<f32>,
    end: Point2<f32>,
    on: f32,
    off: f32,
) -> impl Iterator<Item = (Point2<f32>, Point2<f32>)> {
    let length = nalgebra::distance(&start, &end);
    let dir = if length > 0.0 {
        (end - start) / length
    } else {
        (end - start) * 0.0
    };
    let period = on + off;
    let count = if length.is_finite() {
        (length / period).ceil() as usize
    } else {
        0
    };
    (0..count).map(move |i| {
        let a = i as f32 * period;
        let b = (a + on).min(length);
        (start + dir * a, start + dir * b)
    })
}

/// Clips a line segment to an axis-aligned box (Liang–Barsky).
///
/// Returns `None` if no part of the segment lies inside the box.
fn clip_segment(
    start: Point2<f32>,
    end: Point2<f32>,
    min: [f32; 2],
    max: [f32; 2],
) -> Option<(Point2<f32>, Point2<f32>)> {
    if !(start.coords.iter().chain(end.coords.iter())).all(|v| v.is_finite()) {
        return None;
    }

    let delta = end - start;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for axis in 0..2 {
        for (p, q) in [
            (-delta[axis], start[axis] - min[axis]),
            (delta[axis], max[axis] - start[axis]),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    t0 = t0.max(r);
                } else {
                    t1 = t1.min(r);
                }
            }
        }
    }

    if t0 > t1 {
        return None;
    }
    Some((start + delta * t0, start + delta * t1))
}

/// Scanline-fills a polygon using the non-zero winding rule.
fn fill_polygon(image: &mut Image, points: &[Point2<f32>], color: Color) {
    if points.len() < 3 || !points.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
        return;
    }

    let (min_y, max_y) = points
        .iter()
        .map(|p| p.y)
        .minmax()
        .into_option()
        .unwrap_or((0.0, 0.0));

    let mut crossings: Vec<(f32, i32)> = Vec::new();
    for py in center_range(min_y, max_y, image.height()) {
        let sy = py as f32 + 0.5;

        crossings.clear();
        for (a, b) in points.iter().circular_tuple_windows() {
            let upward = a.y <= sy && b.y > sy;
            let downward = b.y <= sy && a.y > sy;
            if upward || downward {
                let t = (sy - a.y) / (b.y - a.y);
                crossings.push((a.x + t * (b.x - a.x), if upward { 1 } else { -1 }));
            }
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = 0;
        for (&(x0, dir), &(x1, _)) in crossings.iter().tuple_windows() {
            winding += dir;
            if winding != 0 {
                for px in center_range(x0, x1, image.width()) {
                    image.blend_pixel(i64::from(px), i64::from(py), color);
                }
            }
        }
    }
}

struct Target<'a>(&'a mut Image);

impl Dimensions for Target<'_> {
    fn bounding_box(&self) -> Rectangle {
        let (width, height) = (self.0.width(), self.0.height());

        Rectangle {
            top_left: Point { x: 0, y: 0 },
            size: Size { width, height },
        }
    }
}

impl DrawTarget for Target<'_> {
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.0
                .blend_pixel(i64::from(point.x), i64::from(point.y), color);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_segment_inside_is_unchanged() {
        let (a, b) = (Point2::new(1.0, 1.0), Point2::new(5.0, 3.0));
        assert_eq!(clip_segment(a, b, [0.0, 0.0], [10.0, 10.0]), Some((a, b)));
    }

    #[test]
    fn clip_segment_outside_is_rejected() {
        let (a, b) = (Point2::new(-5.0, -5.0), Point2::new(-1.0, 20.0));
        assert_eq!(clip_segment(a, b, [0.0, 0.0], [10.0, 10.0]), None);
    }

    #[test]
    fn clip_segment_far_away_endpoint() {
        let (a, b) = (Point2::new(5.0, 5.0), Point2::new(1.0e9, 5.0));
        let (start, end) = clip_segment(a, b, [0.0, 0.0], [10.0, 10.0]).unwrap();
        assert_eq!(start, a);
        assert!((end.x - 10.0).abs() < 1e-3, "{end:?}");
    }

    #[test]
    fn dash_pattern_segments() {
        let segments =
            dashes(Point2::new(0.0, 0.0), Point2::new(22.0, 0.0), 5.0, 5.0).collect::<Vec<_>>();
        let xs = segments
            .iter()
            .map(|(a, b)| (a.x, b.x))
            .collect::<Vec<_>>();
        assert_eq!(xs, [(0.0, 5.0), (10.0, 15.0), (20.0, 22.0)]);
    }

    #[test]
    fn dashed_line_leaves_gaps() {
        let mut image = Image::new(30, 3);
        line(&mut image, Point2::new(0.0, 1.0), Point2::new(29.0, 1.0))
            .color(Color::WHITE)
            .dash(5.0, 5.0);

        assert_eq!(image.get(2, 1), Color::WHITE);
        assert_eq!(image.get(7, 1), Color::NONE);
        assert_eq!(image.get(12, 1), Color::WHITE);
    }

    #[test]
    fn fill_square() {
        let mut image = Image::new(6, 6);
        let square = Outline::polygon([
            Point2::new(1.0, 1.0),
            Point2::new(4.0, 1.0),
            Point2::new(4.0, 4.0),
            Point2::new(1.0, 4.0),
        ]);
        fill(&mut image, &square).color(Color::GREEN);

        for y in 0..6 {
            for x in 0..6 {
                let inside = (1..4).contains(&x) && (1..4).contains(&y);
                let expected = if inside { Color::GREEN } else { Color::NONE };
                assert_eq!(image.get(x, y), expected, "pixel ({x},{y})");
            }
        }
    }

    #[test]
    fn fill_degenerate_polygon_draws_nothing() {
        let mut image = Image::new(8, 8);
        let flat = Outline::polygon([
            Point2::new(1.0, 4.0),
            Point2::new(6.0, 4.0),
            Point2::new(3.0, 4.0),
        ]);
        fill(&mut image, &flat).color(Color::GREEN);
        assert!(image.is_blank());
    }

    #[test]
    fn translucent_fill_blends() {
        let mut image = Image::new(4, 4);
        image.clear(Color::WHITE);
        let all = Outline::polygon([
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ]);
        fill(&mut image, &all).color(Color::BLACK.with_alpha(0x80));

        let pix = image.get(2, 2);
        assert_eq!(pix.a(), 255);
        assert!(pix.r() > 0 && pix.r() < 255, "{pix:?}");
    }
}
