use std::ops::Range;

use nalgebra::Point2;

/// An axis-aligned rectangle in pixel coordinates.
///
/// Rectangles are allowed to have zero (or negative) width and height; such rectangles cover no
/// pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a rectangle extending downwards and right from a point.
    #[inline]
    pub fn from_top_left(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the X coordinate of the left side of the rectangle.
    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Returns the Y coordinate of the top side of the rectangle.
    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Returns the point at `(fx * width, fy * height)` relative to the top left corner.
    ///
    /// `fx` and `fy` are fractions, so `(0.5, 0.5)` is the center of the rectangle.
    #[inline]
    pub fn at(&self, fx: f32, fy: f32) -> Point2<f32> {
        Point2::new(self.x + self.width * fx, self.y + self.height * fy)
    }

    /// Returns whether this rectangle covers a non-zero, finite area.
    pub fn has_area(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Returns a translated copy of `self`.
    #[must_use]
    pub fn move_by(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Returns the pixel columns and rows whose centers lie inside of `self`, clipped to an image
    /// of size `width x height`.
    ///
    /// A pixel at `(x, y)` has its center at `(x + 0.5, y + 0.5)`.
    pub(crate) fn pixel_ranges(&self, width: u32, height: u32) -> (Range<u32>, Range<u32>) {
        if !self.has_area() {
            return (0..0, 0..0);
        }
        let xs = center_range(self.x, self.x + self.width, width);
        let ys = center_range(self.y, self.y + self.height, height);
        (xs, ys)
    }
}

/// Returns the range of pixel indices `i` with `min <= i + 0.5 < max`, clipped to `0..limit`.
pub(crate) fn center_range(min: f32, max: f32, limit: u32) -> Range<u32> {
    let start = (min - 0.5).ceil().clamp(0.0, limit as f32) as u32;
    let end = (max - 0.5).ceil().clamp(0.0, limit as f32) as u32;
    start..end.max(start)
}
