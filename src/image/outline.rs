use nalgebra::Point2;

/// Number of straight segments a quadratic curve is flattened into.
const CURVE_SEGMENTS: usize = 16;

/// A single open or closed path made of straight lines and quadratic curves.
///
/// Curves are flattened into line segments as they are added, so an [`Outline`] is always a
/// polyline. It can be filled with [`draw::fill`] or traced with [`draw::stroke`].
///
/// [`draw::fill`]: super::draw::fill
/// [`draw::stroke`]: super::draw::stroke
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    points: Vec<Point2<f32>>,
    closed: bool,
}

impl Outline {
    /// Starts a new outline at `start`.
    pub fn new(start: Point2<f32>) -> Self {
        Self {
            points: vec![start],
            closed: false,
        }
    }

    /// Creates a closed outline connecting `points` in order.
    pub fn polygon<I: IntoIterator<Item = Point2<f32>>>(points: I) -> Self {
        Self {
            points: points.into_iter().collect(),
            closed: true,
        }
    }

    /// Adds a straight line from the current point to `to`.
    pub fn line_to(mut self, to: Point2<f32>) -> Self {
        self.points.push(to);
        self
    }

    /// Adds a quadratic Bézier curve from the current point to `to`, bending towards `control`.
    pub fn quad_to(mut self, control: Point2<f32>, to: Point2<f32>) -> Self {
        let from = self.last();
        for i in 1..=CURVE_SEGMENTS {
            let t = i as f32 / CURVE_SEGMENTS as f32;
            let mt = 1.0 - t;
            let p = from.coords * (mt * mt) + control.coords * (2.0 * mt * t) + to.coords * (t * t);
            self.points.push(p.into());
        }
        self
    }

    /// Closes the outline, connecting the last point back to the first one.
    pub fn close(mut self) -> Self {
        self.closed = true;
        self
    }

    /// Returns the flattened points of this outline.
    #[inline]
    pub fn points(&self) -> &[Point2<f32>] {
        &self.points
    }

    /// Returns an iterator over the line segments making up the outline.
    ///
    /// Closed outlines include the segment connecting the last point back to the first one.
    pub fn segments(&self) -> impl Iterator<Item = (Point2<f32>, Point2<f32>)> + '_ {
        let closing = match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) if self.points.len() > 2 => Some((*last, *first)),
            _ => None,
        };
        self.points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(closing)
    }

    fn last(&self) -> Point2<f32> {
        // Only an empty `polygon` has no current point.
        self.points.last().copied().unwrap_or_else(Point2::origin)
    }
}
