//! Positional traces sampled along one lap

use kurbo::{Point, Rect};

/// Ordered `(x, y)` samples along one lap, in the source's planar units.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionTrace {
    points: Vec<Point>,
}

impl PositionTrace {
    /// Wrap already-built points
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Build a trace from raw `[x, y]` pairs
    pub fn from_xy(samples: &[[f64; 2]]) -> Self {
        Self { points: samples.iter().map(|&[x, y]| Point::new(x, y)).collect() }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether every coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }

    /// Arithmetic mean of all samples, `None` for an empty trace
    pub fn centroid(&self) -> Option<Point> {
        centroid(&self.points)
    }

    /// Axis-aligned bounds, `None` for an empty trace
    pub fn bounds(&self) -> Option<Rect> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold(Rect::from_points(first, first), |r, &p| r.union_pt(p)))
    }
}

impl From<Vec<Point>> for PositionTrace {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

/// Mean of a point set
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_of_square() {
        let trace = PositionTrace::from_xy(&[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]);
        assert_eq!(trace.centroid(), Some(Point::new(1.0, 1.0)));
    }

    #[test]
    fn empty_trace_has_no_centroid_or_bounds() {
        let trace = PositionTrace::default();
        assert!(trace.is_empty());
        assert_eq!(trace.centroid(), None);
        assert_eq!(trace.bounds(), None);
    }

    #[test]
    fn bounds_cover_all_points() {
        let trace = PositionTrace::from_xy(&[[-3.0, 1.0], [5.0, -2.0], [0.0, 4.0]]);
        let bounds = trace.bounds().unwrap();
        assert_eq!(bounds, Rect::new(-3.0, -2.0, 5.0, 4.0));
    }

    #[test]
    fn non_finite_samples_are_detected() {
        assert!(PositionTrace::from_xy(&[[0.0, 1.0]]).is_finite());
        assert!(!PositionTrace::from_xy(&[[f64::NAN, 1.0]]).is_finite());
    }
}
