//! Corner marker placement
//!
//! Markers come from one of two sources. Authoritative corners are offset
//! along their exit direction and normalized with the same transform as the
//! trace, so track and labels stay co-registered. Without corner metadata the
//! trace itself is sampled at a fixed stride; that approximation does not
//! locate real corners.

use kurbo::{Point, Vec2};

use crate::geometry::{Normalization, rotate_vec};
use crate::schema::{CircuitInfo, Corner};

/// Upper bound on markers produced by sampling
pub const SAMPLED_MARKER_COUNT: usize = 8;

/// Default distance between a corner and its label, in source units
pub const DEFAULT_CORNER_OFFSET: f64 = 500.0;

/// Where corner markers come from
#[derive(Debug, Clone, Copy)]
pub enum CornerSource<'a> {
    /// Published corner list
    Authoritative(&'a [Corner]),
    /// Evenly spaced samples of the trace
    Sampled,
}

impl<'a> CornerSource<'a> {
    /// Authoritative when circuit info carries at least one corner
    pub fn from_circuit(circuit: Option<&'a CircuitInfo>) -> Self {
        match circuit {
            Some(info) if !info.corners.is_empty() => CornerSource::Authoritative(&info.corners),
            _ => CornerSource::Sampled,
        }
    }
}

/// One label to draw
#[derive(Debug, Clone, PartialEq)]
pub struct CornerMarker {
    pub label: String,
    /// Marker center, normalized
    pub position: Point,
    /// Track point the marker belongs to, normalized
    pub anchor: Point,
}

impl CornerMarker {
    /// Whether a connector between marker and anchor would be visible
    pub fn has_connector(&self) -> bool {
        self.position.distance(self.anchor) > f64::EPSILON
    }
}

/// Places corner markers
#[derive(Debug, Clone, Copy)]
pub struct CornerAnnotator {
    offset: f64,
}

impl Default for CornerAnnotator {
    fn default() -> Self {
        Self::new(DEFAULT_CORNER_OFFSET)
    }
}

impl CornerAnnotator {
    pub fn new(offset: f64) -> Self {
        Self { offset }
    }

    /// Annotate a normalized trace.
    ///
    /// `normalized` must already carry `norm`; authoritative corners are in
    /// raw coordinates and are normalized here.
    pub fn annotate(
        &self,
        normalized: &[Point],
        source: CornerSource<'_>,
        norm: &Normalization,
    ) -> Vec<CornerMarker> {
        match source {
            CornerSource::Authoritative(corners) => {
                corners.iter().map(|corner| self.place_corner(corner, norm)).collect()
            }
            CornerSource::Sampled => sample_markers(normalized),
        }
    }

    fn place_corner(&self, corner: &Corner, norm: &Normalization) -> CornerMarker {
        let offset = rotate_vec(Vec2::new(self.offset, 0.0), corner.angle.to_radians());
        let raw = corner.position();
        CornerMarker {
            label: corner.label(),
            position: norm.apply(raw + offset),
            anchor: norm.apply(raw),
        }
    }
}

/// Stride `max(1, n / 8)` from index 0, capped at [`SAMPLED_MARKER_COUNT`],
/// labeled `1..=k` in trace order.
pub fn sample_markers(points: &[Point]) -> Vec<CornerMarker> {
    let stride = (points.len() / SAMPLED_MARKER_COUNT).max(1);
    points
        .iter()
        .step_by(stride)
        .take(SAMPLED_MARKER_COUNT)
        .enumerate()
        .map(|(i, &p)| CornerMarker { label: (i + 1).to_string(), position: p, anchor: p })
        .collect()
}
