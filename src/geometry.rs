//! 2D rotation and centroid normalization of point sets
//!
//! Rotation uses the row-vector convention `p' = p · R` with
//! `R = [[cos θ, sin θ], [-sin θ, cos θ]]`, i.e.
//! `x' = x cos θ - y sin θ` and `y' = x sin θ + y cos θ`. Positive angles turn
//! counter-clockwise, matching circuit rotation metadata.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::schema::CircuitInfo;
use crate::types::centroid;

/// Rotation used when nothing authoritative exists in legacy mode
pub const LEGACY_FALLBACK_ANGLE: f64 = -std::f64::consts::FRAC_PI_2;

/// Rotate a single point about the origin
#[inline]
pub fn rotate_point(p: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    Point::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

/// Rotate a single vector
#[inline]
pub fn rotate_vec(v: Vec2, angle: f64) -> Vec2 {
    rotate_point(v.to_point(), angle).to_vec2()
}

/// Rotate every point about the origin by `angle` radians.
pub fn rotate(points: &[Point], angle: f64) -> Vec<Point> {
    points.iter().map(|&p| rotate_point(p, angle)).collect()
}

/// Centroid-preserving rotation shared by the trace and its annotations.
///
/// Points are translated so the centroid sits at the origin, rotated, then
/// translated back, which keeps the circuit centered whatever the angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub center: Point,
    pub angle: f64,
}

impl Normalization {
    /// Normalization about the centroid of `points`; `None` when empty
    pub fn about_centroid(points: &[Point], angle: f64) -> Option<Self> {
        centroid(points).map(|center| Self { center, angle })
    }

    pub fn apply(&self, p: Point) -> Point {
        self.center + rotate_point((p - self.center).to_point(), self.angle).to_vec2()
    }

    pub fn apply_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.apply(p)).collect()
    }
}

/// How the rotation angle is chosen when no override is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationPolicy {
    /// Only authoritative circuit rotation; otherwise no rotation
    #[default]
    Strict,
    /// Fall back to a fixed -90° turn for a horizontal layout
    Legacy,
}

/// Where the applied rotation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationSource {
    Override,
    Circuit,
    /// Strict mode without circuit metadata
    Unrotated,
    LegacyFallback,
}

/// A resolved rotation angle in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRotation {
    pub radians: f64,
    pub source: RotationSource,
}

/// Pick the rotation angle.
///
/// Precedence: explicit override (radians, as-is), then circuit rotation
/// (degrees converted), then `0` under [`RotationPolicy::Strict`] or
/// [`LEGACY_FALLBACK_ANGLE`] under [`RotationPolicy::Legacy`].
pub fn resolve_rotation(
    override_radians: Option<f64>,
    circuit: Option<&CircuitInfo>,
    policy: RotationPolicy,
) -> ResolvedRotation {
    if let Some(radians) = override_radians {
        return ResolvedRotation { radians, source: RotationSource::Override };
    }
    if let Some(info) = circuit {
        info!(degrees = info.rotation, "Applying circuit rotation");
        return ResolvedRotation { radians: info.rotation.to_radians(), source: RotationSource::Circuit };
    }
    match policy {
        RotationPolicy::Strict => {
            info!("No circuit rotation available; strict mode applies no rotation");
            ResolvedRotation { radians: 0.0, source: RotationSource::Unrotated }
        }
        RotationPolicy::Legacy => {
            ResolvedRotation { radians: LEGACY_FALLBACK_ANGLE, source: RotationSource::LegacyFallback }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    #[test]
    fn quarter_turn_is_counter_clockwise() {
        let rotated = rotate(&[Point::new(1.0, 0.0)], FRAC_PI_2);
        assert!(close(rotated[0], Point::new(0.0, 1.0)));
    }

    #[test]
    fn matches_row_vector_matrix_convention() {
        let p = Point::new(3.0, -2.0);
        let theta = 0.7_f64;
        let (s, c) = theta.sin_cos();
        // [x y] · [[c, s], [-s, c]]
        let expected = Point::new(p.x * c + p.y * -s, p.x * s + p.y * c);
        assert_eq!(rotate_point(p, theta), expected);
    }

    #[test]
    fn empty_set_stays_empty() {
        assert!(rotate(&[], 1.0).is_empty());
        assert!(Normalization::about_centroid(&[], 1.0).is_none());
    }

    #[test]
    fn normalization_keeps_centroid() {
        let points = [Point::new(10.0, 10.0), Point::new(20.0, 10.0), Point::new(20.0, 30.0)];
        let norm = Normalization::about_centroid(&points, 1.234).unwrap();
        let rotated = norm.apply_all(&points);
        let before = centroid(&points).unwrap();
        let after = centroid(&rotated).unwrap();
        assert!(close(before, after));
    }

    #[test]
    fn rotation_precedence() {
        let info = CircuitInfo { rotation: 90.0, corners: vec![] };

        let r = resolve_rotation(Some(0.25), Some(&info), RotationPolicy::Strict);
        assert_eq!(r, ResolvedRotation { radians: 0.25, source: RotationSource::Override });

        let r = resolve_rotation(None, Some(&info), RotationPolicy::Legacy);
        assert_eq!(r.source, RotationSource::Circuit);
        assert!((r.radians - FRAC_PI_2).abs() < 1e-12);

        let r = resolve_rotation(None, None, RotationPolicy::Strict);
        assert_eq!(r, ResolvedRotation { radians: 0.0, source: RotationSource::Unrotated });

        let r = resolve_rotation(None, None, RotationPolicy::Legacy);
        assert_eq!(r, ResolvedRotation { radians: -FRAC_PI_2, source: RotationSource::LegacyFallback });
    }

    proptest! {
        #[test]
        fn zero_rotation_is_identity(
            xs in prop::collection::vec((-1e5f64..1e5, -1e5f64..1e5), 0..64)
        ) {
            let points: Vec<Point> = xs.iter().map(|&(x, y)| Point::new(x, y)).collect();
            prop_assert_eq!(rotate(&points, 0.0), points);
        }

        #[test]
        fn rotate_then_unrotate_restores_points(
            xs in prop::collection::vec((-1e4f64..1e4, -1e4f64..1e4), 1..64),
            angle in -10.0f64..10.0
        ) {
            let points: Vec<Point> = xs.iter().map(|&(x, y)| Point::new(x, y)).collect();
            let restored = rotate(&rotate(&points, angle), -angle);
            for (a, b) in points.iter().zip(&restored) {
                prop_assert!((a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6);
            }
        }
    }
}
