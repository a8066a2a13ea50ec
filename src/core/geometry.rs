//! Deterministic 2D Geometry
//!
//! Vector, angle, and collision-test primitives shared by the tick
//! pipeline. Everything here is pure `f64` math with a fixed operation
//! order — no fused multiply-add, no platform-dependent rounding.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A 2D vector (or point) with double-precision components.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Vec2 {
    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Construct from components.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared length (avoids `sqrt` — prefer this for comparisons).
    #[inline]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Length (magnitude). Prefer [`Vec2::length_squared`] when possible.
    #[inline]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Distance to another point. Prefer [`Vec2::distance_squared`] when possible.
    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Linear interpolation; `t = 0` returns `self`, `t = 1` returns `other`.
    #[inline]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Clamp both components to an axis-aligned rectangle `[min, max]`.
    #[inline]
    pub fn clamp_rect(self, min: Self, max: Self) -> Self {
        Self {
            x: self.x.clamp(min.x, max.x),
            y: self.y.clamp(min.y, max.y),
        }
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Debug for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2({:.3}, {:.3})", self.x, self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Normalize a degree value into `[0, 360)`.
#[inline]
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Signed shortest-path angular difference `to - from`, in `(-180, 180]`.
#[inline]
pub fn angle_diff(from: f64, to: f64) -> f64 {
    let diff = normalize_angle(to - from);
    if diff > 180.0 {
        diff - 360.0
    } else if diff <= -180.0 {
        diff + 360.0
    } else {
        diff
    }
}

/// Result of a swept segment-vs-circle test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepHit {
    /// Whether the segment comes within `radius` of the circle center.
    pub hit: bool,
    /// Segment parameter `t` in `[0, 1]` of the closest approach.
    pub t: f64,
}

/// Test whether the segment `a -> b` passes within `radius` of `center`.
///
/// Finds the segment parameter `t` minimizing the distance from
/// `a + t*(b - a)` to `center`, clamped to `[0, 1]`, and reports a hit
/// if that minimum distance is `<= radius`. Degenerate zero-length
/// segments reduce to a point-in-circle test with `t = 0`.
///
/// This is the continuous (swept) collision test used to detect fast
/// bullets that would otherwise tunnel through a robot within a single
/// tick of discrete motion.
pub fn swept_segment_vs_circle(a: Vec2, b: Vec2, center: Vec2, radius: f64) -> SweepHit {
    let segment = b - a;
    let seg_len_sq = segment.length_squared();

    if seg_len_sq == 0.0 {
        let hit = a.distance_squared(center) <= radius * radius;
        return SweepHit { hit, t: 0.0 };
    }

    let to_center = center - a;
    let t = (to_center.dot(segment) / seg_len_sq).clamp(0.0, 1.0);
    let closest = a.lerp(b, t);
    let hit = closest.distance_squared(center) <= radius * radius;

    SweepHit { hit, t }
}

/// Tolerance for treating a zero-size sweep arc as "only the exact bearing".
const ZERO_ARC_TOLERANCE_DEGREES: f64 = 1e-9;

/// Decide whether `bearing` falls within the directed arc from `start`
/// to `end` (all normalized degrees).
///
/// When `start == end` the arc is degenerate and only matches a bearing
/// equal to `start` (within a small floating-point tolerance).
/// Otherwise the arc sweeps from `start` to `end` in the direction that
/// makes `sweep_size = (end - start) mod 360` nonnegative, and contains
/// every angle in `[0, sweep_size]` measured from `start`.
pub fn sweep_arc_contains(start: f64, end: f64, bearing: f64) -> bool {
    let start = normalize_angle(start);
    let end = normalize_angle(end);
    let bearing = normalize_angle(bearing);

    let sweep_size = normalize_angle(end - start);

    if sweep_size.abs() < ZERO_ARC_TOLERANCE_DEGREES {
        let delta = normalize_angle(bearing - start);
        return delta < ZERO_ARC_TOLERANCE_DEGREES
            || (360.0 - delta) < ZERO_ARC_TOLERANCE_DEGREES;
    }

    let offset = normalize_angle(bearing - start);
    offset <= sweep_size
}

/// Absolute bearing in `[0, 360)` from `from` to `to`, using the engine's
/// 0° = north (−y), clockwise convention.
pub fn bearing_to(from: Vec2, to: Vec2) -> f64 {
    let delta = to - from;
    // atan2(x, -y): 0 rad points toward -y (north), increasing clockwise.
    let radians = delta.x.atan2(-delta.y);
    normalize_angle(radians.to_degrees())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_into_0_360() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(720.0), 0.0);
        assert_eq!(normalize_angle(-10.0), 350.0);
        assert_eq!(normalize_angle(370.0), 10.0);
    }

    #[test]
    fn angle_diff_shortest_path() {
        assert_eq!(angle_diff(0.0, 90.0), 90.0);
        assert_eq!(angle_diff(0.0, -90.0), -90.0);
        assert_eq!(angle_diff(350.0, 10.0), 20.0);
        assert_eq!(angle_diff(10.0, 350.0), -20.0);
        assert_eq!(angle_diff(0.0, 180.0), 180.0);
    }

    #[test]
    fn swept_hit_straight_through() {
        let hit = swept_segment_vs_circle(
            Vec2::new(-10.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 0.0),
            1.0,
        );
        assert!(hit.hit);
        assert!((hit.t - 0.5).abs() < 1e-9);
    }

    #[test]
    fn swept_miss_when_far() {
        let hit = swept_segment_vs_circle(
            Vec2::new(-10.0, 10.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 0.0),
            1.0,
        );
        assert!(!hit.hit);
    }

    #[test]
    fn swept_degenerate_segment_is_point_test() {
        let inside = swept_segment_vs_circle(
            Vec2::new(0.5, 0.0),
            Vec2::new(0.5, 0.0),
            Vec2::new(0.0, 0.0),
            1.0,
        );
        assert!(inside.hit);
        assert_eq!(inside.t, 0.0);

        let outside = swept_segment_vs_circle(
            Vec2::new(5.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(0.0, 0.0),
            1.0,
        );
        assert!(!outside.hit);
    }

    #[test]
    fn swept_clamps_t_to_segment_ends() {
        // Circle is "before" A: closest point on the segment is A itself (t=0).
        let hit = swept_segment_vs_circle(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(-5.0, 0.0),
            1.0,
        );
        assert!(!hit.hit);
        assert_eq!(hit.t, 0.0);
    }

    #[test]
    fn sweep_arc_degenerate_matches_only_exact_bearing() {
        assert!(sweep_arc_contains(45.0, 45.0, 45.0));
        assert!(!sweep_arc_contains(45.0, 45.0, 46.0));
    }

    #[test]
    fn sweep_arc_forward_sweep() {
        // Sweeping from 10 to 50 degrees should contain everything in between.
        assert!(sweep_arc_contains(10.0, 50.0, 10.0));
        assert!(sweep_arc_contains(10.0, 50.0, 30.0));
        assert!(sweep_arc_contains(10.0, 50.0, 50.0));
        assert!(!sweep_arc_contains(10.0, 50.0, 60.0));
        assert!(!sweep_arc_contains(10.0, 50.0, 350.0));
    }

    #[test]
    fn sweep_arc_wraps_across_zero() {
        // Sweeping from 350 to 10 degrees should contain 0/360 and 5.
        assert!(sweep_arc_contains(350.0, 10.0, 0.0));
        assert!(sweep_arc_contains(350.0, 10.0, 5.0));
        assert!(sweep_arc_contains(350.0, 10.0, 350.0));
        assert!(!sweep_arc_contains(350.0, 10.0, 180.0));
    }

    #[test]
    fn sweep_arc_backward_sweep_goes_the_long_way() {
        // Sweeping from 50 down to 10 degrees is a *directed* arc the
        // other way around the circle (340 degrees), not the short way.
        assert!(sweep_arc_contains(50.0, 10.0, 200.0));
        assert!(!sweep_arc_contains(50.0, 10.0, 30.0));
    }

    #[test]
    fn bearing_to_cardinal_directions() {
        let origin = Vec2::ZERO;
        assert!((bearing_to(origin, Vec2::new(0.0, -10.0)) - 0.0).abs() < 1e-9);
        assert!((bearing_to(origin, Vec2::new(10.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_to(origin, Vec2::new(0.0, 10.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_to(origin, Vec2::new(-10.0, 0.0)) - 270.0).abs() < 1e-9);
    }
}
