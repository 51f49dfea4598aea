//! Small vector and scalar helpers shared by the simulation.
//!
//! All helpers are pure and never produce NaN for degenerate input:
//! zero-length vectors stay zero and empty remap ranges collapse to
//! their start value.

use glam::Vec2;
use std::ops::Range;

/// Pure helper operations on [`Vec2`] that glam does not provide directly.
pub trait Vec2Ext {
    /// Returns the vector scaled to magnitude `len`.
    ///
    /// A zero vector stays zero.
    fn with_length(self, len: f32) -> Vec2;

    /// Returns the vector rotated counter-clockwise (in a y-up frame) by `angle` radians.
    fn rotated(self, angle: f32) -> Vec2;

    /// Signed angle in radians that rotates `self` onto `other`, in `[-π, π]`.
    ///
    /// Returns `0.0` if either vector is zero.
    fn signed_angle_to(self, other: Vec2) -> f32;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn with_length(self, len: f32) -> Vec2 {
        self.normalize_or_zero() * len
    }

    #[inline]
    fn rotated(self, angle: f32) -> Vec2 {
        Vec2::from_angle(angle).rotate(self)
    }

    #[inline]
    fn signed_angle_to(self, other: Vec2) -> f32 {
        self.perp_dot(other).atan2(self.dot(other))
    }
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linearly remaps `x` from the range `from` onto the range `to`.
///
/// The result is not clamped. If `from` is empty (start == end) the
/// result is `to.start`.
#[inline]
pub fn map_range(x: f32, from: Range<f32>, to: Range<f32>) -> f32 {
    let span = from.end - from.start;
    if span == 0.0 || !span.is_finite() {
        return to.start;
    }
    lerp(to.start, to.end, (x - from.start) / span)
}

/// Clamps `x` into `[lo, hi]`; a NaN input collapses to `lo`.
#[inline]
pub fn constrain(x: f32, lo: f32, hi: f32) -> f32 {
    x.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPS: f32 = 1e-5;

    #[test]
    fn with_length_scales_and_keeps_zero() {
        let v = Vec2::new(3.0, 4.0).with_length(10.0);
        assert!((v - Vec2::new(6.0, 8.0)).length() < EPS);

        assert_eq!(Vec2::ZERO.with_length(5.0), Vec2::ZERO);
    }

    #[test]
    fn rotated_quarter_turn() {
        let v = Vec2::X.rotated(FRAC_PI_2);
        assert!((v - Vec2::Y).length() < EPS, "got {v:?}");
    }

    #[test]
    fn signed_angle_has_direction() {
        assert!((Vec2::X.signed_angle_to(Vec2::Y) - FRAC_PI_2).abs() < EPS);
        assert!((Vec2::Y.signed_angle_to(Vec2::X) + FRAC_PI_2).abs() < EPS);
        assert!((Vec2::X.signed_angle_to(-Vec2::X).abs() - PI).abs() < EPS);
    }

    #[test]
    fn signed_angle_of_zero_vector_is_zero() {
        assert_eq!(Vec2::ZERO.signed_angle_to(Vec2::X), 0.0);
        assert_eq!(Vec2::X.signed_angle_to(Vec2::ZERO), 0.0);
    }

    #[test]
    fn map_range_is_linear_and_unclamped() {
        assert!((map_range(5.0, 0.0..10.0, 0.4..4.0) - 2.2).abs() < EPS);
        assert!((map_range(20.0, 0.0..10.0, 0.0..1.0) - 2.0).abs() < EPS);
    }

    #[test]
    fn map_range_with_empty_source_returns_start() {
        assert_eq!(map_range(3.0, 2.0..2.0, 0.0..1.0), 0.0);
    }

    #[test]
    fn constrain_handles_nan() {
        assert_eq!(constrain(f32::NAN, 0.4, 6.0), 0.4);
        assert_eq!(constrain(9.0, 0.4, 6.0), 6.0);
        assert_eq!(constrain(1.0, 0.4, 6.0), 1.0);
    }
}
