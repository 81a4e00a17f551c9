//! Data and operations on planar points.
//!
//! [`Point`] is the coordinate pair every pipeline stage works on. Arithmetic
//! stays in the scalar's own domain; the sign-exact widened operations live
//! in [`crate::geometry::predicates`] and [`crate::geometry::util`].

use crate::geometry::traits::coordinate::CoordinateScalar;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

// =============================================================================
// POINT STRUCT DEFINITION
// =============================================================================

/// A point (or vector) in the plane with coordinates of scalar type `T`.
///
/// # Examples
///
/// ```rust
/// use ruppert::geometry::point::Point;
///
/// let p = Point::new(1.0, 2.0);
/// let q = Point::new(0.5, 0.5);
/// assert_eq!(p - q, Point::new(0.5, 1.5));
/// assert_eq!(p + q, Point::new(1.5, 2.5));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Point<T>
where
    T: CoordinateScalar,
{
    /// Horizontal coordinate.
    pub x: T,
    /// Vertical coordinate.
    pub y: T,
}

// =============================================================================
// PUBLIC API
// =============================================================================

impl<T> Point<T>
where
    T: CoordinateScalar,
{
    /// Creates a point from its two coordinates.
    #[inline]
    #[must_use]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// Returns true if both coordinates are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite_generic() && self.y.is_finite_generic()
    }

    /// Component-wise minimum.
    #[inline]
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(
            if other.x < self.x { other.x } else { self.x },
            if other.y < self.y { other.y } else { self.y },
        )
    }

    /// Component-wise maximum.
    #[inline]
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(
            if other.x > self.x { other.x } else { self.x },
            if other.y > self.y { other.y } else { self.y },
        )
    }

    /// Component-wise absolute value.
    #[inline]
    #[must_use]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Dot product in the scalar's own domain.
    ///
    /// For the sign-exact widened variant used by the encroachment predicate
    /// see [`crate::geometry::util::dot`].
    #[inline]
    #[must_use]
    pub fn dot(self, other: Self) -> T {
        self.x * other.x + self.y * other.y
    }

    /// Squared length in the scalar's own domain.
    #[inline]
    #[must_use]
    pub fn length_sq(self) -> T {
        self.dot(self)
    }

    /// Linear interpolation `self + (other - self) * t`.
    ///
    /// With an integer scalar the interpolant truncates; the pipeline only
    /// interpolates under floating-point scalars (refinement splitting).
    #[inline]
    #[must_use]
    pub fn lerp(self, other: Self, t: T) -> Self {
        self + (other - self) * t
    }

    /// Hashable duplicate-detection key (NaN-safe for floats).
    #[inline]
    #[must_use]
    pub fn ordered_key(self) -> (T::Key, T::Key) {
        (self.x.ordered_key(), self.y.ordered_key())
    }

    /// Both coordinates converted to `f64`, for order-preserving heuristics.
    #[inline]
    #[must_use]
    pub fn to_f64_lossy(self) -> (f64, f64) {
        (self.x.to_f64_lossy(), self.y.to_f64_lossy())
    }
}

// =============================================================================
// OPERATOR IMPLEMENTATIONS
// =============================================================================

impl<T> Add for Point<T>
where
    T: CoordinateScalar,
{
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T> Sub for Point<T>
where
    T: CoordinateScalar,
{
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<T> Mul<T> for Point<T>
where
    T: CoordinateScalar,
{
    type Output = Self;

    #[inline]
    fn mul(self, rhs: T) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn arithmetic_and_measures() {
        let p = Point::new(3.0, 4.0);
        assert_relative_eq!(p.length_sq(), 25.0);
        assert_relative_eq!(p.dot(Point::new(1.0, 0.0)), 3.0);
        assert_eq!(p * 2.0, Point::new(6.0, 8.0));
    }

    #[test]
    fn min_max_abs() {
        let p = Point::new(-1.0, 5.0);
        let q = Point::new(2.0, -3.0);
        assert_eq!(p.min(q), Point::new(-1.0, -3.0));
        assert_eq!(p.max(q), Point::new(2.0, 5.0));
        assert_eq!(p.abs(), Point::new(1.0, 5.0));
    }

    #[test]
    fn lerp_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(2.0, 4.0);
        assert_eq!(a.lerp(b, 0.5), Point::new(1.0, 2.0));
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn finiteness() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f64::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f64::INFINITY).is_finite());
        assert!(Point::new(1i32, 2).is_finite());
    }

    #[test]
    fn integer_points() {
        let p = Point::new(3i32, -4);
        let q = Point::new(-1, 2);
        assert_eq!(p + q, Point::new(2, -2));
        assert_eq!(p - q, Point::new(4, -6));
        assert_eq!(p.length_sq(), 25);
    }

    #[test]
    fn serde_round_trip() {
        let p = Point::new(1.5f64, -2.5);
        let json = serde_json::to_string(&p).unwrap();
        let back: Point<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
