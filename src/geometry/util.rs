//! Geometric utility functions for the triangulation pipeline.
//!
//! Circumcircle calculations, the pseudoangle used by the convex-hull hash,
//! widened vector measures, and the convex-quadrilateral test used by the
//! constrained-edge flip loop.

use crate::geometry::point::Point;
use crate::geometry::predicates::segments_properly_intersect;
use crate::geometry::traits::coordinate::CoordinateScalar;
use num_traits::Zero;

// =============================================================================
// WIDENED VECTOR MEASURES
// =============================================================================

/// Absolute value in the widened domain.
#[inline]
#[must_use]
pub fn wide_abs<W>(value: W) -> W
where
    W: num_traits::Zero + PartialOrd + std::ops::Neg<Output = W> + Copy,
{
    if value < W::zero() { -value } else { value }
}

/// Sign-exact dot product `(a - base) · (b - base)`.
///
/// Coordinates widen before the subtraction, so the encroachment predicate
/// `(a − c)·(b − c) ≤ 0` stays exact for every scalar.
#[inline]
#[must_use]
pub fn dot_relative<T>(base: Point<T>, a: Point<T>, b: Point<T>) -> T::Wide
where
    T: CoordinateScalar,
{
    let (bx, by) = (base.x.widen(), base.y.widen());
    (a.x.widen() - bx) * (b.x.widen() - bx) + (a.y.widen() - by) * (b.y.widen() - by)
}

/// Sign-exact squared distance between two points.
#[inline]
#[must_use]
pub fn distance_sq<T>(a: Point<T>, b: Point<T>) -> T::Wide
where
    T: CoordinateScalar,
{
    dot_relative(a, b, b)
}

// =============================================================================
// CIRCUMCIRCLES
// =============================================================================

/// Circumcenter offset of triangle `(a, b, c)` relative to `a`, in the
/// widened domain. `None` when the triangle is degenerate (zero determinant)
/// — the caller-facing "infinitely far" sentinel.
#[inline]
fn circum_delta<T>(a: Point<T>, b: Point<T>, c: Point<T>) -> Option<(T::Wide, T::Wide)>
where
    T: CoordinateScalar,
{
    let (ax, ay) = (a.x.widen(), a.y.widen());
    let (dx, dy) = (b.x.widen() - ax, b.y.widen() - ay);
    let (ex, ey) = (c.x.widen() - ax, c.y.widen() - ay);

    let det = dx * ey - dy * ex;
    if det == T::Wide::zero() {
        return None;
    }
    let bl = dx * dx + dy * dy;
    let cl = ex * ex + ey * ey;
    let half = det + det;
    Some(((ey * bl - dy * cl) / half, (dx * cl - ex * bl) / half))
}

/// Circumcenter of triangle `(a, b, c)`.
///
/// `None` when the triangle is degenerate or the center does not fit the
/// coordinate domain.
///
/// # Examples
///
/// ```
/// use ruppert::geometry::point::Point;
/// use ruppert::geometry::util::circum_center;
///
/// let center = circum_center(
///     Point::new(0.0, 0.0),
///     Point::new(0.0, 1.0),
///     Point::new(1.0, 0.0),
/// )
/// .unwrap();
/// assert_eq!(center, Point::new(0.5, 0.5));
/// ```
#[inline]
#[must_use]
pub fn circum_center<T>(a: Point<T>, b: Point<T>, c: Point<T>) -> Option<Point<T>>
where
    T: CoordinateScalar,
{
    let (dx, dy) = circum_delta(a, b, c)?;
    let x = T::narrow(a.x.widen() + dx)?;
    let y = T::narrow(a.y.widen() + dy)?;
    Some(Point::new(x, y))
}

/// Squared circumradius of triangle `(a, b, c)` in the widened domain, or
/// `None` when degenerate.
#[inline]
#[must_use]
pub fn circum_radius_sq<T>(a: Point<T>, b: Point<T>, c: Point<T>) -> Option<T::Wide>
where
    T: CoordinateScalar,
{
    let (dx, dy) = circum_delta(a, b, c)?;
    Some(dx * dx + dy * dy)
}

// =============================================================================
// PSEUDOANGLE
// =============================================================================

/// Monotone order-preserving proxy for `atan2` in `[0, 1)`.
///
/// Used only for convex-hull hash bucket selection, so the lossy `f64`
/// evaluation is fine for every scalar.
///
/// # Examples
///
/// ```
/// use ruppert::geometry::util::pseudo_angle;
///
/// assert_eq!(pseudo_angle(1.0, 0.0), 0.5);
/// assert!(pseudo_angle(1.0, 1.0) < pseudo_angle(0.0, 1.0));
/// let psi = pseudo_angle(-0.3, -0.8);
/// assert!((0.0..1.0).contains(&psi));
/// ```
#[inline]
#[must_use]
pub fn pseudo_angle(dx: f64, dy: f64) -> f64 {
    let p = dx / (dx.abs() + dy.abs());
    (if dy > 0.0 { 3.0 - p } else { 1.0 + p }) / 4.0
}

// =============================================================================
// CONVEX QUADRILATERAL
// =============================================================================

/// Returns true if the quadrilateral `(a, b, c, d)` (cyclic order, diagonals
/// `a–c` and `b–d`) is strictly convex: four signed-area checks with
/// magnitude above the scalar's epsilon, plus a proper intersection of the
/// diagonals.
#[inline]
#[must_use]
pub fn is_convex_quadrilateral<T>(a: Point<T>, b: Point<T>, c: Point<T>, d: Point<T>) -> bool
where
    T: CoordinateScalar,
{
    use crate::geometry::predicates::orient2d;

    let eps = T::EPSILON.widen();
    wide_abs(orient2d(a, c, b)) > eps
        && wide_abs(orient2d(a, c, d)) > eps
        && wide_abs(orient2d(b, d, a)) > eps
        && wide_abs(orient2d(b, d, c)) > eps
        && segments_properly_intersect(a, c, b, d)
}

// =============================================================================
// TESTS
// =============================================================================
