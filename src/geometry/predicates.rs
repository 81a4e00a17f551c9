//! Geometric predicates shared by every pipeline stage.
//!
//! All predicates widen coordinates into [`CoordinateScalar::Wide`] *before*
//! the first subtraction, so integer inputs stay sign-exact (the in-circle
//! determinant's partial sums need 128-bit intermediates for `i32`).
//!
//! The mesh convention is **clockwise** triangles: a triangle `(a, b, c)` in
//! storage order satisfies `orient2d(a, b, c) < 0` with the standard
//! counterclockwise-positive determinant. The in-circle and containment
//! predicates below are documented against that convention.

use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;

// =============================================================================
// RESULT ENUMS
// =============================================================================

/// Represents the orientation of a point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The triple winds clockwise (determinant < 0) — the mesh convention.
    NEGATIVE,
    /// The triple is collinear (determinant = 0).
    DEGENERATE,
    /// The triple winds counterclockwise (determinant > 0).
    POSITIVE,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

/// Represents the position of a point relative to a circumcircle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InCircle {
    /// The point is outside the circumcircle
    OUTSIDE,
    /// The point is on the circumcircle
    BOUNDARY,
    /// The point is inside the circumcircle
    INSIDE,
}

impl std::fmt::Display for InCircle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BOUNDARY => write!(f, "BOUNDARY"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

// =============================================================================
// ORIENTATION
// =============================================================================

/// The signed-area determinant `(b - a) × (c - a)` in the widened domain.
///
/// Positive for counterclockwise triples, negative for clockwise ones.
#[inline]
#[must_use]
pub fn orient2d<T>(a: Point<T>, b: Point<T>, c: Point<T>) -> T::Wide
where
    T: CoordinateScalar,
{
    let (ax, ay) = (a.x.widen(), a.y.widen());
    (b.x.widen() - ax) * (c.y.widen() - ay) - (b.y.widen() - ay) * (c.x.widen() - ax)
}

/// Classifies the winding of a point triple.
///
/// # Examples
///
/// ```
/// use ruppert::geometry::point::Point;
/// use ruppert::geometry::predicates::{orientation, Orientation};
///
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(1.0, 0.0);
/// let c = Point::new(0.0, 1.0);
/// assert_eq!(orientation(a, b, c), Orientation::POSITIVE);
/// assert_eq!(orientation(a, c, b), Orientation::NEGATIVE);
/// assert_eq!(orientation(a, b, b), Orientation::DEGENERATE);
/// ```
#[inline]
#[must_use]
pub fn orientation<T>(a: Point<T>, b: Point<T>, c: Point<T>) -> Orientation
where
    T: CoordinateScalar,
{
    match sign(orient2d(a, b, c)) {
        -1 => Orientation::NEGATIVE,
        0 => Orientation::DEGENERATE,
        _ => Orientation::POSITIVE,
    }
}

/// Sign of a widened scalar as `-1`, `0`, or `1`.
#[inline]
#[must_use]
pub fn sign<W>(value: W) -> i8
where
    W: num_traits::Zero + PartialOrd,
{
    if value < W::zero() {
        -1
    } else if value > W::zero() {
        1
    } else {
        0
    }
}

// =============================================================================
// IN-CIRCLE
// =============================================================================

/// Position of `p` relative to the circumcircle of the **clockwise** triangle
/// `(a, b, c)`.
///
/// Standard 3×3 determinant over coordinates relative to the query point,
/// evaluated in the widened domain. With a clockwise triple a negative
/// determinant means the query point lies inside.
///
/// # Examples
///
/// ```
/// use ruppert::geometry::point::Point;
/// use ruppert::geometry::predicates::{in_circle, InCircle};
///
/// // Clockwise right triangle; circumcircle centered on (0.5, 0.5).
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(0.0, 1.0);
/// let c = Point::new(1.0, 0.0);
/// assert_eq!(in_circle(a, b, c, Point::new(0.9, 0.9)), InCircle::INSIDE);
/// assert_eq!(in_circle(a, b, c, Point::new(1.0, 1.0)), InCircle::BOUNDARY);
/// assert_eq!(in_circle(a, b, c, Point::new(2.0, 2.0)), InCircle::OUTSIDE);
/// ```
#[inline]
#[must_use]
pub fn in_circle<T>(a: Point<T>, b: Point<T>, c: Point<T>, p: Point<T>) -> InCircle
where
    T: CoordinateScalar,
{
    let (px, py) = (p.x.widen(), p.y.widen());
    let (adx, ady) = (a.x.widen() - px, a.y.widen() - py);
    let (bdx, bdy) = (b.x.widen() - px, b.y.widen() - py);
    let (cdx, cdy) = (c.x.widen() - px, c.y.widen() - py);

    let am = adx * adx + ady * ady;
    let bm = bdx * bdx + bdy * bdy;
    let cm = cdx * cdx + cdy * cdy;

    let det = adx * (bdy * cm - bm * cdy) - ady * (bdx * cm - bm * cdx)
        + am * (bdx * cdy - bdy * cdx);

    match sign(det) {
        -1 => InCircle::INSIDE,
        0 => InCircle::BOUNDARY,
        _ => InCircle::OUTSIDE,
    }
}

// =============================================================================
// CONTAINMENT AND SEGMENT PREDICATES
// =============================================================================

/// Returns true if `p` lies inside or on the **clockwise** triangle
/// `(a, b, c)`: on the right of (or on) each directed side.
#[inline]
#[must_use]
pub fn point_in_triangle<T>(p: Point<T>, a: Point<T>, b: Point<T>, c: Point<T>) -> bool
where
    T: CoordinateScalar,
{
    sign(orient2d(a, b, p)) <= 0 && sign(orient2d(b, c, p)) <= 0 && sign(orient2d(c, a, p)) <= 0
}

/// Returns true if open segments `(a0, a1)` and `(b0, b1)` properly cross:
/// each segment's endpoints lie strictly on opposite sides of the other's
/// supporting line. Touching at an endpoint or collinear overlap does not
/// count as a proper crossing.
#[inline]
#[must_use]
pub fn segments_properly_intersect<T>(
    a0: Point<T>,
    a1: Point<T>,
    b0: Point<T>,
    b1: Point<T>,
) -> bool
where
    T: CoordinateScalar,
{
    let o1 = sign(orient2d(a0, a1, b0));
    let o2 = sign(orient2d(a0, a1, b1));
    let o3 = sign(orient2d(b0, b1, a0));
    let o4 = sign(orient2d(b0, b1, a1));
    o1 * o2 < 0 && o3 * o4 < 0
}

/// Returns true if `p` lies on the open segment `(a, b)`: collinear with it
/// and strictly between the endpoints.
#[inline]
#[must_use]
pub fn point_on_open_segment<T>(p: Point<T>, a: Point<T>, b: Point<T>) -> bool
where
    T: CoordinateScalar,
{
    if sign(orient2d(a, b, p)) != 0 {
        return false;
    }
    // Strictly between: the vectors toward either endpoint point apart.
    let (px, py) = (p.x.widen(), p.y.widen());
    let toward_a = (a.x.widen() - px, a.y.widen() - py);
    let toward_b = (b.x.widen() - px, b.y.widen() - py);
    sign(toward_a.0 * toward_b.0 + toward_a.1 * toward_b.1) < 0
}

// =============================================================================
// TESTS
// =============================================================================
