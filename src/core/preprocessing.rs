//! Input-frame transforms applied before triangulation and inverted after.
//!
//! The centroid transform moves the point cloud's center of mass to the
//! origin; the principal-component transform additionally rotates the cloud
//! into its principal axes, which conditions elongated inputs. No scaling is
//! applied, so angles and areas — and with them the refinement thresholds —
//! keep their input units.
//!
//! Integer scalars translate only: the rotation needs the real-valued
//! operation witness, and without it the principal-component option degrades
//! to the centroid transform.

use crate::core::triangulator::Preprocessor;
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;

/// An invertible rigid transform `p ↦ R·(p − c)` fitted to the input cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preprocessing<T>
where
    T: CoordinateScalar,
{
    translation: Point<T>,
    /// Image of the x axis under `R`; `(1, 0)` when no rotation applies.
    axis: Point<T>,
    rotate: bool,
}

impl<T> Preprocessing<T>
where
    T: CoordinateScalar,
{
    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            translation: Point::new(T::zero(), T::zero()),
            axis: Point::new(T::one(), T::zero()),
            rotate: false,
        }
    }

    /// Fits the requested transform to the point cloud.
    #[must_use]
    pub fn fit(kind: Preprocessor, points: &[Point<T>]) -> Self {
        match kind {
            Preprocessor::None => Self::identity(),
            Preprocessor::Com => Self {
                translation: centroid(points),
                ..Self::identity()
            },
            Preprocessor::Pca => {
                let translation = centroid(points);
                let Some(ops) = T::real_ops() else {
                    // Integer scalars cannot rotate; translate only.
                    return Self {
                        translation,
                        ..Self::identity()
                    };
                };
                let (xx, xy, yy) = covariance(points, translation);
                let (ax, ay) = (ops.principal_axis)(xx, xy, yy);
                Self {
                    translation,
                    axis: Point::new(ax, ay),
                    rotate: true,
                }
            }
        }
    }

    /// Transforms one point into the working frame.
    #[inline]
    #[must_use]
    pub fn forward_point(&self, p: Point<T>) -> Point<T> {
        let q = p - self.translation;
        if self.rotate {
            let (ax, ay) = (self.axis.x, self.axis.y);
            Point::new(ax * q.x + ay * q.y, ax * q.y - ay * q.x)
        } else {
            q
        }
    }

    /// Transforms one point back into the input frame.
    #[inline]
    #[must_use]
    pub fn inverse_point(&self, p: Point<T>) -> Point<T> {
        let q = if self.rotate {
            let (ax, ay) = (self.axis.x, self.axis.y);
            Point::new(ax * p.x - ay * p.y, ay * p.x + ax * p.y)
        } else {
            p
        };
        q + self.translation
    }

    /// Transforms a buffer into the working frame.
    pub fn forward(&self, points: &mut [Point<T>]) {
        for p in points {
            *p = self.forward_point(*p);
        }
    }

    /// Transforms a buffer back into the input frame.
    pub fn inverse(&self, points: &mut [Point<T>]) {
        for p in points {
            *p = self.inverse_point(*p);
        }
    }
}

/// Arithmetic mean of the points, accumulated in `f64`.
fn centroid<T>(points: &[Point<T>]) -> Point<T>
where
    T: CoordinateScalar,
{
    if points.is_empty() {
        return Point::new(T::zero(), T::zero());
    }
    let n = points.len() as f64;
    let (mut sx, mut sy) = (0.0f64, 0.0f64);
    for p in points {
        let (x, y) = p.to_f64_lossy();
        sx += x;
        sy += y;
    }
    Point::new(T::from_f64_lossy(sx / n), T::from_f64_lossy(sy / n))
}

/// Covariance entries `(xx, xy, yy)` of the centered cloud.
fn covariance<T>(points: &[Point<T>], center: Point<T>) -> (T, T, T)
where
    T: CoordinateScalar,
{
    let n = points.len().max(1) as f64;
    let (cx, cy) = center.to_f64_lossy();
    let (mut xx, mut xy, mut yy) = (0.0f64, 0.0f64, 0.0f64);
    for p in points {
        let (x, y) = p.to_f64_lossy();
        let (dx, dy) = (x - cx, y - cy);
        xx += dx * dx;
        xy += dx * dy;
        yy += dy * dy;
    }
    (
        T::from_f64_lossy(xx / n),
        T::from_f64_lossy(xy / n),
        T::from_f64_lossy(yy / n),
    )
}

// =============================================================================
// TESTS
// =============================================================================
