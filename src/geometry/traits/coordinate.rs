//! Coordinate traits for the triangulation pipeline.
//!
//! Every pipeline stage is written against the arithmetic capability defined
//! here rather than against a concrete scalar, so the same algorithms run for
//! single-precision, double-precision, and integer coordinates.
//!
//! # Overview
//!
//! - **`CoordinateScalar`**: the main capability trait. It consolidates the
//!   numeric bounds every stage needs and adds the triangulation-specific
//!   operations: widening to a sign-exact product type, hashable coordinate
//!   keys for duplicate detection, and an optional [`RealOps`] witness for
//!   the real-valued helpers that only floating-point scalars provide.
//! - **`WideScalar`**: the widened scalar produced by `cross`/`orient2d`/
//!   `in_circle` partial products. `f32` widens to `f64`, `f64` stays `f64`,
//!   and `i32` widens to `i128` so that the 3×3 in-circle determinant's
//!   partial sums `a·(b·cp − bp·c)` never overflow.
//! - **`FiniteCheck`**: validation of coordinate values (no NaN or infinity).
//!
//! # Refinement support
//!
//! Ruppert refinement needs `cos`, `sqrt`, and the concentric-shell split
//! parameter `alpha(R, d²)` — operations with no integer counterpart.
//! Floating-point scalars hand these out through
//! [`CoordinateScalar::real_ops`]; integer scalars return `None` and the
//! refinement stage refuses to run with
//! [`Status::IntegersDoNotSupportMeshRefinement`](crate::core::status::Status).

use num_traits::{NumAssign, NumCast, Signed};
use ordered_float::OrderedFloat;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fmt::Debug,
    hash::Hash,
    ops::{Add, Div, Mul, Neg, Sub},
};

// =============================================================================
// SUPPORTING TRAITS
// =============================================================================

/// Helper trait for checking finiteness of coordinates.
///
/// Provides a unified interface for checking whether a numeric value is
/// finite (not NaN or infinite). Integer values are always finite.
///
/// # Examples
///
/// ```
/// use ruppert::geometry::traits::coordinate::FiniteCheck;
///
/// assert!(3.14f64.is_finite_generic());
/// assert!(!f64::NAN.is_finite_generic());
/// assert!(!f32::INFINITY.is_finite_generic());
/// assert!(42i32.is_finite_generic());
/// ```
pub trait FiniteCheck {
    /// Returns true if the value is finite (not NaN or infinite).
    fn is_finite_generic(&self) -> bool;
}

// Unified macro for implementing FiniteCheck
macro_rules! impl_finite_check {
    (float: $($t:ty),*) => {
        $(
            impl FiniteCheck for $t {
                #[inline(always)]
                fn is_finite_generic(&self) -> bool {
                    self.is_finite()
                }
            }
        )*
    };
    (int: $($t:ty),*) => {
        $(
            impl FiniteCheck for $t {
                #[inline(always)]
                fn is_finite_generic(&self) -> bool {
                    true
                }
            }
        )*
    };
}

impl_finite_check!(float: f32, f64);
impl_finite_check!(int: i32, i64);

/// The widened scalar produced by sign-exact products.
///
/// `orient2d`, `cross`, `dot`, `distance²`, and the in-circle determinant are
/// evaluated entirely in this type: coordinates are widened *before* the
/// first subtraction so no intermediate overflows or loses the sign.
pub trait WideScalar:
    Copy
    + Debug
    + PartialOrd
    + num_traits::Zero
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
}

impl<W> WideScalar for W where
    W: Copy
        + Debug
        + PartialOrd
        + num_traits::Zero
        + Add<Output = W>
        + Sub<Output = W>
        + Mul<Output = W>
        + Div<Output = W>
        + Neg<Output = W>
{
}

// =============================================================================
// REAL-VALUED OPERATIONS WITNESS
// =============================================================================

/// Real-valued helpers that only floating-point scalars provide.
///
/// Obtaining a value of this type through [`CoordinateScalar::real_ops`]
/// *is* the capability check: integer scalars return `None` and the stages
/// that need these helpers (refinement, PCA preprocessing) bail out with the
/// corresponding status instead.
#[derive(Clone, Copy)]
pub struct RealOps<T> {
    /// Cosine, for the minimum-angle threshold.
    pub cos: fn(T) -> T,
    /// Square root, for normalizing edge vectors and segment lengths.
    pub sqrt: fn(T) -> T,
    /// Concentric-shell split parameter: given a reference shell radius `r`
    /// and the squared segment length `d²`, returns `r/d · 2^k` with
    /// `k = round(log₂(d / 2r))`, so split points snap to shells of radius
    /// `r·2^k` centered on the segment's input endpoint.
    pub alpha: fn(T, T) -> T,
    /// Unit eigenvector of the dominant eigenvalue of the symmetric 2×2
    /// matrix `[[xx, xy], [xy, yy]]`, for principal-component alignment.
    pub principal_axis: fn(T, T, T) -> (T, T),
}

macro_rules! impl_real_ops {
    ($($t:ty),*) => {
        $(
            impl RealOps<$t> {
                fn alpha_impl(r: $t, d2: $t) -> $t {
                    let d = d2.sqrt();
                    let k = (d / (2.0 * r)).log2().round();
                    r / d * k.exp2()
                }

                fn principal_axis_impl(xx: $t, xy: $t, yy: $t) -> ($t, $t) {
                    let eigen = nalgebra::Matrix2::new(xx, xy, xy, yy).symmetric_eigen();
                    let dominant = if eigen.eigenvalues[0] >= eigen.eigenvalues[1] {
                        0
                    } else {
                        1
                    };
                    let axis = eigen.eigenvectors.column(dominant);
                    (axis[0], axis[1])
                }

                fn table() -> Self {
                    Self {
                        cos: <$t>::cos,
                        sqrt: <$t>::sqrt,
                        alpha: Self::alpha_impl,
                        principal_axis: Self::principal_axis_impl,
                    }
                }
            }
        )*
    };
}

impl_real_ops!(f32, f64);

// =============================================================================
// MAIN COORDINATE SCALAR TRAIT
// =============================================================================

/// Scalar type usable as a triangulation coordinate.
///
/// Consolidates the numeric, ordering, and serialization bounds the pipeline
/// needs, plus the capability operations described in the module docs.
///
/// # Provided implementations
///
/// | Scalar | `Wide` | `real_ops()` |
/// |--------|--------|--------------|
/// | `f32`  | `f64`  | `Some`       |
/// | `f64`  | `f64`  | `Some`       |
/// | `i32`  | `i128` | `None`       |
///
/// # Examples
///
/// ```
/// use ruppert::geometry::traits::coordinate::CoordinateScalar;
///
/// assert_eq!(<f64 as CoordinateScalar>::EPSILON, f64::EPSILON);
/// assert_eq!(<i32 as CoordinateScalar>::EPSILON, 0);
/// assert!(f64::real_ops().is_some());
/// assert!(i32::real_ops().is_none());
/// ```
pub trait CoordinateScalar:
    Copy
    + Debug
    + Default
    + PartialOrd
    + NumAssign
    + NumCast
    + Signed
    + FiniteCheck
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Widened scalar for sign-exact products.
    type Wide: WideScalar;

    /// Hashable, totally ordered key for duplicate-coordinate detection.
    type Key: Copy + Debug + Eq + Hash;

    /// Tolerance below which two coordinates count as coincident and below
    /// which a signed area counts as degenerate. Zero for integers.
    const EPSILON: Self;

    /// Widen into the sign-exact product domain.
    fn widen(self) -> Self::Wide;

    /// Narrow a widened value back into the coordinate domain. `None` when
    /// the value does not fit (out-of-range integers, non-finite floats) —
    /// the circumcenter "infinity" sentinel.
    fn narrow(wide: Self::Wide) -> Option<Self>;

    /// Lossy conversion to `f64`, for order-preserving heuristics only
    /// (pseudoangle hashing, insertion-order sort keys).
    fn to_f64_lossy(self) -> f64;

    /// Lossy conversion from `f64`, for centroids and threshold settings.
    fn from_f64_lossy(value: f64) -> Self;

    /// Hashable key with NaN-safe total equality.
    fn ordered_key(self) -> Self::Key;

    /// The real-valued operation table, or `None` for scalars that cannot
    /// represent the intermediate values (integers).
    fn real_ops() -> Option<RealOps<Self>>;
}

macro_rules! impl_coordinate_scalar_float {
    ($($t:ty => $w:ty),*) => {
        $(
            impl CoordinateScalar for $t {
                type Wide = $w;
                type Key = OrderedFloat<$t>;

                const EPSILON: Self = <$t>::EPSILON;

                #[inline(always)]
                fn widen(self) -> Self::Wide {
                    <Self::Wide as From<$t>>::from(self)
                }

                #[inline]
                fn narrow(wide: Self::Wide) -> Option<Self> {
                    let narrowed = wide as $t;
                    narrowed.is_finite().then_some(narrowed)
                }

                #[inline(always)]
                fn to_f64_lossy(self) -> f64 {
                    <f64 as From<$t>>::from(self)
                }

                #[inline(always)]
                fn from_f64_lossy(value: f64) -> Self {
                    value as $t
                }

                #[inline(always)]
                fn ordered_key(self) -> Self::Key {
                    OrderedFloat(self)
                }

                #[inline]
                fn real_ops() -> Option<RealOps<Self>> {
                    Some(RealOps::<$t>::table())
                }
            }
        )*
    };
}

impl_coordinate_scalar_float!(f32 => f64, f64 => f64);

impl CoordinateScalar for i32 {
    type Wide = i128;
    type Key = i32;

    const EPSILON: Self = 0;

    #[inline(always)]
    fn widen(self) -> Self::Wide {
        <i128 as From<i32>>::from(self)
    }

    #[inline]
    fn narrow(wide: Self::Wide) -> Option<Self> {
        Self::try_from(wide).ok()
    }

    #[inline(always)]
    fn to_f64_lossy(self) -> f64 {
        <f64 as From<i32>>::from(self)
    }

    #[inline(always)]
    fn from_f64_lossy(value: f64) -> Self {
        value as i32
    }

    #[inline(always)]
    fn ordered_key(self) -> Self::Key {
        self
    }

    #[inline]
    fn real_ops() -> Option<RealOps<Self>> {
        None
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // =============================================================================
    // FINITE CHECK TESTS
    // =============================================================================

    #[test]
    fn finite_check_floats() {
        assert!(1.0f64.is_finite_generic());
        assert!((-42.5f32).is_finite_generic());
        assert!(!f64::NAN.is_finite_generic());
        assert!(!f64::INFINITY.is_finite_generic());
        assert!(!f32::NEG_INFINITY.is_finite_generic());
    }

    #[test]
    fn finite_check_integers() {
        assert!(0i32.is_finite_generic());
        assert!(i32::MIN.is_finite_generic());
        assert!(i64::MAX.is_finite_generic());
    }

    // =============================================================================
    // WIDENING TESTS
    // =============================================================================

    #[test]
    fn widen_is_exact_for_i32() {
        assert_eq!(i32::MAX.widen(), <i128 as From<i32>>::from(i32::MAX));
        assert_eq!(i32::MIN.widen(), <i128 as From<i32>>::from(i32::MIN));
        // The widened domain absorbs products that would overflow i64.
        let big = i32::MAX.widen();
        let product = big * big * big;
        assert!(product > 0);
    }

    #[test]
    fn narrow_rejects_out_of_range() {
        assert_eq!(i32::narrow(<i128 as From<i32>>::from(i32::MAX) + 1), None);
        assert_eq!(i32::narrow(42), Some(42));
        assert_eq!(f32::narrow(<f64 as From<f32>>::from(f32::MAX) * 4.0), None);
        assert_eq!(f64::narrow(1.5), Some(1.5));
    }

    #[test]
    fn widen_f32_preserves_value() {
        assert_relative_eq!(1.25f32.widen(), 1.25f64);
    }

    // =============================================================================
    // ORDERED KEY TESTS
    // =============================================================================

    #[test]
    fn ordered_keys_hash_duplicates_together() {
        use crate::core::collections::FastHashSet;

        let mut seen: FastHashSet<(OrderedFloat<f64>, OrderedFloat<f64>)> = FastHashSet::default();
        assert!(seen.insert((1.0.ordered_key(), 2.0.ordered_key())));
        assert!(!seen.insert((1.0.ordered_key(), 2.0.ordered_key())));
        assert!(seen.insert((2.0.ordered_key(), 1.0.ordered_key())));
    }

    // =============================================================================
    // REAL OPS TESTS
    // =============================================================================

    #[test]
    fn real_ops_presence_matches_scalar_kind() {
        assert!(f32::real_ops().is_some());
        assert!(f64::real_ops().is_some());
        assert!(i32::real_ops().is_none());
    }

    #[test]
    fn alpha_snaps_to_concentric_shells() {
        let ops = f64::real_ops().unwrap();
        // d = 1, R = 0.001: k = round(log2(500)) = 9, alpha = 0.001 * 512.
        let alpha = (ops.alpha)(0.001, 1.0);
        assert_relative_eq!(alpha, 0.512, epsilon = 1e-12);
        // The split point always stays in the open interval (0, 1).
        for d2 in [0.01, 0.25, 1.0, 400.0] {
            let a = (ops.alpha)(0.001, d2);
            assert!(a > 0.0 && a < 1.0, "alpha {a} escaped (0, 1) for d2 {d2}");
        }
    }

    #[test]
    fn principal_axis_is_unit_and_dominant() {
        let ops = f64::real_ops().unwrap();
        // Strongly anisotropic covariance along x.
        let (x, y) = (ops.principal_axis)(9.0, 0.0, 1.0);
        assert_relative_eq!(x.abs(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(y.abs(), 0.0, epsilon = 1e-12);
        // Diagonal covariance rotated 45 degrees.
        let (x, y) = (ops.principal_axis)(2.0, 1.0, 2.0);
        assert_relative_eq!(x.abs(), std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(y.abs(), std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn real_ops_cos_and_sqrt_delegate() {
        let ops = f64::real_ops().unwrap();
        assert_relative_eq!((ops.cos)(0.0), 1.0);
        assert_relative_eq!((ops.sqrt)(9.0), 3.0);
    }
}
