//! Pipeline status codes.
//!
//! A single [`Status`] value is accumulated into a shared cell as the
//! pipeline runs: the first error wins within a stage, and every later stage
//! short-circuits when the cell holds an error. The output carries whatever
//! mesh was built up to that point.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of a triangulation run.
///
/// `Ok` is the success value; every other variant is the first error the
/// pipeline encountered. Validation errors are only produced when
/// [`validate_input`](crate::core::triangulator::TriangulatorSettings) is
/// enabled — with validation skipped, ill-formed inputs are the caller's
/// responsibility.
///
/// # Examples
///
/// ```
/// use ruppert::core::status::Status;
///
/// let status = Status::default();
/// assert_eq!(status, Status::Ok);
/// assert!(status.is_ok());
/// assert!(Status::DegenerateInput.is_error());
/// ```
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error,
)]
pub enum Status {
    /// The pipeline completed successfully.
    #[default]
    #[error("triangulation completed successfully")]
    Ok,

    /// Fewer than three points, or the seed triangle search found only
    /// collinear points.
    #[error("input is degenerate: all points are collinear or fewer than 3 points were given")]
    DegenerateInput,

    /// Fewer than three input positions.
    #[error("at least 3 positions are required, got {count}")]
    PositionsLengthLessThan3 {
        /// Number of positions supplied.
        count: usize,
    },

    /// A position holds a NaN or infinite coordinate.
    #[error("position {index} must be finite")]
    PositionsMustBeFinite {
        /// Index of the offending position.
        index: usize,
    },

    /// Two input positions coincide.
    #[error("position {index} duplicates an earlier position")]
    DuplicatePosition {
        /// Index of the later duplicate.
        index: usize,
    },

    /// The flat constraint-edge array has odd length.
    #[error("constraint edges array length {count} is not divisible by 2")]
    ConstraintsLengthNotDivisibleBy2 {
        /// Length of the constraint-edge array.
        count: usize,
    },

    /// The constraint-type array disagrees with the edge count.
    #[error("constraint edge types length must equal the number of constraint edge pairs")]
    ConstraintArrayLengthMismatch,

    /// A constraint endpoint indexes outside the positions array.
    #[error("constraint {index} endpoint pair {pair:?} is out of bounds for {positions} positions")]
    ConstraintOutOfBounds {
        /// Index of the constraint pair.
        index: usize,
        /// The offending endpoint pair.
        pair: (i32, i32),
        /// Number of positions supplied.
        positions: usize,
    },

    /// A constraint joins a vertex to itself.
    #[error("constraint {index} endpoint pair {pair:?} is a self-loop")]
    ConstraintSelfLoop {
        /// Index of the constraint pair.
        index: usize,
        /// The offending endpoint pair.
        pair: (i32, i32),
    },

    /// Two constraints share the same endpoint set.
    #[error("constraint {second} duplicates constraint {first}")]
    DuplicateConstraint {
        /// Index of the earlier constraint.
        first: usize,
        /// Index of the duplicating constraint.
        second: usize,
    },

    /// Two distinct constraints properly cross.
    #[error("constraints {first} and {second} intersect")]
    ConstraintIntersection {
        /// Index of one crossing constraint.
        first: usize,
        /// Index of the other crossing constraint.
        second: usize,
    },

    /// Hole seeds were supplied without any constraint edges.
    #[error("hole seeds were provided but there are no constraint edges")]
    RedundantHolesArray,

    /// A hole seed holds a NaN or infinite coordinate.
    #[error("hole seed {index} must be finite")]
    HoleMustBeFinite {
        /// Index of the offending hole seed.
        index: usize,
    },

    /// `auto_holes_and_boundary` requires constraint edges.
    #[error("auto holes-and-boundary requires constraint edges")]
    ConstraintEdgesMissingForAutoHolesAndBoundary,

    /// `restore_boundary` requires constraint edges.
    #[error("restore boundary requires constraint edges")]
    ConstraintEdgesMissingForRestoreBoundary,

    /// Refinement was requested for a coordinate scalar that cannot
    /// support it (validation-time check).
    #[error("mesh refinement is not supported for this coordinate type")]
    RefinementNotSupportedForCoordinateType,

    /// `sloan_max_iters` must be positive.
    #[error("sloan_max_iters must be positive, got {value}")]
    SloanMaxItersMustBePositive {
        /// The configured value.
        value: usize,
    },

    /// The refinement area threshold must be positive.
    #[error("refinement area threshold must be positive")]
    RefinementThresholdAreaMustBePositive,

    /// The refinement angle threshold must lie in `[0, π/4]`.
    #[error("refinement angle threshold must lie in [0, pi/4]")]
    RefinementThresholdAngleOutOfRange,

    /// The constrained-edge flip loop did not converge within the
    /// configured iteration budget.
    #[error("sloan flip loop exceeded the configured iteration budget")]
    SloanMaxItersExceeded,

    /// Refinement reached the mesh but the scalar lacks the real-valued
    /// operations (integer coordinates).
    #[error("integer coordinates do not support mesh refinement")]
    IntegersDoNotSupportMeshRefinement,
}

impl Status {
    /// Returns true for [`Status::Ok`].
    #[inline]
    #[must_use]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// Returns true for every variant except [`Status::Ok`].
    #[inline]
    #[must_use]
    pub fn is_error(self) -> bool {
        !self.is_ok()
    }
}

/// The shared status cell threaded through the pipeline stages.
///
/// The first error sticks; later writes are ignored.
#[derive(Debug, Default, Clone)]
pub struct StatusCell {
    current: Status,
}

impl StatusCell {
    /// A fresh cell holding [`Status::Ok`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current status.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Status {
        self.current
    }

    /// Records `status` unless an earlier error already stuck.
    #[inline]
    pub fn set(&mut self, status: Status) {
        if self.current.is_ok() {
            self.current = status;
        }
    }

    /// Returns true while no error has been recorded.
    #[inline]
    #[must_use]
    pub fn ok(&self) -> bool {
        self.current.is_ok()
    }
}
