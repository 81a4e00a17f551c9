//! # ruppert
//!
//! A two-dimensional **constrained Delaunay triangulator** with Ruppert mesh
//! refinement, built on a compact halfedge representation.
//!
//! # Features
//!
//! - Incremental Delaunay construction (Bowyer–Watson with a convex-hull
//!   pseudoangle hash, after Mapbox's *delaunator*)
//! - Constrained edge insertion by Sloan's edge-flipping scheme, with
//!   constraints split at vertices lying exactly on them
//! - Hole and exterior removal: explicit hole seeds, boundary restoration,
//!   and an automatic even–odd mode
//! - Ruppert's Delaunay refinement with concentric-shell segment splitting
//!   and circumcenter insertion
//! - Generic coordinate scalars (`f32`, `f64`, and `i32` with widened
//!   128-bit determinant intermediates; integers refuse refinement)
//! - Serialization/deserialization of inputs and outputs with
//!   [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use ruppert::prelude::*;
//!
//! let positions = [
//!     Point::new(0.0_f64, 0.0),
//!     Point::new(1.0, 0.0),
//!     Point::new(0.0, 1.0),
//! ];
//! let triangulation = Triangulator::default().triangulate(&Input::new(&positions));
//!
//! assert_eq!(triangulation.status, Status::Ok);
//! // Triangles are wound clockwise; boundary halfedges carry -1.
//! assert_eq!(triangulation.triangles, vec![0, 2, 1]);
//! assert_eq!(triangulation.halfedges, vec![-1, -1, -1]);
//! ```
//!
//! # Constraints, holes, refinement
//!
//! Constraint edges are flat index pairs into `positions`. Edges typed
//! [`HalfedgeState::ConstrainedAndHoleBoundary`](core::mesh::HalfedgeState)
//! additionally delimit hole/boundary loops for the planting stage:
//!
//! ```rust
//! use ruppert::prelude::*;
//!
//! let positions = [
//!     Point::new(0.0_f64, 0.0),
//!     Point::new(4.0, 0.0),
//!     Point::new(4.0, 4.0),
//!     Point::new(0.0, 4.0),
//! ];
//! let edges = [0, 1, 1, 2, 2, 3, 3, 0];
//! let settings = TriangulatorSettingsBuilder::default()
//!     .restore_boundary(true)
//!     .build()
//!     .unwrap();
//! let input = Input::new(&positions).with_constraint_edges(&edges);
//! let triangulation = Triangulator::new(settings).triangulate(&input);
//! assert_eq!(triangulation.status, Status::Ok);
//! assert_eq!(triangulation.triangles.len(), 6);
//! ```
//!
//! # Pipeline and invariants
//!
//! A triangulation run executes fixed stages on one shared mesh:
//! *preprocess → validate → delaunay → constrain → plant → refine →
//! postprocess*. A single [`Status`](core::status::Status) cell records the
//! first error; every later stage short-circuits, leaving the output
//! truncated to whatever was built.
//!
//! After a successful run the mesh satisfies the structural invariants
//! checked by [`Mesh::is_valid`](core::mesh::Mesh::is_valid):
//!
//! - **Twin reciprocity** – `halfedges[halfedges[h]] == h` away from the
//!   boundary, and twins agree on their constrained state.
//! - **Orientation** – every triangle is wound clockwise.
//! - **Non-degeneracy** – no triangle has collinear vertices.
//! - **Constraint containment** – every input constraint is covered by a
//!   path of halfedges marked at least `Constrained`.
//!
//! With refinement enabled, every triangle additionally satisfies the
//! configured maximum-area and minimum-angle bounds.
//!
//! # Determinism
//!
//! The pipeline is single-threaded and allocation-scoped; given identical
//! inputs and the same scalar type, two runs produce byte-identical outputs.
//! Independent triangulations may run in parallel on disjoint
//! [`Triangulator`](core::triangulator::Triangulator) instances.

// Allow multiple crate versions due to transitive dependencies
#![expect(clippy::multiple_crate_versions)]
// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// The `core` module contains the mesh data structure, the pipeline stages,
/// and the triangulator entry point.
pub mod core {
    /// Pipeline stage algorithms operating on the shared halfedge mesh.
    pub mod algorithms {
        /// Incremental Delaunay construction with a convex-hull hash
        pub mod delaunay;
        /// Seed-based hole and exterior removal
        pub mod planting;
        /// Ruppert's Delaunay refinement
        pub mod refinement;
        /// Sloan's constrained edge insertion
        pub mod sloan;
        pub use delaunay::*;
        pub use planting::*;
        pub use refinement::*;
        pub use sloan::*;
    }
    /// High-performance collection types for triangulation internals
    pub mod collections;
    pub mod mesh;
    /// Input-frame transforms applied before and inverted after a run
    pub mod preprocessing;
    pub mod status;
    pub mod triangulator;
    /// Opt-in input validation (a pure predicate over inputs)
    pub mod validation;
    // Re-export the `core` modules.
    pub use mesh::*;
    pub use status::*;
    pub use triangulator::*;
    // Note: collections module not re-exported here to avoid namespace
    // pollution; import via prelude or crate::core::collections.
}

/// Contains geometric types including the planar `Point` and the predicates
/// shared by every pipeline stage.
pub mod geometry {
    pub mod point;
    pub mod predicates;
    /// Geometric utility functions (circumcircles, pseudoangles, quads)
    pub mod util;
    /// Coordinate abstractions: the arithmetic capability every stage is
    /// written against.
    pub mod traits {
        pub mod coordinate;
        pub use coordinate::*;
    }
    pub use point::*;
    pub use predicates::*;
    pub use traits::*;
    pub use util::*;
}

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    pub use crate::core::{
        mesh::{HalfedgeState, Mesh, NONE},
        status::Status,
        triangulator::{
            Input, Preprocessor, Triangulation, Triangulator, TriangulatorSettings,
            TriangulatorSettingsBuilder,
        },
    };

    pub use crate::core::collections::{FastHashMap, FastHashSet, SmallBuffer};

    pub use crate::geometry::{
        point::Point,
        predicates::{InCircle, Orientation},
        traits::coordinate::{CoordinateScalar, FiniteCheck, RealOps},
    };
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{
        core::{mesh::Mesh, status::Status, triangulator::Triangulation},
        geometry::point::Point,
        is_normal,
    };

    #[test]
    fn normal_types() {
        assert!(is_normal::<Point<f64>>());
        assert!(is_normal::<Point<f32>>());
        assert!(is_normal::<Point<i32>>());
        assert!(is_normal::<Mesh<f64>>());
        assert!(is_normal::<Triangulation<f64>>());
        assert!(is_normal::<Status>());
    }

    #[test]
    fn test_prelude_exports() {
        use crate::prelude::*;

        let mut map: FastHashMap<u64, usize> = FastHashMap::default();
        map.insert(123, 456);
        assert_eq!(map.get(&123), Some(&456));

        let mut set: FastHashSet<u64> = FastHashSet::default();
        set.insert(789);
        assert!(set.contains(&789));

        let mut buffer: SmallBuffer<i32, 8> = SmallBuffer::new();
        buffer.push(42);
        assert_eq!(buffer.len(), 1);

        let p = Point::new(1.0_f64, 2.0);
        assert_eq!(p.x, 1.0);
        assert_eq!(p.y, 2.0);
    }
}
