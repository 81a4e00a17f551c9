//! The shared halfedge mesh mutated by every pipeline stage.
//!
//! A triangulation is three parallel sequences indexed by halfedge id
//! `h ∈ [0, 3T)`: the origin vertex of each halfedge, the twin halfedge (or
//! [`NONE`] on the boundary), and the per-halfedge constraint state, plus the
//! vertex positions. Halfedges `3t, 3t+1, 3t+2` form triangle `t` in
//! clockwise orientation; all neighbor operations are integer arithmetic
//! plus one indirection.
//!
//! Vertex indices are stable while constraints are inserted, compacted by
//! the planting stage (which removes triangles and orphaned vertices), and
//! append-only during refinement.

use crate::geometry::point::Point;
use crate::geometry::predicates::{orientation, Orientation};
use crate::geometry::traits::coordinate::CoordinateScalar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel for "no halfedge": the twin of a boundary halfedge, a removed
/// queue entry, an absent map slot.
pub const NONE: i32 = -1;

// =============================================================================
// HALFEDGE STATE
// =============================================================================

/// Constraint state of a halfedge. Twins always agree.
///
/// The variants are totally ordered; when a constraint overlaps an existing
/// marked halfedge the effective state is the maximum of the two.
///
/// # Examples
///
/// ```
/// use ruppert::core::mesh::HalfedgeState;
///
/// assert!(HalfedgeState::Unconstrained < HalfedgeState::Constrained);
/// assert_eq!(
///     HalfedgeState::Constrained.max(HalfedgeState::ConstrainedAndHoleBoundary),
///     HalfedgeState::ConstrainedAndHoleBoundary
/// );
/// ```
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum HalfedgeState {
    /// An ordinary Delaunay edge.
    #[default]
    Unconstrained,
    /// A forced edge the triangulation must contain.
    Constrained,
    /// A forced edge that additionally delimits a hole/boundary loop for
    /// the planting stage.
    ConstrainedAndHoleBoundary,
}

impl HalfedgeState {
    /// Returns true for any constrained variant.
    #[inline]
    #[must_use]
    pub fn is_constrained(self) -> bool {
        self != Self::Unconstrained
    }

    /// Returns true if this state delimits a hole/boundary loop.
    #[inline]
    #[must_use]
    pub fn is_hole_boundary(self) -> bool {
        self == Self::ConstrainedAndHoleBoundary
    }
}

// =============================================================================
// HALFEDGE ARITHMETIC
// =============================================================================

/// The halfedge following `h` inside its triangle.
#[inline]
#[must_use]
pub const fn next_halfedge(h: i32) -> i32 {
    h - h % 3 + (h + 1) % 3
}

/// The halfedge preceding `h` inside its triangle.
#[inline]
#[must_use]
pub const fn prev_halfedge(h: i32) -> i32 {
    h - h % 3 + (h + 2) % 3
}

// =============================================================================
// MESH
// =============================================================================

/// Halfedge triangulation mesh shared by the pipeline stages.
///
/// See the [module docs](self) for the representation; the derived
/// invariants are checked by [`Mesh::is_valid`].
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Mesh<T>
where
    T: CoordinateScalar,
{
    /// Vertex positions. May grow during refinement.
    pub positions: Vec<Point<T>>,
    /// Origin vertex index of each halfedge.
    pub triangles: Vec<i32>,
    /// Twin halfedge of each halfedge, or [`NONE`] on the boundary.
    pub halfedges: Vec<i32>,
    /// Constraint state of each halfedge.
    pub constrained: Vec<HalfedgeState>,
}

impl<T> Mesh<T>
where
    T: CoordinateScalar,
{
    /// An empty mesh over the given positions.
    #[must_use]
    pub fn with_positions(positions: Vec<Point<T>>) -> Self {
        Self {
            positions,
            triangles: Vec::new(),
            halfedges: Vec::new(),
            constrained: Vec::new(),
        }
    }

    /// Number of triangles currently stored.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Position of vertex `v`.
    #[inline]
    #[must_use]
    pub fn point(&self, v: i32) -> Point<T> {
        self.positions[v as usize]
    }

    /// Origin vertex of halfedge `h`.
    #[inline]
    #[must_use]
    pub fn origin(&self, h: i32) -> i32 {
        self.triangles[h as usize]
    }

    /// Destination vertex of halfedge `h`.
    #[inline]
    #[must_use]
    pub fn destination(&self, h: i32) -> i32 {
        self.triangles[next_halfedge(h) as usize]
    }

    /// Twin of halfedge `h`, or [`NONE`] on the boundary.
    #[inline]
    #[must_use]
    pub fn twin(&self, h: i32) -> i32 {
        self.halfedges[h as usize]
    }

    /// Links `a` and `b` as twins. Either side may be [`NONE`].
    #[inline]
    pub fn link(&mut self, a: i32, b: i32) {
        if a != NONE {
            self.halfedges[a as usize] = b;
        }
        if b != NONE {
            self.halfedges[b as usize] = a;
        }
    }

    /// Appends the clockwise triangle `(i0, i1, i2)` and links its halfedges
    /// against twins `(a, b, c)`. Returns the id of the triangle's first
    /// halfedge.
    pub fn add_triangle(&mut self, i0: i32, i1: i32, i2: i32, a: i32, b: i32, c: i32) -> i32 {
        let t = self.triangles.len() as i32;
        self.triangles.extend_from_slice(&[i0, i1, i2]);
        self.halfedges.extend_from_slice(&[NONE, NONE, NONE]);
        self.constrained.extend_from_slice(&[
            HalfedgeState::Unconstrained,
            HalfedgeState::Unconstrained,
            HalfedgeState::Unconstrained,
        ]);
        self.link(t, a);
        self.link(t + 1, b);
        self.link(t + 2, c);
        t
    }

    /// Marks halfedge `h` and its twin with `max(current, state)`.
    pub fn constrain(&mut self, h: i32, state: HalfedgeState) {
        let merged = self.constrained[h as usize].max(state);
        self.constrained[h as usize] = merged;
        let t = self.twin(h);
        if t != NONE {
            self.constrained[t as usize] = merged;
        }
    }

    /// Finds the halfedge running from vertex `u` to vertex `v` by scanning,
    /// or `None` if the mesh holds no such edge. Linear in the mesh size;
    /// intended for tests and one-off queries.
    #[must_use]
    pub fn find_halfedge(&self, u: i32, v: i32) -> Option<i32> {
        (0..self.triangles.len() as i32)
            .find(|&h| self.origin(h) == u && self.destination(h) == v)
    }

    // =========================================================================
    // COMPACTION
    // =========================================================================

    /// Removes every triangle flagged in `remove`, compacting the three
    /// halfedge arrays in place. Returns the triangle remap: for each old
    /// triangle id its new id, or [`NONE`] if removed. Surviving halfedges
    /// whose twin was removed become boundary ([`NONE`]) halfedges.
    pub fn compact_triangles(&mut self, remove: &[bool]) -> Vec<i32> {
        debug_assert_eq!(remove.len(), self.triangle_count());

        let mut remap = vec![NONE; remove.len()];
        let mut kept = 0i32;
        for (t, removed) in remove.iter().enumerate() {
            if !removed {
                remap[t] = kept;
                kept += 1;
            }
        }

        for t in 0..remove.len() {
            let new_t = remap[t];
            if new_t == NONE {
                continue;
            }
            for k in 0..3usize {
                let src = 3 * t + k;
                let dst = (3 * new_t) as usize + k;
                self.triangles[dst] = self.triangles[src];
                let twin = self.halfedges[src];
                self.halfedges[dst] = remap_halfedge(&remap, twin);
                self.constrained[dst] = self.constrained[src];
            }
        }

        let len = (3 * kept) as usize;
        self.triangles.truncate(len);
        self.halfedges.truncate(len);
        self.constrained.truncate(len);
        remap
    }

    /// Drops positions no surviving triangle references and rewrites vertex
    /// indices. Returns the vertex remap (old index to new index, or
    /// [`NONE`] if dropped).
    pub fn compact_vertices(&mut self) -> Vec<i32> {
        let mut used = vec![false; self.positions.len()];
        for &v in &self.triangles {
            used[v as usize] = true;
        }

        let mut remap = vec![NONE; self.positions.len()];
        let mut kept = 0i32;
        for (v, in_use) in used.iter().enumerate() {
            if *in_use {
                remap[v] = kept;
                self.positions[kept as usize] = self.positions[v];
                kept += 1;
            }
        }
        self.positions.truncate(kept as usize);

        for v in &mut self.triangles {
            *v = remap[*v as usize];
        }
        remap
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Checks the structural mesh invariants: array consistency, index
    /// bounds, twin reciprocity and twin vertex relations, constraint-state
    /// agreement on twins, and clockwise non-degenerate triangles.
    ///
    /// # Errors
    ///
    /// Returns the first [`MeshValidationError`] encountered.
    pub fn is_valid(&self) -> Result<(), MeshValidationError> {
        let len = self.triangles.len();
        if len % 3 != 0 || self.halfedges.len() != len || self.constrained.len() != len {
            return Err(MeshValidationError::InconsistentArrayLengths {
                triangles: len,
                halfedges: self.halfedges.len(),
                constrained: self.constrained.len(),
            });
        }

        let vertex_count = self.positions.len() as i32;
        for (h, &v) in self.triangles.iter().enumerate() {
            if v < 0 || v >= vertex_count {
                return Err(MeshValidationError::VertexOutOfBounds {
                    halfedge: h,
                    vertex: v,
                });
            }
        }

        for h in 0..len as i32 {
            let twin = self.halfedges[h as usize];
            if twin == NONE {
                continue;
            }
            if twin < 0 || twin as usize >= len {
                return Err(MeshValidationError::TwinOutOfBounds { halfedge: h, twin });
            }
            if self.halfedges[twin as usize] != h {
                return Err(MeshValidationError::TwinMismatch { halfedge: h, twin });
            }
            if self.origin(h) != self.destination(twin)
                || self.destination(h) != self.origin(twin)
            {
                return Err(MeshValidationError::TwinVertexMismatch { halfedge: h, twin });
            }
            if self.constrained[h as usize] != self.constrained[twin as usize] {
                return Err(MeshValidationError::TwinStateMismatch { halfedge: h, twin });
            }
        }

        for t in 0..self.triangle_count() {
            let h = (3 * t) as i32;
            let (a, b, c) = (
                self.point(self.origin(h)),
                self.point(self.origin(h + 1)),
                self.point(self.origin(h + 2)),
            );
            match orientation(a, b, c) {
                Orientation::NEGATIVE => {}
                Orientation::DEGENERATE => {
                    return Err(MeshValidationError::DegenerateTriangle { triangle: t });
                }
                Orientation::POSITIVE => {
                    return Err(MeshValidationError::CounterclockwiseTriangle { triangle: t });
                }
            }
        }

        Ok(())
    }
}

/// Applies a triangle remap to a halfedge id: removed neighbors map to
/// [`NONE`].
#[inline]
#[must_use]
pub fn remap_halfedge(triangle_remap: &[i32], h: i32) -> i32 {
    if h == NONE {
        return NONE;
    }
    let t = triangle_remap[(h / 3) as usize];
    if t == NONE { NONE } else { 3 * t + h % 3 }
}

// =============================================================================
// VALIDATION ERRORS
// =============================================================================

/// Errors reported by [`Mesh::is_valid`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshValidationError {
    /// The three halfedge arrays disagree in length.
    #[error(
        "inconsistent array lengths: triangles {triangles}, halfedges {halfedges}, constrained {constrained}"
    )]
    InconsistentArrayLengths {
        /// Length of the triangles array.
        triangles: usize,
        /// Length of the halfedges array.
        halfedges: usize,
        /// Length of the constrained array.
        constrained: usize,
    },
    /// A halfedge origin indexes outside the positions array.
    #[error("halfedge {halfedge} references vertex {vertex} out of bounds")]
    VertexOutOfBounds {
        /// The offending halfedge.
        halfedge: usize,
        /// The out-of-range vertex index.
        vertex: i32,
    },
    /// A twin id indexes outside the halfedge array.
    #[error("halfedge {halfedge} has out-of-bounds twin {twin}")]
    TwinOutOfBounds {
        /// The offending halfedge.
        halfedge: i32,
        /// The out-of-range twin id.
        twin: i32,
    },
    /// Twin reciprocity is broken.
    #[error("halfedge {halfedge} and twin {twin} are not mutual")]
    TwinMismatch {
        /// The offending halfedge.
        halfedge: i32,
        /// Its claimed twin.
        twin: i32,
    },
    /// A twin pair does not run over the same vertex pair.
    #[error("halfedge {halfedge} and twin {twin} disagree on endpoints")]
    TwinVertexMismatch {
        /// The offending halfedge.
        halfedge: i32,
        /// Its twin.
        twin: i32,
    },
    /// A twin pair disagrees on the constraint state.
    #[error("halfedge {halfedge} and twin {twin} disagree on constraint state")]
    TwinStateMismatch {
        /// The offending halfedge.
        halfedge: i32,
        /// Its twin.
        twin: i32,
    },
    /// A triangle has collinear vertices.
    #[error("triangle {triangle} is degenerate")]
    DegenerateTriangle {
        /// The offending triangle.
        triangle: usize,
    },
    /// A triangle is wound counterclockwise.
    #[error("triangle {triangle} is wound counterclockwise")]
    CounterclockwiseTriangle {
        /// The offending triangle.
        triangle: usize,
    },
}

// =============================================================================
// TESTS
// =============================================================================
