//! The triangulator entry point: settings, inputs, outputs, and the stage
//! pipeline.
//!
//! A [`Triangulator`] owns its settings and runs the fixed stage sequence
//! *preprocess → validate → delaunay → constrain → plant → refine →
//! postprocess* on one shared [`Mesh`], threading a single [`Status`] cell
//! through: the first error short-circuits every later stage and the output
//! carries whatever was built up to that point.
//!
//! The pipeline is single-threaded and synchronous; it owns its working
//! buffers for the duration of one call and keeps no state between calls, so
//! independent triangulations may run in parallel on disjoint instances.

use crate::core::algorithms::{delaunay, planting, refinement, sloan};
use crate::core::mesh::{HalfedgeState, Mesh};
use crate::core::preprocessing::Preprocessing;
use crate::core::status::{Status, StatusCell};
use crate::core::validation::validate_input;
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;
use serde::{Deserialize, Serialize};

// =============================================================================
// SETTINGS
// =============================================================================

/// Input-frame transform applied before triangulation and inverted on the
/// way out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preprocessor {
    /// Triangulate in the input frame.
    #[default]
    None,
    /// Translate the center of mass to the origin.
    Com,
    /// Translate to the center of mass and rotate into the principal axes.
    Pca,
}

/// Configuration for a [`Triangulator`].
///
/// Construct via [`TriangulatorSettingsBuilder`]; every field has a default.
///
/// # Examples
///
/// ```
/// use ruppert::core::triangulator::TriangulatorSettingsBuilder;
///
/// let settings = TriangulatorSettingsBuilder::default()
///     .refine_mesh(true)
///     .refinement_area(0.05)
///     .refinement_angle(20f64.to_radians())
///     .build()
///     .unwrap();
/// assert!(settings.validate_input);
/// assert_eq!(settings.sloan_max_iters, 1_000_000);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default)]
pub struct TriangulatorSettings {
    /// Input-frame transform. Default: [`Preprocessor::None`].
    pub preprocessor: Preprocessor,
    /// Run the validation stage before triangulating. Default: `true`.
    pub validate_input: bool,
    /// Remove holes and the exterior by the even–odd rule, walking inward
    /// from the outside. Requires constraint edges. Default: `false`.
    pub auto_holes_and_boundary: bool,
    /// Remove every triangle reachable from an unconstrained piece of the
    /// convex hull boundary. Requires constraint edges. Default: `false`.
    pub restore_boundary: bool,
    /// Run Ruppert refinement after planting. Default: `false`.
    pub refine_mesh: bool,
    /// Iteration budget for the constrained-edge flip loop, per constraint.
    /// Must be positive. Default: `1_000_000`.
    pub sloan_max_iters: usize,
    /// Refinement maximum triangle area. Must be positive. Default: `1.0`.
    pub refinement_area: f64,
    /// Refinement minimum angle in radians, in `[0, π/4]`. Default: 5°.
    pub refinement_angle: f64,
}

impl Default for TriangulatorSettings {
    fn default() -> Self {
        Self {
            preprocessor: Preprocessor::None,
            validate_input: true,
            auto_holes_and_boundary: false,
            restore_boundary: false,
            refine_mesh: false,
            sloan_max_iters: 1_000_000,
            refinement_area: 1.0,
            refinement_angle: 5.0f64.to_radians(),
        }
    }
}

// =============================================================================
// INPUT
// =============================================================================

/// Borrowed triangulation inputs.
///
/// `constraint_edges` holds flat index pairs into `positions`; when
/// `constraint_edge_types` is absent every constraint defaults to
/// [`HalfedgeState::ConstrainedAndHoleBoundary`]. Hole seeds are ignored
/// (and rejected under validation) without constraint edges.
#[derive(Debug, Clone, Copy)]
pub struct Input<'a, T>
where
    T: CoordinateScalar,
{
    /// The points to triangulate.
    pub positions: &'a [Point<T>],
    /// Flat constraint endpoint pairs.
    pub constraint_edges: &'a [i32],
    /// One state per constraint pair, or `None` for the default.
    pub constraint_edge_types: Option<&'a [HalfedgeState]>,
    /// Seed points marking hole interiors.
    pub hole_seeds: &'a [Point<T>],
}

impl<'a, T> Input<'a, T>
where
    T: CoordinateScalar,
{
    /// Input holding only positions.
    #[must_use]
    pub const fn new(positions: &'a [Point<T>]) -> Self {
        Self {
            positions,
            constraint_edges: &[],
            constraint_edge_types: None,
            hole_seeds: &[],
        }
    }

    /// Attaches constraint edges.
    #[must_use]
    pub const fn with_constraint_edges(mut self, edges: &'a [i32]) -> Self {
        self.constraint_edges = edges;
        self
    }

    /// Attaches per-constraint states.
    #[must_use]
    pub const fn with_constraint_edge_types(mut self, types: &'a [HalfedgeState]) -> Self {
        self.constraint_edge_types = Some(types);
        self
    }

    /// Attaches hole seed points.
    #[must_use]
    pub const fn with_hole_seeds(mut self, seeds: &'a [Point<T>]) -> Self {
        self.hole_seeds = seeds;
        self
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// The result of a triangulation run.
///
/// On success the four mesh arrays satisfy the invariants listed in the
/// [crate docs](crate); on error they hold whatever was built before the
/// pipeline short-circuited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Triangulation<T>
where
    T: CoordinateScalar,
{
    /// Vertex positions, with Steiner points appended by refinement.
    pub positions: Vec<Point<T>>,
    /// Flat clockwise vertex triples.
    pub triangles: Vec<i32>,
    /// Twin halfedges, `-1` on the boundary.
    pub halfedges: Vec<i32>,
    /// Per-halfedge constraint state.
    pub constrained_halfedges: Vec<HalfedgeState>,
    /// Outcome of the run.
    pub status: Status,
}

impl<T> Triangulation<T>
where
    T: CoordinateScalar,
{
    /// Converts into a `Result`, surfacing the status as the error.
    ///
    /// # Errors
    ///
    /// Returns the status when the run did not complete successfully.
    pub fn ok(self) -> Result<Self, Status> {
        if self.status.is_ok() {
            Ok(self)
        } else {
            Err(self.status)
        }
    }

    /// Number of triangles in the output.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

// =============================================================================
// TRIANGULATOR
// =============================================================================

/// A constrained Delaunay triangulator with Ruppert refinement.
///
/// See the [crate docs](crate) for usage examples.
#[derive(Debug, Default, Clone)]
pub struct Triangulator {
    settings: TriangulatorSettings,
}

impl Triangulator {
    /// A triangulator with the given settings.
    #[must_use]
    pub const fn new(settings: TriangulatorSettings) -> Self {
        Self { settings }
    }

    /// The active settings.
    #[must_use]
    pub const fn settings(&self) -> &TriangulatorSettings {
        &self.settings
    }

    /// Runs the full pipeline on `input`.
    ///
    /// Never panics on ill-formed input when validation is enabled; the
    /// outcome is reported through [`Triangulation::status`].
    #[must_use]
    pub fn triangulate<T>(&self, input: &Input<'_, T>) -> Triangulation<T>
    where
        T: CoordinateScalar,
    {
        let settings = &self.settings;
        let mut status = StatusCell::new();

        // Preprocess: fit the transform and copy inputs into working buffers.
        let transform = Preprocessing::fit(settings.preprocessor, input.positions);
        let positions: Vec<Point<T>> = input
            .positions
            .iter()
            .map(|&p| transform.forward_point(p))
            .collect();
        let holes: Vec<Point<T>> = input
            .hole_seeds
            .iter()
            .map(|&p| transform.forward_point(p))
            .collect();

        // Validate: a pure predicate over the raw inputs.
        if settings.validate_input {
            status.set(validate_input(input, settings));
        }

        let mut mesh = Mesh::with_positions(positions);
        let has_constraints = !input.constraint_edges.is_empty();

        if status.ok() {
            delaunay::triangulate(&mut mesh, &mut status);
        }

        if status.ok() && has_constraints {
            sloan::constrain_edges(
                &mut mesh,
                input.constraint_edges,
                input.constraint_edge_types,
                settings.sloan_max_iters,
                &mut status,
            );
        }

        if status.ok() {
            planting::plant_seeds(
                &mut mesh,
                &holes,
                planting::PlantingModes {
                    auto_holes_and_boundary: settings.auto_holes_and_boundary && has_constraints,
                    restore_boundary: settings.restore_boundary && has_constraints,
                    hole_seeds: has_constraints && !holes.is_empty(),
                },
            );
        }

        if status.ok() && settings.refine_mesh {
            refinement::refine(&mut mesh, settings, has_constraints, &mut status);
        }

        // Postprocess: only a completed run leaves the working frame.
        if status.ok() {
            transform.inverse(&mut mesh.positions);
        }

        Triangulation {
            positions: mesh.positions,
            triangles: mesh.triangles,
            halfedges: mesh.halfedges,
            constrained_halfedges: mesh.constrained,
            status: status.get(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
