//! Ruppert's Delaunay refinement.
//!
//! Steiner points are inserted until every constrained segment is
//! unencroached and every triangle satisfies the maximum-area and
//! minimum-angle bounds. Segments come first: the encroached-segment queue
//! drains before each bad triangle is considered, and a circumcenter whose
//! cavity reaches a constrained segment it encroaches (or lies beyond) is
//! abandoned in favor of splitting those segments, with the triangle
//! requeued.
//!
//! Segment split points snap to concentric shells centered on input
//! endpoints, which prevents indefinite split cascades next to small input
//! angles. Point insertion digs a Bowyer–Watson cavity — a closed star
//! polygon in the interior, an open amphitheater when the split segment lies
//! on the boundary — and fans the new point to the cavity loop. Removing
//! cavity triangles compacts the mesh arrays, synchronously remapping every
//! live halfedge and triangle reference held in the work queues and the
//! circumcircle cache.

use crate::core::mesh::{
    next_halfedge, prev_halfedge, remap_halfedge, HalfedgeState, Mesh, NONE,
};
use crate::core::status::{Status, StatusCell};
use crate::core::triangulator::TriangulatorSettings;
use crate::geometry::point::Point;
use crate::geometry::predicates::{orient2d, sign};
use crate::geometry::traits::coordinate::{CoordinateScalar, RealOps};
use crate::geometry::util::{circum_center, dot_relative, wide_abs};
use crate::core::collections::FastHashSet;
use std::collections::VecDeque;

/// Reference radius of the concentric shells around input endpoints.
const SHELL_RADIUS: f64 = 0.001;

/// Refines the mesh in place until the quality bounds of `settings` hold.
///
/// Scalars without real-valued operations (integers) refuse with
/// [`Status::IntegersDoNotSupportMeshRefinement`].
pub fn refine<T>(
    mesh: &mut Mesh<T>,
    settings: &TriangulatorSettings,
    has_constraints: bool,
    status: &mut StatusCell,
) where
    T: CoordinateScalar,
{
    let Some(ops) = T::real_ops() else {
        status.set(Status::IntegersDoNotSupportMeshRefinement);
        return;
    };
    if mesh.triangles.is_empty() {
        return;
    }

    // Pin the boundary so every cavity walk is fenced in: without
    // constraints the hull is the only boundary and is rebuilt from
    // scratch; with constraints, any unmarked boundary halfedge left by
    // planting is upgraded, never downgraded.
    if has_constraints {
        for h in 0..mesh.halfedges.len() {
            if mesh.halfedges[h] == NONE {
                mesh.constrained[h] =
                    mesh.constrained[h].max(HalfedgeState::ConstrainedAndHoleBoundary);
            }
        }
    } else {
        for h in 0..mesh.halfedges.len() {
            mesh.constrained[h] = if mesh.halfedges[h] == NONE {
                HalfedgeState::ConstrainedAndHoleBoundary
            } else {
                HalfedgeState::Unconstrained
            };
        }
    }

    let cache: Vec<Circle<T>> = (0..mesh.triangle_count() as i32)
        .map(|t| Circle::of_triangle(mesh, t))
        .collect();
    let initial_points = mesh.positions.len();
    let mut refiner = Refiner {
        mesh,
        cache,
        he_queue: VecDeque::new(),
        t_queue: VecDeque::new(),
        initial_points,
        ops,
        max_twice_area: T::from_f64_lossy(2.0 * settings.refinement_area).widen(),
        cos_min: (ops.cos)(T::from_f64_lossy(settings.refinement_angle)),
    };

    // Warm-up: split segments until none is encroached, ignoring triangle
    // quality so segments become safe first.
    for h in 0..refiner.mesh.triangles.len() as i32 {
        if refiner.mesh.constrained[h as usize].is_constrained() && refiner.encroached(h) {
            refiner.he_queue.push_back(h);
        }
    }
    refiner.drain_segments();

    // Quality phase: one bad triangle at a time, segments always first.
    refiner.t_queue.clear();
    for t in 0..refiner.mesh.triangle_count() as i32 {
        if refiner.is_bad(t) {
            refiner.t_queue.push_back(t);
        }
    }
    loop {
        refiner.drain_segments();
        match refiner.t_queue.pop_front() {
            None => break,
            Some(NONE) => {}
            Some(t) => {
                if refiner.is_bad(t) {
                    refiner.try_insert_circumcenter(t);
                }
            }
        }
    }
}

// =============================================================================
// CIRCUMCIRCLE CACHE
// =============================================================================

/// Cached circumcircle of a live triangle.
#[derive(Debug, Clone, Copy)]
struct Circle<T>
where
    T: CoordinateScalar,
{
    center: Point<T>,
    radius_sq: T,
}

impl<T> Circle<T>
where
    T: CoordinateScalar,
{
    fn of_triangle(mesh: &Mesh<T>, t: i32) -> Self {
        let h = 3 * t;
        let a = mesh.point(mesh.origin(h));
        let b = mesh.point(mesh.origin(h + 1));
        let c = mesh.point(mesh.origin(h + 2));
        match circum_center(a, b, c) {
            Some(center) => Self {
                center,
                radius_sq: (center - a).length_sq(),
            },
            // A degenerate circle contains nothing; such a triangle can only
            // appear through floating-point collapse and is left alone.
            None => Self {
                center: a,
                radius_sq: -T::one(),
            },
        }
    }

    #[inline]
    fn contains(&self, p: Point<T>) -> bool {
        (p - self.center).length_sq() < self.radius_sq
    }
}

// =============================================================================
// REFINER
// =============================================================================

/// What kind of point is being inserted.
enum Insertion {
    /// Splitting the segment held by this halfedge.
    SegmentSplit { he: i32, state: HalfedgeState },
    /// Inserting the circumcenter of this bad triangle.
    Circumcenter { triangle: i32 },
}

struct Refiner<'a, T>
where
    T: CoordinateScalar,
{
    mesh: &'a mut Mesh<T>,
    cache: Vec<Circle<T>>,
    he_queue: VecDeque<i32>,
    t_queue: VecDeque<i32>,
    /// Vertices below this index are input points; the rest are Steiner.
    initial_points: usize,
    ops: RealOps<T>,
    max_twice_area: T::Wide,
    cos_min: T,
}

impl<T> Refiner<'_, T>
where
    T: CoordinateScalar,
{
    /// Splits encroached segments until the queue is dry.
    fn drain_segments(&mut self) {
        while let Some(he) = self.he_queue.pop_front() {
            if he == NONE {
                continue;
            }
            if !self.mesh.constrained[he as usize].is_constrained() || !self.encroached(he) {
                continue;
            }
            self.split_segment(he);
        }
    }

    /// A constrained halfedge is encroached iff its triangle's apex lies in
    /// the segment's diametral circle: `(a − c) · (b − c) ≤ 0`.
    fn encroached(&self, he: i32) -> bool {
        let a = self.mesh.point(self.mesh.origin(he));
        let b = self.mesh.point(self.mesh.destination(he));
        let apex = self.mesh.point(self.mesh.origin(prev_halfedge(he)));
        sign(dot_relative(apex, a, b)) <= 0
    }

    fn encroached_by(&self, he: i32, p: Point<T>) -> bool {
        let a = self.mesh.point(self.mesh.origin(he));
        let b = self.mesh.point(self.mesh.destination(he));
        sign(dot_relative(p, a, b)) <= 0
    }

    /// A triangle is bad when its doubled area exceeds the doubled area
    /// bound, or some corner's angle falls below the angle bound (tested
    /// against the cosine of the normalized edge-vector pair).
    fn is_bad(&self, t: i32) -> bool {
        let h = 3 * t;
        let a = self.mesh.point(self.mesh.origin(h));
        let b = self.mesh.point(self.mesh.origin(h + 1));
        let c = self.mesh.point(self.mesh.origin(h + 2));

        if wide_abs(orient2d(a, b, c)) > self.max_twice_area {
            return true;
        }

        for (corner, e1, e2) in [(a, b, c), (b, c, a), (c, a, b)] {
            let u = e1 - corner;
            let v = e2 - corner;
            let dot = u.dot(v);
            if dot <= T::zero() {
                continue;
            }
            let len = (self.ops.sqrt)(u.length_sq()) * (self.ops.sqrt)(v.length_sq());
            if dot > self.cos_min * len {
                return true;
            }
        }
        false
    }

    // =========================================================================
    // SEGMENT SPLITTING
    // =========================================================================

    /// Split point on the segment: plain midpoint between endpoints of the
    /// same kind, otherwise snapped to the concentric shell grid centered on
    /// the input endpoint.
    fn split_point(&self, he: i32) -> Point<T> {
        let a = self.mesh.origin(he);
        let b = self.mesh.destination(he);
        let (pa, pb) = (self.mesh.point(a), self.mesh.point(b));
        let a_input = (a as usize) < self.initial_points;
        let b_input = (b as usize) < self.initial_points;

        if a_input == b_input {
            return pa.lerp(pb, T::from_f64_lossy(0.5));
        }
        let (input_end, steiner_end) = if a_input { (pa, pb) } else { (pb, pa) };
        let d2 = (steiner_end - input_end).length_sq();
        let alpha = (self.ops.alpha)(T::from_f64_lossy(SHELL_RADIUS), d2);
        input_end.lerp(steiner_end, alpha)
    }

    fn split_segment(&mut self, he: i32) {
        let p = self.split_point(he);
        let state = self.mesh.constrained[he as usize];
        self.insert_point(p, &Insertion::SegmentSplit { he, state });
    }

    // =========================================================================
    // CIRCUMCENTER INSERTION
    // =========================================================================

    fn try_insert_circumcenter(&mut self, t: i32) {
        let circle = self.cache[t as usize];
        // A degenerate circle means the triangle has collapsed numerically;
        // no Steiner point can improve it.
        if circle.radius_sq < T::zero() {
            return;
        }
        self.insert_point(circle.center, &Insertion::Circumcenter { triangle: t });
    }

    // =========================================================================
    // CAVITY INSERTION
    // =========================================================================

    /// Bowyer–Watson insertion of `p`. For a segment split the cavity seeds
    /// on both sides of the split halfedge; for a circumcenter it grows from
    /// the bad triangle and aborts — queueing the offending segments and
    /// requeueing the triangle — when the cavity boundary holds a
    /// constrained segment that `p` encroaches or lies beyond.
    #[allow(clippy::too_many_lines)]
    fn insert_point(&mut self, p: Point<T>, kind: &Insertion) {
        let (seed_he, split_state) = match kind {
            Insertion::SegmentSplit { he, state } => (Some(*he), Some(*state)),
            Insertion::Circumcenter { .. } => (None, None),
        };

        // Grow the cavity: triangles whose circumcircle contains p, flooding
        // only across unconstrained halfedges. Seeds join unconditionally.
        let mut cavity: FastHashSet<i32> = FastHashSet::default();
        let mut pending: Vec<i32> = Vec::new();
        let mut blocking: Vec<i32> = Vec::new();

        let split_twin = seed_he.map(|he| self.mesh.twin(he));
        match kind {
            Insertion::SegmentSplit { he, .. } => {
                cavity.insert(he / 3);
                pending.push(he / 3);
                if let Some(twin) = split_twin {
                    if twin != NONE && cavity.insert(twin / 3) {
                        pending.push(twin / 3);
                    }
                }
            }
            Insertion::Circumcenter { triangle } => {
                cavity.insert(*triangle);
                pending.push(*triangle);
            }
        }

        while let Some(t) = pending.pop() {
            for k in 0..3 {
                let h = 3 * t + k;
                if Some(h) == seed_he || Some(h) == split_twin {
                    continue;
                }
                if self.mesh.constrained[h as usize].is_constrained() {
                    // A constrained fence. For a circumcenter, a fence the
                    // point encroaches (or escapes across) wins instead.
                    if split_state.is_none()
                        && (self.encroached_by(h, p) || !self.strictly_inside(h, p))
                    {
                        blocking.push(h);
                    }
                    continue;
                }
                let twin = self.mesh.twin(h);
                if twin == NONE {
                    continue;
                }
                let neighbor = twin / 3;
                if cavity.contains(&neighbor) {
                    continue;
                }
                if self.cache[neighbor as usize].contains(p) && cavity.insert(neighbor) {
                    pending.push(neighbor);
                }
            }
        }

        if !blocking.is_empty() {
            if let Insertion::Circumcenter { triangle } = kind {
                // The rejected circumcenter justifies the split by itself,
                // so split one offending segment outright (the apex-based
                // recheck in the queue would drop it) and try the triangle
                // again; the requeued id rides the split's remap.
                self.t_queue.push_back(*triangle);
                self.split_segment(blocking[0]);
            }
            return;
        }

        // Walk the ordered cavity boundary loop. A boundary split starts at
        // the split halfedge itself (the chord); otherwise at the first
        // cavity edge whose far side survives.
        let boundary_split = seed_he.is_some() && split_twin == Some(NONE);
        let start = if boundary_split {
            seed_he.unwrap_or(NONE)
        } else {
            self.find_cavity_boundary(&cavity)
        };
        debug_assert_ne!(start, NONE);

        // (origin, destination, surviving twin, constraint state) per loop edge.
        let mut loop_edges: Vec<(i32, i32, i32, HalfedgeState)> = Vec::new();
        let mut cur = start;
        loop {
            loop_edges.push((
                self.mesh.origin(cur),
                self.mesh.destination(cur),
                self.mesh.twin(cur),
                self.mesh.constrained[cur as usize],
            ));
            cur = self.advance_cavity_boundary(&cavity, cur);
            if cur == start {
                break;
            }
        }

        // The split segment's endpoints, for re-marking the collinear fan
        // edges afterwards.
        let split_ends = seed_he.map(|he| (self.mesh.origin(he), self.mesh.destination(he)));

        // The new vertex.
        let v_new = self.mesh.positions.len() as i32;
        self.mesh.positions.push(p);

        // Delete the cavity triangles, keeping every live reference in step.
        let mut remove = vec![false; self.mesh.triangle_count()];
        for &t in &cavity {
            remove[t as usize] = true;
        }
        let remap = self.mesh.compact_triangles(&remove);
        for entry in &mut self.he_queue {
            *entry = remap_halfedge(&remap, *entry);
        }
        for entry in &mut self.t_queue {
            *entry = if *entry == NONE { NONE } else { remap[*entry as usize] };
        }
        let mut kept = 0usize;
        for (t, &target) in remap.iter().enumerate() {
            if target != NONE {
                self.cache[kept] = self.cache[t];
                kept += 1;
            }
        }
        self.cache.truncate(kept);
        for edge in &mut loop_edges {
            edge.2 = remap_halfedge(&remap, edge.2);
        }

        // Fan the new point to the loop. For a boundary split the chord
        // entry (the split halfedge itself) is skipped: the two chord
        // sub-edges arise as the fan's open ends.
        let fan: Vec<(i32, i32, i32, HalfedgeState)> = if boundary_split {
            loop_edges[1..].to_vec()
        } else {
            loop_edges
        };
        let base = self.mesh.triangle_count() as i32;
        let fan_len = fan.len() as i32;
        for &(o, d, outside, state) in &fan {
            let first = self.mesh.add_triangle(o, d, v_new, outside, NONE, NONE);
            self.mesh.constrained[first as usize] = state;
            self.cache.push(Circle::of_triangle(self.mesh, first / 3));
        }
        // Stitch consecutive fan triangles: d->p against the next one's
        // p->o. An amphitheater leaves its two chord ends open.
        for k in 0..fan_len {
            let next_k = if k + 1 < fan_len {
                k + 1
            } else if boundary_split {
                break;
            } else {
                0
            };
            self.mesh.link(3 * (base + k) + 1, 3 * (base + next_k) + 2);
        }

        // Restore the split segment along the fan edges collinear with it:
        // the edges joining the new point to the split endpoints.
        if let (Some((a, b)), Some(state)) = (split_ends, split_state) {
            for k in 0..fan_len {
                let first = 3 * (base + k);
                let d = self.mesh.destination(first);
                if d == a || d == b {
                    self.mesh.constrain(first + 1, state);
                }
                let o = self.mesh.origin(first);
                if o == a || o == b {
                    self.mesh.constrain(first + 2, state);
                }
            }
        }

        // Queue the freshly created work: encroached constrained edges and
        // bad triangles among the fan.
        for k in 0..fan_len {
            let t = base + k;
            for h in 3 * t..3 * t + 3 {
                if self.mesh.constrained[h as usize].is_constrained() && self.encroached(h) {
                    self.he_queue.push_back(h);
                }
            }
            if self.is_bad(t) {
                self.t_queue.push_back(t);
            }
        }
    }

    /// True if `p` lies strictly on the interior side (the right) of the
    /// cavity-internal halfedge `h`.
    fn strictly_inside(&self, h: i32, p: Point<T>) -> bool {
        let o = self.mesh.point(self.mesh.origin(h));
        let d = self.mesh.point(self.mesh.destination(h));
        sign(orient2d(o, d, p)) < 0
    }

    /// First halfedge of a cavity triangle whose far side is outside the
    /// cavity, scanning in triangle order for determinism.
    fn find_cavity_boundary(&self, cavity: &FastHashSet<i32>) -> i32 {
        let mut triangles: Vec<i32> = cavity.iter().copied().collect();
        triangles.sort_unstable();
        for t in triangles {
            for h in 3 * t..3 * t + 3 {
                let twin = self.mesh.twin(h);
                if twin == NONE || !cavity.contains(&(twin / 3)) {
                    return h;
                }
            }
        }
        NONE
    }

    /// The next cavity boundary halfedge after `h`, pivoting around the
    /// destination vertex through cavity triangles.
    fn advance_cavity_boundary(&self, cavity: &FastHashSet<i32>, h: i32) -> i32 {
        let mut g = next_halfedge(h);
        loop {
            let twin = self.mesh.twin(g);
            if twin == NONE || !cavity.contains(&(twin / 3)) {
                return g;
            }
            g = next_halfedge(twin);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
