//! Constrained edge insertion by Sloan's edge-flipping scheme.
//!
//! For each input constraint `(u, v)` the mesh is walked from `u` through
//! its one-ring to the first triangle whose far edge crosses the segment,
//! then across the tunnel of intersected triangles until `v` — or a vertex
//! lying exactly on the segment, which splits the constraint into two
//! subconstraints. The collected crossings are resolved by repeatedly
//! flipping the diagonals of strictly convex quadrilaterals; entries whose
//! quadrilateral is not yet convex, and flipped diagonals that still cross
//! the constraint, requeue into an alternate list until none remain. A
//! per-constraint pass counter bounds the loop.
//!
//! Constraints are stored smaller endpoint first; the ordering only affects
//! symmetric lookups, never the mesh.

use crate::core::mesh::{next_halfedge, prev_halfedge, HalfedgeState, Mesh, NONE};
use crate::core::status::{Status, StatusCell};
use crate::geometry::predicates::{
    orient2d, point_on_open_segment, segments_properly_intersect, sign,
};
use crate::geometry::traits::coordinate::CoordinateScalar;
use crate::geometry::util::is_convex_quadrilateral;

/// Forces every constraint edge into the mesh, marking the covering
/// halfedges with the requested state (or the maximum of the requested and
/// existing states where constraints overlap).
///
/// Sets [`Status::SloanMaxItersExceeded`] and returns early — leaving the
/// mesh truncated to whatever was built — when a constraint's flip loop does
/// not converge within `max_iters` passes.
pub fn constrain_edges<T>(
    mesh: &mut Mesh<T>,
    edges: &[i32],
    types: Option<&[HalfedgeState]>,
    max_iters: usize,
    status: &mut StatusCell,
) where
    T: CoordinateScalar,
{
    if mesh.triangles.is_empty() || edges.is_empty() {
        return;
    }

    let mut point_to_halfedge = vec![NONE; mesh.positions.len()];
    for h in 0..mesh.triangles.len() as i32 {
        point_to_halfedge[mesh.triangles[h as usize] as usize] = h;
    }

    let mut constrainer = Constrainer {
        mesh,
        point_to_halfedge,
        intersections: Vec::new(),
        unresolved: Vec::new(),
        max_iters,
    };

    for index in 0..edges.len() / 2 {
        let (a, b) = (edges[2 * index], edges[2 * index + 1]);
        // Legacy ordering: the smaller endpoint leads.
        let (u, v) = if a <= b { (a, b) } else { (b, a) };
        let state = types.map_or(HalfedgeState::ConstrainedAndHoleBoundary, |t| t[index]);
        constrainer.apply_constraint(u, v, state, status);
        if !status.ok() {
            return;
        }
    }
}

/// Outcome of one ring walk from the constraint origin.
enum RingWalk {
    /// The constraint (or its final subsegment) already exists and was marked.
    ReachedTarget,
    /// A subedge toward a collinear vertex was marked; continue from it.
    AdvancedTo(i32),
    /// A tunnel of crossings was collected, ending at `Some(vertex)` lying
    /// exactly on the segment or at the target (`None`).
    Tunneled(Option<i32>),
    /// Nothing found — only possible on inputs that skipped validation.
    NotFound,
}

struct Constrainer<'a, T>
where
    T: CoordinateScalar,
{
    mesh: &'a mut Mesh<T>,
    /// One outgoing halfedge per vertex, maintained across flips.
    point_to_halfedge: Vec<i32>,
    intersections: Vec<i32>,
    unresolved: Vec<i32>,
    max_iters: usize,
}

impl<T> Constrainer<'_, T>
where
    T: CoordinateScalar,
{
    fn apply_constraint(&mut self, c0: i32, c1: i32, state: HalfedgeState, status: &mut StatusCell) {
        let mut u = c0;
        let v = c1;
        loop {
            match self.find_first_crossing(u, v, state) {
                RingWalk::ReachedTarget => return,
                RingWalk::AdvancedTo(w) => u = w,
                RingWalk::Tunneled(stop) => {
                    let end = stop.unwrap_or(v);
                    self.resolve(u, end, state, status);
                    if !status.ok() {
                        return;
                    }
                    if end == v {
                        return;
                    }
                    u = end;
                }
                RingWalk::NotFound => {
                    debug_assert!(false, "constraint endpoint {u} is not connected to {v}");
                    return;
                }
            }
        }
    }

    /// Walks the one-ring of `u` (both rotation directions across boundary
    /// gaps) looking for `v`, a vertex on the open segment, or the first far
    /// edge the segment crosses.
    fn find_first_crossing(&mut self, u: i32, v: i32, state: HalfedgeState) -> RingWalk {
        let start = self.point_to_halfedge[u as usize];

        let mut h = start;
        loop {
            if let Some(result) = self.check_ring_triangle(h, u, v, state) {
                return result;
            }
            let forward = self.mesh.twin(prev_halfedge(h));
            if forward == NONE {
                break;
            }
            h = forward;
            if h == start {
                return RingWalk::NotFound;
            }
        }

        // The forward sweep hit the boundary; sweep the other way from the
        // start (whose triangle is already checked).
        let mut h = start;
        loop {
            let twin = self.mesh.twin(h);
            if twin == NONE {
                return RingWalk::NotFound;
            }
            h = next_halfedge(twin);
            if let Some(result) = self.check_ring_triangle(h, u, v, state) {
                return result;
            }
        }
    }

    /// Checks one ring triangle `(u, p, q)` reached through the outgoing
    /// halfedge `h`.
    fn check_ring_triangle(
        &mut self,
        h: i32,
        u: i32,
        v: i32,
        state: HalfedgeState,
    ) -> Option<RingWalk> {
        let hn = next_halfedge(h);
        let hp = prev_halfedge(h);
        let p = self.mesh.origin(hn);
        let q = self.mesh.origin(hp);

        if p == v {
            self.mesh.constrain(h, state);
            return Some(RingWalk::ReachedTarget);
        }
        if q == v {
            self.mesh.constrain(hp, state);
            return Some(RingWalk::ReachedTarget);
        }

        let (pu, pv) = (self.mesh.point(u), self.mesh.point(v));
        let (pp, pq) = (self.mesh.point(p), self.mesh.point(q));
        if point_on_open_segment(pp, pu, pv) {
            self.mesh.constrain(h, state);
            return Some(RingWalk::AdvancedTo(p));
        }
        if point_on_open_segment(pq, pu, pv) {
            self.mesh.constrain(hp, state);
            return Some(RingWalk::AdvancedTo(q));
        }

        if segments_properly_intersect(pu, pv, pp, pq) {
            let stop = self.march_tunnel(u, v, hn);
            return Some(RingWalk::Tunneled(stop));
        }
        None
    }

    /// Marches across the tunnel of triangles intersected by the segment,
    /// collecting every crossed halfedge. Returns `Some(w)` when a vertex
    /// `w` lying exactly on the segment cuts the constraint short, `None`
    /// when the target is reached.
    fn march_tunnel(&mut self, u: i32, v: i32, first: i32) -> Option<i32> {
        let (pu, pv) = (self.mesh.point(u), self.mesh.point(v));
        self.intersections.clear();
        self.unresolved.clear();

        let mut k = first;
        self.intersections.push(k);
        loop {
            let twin = self.mesh.twin(k);
            debug_assert_ne!(twin, NONE, "constraint tunnel escaped the hull");
            let apex_he = prev_halfedge(twin);
            let w = self.mesh.origin(apex_he);
            if w == v {
                return None;
            }
            let side_w = sign(orient2d(pu, pv, self.mesh.point(w)));
            if side_w == 0 {
                debug_assert!(point_on_open_segment(self.mesh.point(w), pu, pv));
                return Some(w);
            }
            let side_o = sign(orient2d(pu, pv, self.mesh.point(self.mesh.origin(twin))));
            // Exit through whichever apex edge straddles the segment.
            k = if side_w == side_o {
                next_halfedge(twin)
            } else {
                apex_he
            };
            self.intersections.push(k);
        }
    }

    /// Flip loop: scan the intersection list, flipping strictly convex
    /// quadrilaterals; requeue non-convex entries and still-crossing new
    /// diagonals into the alternate list, then swap. The pass count is
    /// bounded per (sub)constraint.
    fn resolve(&mut self, u: i32, v: i32, state: HalfedgeState, status: &mut StatusCell) {
        let (pu, pv) = (self.mesh.point(u), self.mesh.point(v));
        let mut iters = 0usize;
        while !self.intersections.is_empty() {
            if iters >= self.max_iters {
                status.set(Status::SloanMaxItersExceeded);
                return;
            }
            iters += 1;

            for index in 0..self.intersections.len() {
                let he = self.intersections[index];
                let twin = self.mesh.twin(he);
                let o = self.mesh.origin(he);
                let d = self.mesh.origin(twin);
                let x = self.mesh.origin(prev_halfedge(he));
                let y = self.mesh.origin(prev_halfedge(twin));

                let quad_convex = is_convex_quadrilateral(
                    self.mesh.point(o),
                    self.mesh.point(x),
                    self.mesh.point(d),
                    self.mesh.point(y),
                );
                if !quad_convex {
                    self.unresolved.push(he);
                    continue;
                }

                let diagonal = self.flip_diagonal(he);
                if (x == u && y == v) || (x == v && y == u) {
                    self.mesh.constrain(diagonal, state);
                } else if segments_properly_intersect(
                    pu,
                    pv,
                    self.mesh.point(x),
                    self.mesh.point(y),
                ) {
                    self.unresolved.push(diagonal);
                }
            }
            self.intersections.clear();
            std::mem::swap(&mut self.intersections, &mut self.unresolved);
        }
    }

    /// Flips the diagonal held in halfedge `e`, keeping the two triangle
    /// slots: the diagonal lands in slots `next(e)`/`next(twin)` while the
    /// two outer edges that previously lived there migrate to `e`/`twin`,
    /// carrying their twin links and constraint states along. Pending list
    /// entries referring to the moved slots follow them. Returns the new
    /// diagonal's halfedge.
    fn flip_diagonal(&mut self, e: i32) -> i32 {
        let ep = self.mesh.twin(e);
        debug_assert_ne!(ep, NONE, "cannot flip a boundary halfedge");
        let n1 = next_halfedge(e);
        let p1 = prev_halfedge(e);
        let n2 = next_halfedge(ep);
        let p2 = prev_halfedge(ep);

        let mesh = &mut *self.mesh;
        let o = mesh.triangles[e as usize];
        let d = mesh.triangles[ep as usize];
        let x = mesh.triangles[p1 as usize];
        let y = mesh.triangles[p2 as usize];

        let outer_n1 = mesh.halfedges[n1 as usize];
        let outer_n2 = mesh.halfedges[n2 as usize];
        let state_n1 = mesh.constrained[n1 as usize];
        let state_n2 = mesh.constrained[n2 as usize];

        mesh.triangles[n1 as usize] = y;
        mesh.triangles[n2 as usize] = x;

        mesh.link(n1, n2);
        mesh.link(e, outer_n2);
        mesh.link(ep, outer_n1);

        mesh.constrained[e as usize] = state_n2;
        mesh.constrained[ep as usize] = state_n1;
        mesh.constrained[n1 as usize] = HalfedgeState::Unconstrained;
        mesh.constrained[n2 as usize] = HalfedgeState::Unconstrained;

        self.point_to_halfedge[o as usize] = e;
        self.point_to_halfedge[d as usize] = ep;
        self.point_to_halfedge[x as usize] = p1;
        self.point_to_halfedge[y as usize] = p2;

        for list in [&mut self.intersections, &mut self.unresolved] {
            for entry in list.iter_mut() {
                if *entry == n1 {
                    *entry = ep;
                } else if *entry == n2 {
                    *entry = e;
                }
            }
        }
        n1
    }
}

// =============================================================================
// TESTS
// =============================================================================
