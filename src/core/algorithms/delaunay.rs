//! Incremental Delaunay construction.
//!
//! Bowyer–Watson in the sweep-circle formulation of Mapbox's *delaunator*:
//! a seed triangle is chosen near the centroid of the cloud, the remaining
//! points are inserted in order of distance from its circumcenter, and a
//! convex hull maintained as a circular linked list with a pseudoangle
//! bucket hash locates the visible hull edge for each insertion in expected
//! constant time. Every new triangle is legalized against the in-circle
//! predicate with a bounded explicit stack.
//!
//! The mesh convention is clockwise triangles; the hull list runs clockwise
//! with the triangulation on the right of each boundary halfedge.
//!
//! Ordering heuristics (seed choice, insertion order, hash buckets) are
//! evaluated in `f64`, which is exact for every provided scalar; all
//! decisions that affect correctness (visibility, legalization) use the
//! widened exact predicates.

use crate::core::mesh::{Mesh, NONE};
use crate::core::status::{Status, StatusCell};
use crate::geometry::point::Point;
use crate::geometry::predicates::{in_circle, orient2d, orientation, sign, InCircle, Orientation};
use crate::geometry::traits::coordinate::CoordinateScalar;
use crate::geometry::util::{circum_center, circum_radius_sq, pseudo_angle};

/// Builds the Delaunay triangulation of the mesh's positions in place.
///
/// Sets [`Status::DegenerateInput`] and leaves the mesh empty when fewer
/// than three points are given or every seed candidate is collinear.
pub fn triangulate<T>(mesh: &mut Mesh<T>, status: &mut StatusCell)
where
    T: CoordinateScalar,
{
    let n = mesh.positions.len();
    if n < 3 {
        status.set(Status::DegenerateInput);
        return;
    }

    let coords: Vec<(f64, f64)> = mesh.positions.iter().map(|p| p.to_f64_lossy()).collect();

    let Some((i0, i1, i2)) = select_seed_triangle(mesh, &coords) else {
        status.set(Status::DegenerateInput);
        return;
    };

    let (s0, s1, s2) = (
        shadow(&coords, i0),
        shadow(&coords, i1),
        shadow(&coords, i2),
    );
    let Some(center) = circum_center(s0, s1, s2) else {
        status.set(Status::DegenerateInput);
        return;
    };

    // Insertion order: squared distance from the seed circumcenter, ties
    // broken by index so runs are reproducible.
    let mut dists = vec![0.0f64; n];
    for (i, &(x, y)) in coords.iter().enumerate() {
        let (dx, dy) = (x - center.x, y - center.y);
        dists[i] = dx * dx + dy * dy;
    }
    let mut ids: Vec<i32> = (0..n as i32).collect();
    ids.sort_unstable_by(|&a, &b| {
        dists[a as usize]
            .partial_cmp(&dists[b as usize])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let max_triangles = 2 * n - 5;
    mesh.triangles.reserve(3 * max_triangles);
    mesh.halfedges.reserve(3 * max_triangles);
    mesh.constrained.reserve(3 * max_triangles);

    let mut hull = HullState::new(n, center, (3 * max_triangles).min(512));
    hull.start = i0;
    hull.next[i0 as usize] = i1;
    hull.prev[i2 as usize] = i1;
    hull.next[i1 as usize] = i2;
    hull.prev[i0 as usize] = i2;
    hull.next[i2 as usize] = i0;
    hull.prev[i1 as usize] = i0;
    hull.tri[i0 as usize] = 0;
    hull.tri[i1 as usize] = 1;
    hull.tri[i2 as usize] = 2;
    hull.rehash(i0, coords[i0 as usize]);
    hull.rehash(i1, coords[i1 as usize]);
    hull.rehash(i2, coords[i2 as usize]);

    mesh.add_triangle(i0, i1, i2, NONE, NONE, NONE);

    let eps = T::EPSILON.to_f64_lossy();
    let (mut xp, mut yp) = (f64::NAN, f64::NAN);
    for (k, &i) in ids.iter().enumerate() {
        let (x, y) = coords[i as usize];

        // Skip near-duplicates of the previously visited point.
        if k > 0 && (x - xp).abs() <= eps && (y - yp).abs() <= eps {
            continue;
        }
        xp = x;
        yp = y;

        if i == i0 || i == i1 || i == i2 {
            continue;
        }

        insert_point(mesh, &mut hull, i, (x, y));
    }
}

/// Seed selection: `i0` closest to the bounding-box center, `i1` closest to
/// `i0`, `i2` minimizing the circumradius of the triple, then swapped into
/// clockwise order. `None` when every candidate triple is collinear.
fn select_seed_triangle<T>(mesh: &Mesh<T>, coords: &[(f64, f64)]) -> Option<(i32, i32, i32)>
where
    T: CoordinateScalar,
{
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &(x, y) in coords {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

    let mut i0 = 0i32;
    let mut best = f64::INFINITY;
    for (i, &(x, y)) in coords.iter().enumerate() {
        let d = (x - cx) * (x - cx) + (y - cy) * (y - cy);
        if d < best {
            best = d;
            i0 = i as i32;
        }
    }
    let (x0, y0) = coords[i0 as usize];

    let mut i1 = NONE;
    let mut best = f64::INFINITY;
    for (i, &(x, y)) in coords.iter().enumerate() {
        if i as i32 == i0 {
            continue;
        }
        let d = (x - x0) * (x - x0) + (y - y0) * (y - y0);
        if d < best {
            best = d;
            i1 = i as i32;
        }
    }

    let mut i2 = NONE;
    let mut best = f64::INFINITY;
    for (i, _) in coords.iter().enumerate() {
        if i as i32 == i0 || i as i32 == i1 {
            continue;
        }
        let Some(r2) = circum_radius_sq(
            shadow(coords, i0),
            shadow(coords, i1),
            shadow(coords, i as i32),
        ) else {
            continue;
        };
        if r2 < best {
            best = r2;
            i2 = i as i32;
        }
    }
    if i1 == NONE || i2 == NONE {
        return None;
    }

    // Orient the seed clockwise; the exact predicate has the final word on
    // degeneracy.
    let (mut i1, mut i2) = (i1, i2);
    match orientation(mesh.point(i0), mesh.point(i1), mesh.point(i2)) {
        Orientation::POSITIVE => std::mem::swap(&mut i1, &mut i2),
        Orientation::DEGENERATE => return None,
        Orientation::NEGATIVE => {}
    }
    Some((i0, i1, i2))
}

#[inline]
fn shadow(coords: &[(f64, f64)], i: i32) -> Point<f64> {
    let (x, y) = coords[i as usize];
    Point::new(x, y)
}

// =============================================================================
// HULL STATE
// =============================================================================

/// Convex hull as a circular doubly-linked vertex list plus a pseudoangle
/// bucket hash of `⌈√n⌉` buckets. Deletion is soft: a removed vertex `v` has
/// `next[v] == v` and probes skip it.
struct HullState {
    start: i32,
    next: Vec<i32>,
    prev: Vec<i32>,
    /// One boundary halfedge per hull vertex: the halfedge running from the
    /// vertex toward its hull successor.
    tri: Vec<i32>,
    hash: Vec<i32>,
    center: Point<f64>,
    /// Bounded legalization stack storage.
    stack: Vec<i32>,
    stack_cap: usize,
}

impl HullState {
    fn new(n: usize, center: Point<f64>, stack_cap: usize) -> Self {
        let hash_size = (n as f64).sqrt().ceil() as usize;
        Self {
            start: 0,
            next: vec![0; n],
            prev: vec![0; n],
            tri: vec![0; n],
            hash: vec![NONE; hash_size],
            center,
            stack: Vec::with_capacity(stack_cap.min(512)),
            stack_cap,
        }
    }

    #[inline]
    fn hash_key(&self, (x, y): (f64, f64)) -> usize {
        let angle = pseudo_angle(x - self.center.x, y - self.center.y);
        let buckets = self.hash.len();
        ((angle * buckets as f64).floor() as usize) % buckets
    }

    #[inline]
    fn rehash(&mut self, v: i32, at: (f64, f64)) {
        let key = self.hash_key(at);
        self.hash[key] = v;
    }
}

// =============================================================================
// POINT INSERTION
// =============================================================================

/// Strict visibility of point `p` from the hull edge `a → b`: the hull runs
/// clockwise with the triangulation on the right, so the edge is visible iff
/// `p` lies strictly on its left.
#[inline]
fn visible<T>(mesh: &Mesh<T>, a: i32, b: i32, p: Point<T>) -> bool
where
    T: CoordinateScalar,
{
    sign(orient2d(mesh.point(a), mesh.point(b), p)) > 0
}

fn insert_point<T>(mesh: &mut Mesh<T>, hull: &mut HullState, i: i32, at: (f64, f64))
where
    T: CoordinateScalar,
{
    let p = mesh.point(i);

    // Probe the hash for a live hull vertex near the query pseudoangle.
    let key = hull.hash_key(at);
    let buckets = hull.hash.len();
    let mut start = NONE;
    for j in 0..buckets {
        start = hull.hash[(key + j) % buckets];
        if start != NONE && start != hull.next[start as usize] {
            break;
        }
    }
    if start == NONE {
        return;
    }
    start = hull.prev[start as usize];

    // Walk to the first hull edge visible from p.
    let mut e = start;
    loop {
        let q = hull.next[e as usize];
        if visible(mesh, e, q, p) {
            break;
        }
        e = q;
        if e == start {
            // Likely a near-duplicate or a point on the hull chain; skip it.
            return;
        }
    }

    // First triangle, filling the visible edge e -> q with apex i.
    let q = hull.next[e as usize];
    let t = mesh.add_triangle(e, i, q, NONE, NONE, hull.tri[e as usize]);
    hull.tri[i as usize] = legalize(mesh, hull, t + 2);
    hull.tri[e as usize] = t;

    // Walk forward along the hull, filling every further visible edge.
    let mut n = q;
    loop {
        let q = hull.next[n as usize];
        if !visible(mesh, n, q, p) {
            break;
        }
        let t = mesh.add_triangle(n, i, q, hull.tri[i as usize], NONE, hull.tri[n as usize]);
        hull.tri[i as usize] = legalize(mesh, hull, t + 2);
        hull.next[n as usize] = n; // soft-delete from the hull
        n = q;
    }

    // Walk backward only if the first visible edge was the walk's start.
    if e == start {
        loop {
            let q = hull.prev[e as usize];
            if !visible(mesh, q, e, p) {
                break;
            }
            let t = mesh.add_triangle(q, i, e, NONE, hull.tri[e as usize], hull.tri[q as usize]);
            legalize(mesh, hull, t + 2);
            hull.tri[q as usize] = t;
            hull.next[e as usize] = e; // soft-delete from the hull
            e = q;
        }
    }

    // Splice i between e and n, and rehash the two new hull edge endpoints.
    hull.start = e;
    hull.prev[i as usize] = e;
    hull.next[e as usize] = i;
    hull.prev[n as usize] = i;
    hull.next[i as usize] = n;
    hull.rehash(i, at);
    let (ex, ey) = mesh.point(e).to_f64_lossy();
    hull.rehash(e, (ex, ey));
}

// =============================================================================
// LEGALIZATION
// =============================================================================

/// Legalizes halfedge `a` against the in-circle predicate, flipping and
/// recursing onto the exposed edges via a bounded explicit stack. Returns
/// the halfedge that ends up running from the newly inserted point along the
/// hull (delaunator's `ar` bookkeeping).
fn legalize<T>(mesh: &mut Mesh<T>, hull: &mut HullState, a: i32) -> i32
where
    T: CoordinateScalar,
{
    let mut a = a;
    hull.stack.clear();
    let mut ar;
    loop {
        let b = mesh.halfedges[a as usize];
        let a0 = a - a % 3;
        ar = a0 + (a + 2) % 3;

        if b == NONE {
            match hull.stack.pop() {
                Some(next) => {
                    a = next;
                    continue;
                }
                None => break,
            }
        }

        let b0 = b - b % 3;
        let al = a0 + (a + 1) % 3;
        let bl = b0 + (b + 2) % 3;

        let p0 = mesh.triangles[ar as usize];
        let pr = mesh.triangles[a as usize];
        let pl = mesh.triangles[al as usize];
        let p1 = mesh.triangles[bl as usize];

        let illegal = in_circle(
            mesh.point(p0),
            mesh.point(pr),
            mesh.point(pl),
            mesh.point(p1),
        ) == InCircle::INSIDE;

        if illegal {
            mesh.triangles[a as usize] = p1;
            mesh.triangles[b as usize] = p0;

            let hbl = mesh.halfedges[bl as usize];
            // The flipped edge was on the hull; repoint the boundary
            // reference at its new slot.
            if hbl == NONE {
                let mut e = hull.start;
                loop {
                    if hull.tri[e as usize] == bl {
                        hull.tri[e as usize] = a;
                        break;
                    }
                    e = hull.prev[e as usize];
                    if e == hull.start {
                        break;
                    }
                }
            }
            mesh.link(a, hbl);
            let har = mesh.halfedges[ar as usize];
            mesh.link(b, har);
            mesh.link(ar, bl);

            let br = b0 + (b + 1) % 3;
            if hull.stack.len() < hull.stack_cap {
                hull.stack.push(br);
            }
        } else {
            match hull.stack.pop() {
                Some(next) => {
                    a = next;
                    continue;
                }
                None => break,
            }
        }
    }
    ar
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::HalfedgeState;

    fn run(points: Vec<Point<f64>>) -> (Mesh<f64>, Status) {
        let mut mesh = Mesh::with_positions(points);
        let mut status = StatusCell::new();
        triangulate(&mut mesh, &mut status);
        (mesh, status.get())
    }

    #[test]
    fn single_triangle() {
        let (mesh, status) = run(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ]);
        assert_eq!(status, Status::Ok);
        assert_eq!(mesh.triangles, vec![0, 2, 1]);
        assert_eq!(mesh.halfedges, vec![NONE, NONE, NONE]);
        assert_eq!(mesh.constrained, vec![HalfedgeState::Unconstrained; 3]);
        assert!(mesh.is_valid().is_ok());
    }

    #[test]
    fn unit_square_two_triangles() {
        let (mesh, status) = run(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]);
        assert_eq!(status, Status::Ok);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.is_valid().is_ok());
        // Exactly one interior edge, i.e. one twin pair.
        let interior = mesh.halfedges.iter().filter(|&&h| h != NONE).count();
        assert_eq!(interior, 2);
        // The traced construction order: seed (0, 2, 1), then (0, 3, 2).
        assert_eq!(mesh.triangles, vec![0, 2, 1, 0, 3, 2]);
        assert_eq!(mesh.halfedges, vec![5, NONE, NONE, NONE, NONE, 0]);
    }

    #[test]
    fn too_few_points_is_degenerate() {
        let (mesh, status) = run(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert_eq!(status, Status::DegenerateInput);
        assert!(mesh.triangles.is_empty());
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let (mesh, status) = run(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.0),
        ]);
        assert_eq!(status, Status::DegenerateInput);
        assert!(mesh.triangles.is_empty());
    }

    #[test]
    fn grid_triangulation_is_delaunay() {
        let mut points = Vec::new();
        for gy in 0..5 {
            for gx in 0..5 {
                // Perturb slightly so no four points are cocircular.
                let jitter = f64::from(gx * 7 + gy * 3 % 5) * 1e-3;
                points.push(Point::new(f64::from(gx) + jitter, f64::from(gy) - jitter));
            }
        }
        let n = points.len();
        let (mesh, status) = run(points);
        assert_eq!(status, Status::Ok);
        assert!(mesh.is_valid().is_ok());

        // Euler: a triangulation of n points with h hull vertices has
        // 2n - 2 - h triangles; with jitter the hull stays small, so just
        // bound it.
        let t = mesh.triangle_count();
        assert!(t >= n && t <= 2 * n - 5, "unexpected triangle count {t}");

        // The empty-circumcircle property: no vertex strictly inside any
        // triangle's circumcircle.
        for tri in 0..t {
            let (a, b, c) = (
                mesh.triangles[3 * tri],
                mesh.triangles[3 * tri + 1],
                mesh.triangles[3 * tri + 2],
            );
            for v in 0..n as i32 {
                if v == a || v == b || v == c {
                    continue;
                }
                assert_ne!(
                    in_circle(mesh.point(a), mesh.point(b), mesh.point(c), mesh.point(v)),
                    InCircle::INSIDE,
                    "vertex {v} violates the circumcircle of triangle {tri}"
                );
            }
        }
    }

    #[test]
    fn integer_coordinates_triangulate_exactly() {
        let mut mesh = Mesh::with_positions(vec![
            Point::new(0i32, 0),
            Point::new(100, 0),
            Point::new(100, 100),
            Point::new(0, 100),
            Point::new(50, 40),
        ]);
        let mut status = StatusCell::new();
        triangulate(&mut mesh, &mut status);
        assert_eq!(status.get(), Status::Ok);
        assert!(mesh.is_valid().is_ok());
        assert_eq!(mesh.triangle_count(), 4);
    }

    #[test]
    fn duplicate_points_are_skipped_without_validation() {
        let (mesh, status) = run(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 0.0), // exact duplicate of vertex 1
        ]);
        assert_eq!(status, Status::Ok);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.is_valid().is_ok());
    }

    #[test]
    fn runs_are_bitwise_deterministic() {
        let points: Vec<Point<f64>> = (0..40)
            .map(|i| {
                let t = f64::from(i) * 0.7;
                Point::new(t.sin() * 10.0, t.cos() * 7.0 + t * 0.1)
            })
            .collect();
        let (mesh_a, status_a) = run(points.clone());
        let (mesh_b, status_b) = run(points);
        assert_eq!(status_a, status_b);
        assert_eq!(mesh_a, mesh_b);
    }
}
