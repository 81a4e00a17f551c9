//! Shared invariant checks for the integration suites.

// Not every suite uses every helper.
#![allow(dead_code)]

use ruppert::core::mesh::{next_halfedge, HalfedgeState, Mesh, NONE};
use ruppert::geometry::point::Point;
use ruppert::geometry::predicates::{point_on_open_segment, sign};
use ruppert::geometry::util::dot_relative;
use ruppert::prelude::Triangulation;

/// Rebuilds a [`Mesh`] view over a triangulation's output arrays so the
/// library's own structural validator can run against them.
pub fn as_mesh(triangulation: &Triangulation<f64>) -> Mesh<f64> {
    Mesh {
        positions: triangulation.positions.clone(),
        triangles: triangulation.triangles.clone(),
        halfedges: triangulation.halfedges.clone(),
        constrained: triangulation.constrained_halfedges.clone(),
    }
}

/// Structural invariants: twin reciprocity and state agreement, clockwise
/// winding, no degenerate triangles.
pub fn assert_structure(triangulation: &Triangulation<f64>) {
    let mesh = as_mesh(triangulation);
    if let Err(violation) = mesh.is_valid() {
        panic!("structural invariant violated: {violation}");
    }
}

/// Constraint containment: a path of collinear halfedges from `u` to `v`,
/// every hop marked at least [`HalfedgeState::Constrained`].
pub fn assert_constraint_covered(triangulation: &Triangulation<f64>, u: i32, v: i32) {
    let mesh = as_mesh(triangulation);
    let target = mesh.point(v);
    let mut current = u;
    let mut hops = 0;
    while current != v {
        let from = mesh.point(current);
        let next = (0..mesh.triangles.len() as i32)
            .filter(|&h| mesh.origin(h) == current)
            .filter(|&h| mesh.constrained[h as usize].is_constrained())
            .find(|&h| {
                let dest = mesh.destination(h);
                dest == v || point_on_open_segment(mesh.point(dest), from, target)
            });
        let Some(h) = next else {
            panic!("constraint ({u}, {v}) breaks at vertex {current}");
        };
        current = mesh.destination(h);
        hops += 1;
        assert!(hops <= mesh.triangles.len(), "constraint path loops");
    }
}

/// No constrained halfedge is encroached by its triangle's apex.
pub fn assert_unencroached(triangulation: &Triangulation<f64>) {
    let mesh = as_mesh(triangulation);
    for h in 0..mesh.triangles.len() as i32 {
        if !mesh.constrained[h as usize].is_constrained() {
            continue;
        }
        let a = mesh.point(mesh.origin(h));
        let b = mesh.point(mesh.destination(h));
        let apex = mesh.point(mesh.origin(next_halfedge(next_halfedge(h))));
        assert!(
            sign(dot_relative(apex, a, b)) > 0,
            "constrained halfedge {h} is encroached"
        );
    }
}

/// Quality bounds: twice-area within `2 * max_area`, every interior angle at
/// least `min_angle` radians (up to floating rounding).
pub fn assert_quality(triangulation: &Triangulation<f64>, max_area: f64, min_angle: f64) {
    let mesh = as_mesh(triangulation);
    for t in 0..mesh.triangle_count() as i32 {
        let h = 3 * t;
        let a = mesh.point(mesh.origin(h));
        let b = mesh.point(mesh.origin(h + 1));
        let c = mesh.point(mesh.origin(h + 2));
        let twice_area =
            ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)).abs();
        assert!(
            twice_area <= 2.0 * max_area + 1e-9,
            "triangle {t} has area {}",
            twice_area / 2.0
        );
        for (corner, e1, e2) in [(a, b, c), (b, c, a), (c, a, b)] {
            let u = e1 - corner;
            let v = e2 - corner;
            let angle = (u.dot(v) / (u.length_sq().sqrt() * v.length_sq().sqrt())).acos();
            assert!(
                angle >= min_angle - 1e-6,
                "triangle {t} has angle {}°",
                angle.to_degrees()
            );
        }
    }
}

/// Per-triangle centroid.
pub fn centroid(triangulation: &Triangulation<f64>, t: usize) -> Point<f64> {
    let a = triangulation.positions[triangulation.triangles[3 * t] as usize];
    let b = triangulation.positions[triangulation.triangles[3 * t + 1] as usize];
    let c = triangulation.positions[triangulation.triangles[3 * t + 2] as usize];
    Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
}

/// Counts halfedges carrying at least the given state.
pub fn count_marked(triangulation: &Triangulation<f64>, state: HalfedgeState) -> usize {
    triangulation
        .constrained_halfedges
        .iter()
        .filter(|&&s| s >= state)
        .count()
}

/// Sum of unsigned triangle areas.
pub fn total_area(triangulation: &Triangulation<f64>) -> f64 {
    (0..triangulation.triangle_count())
        .map(|t| {
            let a = triangulation.positions[triangulation.triangles[3 * t] as usize];
            let b = triangulation.positions[triangulation.triangles[3 * t + 1] as usize];
            let c = triangulation.positions[triangulation.triangles[3 * t + 2] as usize];
            ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)).abs() / 2.0
        })
        .sum()
}

/// Boundary halfedges all report `-1` twins (P6 structural face).
pub fn boundary_halfedge_count(triangulation: &Triangulation<f64>) -> usize {
    triangulation
        .halfedges
        .iter()
        .filter(|&&h| h == NONE)
        .count()
}
