//! End-to-end scenarios through the public API.

#![allow(missing_docs)]

mod common;

use common::{
    assert_constraint_covered, assert_quality, assert_structure, assert_unencroached, centroid,
    count_marked, total_area,
};
use ruppert::prelude::*;

#[test]
fn scenario_single_triangle() {
    let positions = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(0.0, 1.0),
    ];
    let triangulation = Triangulator::default().triangulate(&Input::new(&positions));
    assert_eq!(triangulation.status, Status::Ok);
    assert_eq!(triangulation.triangles, vec![0, 2, 1]);
    assert_eq!(triangulation.halfedges, vec![-1, -1, -1]);
    assert_eq!(
        triangulation.constrained_halfedges,
        vec![HalfedgeState::Unconstrained; 3]
    );
    assert_structure(&triangulation);
}

#[test]
fn scenario_unit_square() {
    let positions = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ];
    let triangulation = Triangulator::default().triangulate(&Input::new(&positions));
    assert_eq!(triangulation.status, Status::Ok);
    assert_structure(&triangulation);
    assert_eq!(triangulation.triangle_count(), 2);

    // The two triangles cover the square and share exactly one interior
    // edge: one twin pair, four boundary halfedges.
    let interior: Vec<usize> = (0..6).filter(|&h| triangulation.halfedges[h] != -1).collect();
    assert_eq!(interior.len(), 2);
    let (a, b) = (interior[0], interior[1]);
    assert_eq!(triangulation.halfedges[a] as usize, b);
    assert_eq!(triangulation.halfedges[b] as usize, a);
    assert!((total_area(&triangulation) - 1.0).abs() < 1e-12);

    let mut sets: Vec<[i32; 3]> = (0..2)
        .map(|t| {
            let mut tri = [
                triangulation.triangles[3 * t],
                triangulation.triangles[3 * t + 1],
                triangulation.triangles[3 * t + 2],
            ];
            tri.sort_unstable();
            tri
        })
        .collect();
    sets.sort_unstable();
    assert_eq!(sets, vec![[0, 1, 2], [0, 2, 3]]);
}

#[test]
fn scenario_constrained_crossing() {
    // A bowtie of five points whose Delaunay diagonal (1, 3) blocks the
    // segment from 0 to 2; the constraint must flip it out of the way.
    let positions = [
        Point::new(0.0, 0.0),
        Point::new(2.0, 1.0),
        Point::new(4.0, 0.0),
        Point::new(2.0, -1.0),
        Point::new(2.0, 3.0),
    ];
    let edges = [0, 2];
    let types = [HalfedgeState::Constrained];
    let input = Input::new(&positions)
        .with_constraint_edges(&edges)
        .with_constraint_edge_types(&types);
    let triangulation = Triangulator::default().triangulate(&input);
    assert_eq!(triangulation.status, Status::Ok);
    assert_structure(&triangulation);
    assert_constraint_covered(&triangulation, 0, 2);
    // Both twins of the forced edge carry the constrained mark.
    assert_eq!(count_marked(&triangulation, HalfedgeState::Constrained), 2);
}

#[test]
fn scenario_hole_extraction() {
    let positions = [
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(4.0, 4.0),
        Point::new(0.0, 4.0),
        Point::new(1.0, 1.0),
        Point::new(3.0, 1.0),
        Point::new(3.0, 3.0),
        Point::new(1.0, 3.0),
    ];
    let edges = [0, 1, 1, 2, 2, 3, 3, 0, 4, 5, 5, 6, 6, 7, 7, 4];
    let seeds = [Point::new(2.0, 2.0)];
    let input = Input::new(&positions)
        .with_constraint_edges(&edges)
        .with_hole_seeds(&seeds);
    let triangulation = Triangulator::default().triangulate(&input);
    assert_eq!(triangulation.status, Status::Ok);
    assert_structure(&triangulation);

    // The annulus survives; the inner square is empty.
    assert_eq!(triangulation.triangle_count(), 8);
    assert!((total_area(&triangulation) - 12.0).abs() < 1e-9);
    for t in 0..triangulation.triangle_count() {
        let c = centroid(&triangulation, t);
        assert!(
            !((1.0..3.0).contains(&c.x) && (1.0..3.0).contains(&c.y)),
            "triangle {t} sits inside the hole"
        );
    }
    for (u, v) in [(0, 1), (1, 2), (2, 3), (3, 0), (4, 5), (5, 6), (6, 7), (7, 4)] {
        assert_constraint_covered(&triangulation, u, v);
    }
}

#[test]
fn scenario_auto_holes_and_boundary() {
    let positions = [
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(4.0, 4.0),
        Point::new(0.0, 4.0),
        Point::new(1.0, 1.0),
        Point::new(3.0, 1.0),
        Point::new(3.0, 3.0),
        Point::new(1.0, 3.0),
    ];
    let edges = [0, 1, 1, 2, 2, 3, 3, 0, 4, 5, 5, 6, 6, 7, 7, 4];
    let settings = TriangulatorSettingsBuilder::default()
        .auto_holes_and_boundary(true)
        .build()
        .unwrap();
    let input = Input::new(&positions).with_constraint_edges(&edges);
    let triangulation = Triangulator::new(settings).triangulate(&input);
    assert_eq!(triangulation.status, Status::Ok);
    assert_structure(&triangulation);
    assert_eq!(triangulation.triangle_count(), 8);
    assert!((total_area(&triangulation) - 12.0).abs() < 1e-9);
}

#[test]
fn scenario_sloan_budget_exceeded() {
    // The first crossed quadrilateral is a dart, forcing a second flip pass
    // that a budget of one forbids.
    let positions = [
        Point::new(0.0, 0.0),
        Point::new(2.0, 1.0),
        Point::new(2.0, -0.2),
        Point::new(4.0, -1.0),
        Point::new(10.0, 0.0),
    ];
    let edges = [0, 4];

    let strict = TriangulatorSettingsBuilder::default()
        .sloan_max_iters(1usize)
        .build()
        .unwrap();
    let input = Input::new(&positions).with_constraint_edges(&edges);
    let truncated = Triangulator::new(strict).triangulate(&input);
    assert_eq!(truncated.status, Status::SloanMaxItersExceeded);
    // Outputs are whatever was built up to the abort.
    assert_eq!(truncated.positions.len(), 5);
    assert!(!truncated.triangles.is_empty());

    let relaxed = Triangulator::default().triangulate(&input);
    assert_eq!(relaxed.status, Status::Ok);
    assert_constraint_covered(&relaxed, 0, 4);
}

#[test]
fn scenario_refined_unit_square() {
    let positions = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ];
    let settings = TriangulatorSettingsBuilder::default()
        .refine_mesh(true)
        .refinement_area(0.05)
        .refinement_angle(20.0f64.to_radians())
        .build()
        .unwrap();
    let triangulation = Triangulator::new(settings).triangulate(&Input::new(&positions));
    assert_eq!(triangulation.status, Status::Ok);
    assert_structure(&triangulation);
    assert_quality(&triangulation, 0.05, 20.0f64.to_radians());
    assert_unencroached(&triangulation);
    assert!((total_area(&triangulation) - 1.0).abs() < 1e-9);

    // All original corners remain as vertices, in place.
    for (i, corner) in positions.iter().enumerate() {
        assert_eq!(triangulation.positions[i], *corner);
    }
    assert!(triangulation.positions.len() > 4);
}

#[test]
fn scenario_round_trip_determinism() {
    let positions: Vec<Point<f64>> = (0..60)
        .map(|i| {
            let t = f64::from(i) * 0.61;
            Point::new(t.sin() * 5.0 + t * 0.05, t.cos() * 3.0)
        })
        .collect();
    let edges = [0, 30];
    let input = Input::new(&positions).with_constraint_edges(&edges);
    let first = Triangulator::default().triangulate(&input);
    let second = Triangulator::default().triangulate(&input);
    assert_eq!(first.status, Status::Ok);
    assert_eq!(first, second);
}
