//! Seed-based hole and exterior removal.
//!
//! Three combinable modes decide which triangles survive:
//!
//! - **Hole seeds**: each seed point's containing triangle floods outward,
//!   stopping at hole-boundary constraints and at the outer boundary.
//! - **Restore boundary**: every triangle owning an unmarked boundary
//!   halfedge seeds the same flood, stripping the convex-hull filler outside
//!   the constrained boundary loops.
//! - **Auto holes and boundary**: a two-queue breadth-first walk from the
//!   outside in; crossing a hole-boundary constraint defers the neighbor to
//!   the alternate queue, and every queue swap flips between removing and
//!   keeping — the even–odd rule.
//!
//! After marking, triangles are compacted in place with an index remap and
//! orphaned vertices are dropped, so vertex indices are not stable across
//! this stage.

use crate::core::mesh::{Mesh, NONE};
use crate::geometry::point::Point;
use crate::geometry::predicates::point_in_triangle;
use crate::geometry::traits::coordinate::CoordinateScalar;
use std::collections::VecDeque;

/// Which removal modes run; any combination unions its removals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlantingModes {
    /// Even–odd removal from the outside in.
    pub auto_holes_and_boundary: bool,
    /// Remove the convex-hull filler outside constrained boundary loops.
    pub restore_boundary: bool,
    /// Flood from the explicit hole seed points.
    pub hole_seeds: bool,
}

impl PlantingModes {
    fn any(self) -> bool {
        self.auto_holes_and_boundary || self.restore_boundary || self.hole_seeds
    }
}

/// Removes triangles interior to holes or exterior to boundaries, then
/// compacts the mesh arrays and positions.
pub fn plant_seeds<T>(mesh: &mut Mesh<T>, holes: &[Point<T>], modes: PlantingModes)
where
    T: CoordinateScalar,
{
    if !modes.any() || mesh.triangles.is_empty() {
        return;
    }

    let triangle_count = mesh.triangle_count();
    let mut remove = vec![false; triangle_count];

    if modes.auto_holes_and_boundary {
        mark_even_odd(mesh, &mut remove);
    }
    if modes.restore_boundary {
        let seeds = unmarked_boundary_triangles(mesh);
        flood(mesh, &seeds, &mut remove);
    }
    if modes.hole_seeds {
        let mut seeds = Vec::with_capacity(holes.len());
        for &seed in holes {
            if let Some(t) = containing_triangle(mesh, seed) {
                seeds.push(t);
            }
        }
        flood(mesh, &seeds, &mut remove);
    }

    if remove.iter().any(|&r| r) {
        mesh.compact_triangles(&remove);
        mesh.compact_vertices();
    }
}

/// Triangles owning a boundary halfedge that no hole-boundary constraint
/// pins down: the convex-hull filler seeds.
fn unmarked_boundary_triangles<T>(mesh: &Mesh<T>) -> Vec<i32>
where
    T: CoordinateScalar,
{
    let mut seeds = Vec::new();
    for h in 0..mesh.triangles.len() as i32 {
        if mesh.twin(h) == NONE && !mesh.constrained[h as usize].is_hole_boundary() {
            seeds.push(h / 3);
        }
    }
    seeds
}

/// Linear scan for the triangle containing `seed` (inclusive of edges).
fn containing_triangle<T>(mesh: &Mesh<T>, seed: Point<T>) -> Option<i32>
where
    T: CoordinateScalar,
{
    (0..mesh.triangle_count() as i32).find(|&t| {
        let h = 3 * t;
        point_in_triangle(
            seed,
            mesh.point(mesh.origin(h)),
            mesh.point(mesh.origin(h + 1)),
            mesh.point(mesh.origin(h + 2)),
        )
    })
}

/// Breadth-first removal flood stopping at hole-boundary constraints and at
/// the outer boundary. `remove` doubles as the visited set.
fn flood<T>(mesh: &Mesh<T>, seeds: &[i32], remove: &mut [bool])
where
    T: CoordinateScalar,
{
    let mut queue: VecDeque<i32> = VecDeque::new();
    for &t in seeds {
        if !remove[t as usize] {
            remove[t as usize] = true;
            queue.push_back(t);
        }
    }
    while let Some(t) = queue.pop_front() {
        for k in 0..3 {
            let h = 3 * t + k;
            if mesh.constrained[h as usize].is_hole_boundary() {
                continue;
            }
            let twin = mesh.twin(h);
            if twin == NONE {
                continue;
            }
            let neighbor = twin / 3;
            if !remove[neighbor as usize] {
                remove[neighbor as usize] = true;
                queue.push_back(neighbor);
            }
        }
    }
}

/// Even–odd walk from the outside in. Boundary triangles seed the removal
/// generation — except those entered across a marked boundary halfedge,
/// which already sit one level inside and seed the keep generation. Each
/// queue swap afterwards flips the decision.
fn mark_even_odd<T>(mesh: &Mesh<T>, remove: &mut [bool])
where
    T: CoordinateScalar,
{
    let triangle_count = mesh.triangle_count();
    let mut visited = vec![false; triangle_count];
    let mut current: VecDeque<i32> = VecDeque::new();
    let mut alternate: VecDeque<i32> = VecDeque::new();

    for h in 0..mesh.triangles.len() as i32 {
        if mesh.twin(h) != NONE || mesh.constrained[h as usize].is_hole_boundary() {
            continue;
        }
        let t = h / 3;
        if !visited[t as usize] {
            visited[t as usize] = true;
            current.push_back(t);
        }
    }
    for h in 0..mesh.triangles.len() as i32 {
        if mesh.twin(h) != NONE || !mesh.constrained[h as usize].is_hole_boundary() {
            continue;
        }
        let t = h / 3;
        if !visited[t as usize] {
            visited[t as usize] = true;
            alternate.push_back(t);
        }
    }

    let mut removing = true;
    while !current.is_empty() || !alternate.is_empty() {
        if current.is_empty() {
            std::mem::swap(&mut current, &mut alternate);
            removing = !removing;
        }
        let Some(t) = current.pop_front() else {
            continue;
        };
        if removing {
            remove[t as usize] = true;
        }
        for k in 0..3 {
            let h = 3 * t + k;
            let twin = mesh.twin(h);
            if twin == NONE {
                continue;
            }
            let neighbor = twin / 3;
            if visited[neighbor as usize] {
                continue;
            }
            visited[neighbor as usize] = true;
            if mesh.constrained[h as usize].is_hole_boundary() {
                alternate.push_back(neighbor);
            } else {
                current.push_back(neighbor);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
