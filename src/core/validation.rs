//! Opt-in input validation.
//!
//! A pure predicate over the raw inputs and settings: it only produces a
//! [`Status`], never touches the mesh. With validation disabled, ill-formed
//! inputs are explicitly the caller's responsibility.

use crate::core::collections::{fast_hash_map_with_capacity, fast_hash_set_with_capacity};
use crate::core::status::Status;
use crate::core::triangulator::{Input, TriangulatorSettings};
use crate::geometry::predicates::segments_properly_intersect;
use crate::geometry::traits::coordinate::CoordinateScalar;
use std::f64::consts::FRAC_PI_4;

/// Validates the inputs and settings, returning the first failing status in
/// the taxonomy order, or [`Status::Ok`].
#[must_use]
pub fn validate_input<T>(input: &Input<'_, T>, settings: &TriangulatorSettings) -> Status
where
    T: CoordinateScalar,
{
    if let Some(status) = validate_positions(input) {
        return status;
    }
    if let Some(status) = validate_constraints(input) {
        return status;
    }
    if let Some(status) = validate_holes(input) {
        return status;
    }
    if let Some(status) = validate_flags::<T>(input, settings) {
        return status;
    }
    validate_settings(settings).unwrap_or(Status::Ok)
}

fn validate_positions<T>(input: &Input<'_, T>) -> Option<Status>
where
    T: CoordinateScalar,
{
    let positions = input.positions;
    if positions.len() < 3 {
        return Some(Status::PositionsLengthLessThan3 {
            count: positions.len(),
        });
    }
    for (index, p) in positions.iter().enumerate() {
        if !p.is_finite() {
            return Some(Status::PositionsMustBeFinite { index });
        }
    }
    let mut seen = fast_hash_set_with_capacity(positions.len());
    for (index, p) in positions.iter().enumerate() {
        if !seen.insert(p.ordered_key()) {
            return Some(Status::DuplicatePosition { index });
        }
    }
    None
}

fn validate_constraints<T>(input: &Input<'_, T>) -> Option<Status>
where
    T: CoordinateScalar,
{
    let edges = input.constraint_edges;
    if edges.len() % 2 != 0 {
        return Some(Status::ConstraintsLengthNotDivisibleBy2 { count: edges.len() });
    }
    let pair_count = edges.len() / 2;
    if let Some(types) = input.constraint_edge_types {
        if types.len() != pair_count {
            return Some(Status::ConstraintArrayLengthMismatch);
        }
    }

    let positions = input.positions.len();
    for index in 0..pair_count {
        let pair = (edges[2 * index], edges[2 * index + 1]);
        if pair.0 < 0 || pair.1 < 0 || pair.0 as usize >= positions || pair.1 as usize >= positions
        {
            return Some(Status::ConstraintOutOfBounds {
                index,
                pair,
                positions,
            });
        }
        if pair.0 == pair.1 {
            return Some(Status::ConstraintSelfLoop { index, pair });
        }
    }

    // Duplicate detection is symmetric: normalize smaller endpoint first.
    let mut seen = fast_hash_map_with_capacity(pair_count);
    for index in 0..pair_count {
        let (u, v) = (edges[2 * index], edges[2 * index + 1]);
        let key = (u.min(v), u.max(v));
        if let Some(&first) = seen.get(&key) {
            return Some(Status::DuplicateConstraint {
                first,
                second: index,
            });
        }
        seen.insert(key, index);
    }

    for first in 0..pair_count {
        let (a0, a1) = (edges[2 * first], edges[2 * first + 1]);
        for second in (first + 1)..pair_count {
            let (b0, b1) = (edges[2 * second], edges[2 * second + 1]);
            if a0 == b0 || a0 == b1 || a1 == b0 || a1 == b1 {
                continue;
            }
            if segments_properly_intersect(
                input.positions[a0 as usize],
                input.positions[a1 as usize],
                input.positions[b0 as usize],
                input.positions[b1 as usize],
            ) {
                return Some(Status::ConstraintIntersection { first, second });
            }
        }
    }
    None
}

fn validate_holes<T>(input: &Input<'_, T>) -> Option<Status>
where
    T: CoordinateScalar,
{
    if input.hole_seeds.is_empty() {
        return None;
    }
    if input.constraint_edges.is_empty() {
        return Some(Status::RedundantHolesArray);
    }
    for (index, seed) in input.hole_seeds.iter().enumerate() {
        if !seed.is_finite() {
            return Some(Status::HoleMustBeFinite { index });
        }
    }
    None
}

fn validate_flags<T>(input: &Input<'_, T>, settings: &TriangulatorSettings) -> Option<Status>
where
    T: CoordinateScalar,
{
    if settings.auto_holes_and_boundary && input.constraint_edges.is_empty() {
        return Some(Status::ConstraintEdgesMissingForAutoHolesAndBoundary);
    }
    if settings.restore_boundary && input.constraint_edges.is_empty() {
        return Some(Status::ConstraintEdgesMissingForRestoreBoundary);
    }
    if settings.refine_mesh && T::real_ops().is_none() {
        return Some(Status::RefinementNotSupportedForCoordinateType);
    }
    None
}

fn validate_settings(settings: &TriangulatorSettings) -> Option<Status> {
    if settings.sloan_max_iters == 0 {
        return Some(Status::SloanMaxItersMustBePositive {
            value: settings.sloan_max_iters,
        });
    }
    if !(settings.refinement_area > 0.0) {
        return Some(Status::RefinementThresholdAreaMustBePositive);
    }
    if !(0.0..=FRAC_PI_4).contains(&settings.refinement_angle) {
        return Some(Status::RefinementThresholdAngleOutOfRange);
    }
    None
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::HalfedgeState;
    use crate::core::triangulator::TriangulatorSettingsBuilder;
    use crate::geometry::point::Point;

    fn square() -> Vec<Point<f64>> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]
    }

    fn settings() -> TriangulatorSettings {
        TriangulatorSettings::default()
    }

    #[test]
    fn accepts_well_formed_input() {
        let positions = square();
        let edges = [0, 1, 1, 2];
        let input = Input::new(&positions).with_constraint_edges(&edges);
        assert_eq!(validate_input(&input, &settings()), Status::Ok);
    }

    #[test]
    fn rejects_too_few_positions() {
        let positions = [Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        assert_eq!(
            validate_input(&Input::new(&positions), &settings()),
            Status::PositionsLengthLessThan3 { count: 2 }
        );
    }

    #[test]
    fn rejects_non_finite_positions() {
        let positions = [
            Point::new(0.0, 0.0),
            Point::new(f64::NAN, 0.0),
            Point::new(1.0, 1.0),
        ];
        assert_eq!(
            validate_input(&Input::new(&positions), &settings()),
            Status::PositionsMustBeFinite { index: 1 }
        );
    }

    #[test]
    fn rejects_duplicate_positions() {
        let positions = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
        ];
        assert_eq!(
            validate_input(&Input::new(&positions), &settings()),
            Status::DuplicatePosition { index: 2 }
        );
    }

    #[test]
    fn rejects_odd_constraint_array() {
        let positions = square();
        let edges = [0, 1, 2];
        let input = Input::new(&positions).with_constraint_edges(&edges);
        assert_eq!(
            validate_input(&input, &settings()),
            Status::ConstraintsLengthNotDivisibleBy2 { count: 3 }
        );
    }

    #[test]
    fn rejects_type_array_mismatch() {
        let positions = square();
        let edges = [0, 1, 1, 2];
        let types = [HalfedgeState::Constrained];
        let input = Input::new(&positions)
            .with_constraint_edges(&edges)
            .with_constraint_edge_types(&types);
        assert_eq!(
            validate_input(&input, &settings()),
            Status::ConstraintArrayLengthMismatch
        );
    }

    #[test]
    fn rejects_out_of_bounds_and_self_loops() {
        let positions = square();
        let edges = [0, 9];
        let input = Input::new(&positions).with_constraint_edges(&edges);
        assert_eq!(
            validate_input(&input, &settings()),
            Status::ConstraintOutOfBounds {
                index: 0,
                pair: (0, 9),
                positions: 4,
            }
        );

        let edges = [2, 2];
        let input = Input::new(&positions).with_constraint_edges(&edges);
        assert_eq!(
            validate_input(&input, &settings()),
            Status::ConstraintSelfLoop {
                index: 0,
                pair: (2, 2),
            }
        );
    }

    #[test]
    fn rejects_duplicate_constraints_in_either_direction() {
        let positions = square();
        let edges = [0, 1, 2, 3, 1, 0];
        let input = Input::new(&positions).with_constraint_edges(&edges);
        assert_eq!(
            validate_input(&input, &settings()),
            Status::DuplicateConstraint { first: 0, second: 2 }
        );
    }

    #[test]
    fn rejects_crossing_constraints() {
        let positions = square();
        // The two diagonals of the square cross.
        let edges = [0, 2, 1, 3];
        let input = Input::new(&positions).with_constraint_edges(&edges);
        assert_eq!(
            validate_input(&input, &settings()),
            Status::ConstraintIntersection { first: 0, second: 1 }
        );
    }

    #[test]
    fn accepts_constraints_sharing_an_endpoint() {
        let positions = square();
        let edges = [0, 2, 2, 1];
        let input = Input::new(&positions).with_constraint_edges(&edges);
        assert_eq!(validate_input(&input, &settings()), Status::Ok);
    }

    #[test]
    fn rejects_holes_without_constraints() {
        let positions = square();
        let holes = [Point::new(0.5, 0.5)];
        let input = Input::new(&positions).with_hole_seeds(&holes);
        assert_eq!(
            validate_input(&input, &settings()),
            Status::RedundantHolesArray
        );
    }

    #[test]
    fn rejects_non_finite_holes() {
        let positions = square();
        let edges = [0, 1, 1, 2];
        let holes = [Point::new(0.5, f64::INFINITY)];
        let input = Input::new(&positions)
            .with_constraint_edges(&edges)
            .with_hole_seeds(&holes);
        assert_eq!(
            validate_input(&input, &settings()),
            Status::HoleMustBeFinite { index: 0 }
        );
    }

    #[test]
    fn rejects_flags_without_constraints() {
        let positions = square();
        let auto = TriangulatorSettingsBuilder::default()
            .auto_holes_and_boundary(true)
            .build()
            .unwrap();
        assert_eq!(
            validate_input(&Input::new(&positions), &auto),
            Status::ConstraintEdgesMissingForAutoHolesAndBoundary
        );
        let restore = TriangulatorSettingsBuilder::default()
            .restore_boundary(true)
            .build()
            .unwrap();
        assert_eq!(
            validate_input(&Input::new(&positions), &restore),
            Status::ConstraintEdgesMissingForRestoreBoundary
        );
    }

    #[test]
    fn rejects_refinement_on_integers() {
        let positions = [
            Point::new(0i32, 0),
            Point::new(4, 0),
            Point::new(0, 4),
        ];
        let refine = TriangulatorSettingsBuilder::default()
            .refine_mesh(true)
            .build()
            .unwrap();
        assert_eq!(
            validate_input(&Input::new(&positions), &refine),
            Status::RefinementNotSupportedForCoordinateType
        );
    }

    #[test]
    fn rejects_misconfigured_settings() {
        let positions = square();
        let zero_iters = TriangulatorSettingsBuilder::default()
            .sloan_max_iters(0usize)
            .build()
            .unwrap();
        assert_eq!(
            validate_input(&Input::new(&positions), &zero_iters),
            Status::SloanMaxItersMustBePositive { value: 0 }
        );

        let bad_area = TriangulatorSettingsBuilder::default()
            .refinement_area(0.0)
            .build()
            .unwrap();
        assert_eq!(
            validate_input(&Input::new(&positions), &bad_area),
            Status::RefinementThresholdAreaMustBePositive
        );

        let bad_angle = TriangulatorSettingsBuilder::default()
            .refinement_angle(1.0)
            .build()
            .unwrap();
        assert_eq!(
            validate_input(&Input::new(&positions), &bad_angle),
            Status::RefinementThresholdAngleOutOfRange
        );
    }
}
