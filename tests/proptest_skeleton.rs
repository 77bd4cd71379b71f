//! Property-based tests for skeleton extraction over the lifted-hull kernel.
//!
//! This module uses proptest to verify, on small integer point sets:
//! - Extraction is deterministic
//! - A tagging kernel never drops a simplex
//! - The skeleton is closed under taking faces
//! - The Euler characteristic of the triangulated hull is 1
//! - Every referenced index is a valid stable index
//!
//! Integer coordinates and weights keep every determinant exactly
//! representable. Inputs the kernel rejects are skipped.

use power_skeleton::prelude::*;
use proptest::prelude::*;

// =============================================================================
// TEST CONFIGURATION
// =============================================================================

/// Strategy for one weighted point on the integer grid `[-10, 10]^3`.
fn grid_point() -> impl Strategy<Value = ([i32; 3], i32)> {
    (prop::array::uniform3(-10..=10i32), -3..=3i32)
}

/// Strategy for 5 to 8 weighted points with distinct coordinates.
fn weighted_points() -> impl Strategy<Value = Vec<WeightedPoint>> {
    prop::collection::vec(grid_point(), 5..=8).prop_map(|raw| {
        let mut seen = std::collections::BTreeSet::new();
        raw.into_iter()
            .filter(|(coords, _)| seen.insert(*coords))
            .map(|([x, y, z], w)| {
                ([f64::from(x), f64::from(y), f64::from(z)], f64::from(w)).into()
            })
            .collect()
    })
}

fn extract(points: &[WeightedPoint], config: &ExtractionConfig) -> Option<Extraction> {
    build_skeleton(&LiftedHullKernel::new(), points, config).ok()
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: two extractions of the same input are identical
    #[test]
    fn prop_extraction_is_deterministic(points in weighted_points()) {
        if let Some(first) = extract(&points, &ExtractionConfig::default()) {
            let second = extract(&points, &ExtractionConfig::default());
            prop_assert_eq!(Some(&first), second.as_ref());
            prop_assert!(diff_skeletons(first.skeleton(), first.skeleton()).is_empty());
        }
    }

    /// Property: strict extraction over a tagging kernel never drops anything
    #[test]
    fn prop_strict_extraction_is_clean(points in weighted_points()) {
        if let Ok(rt) = LiftedHullKernel::new().triangulate(&points) {
            let extraction = extract_skeleton(&rt, &points, &ExtractionConfig::strict());
            prop_assert!(extraction.is_ok(), "strict extraction failed: {:?}", extraction);
            if let Ok(extraction) = extraction {
                prop_assert!(extraction.report().is_clean());
                prop_assert_eq!(
                    extraction.report().cells.inserted,
                    rt.finite_cells().count()
                );
            }
        }
    }

    /// Property: resolving by coordinates agrees with the kernel's tags
    #[test]
    fn prop_coordinate_resolution_matches_tags(points in weighted_points()) {
        if let Ok(rt) = LiftedHullKernel::new().triangulate(&points) {
            let by_tag = extract_skeleton(&rt, &points, &ExtractionConfig::strict());
            let by_coords = extract_skeleton(
                &rt,
                &points,
                &ExtractionConfigBuilder::default()
                    .index_source(IndexSource::Coordinates)
                    .policy(ResolutionPolicy::Strict)
                    .build()
                    .unwrap(),
            );
            prop_assert_eq!(by_tag, by_coords);
        }
    }

    /// Property: every face of a simplex is itself in the skeleton
    #[test]
    fn prop_skeleton_is_closed_under_faces(points in weighted_points()) {
        if let Some(extraction) = extract(&points, &ExtractionConfig::strict()) {
            let skeleton = extraction.skeleton();
            for cell in skeleton.cells() {
                for triangle in cell.triangles() {
                    prop_assert!(skeleton.contains_triangle(&triangle), "{} missing face {}", cell, triangle);
                }
            }
            for triangle in skeleton.triangles() {
                for edge in triangle.edges() {
                    prop_assert!(skeleton.contains_edge(&edge), "{} missing edge {}", triangle, edge);
                }
            }
            if !skeleton.cells().is_empty() {
                prop_assert_eq!(skeleton.dimension(), Some(3));
            }
        }
    }

    /// Property: the triangulated hull is contractible
    #[test]
    fn prop_euler_characteristic_is_one(points in weighted_points()) {
        if let Some(extraction) = extract(&points, &ExtractionConfig::strict()) {
            let counts = extraction.skeleton().simplex_counts();
            prop_assert_eq!(counts.euler_characteristic(), 1, "counts: {:?}", counts);
        }
    }

    /// Property: referenced indices are stable indices of the input
    #[test]
    fn prop_referenced_vertices_are_in_range(points in weighted_points()) {
        if let Some(extraction) = extract(&points, &ExtractionConfig::strict()) {
            let skeleton = extraction.skeleton();
            prop_assert_eq!(skeleton.number_of_vertices(), points.len());
            for index in skeleton.referenced_vertices() {
                prop_assert!(index < points.len());
            }
            let hidden = skeleton.hidden_vertices();
            prop_assert_eq!(
                hidden.len() + skeleton.referenced_vertices().len(),
                points.len()
            );
        }
    }
}
