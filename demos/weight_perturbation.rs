//! # `weight_perturbation` Example
//!
//! Builds the regular triangulation of five points twice: once with every
//! weight zero, and once with the corner `(1,1,1)` raised to weight 100. Both
//! skeletons and their differences are printed.
//!
//! ## Features Demonstrated
//!
//! - **Comparison pipeline**: `compare_reweighted` with the lifted-hull kernel
//! - **Reports**: the extraction report and one-sided differences
//! - **Scene state**: layer toggles and the counts a viewer would overlay
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --example weight_perturbation
//! ```

use power_skeleton::prelude::*;

fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let points: Vec<WeightedPoint> = vec![
        ([0.0, 0.0, 0.0], 0.0).into(),
        ([1.0, 0.0, 0.0], 0.0).into(),
        ([0.0, 1.0, 0.0], 0.0).into(),
        ([0.0, 0.0, 1.0], 0.0).into(),
        ([1.0, 1.0, 1.0], 0.0).into(),
    ];

    let comparison = match compare_reweighted(
        &LiftedHullKernel::new(),
        &points,
        4,
        100.0,
        &ExtractionConfig::default(),
    ) {
        Ok(comparison) => comparison,
        Err(e) => {
            eprintln!("Comparison failed: {e}");
            std::process::exit(1);
        }
    };

    println!("{comparison}");

    for (label, extraction) in [("first", comparison.first()), ("second", comparison.second())] {
        let report = extraction.report();
        let stats = SceneState::stats(extraction.skeleton());
        println!(
            "{label}: {} vertices, {} edges, {} faces, {} cells (dropped {}, euler {})",
            stats.vertices,
            stats.edges,
            stats.faces,
            stats.cells,
            report.total_dropped(),
            extraction.skeleton().euler_characteristic(),
        );
    }

    let mut scene = SceneState::default();
    scene.visibility.set(SceneLayer::Cells, true);
    scene.camera.orbit(0.1, -0.2);
    let geometry = scene.collect(comparison.second().skeleton());
    let [yaw, pitch] = scene.camera.rotation_degrees();
    println!(
        "scene at ({yaw:.1}°, {pitch:.1}°): {} points, {} segments, {} cell faces",
        geometry.points.len(),
        geometry.segments.len(),
        geometry.cell_faces.len(),
    );

    for change in comparison.diff().changed_counts() {
        println!(
            "{:>9}: -{} +{} (jaccard {:.2})",
            change.kind.label(),
            change.only_in_first,
            change.only_in_second,
            comparison.diff().jaccard_index(change.kind),
        );
    }
}
