//! Integration tests for coordinate resolution and the unresolved-vertex
//! policies.
//!
//! The lifted-hull kernel tags its vertices and echoes coordinates exactly, so
//! it never exercises the fallback paths. [`DriftingKernel`] wraps it to behave
//! like a kernel that stores no index and nudges one point's coordinates.

use power_skeleton::prelude::*;

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Untagged kernel whose reported coordinates for one point drift along x.
struct DriftingKernel {
    target: usize,
    drift: f64,
}

struct DriftingTriangulation {
    inner: LiftedHullTriangulation,
    target: usize,
    drift: f64,
}

impl TriangulationKernel for DriftingKernel {
    type Triangulation = DriftingTriangulation;

    fn triangulate(&self, points: &[WeightedPoint]) -> Result<Self::Triangulation, KernelError> {
        Ok(DriftingTriangulation {
            inner: LiftedHullKernel::new().triangulate(points)?,
            target: self.target,
            drift: self.drift,
        })
    }
}

impl RegularTriangulation for DriftingTriangulation {
    type Cell = CellHandle;

    fn dimension(&self) -> Option<usize> {
        self.inner.dimension()
    }

    fn number_of_vertices(&self) -> usize {
        self.inner.number_of_vertices()
    }

    fn finite_cells(&self) -> impl Iterator<Item = CellHandle> + '_ {
        self.inner.finite_cells()
    }

    fn finite_facets(&self) -> impl Iterator<Item = (CellHandle, usize)> + '_ {
        self.inner.finite_facets()
    }

    fn finite_edges(&self) -> impl Iterator<Item = (CellHandle, usize, usize)> + '_ {
        self.inner.finite_edges()
    }

    fn vertex_point(&self, cell: CellHandle, slot: usize) -> Option<Point> {
        let point = self.inner.vertex_point(cell, slot)?;
        if self.inner.vertex_index(cell, slot) == Some(self.target) {
            return Some(Point::new(point.x() + self.drift, point.y(), point.z()));
        }
        Some(point)
    }
}

fn bipyramid() -> Vec<WeightedPoint> {
    vec![
        ([0.0, 0.0, 0.0], 0.0).into(),
        ([1.0, 0.0, 0.0], 0.0).into(),
        ([0.0, 1.0, 0.0], 0.0).into(),
        ([0.0, 0.0, 1.0], 0.0).into(),
        ([1.0, 1.0, 1.0], 0.0).into(),
    ]
}

fn config(policy: ResolutionPolicy, resolver: ResolverStrategy) -> ExtractionConfig {
    ExtractionConfigBuilder::default()
        .policy(policy)
        .resolver(resolver)
        .build()
        .unwrap()
}

fn reference_skeleton(points: &[WeightedPoint]) -> Skeleton {
    build_skeleton(&LiftedHullKernel::new(), points, &ExtractionConfig::strict())
        .unwrap()
        .into_skeleton()
}

#[test]
fn untagged_exact_kernel_matches_tagged_result() {
    init_tracing();
    let points = bipyramid();
    let kernel = DriftingKernel {
        target: 4,
        drift: 0.0,
    };

    for resolver in [
        ResolverStrategy::Linear,
        ResolverStrategy::Exact,
        ResolverStrategy::Tolerance { epsilon: 1e-9 },
    ] {
        let extraction =
            build_skeleton(&kernel, &points, &config(ResolutionPolicy::Strict, resolver)).unwrap();
        assert!(extraction.report().is_clean(), "{resolver:?}");
        assert_eq!(extraction.skeleton(), &reference_skeleton(&points), "{resolver:?}");
    }
}

#[test]
fn drop_policy_discards_simplices_touching_the_drifted_point() {
    init_tracing();
    let points = bipyramid();
    let kernel = DriftingKernel {
        target: 4,
        drift: 1e-12,
    };

    let extraction = build_skeleton(
        &kernel,
        &points,
        &config(ResolutionPolicy::Drop, ResolverStrategy::Exact),
    )
    .unwrap();
    let skeleton = extraction.skeleton();
    let report = extraction.report();

    // Only the tetrahedron 0123 survives.
    assert_eq!(skeleton.number_of_cells(), 1);
    assert_eq!(skeleton.number_of_triangles(), 4);
    assert_eq!(skeleton.number_of_edges(), 6);
    assert_eq!(skeleton.hidden_vertices(), vec![4]);

    assert_eq!(report.edges.unresolved, 3);
    assert_eq!(report.triangles.unresolved, 3);
    assert_eq!(report.cells.unresolved, 1);
    assert_eq!(report.total_dropped(), 7);
    assert!(!report.is_clean());
}

#[test]
fn warn_policy_drops_like_drop_policy() {
    init_tracing();
    let points = bipyramid();
    let kernel = DriftingKernel {
        target: 4,
        drift: 1e-12,
    };

    let dropped = build_skeleton(
        &kernel,
        &points,
        &config(ResolutionPolicy::Drop, ResolverStrategy::Linear),
    )
    .unwrap();
    let warned = build_skeleton(
        &kernel,
        &points,
        &config(ResolutionPolicy::Warn, ResolverStrategy::Linear),
    )
    .unwrap();
    assert_eq!(dropped, warned);
}

#[test]
fn strict_policy_fails_on_first_unresolved_vertex() {
    init_tracing();
    let points = bipyramid();
    let kernel = DriftingKernel {
        target: 4,
        drift: 1e-12,
    };

    let err = build_skeleton(
        &kernel,
        &points,
        &config(ResolutionPolicy::Strict, ResolverStrategy::Exact),
    )
    .unwrap_err();
    match err {
        ComparisonError::Extraction(ExtractionError::UnresolvedVertex { kind, point, .. }) => {
            // Edges are walked first.
            assert_eq!(kind, SimplexKind::Edge);
            assert_eq!(point, Point::new(1.0 + 1e-12, 1.0, 1.0));
        }
        other => panic!("expected an unresolved vertex, got {other:?}"),
    }
}

#[test]
fn tolerance_resolver_recovers_small_drift() {
    init_tracing();
    let points = bipyramid();
    let kernel = DriftingKernel {
        target: 4,
        drift: 1e-12,
    };

    let extraction =
        build_skeleton(&kernel, &points, &ExtractionConfig::lenient()).unwrap();
    assert!(extraction.report().is_clean());
    assert_eq!(extraction.skeleton(), &reference_skeleton(&points));
}

#[test]
fn tolerance_resolver_does_not_absorb_large_drift() {
    init_tracing();
    let points = bipyramid();
    let kernel = DriftingKernel {
        target: 4,
        drift: 0.25,
    };

    let extraction =
        build_skeleton(&kernel, &points, &ExtractionConfig::lenient()).unwrap();
    assert_eq!(extraction.report().cells.unresolved, 1);
    assert_eq!(extraction.skeleton().number_of_cells(), 1);
}

#[test]
fn coordinate_source_ignores_kernel_tags() {
    init_tracing();
    let points = bipyramid();
    let rt = LiftedHullKernel::new().triangulate(&points).unwrap();

    let by_tag = extract_skeleton(&rt, &points, &ExtractionConfig::strict()).unwrap();
    let by_coords = extract_skeleton(
        &rt,
        &points,
        &ExtractionConfigBuilder::default()
            .index_source(IndexSource::Coordinates)
            .policy(ResolutionPolicy::Strict)
            .build()
            .unwrap(),
    )
    .unwrap();
    assert_eq!(by_tag, by_coords);
}

#[test]
fn configuration_errors_surface_before_walking() {
    init_tracing();
    let points = bipyramid();
    let rt = LiftedHullKernel::new().triangulate(&points).unwrap();

    assert_eq!(
        extract_skeleton(&rt, &points[..4], &ExtractionConfig::default()).unwrap_err(),
        ExtractionError::VertexCountMismatch {
            kernel: 5,
            supplied: 4
        }
    );

    let bad = config(
        ResolutionPolicy::Drop,
        ResolverStrategy::Tolerance { epsilon: -1.0 },
    );
    assert_eq!(
        extract_skeleton(&rt, &points, &bad).unwrap_err(),
        ExtractionError::Resolution(ResolutionError::InvalidTolerance { epsilon: -1.0 })
    );
}

#[test]
fn extraction_config_round_trips_through_json() {
    let config = ExtractionConfig::lenient();
    let json = serde_json::to_string(&config).unwrap();
    let back: ExtractionConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
