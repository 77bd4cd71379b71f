//! # power-skeleton
//!
//! This is a library for extracting and comparing the combinatorial skeletons
//! of 3D [regular triangulations](https://en.wikipedia.org/wiki/Weighted_Voronoi_diagram)
//! (weighted Delaunay triangulations), with a kernel seam modelled on
//! [CGAL](https://www.cgal.org)'s `Regular_triangulation_3`.
//!
//! # Features
//!
//! - Canonical edges, triangles and cells over the caller's stable point indices
//! - Kernel-agnostic extraction through the [`TriangulationKernel`](geometry::kernel::TriangulationKernel)
//!   and [`RegularTriangulation`](geometry::kernel::RegularTriangulation) traits
//! - Exact, hashed and tolerance-aware resolution of kernel points back to indices
//! - Caller-selectable handling of unresolved vertices, with a per-kind extraction report
//! - One-sided skeleton differences and a textual report
//! - A reference lifted-hull kernel for small inputs
//! - Serialization/Deserialization with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! Raising the weight of one point changes which simplices the regular
//! triangulation contains:
//!
//! ```rust
//! use power_skeleton::prelude::*;
//!
//! let points: Vec<WeightedPoint> = vec![
//!     ([0.0, 0.0, 0.0], 0.0).into(),
//!     ([1.0, 0.0, 0.0], 0.0).into(),
//!     ([0.0, 1.0, 0.0], 0.0).into(),
//!     ([0.0, 0.0, 1.0], 0.0).into(),
//!     ([1.0, 1.0, 1.0], 0.0).into(),
//! ];
//!
//! let comparison = compare_reweighted(
//!     &LiftedHullKernel::new(),
//!     &points,
//!     4,
//!     100.0,
//!     &ExtractionConfig::default(),
//! )
//! .unwrap();
//!
//! let first = comparison.first().skeleton();
//! let second = comparison.second().skeleton();
//! assert_eq!(first.number_of_cells(), 2);
//! assert_eq!(second.number_of_cells(), 3);
//!
//! // The heavy point now reaches the origin.
//! let diff = comparison.diff();
//! assert_eq!(diff.edges.only_in_second, vec![Edge::new([0, 4]).unwrap()]);
//! assert!(diff.edges.only_in_first.is_empty());
//! ```
//!
//! # Stable Indices
//!
//! A point's position in the caller's input sequence is its identity. Kernels
//! that can tag vertices report those indices directly; otherwise the
//! extractor matches reported coordinates against the input with the
//! configured [`ResolverStrategy`](core::resolver::ResolverStrategy).
//!
//! ```rust
//! use power_skeleton::prelude::*;
//!
//! let points: Vec<WeightedPoint> = vec![
//!     ([0.0, 0.0, 0.0], 0.0).into(),
//!     ([1.0, 0.0, 0.0], 0.0).into(),
//!     ([0.0, 1.0, 0.0], 0.0).into(),
//!     ([0.0, 0.0, 1.0], 0.0).into(),
//! ];
//! let rt = LiftedHullKernel::new().triangulate(&points).unwrap();
//!
//! let config = ExtractionConfigBuilder::default()
//!     .index_source(IndexSource::Coordinates)
//!     .resolver(ResolverStrategy::Linear)
//!     .policy(ResolutionPolicy::Strict)
//!     .build()
//!     .unwrap();
//! let extraction = extract_skeleton(&rt, &points, &config).unwrap();
//! assert!(extraction.report().is_clean());
//! assert_eq!(extraction.skeleton().euler_characteristic(), 1);
//! ```

#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// Skeleton extraction, resolution and differencing.
///
/// Everything here works on stable indices; geometry enters only through the
/// kernel traits in [`geometry::kernel`](crate::geometry::kernel).
pub mod core {
    pub mod collections;
    pub mod comparison;
    pub mod diff;
    pub mod extraction;
    pub mod resolver;
    pub mod scene;
    pub mod simplex;
    pub mod skeleton;

    pub use comparison::*;
    pub use diff::*;
    pub use extraction::*;
    pub use resolver::*;
    pub use simplex::*;
    pub use skeleton::*;
}

/// Points, predicates and the triangulation kernel seam.
pub mod geometry {
    /// Kernel implementations.
    pub mod algorithms {
        pub mod lifted_hull;
        pub use lifted_hull::*;
    }
    pub mod kernel;
    pub mod matrix;
    pub mod point;
    pub mod predicates;

    pub use algorithms::*;
    pub use kernel::*;
    pub use point::*;
    pub use predicates::*;
}

/// A prelude module that re-exports commonly used types.
pub mod prelude {
    pub use crate::core::{
        collections::{FastHashMap, FastHashSet, SmallBuffer},
        comparison::*,
        diff::*,
        extraction::*,
        resolver::*,
        scene::*,
        simplex::*,
        skeleton::*,
    };

    pub use crate::geometry::{
        algorithms::lifted_hull::*, kernel::*, point::*, predicates::PredicateConfig,
    };
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}
