//! Skeleton extraction from a regular triangulation.
//!
//! [`extract_skeleton`] walks the finite edges, facets and cells a kernel
//! exposes, maps every vertex back to the caller's stable index, and collects
//! canonical simplices into ordered, deduplicated sets.
//!
//! # Dropped simplices
//!
//! A simplex is never inserted with missing or repeated vertices. Two things
//! can stop a simplex from being inserted:
//!
//! - **Unresolved vertex**: the kernel reported a point that matches nothing in
//!   the caller's sequence. What happens next is the caller's choice through
//!   [`ResolutionPolicy`].
//! - **Degenerate simplex**: a slot the kernel could not read, or two slots
//!   that resolved to the same index. These are always discarded.
//!
//! Both are counted in the [`ExtractionReport`], so nothing is lost silently.

#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::collections::{MAX_CELL_VERTICES, SmallBuffer};
use crate::core::resolver::{PointResolver, ResolutionError, ResolverStrategy};
use crate::core::simplex::{Simplex, SimplexKind};
use crate::core::skeleton::Skeleton;
use crate::geometry::kernel::RegularTriangulation;
use crate::geometry::point::{Point, WeightedPoint};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// What to do with a simplex that has an unresolved vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionPolicy {
    /// Discard the simplex and count it.
    Drop,
    /// Discard the simplex, count it, and log a warning per simplex kind.
    #[default]
    Warn,
    /// Fail the whole extraction.
    Strict,
}

/// Where stable indices come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexSource {
    /// Use the kernel's vertex tags when present, coordinates otherwise.
    #[default]
    PreferKernel,
    /// Always match coordinates, ignoring kernel tags.
    Coordinates,
}

/// Extraction settings.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::extraction::{
///     ExtractionConfig, ExtractionConfigBuilder, IndexSource, ResolutionPolicy,
/// };
/// use power_skeleton::core::resolver::ResolverStrategy;
///
/// let config = ExtractionConfigBuilder::default()
///     .policy(ResolutionPolicy::Strict)
///     .index_source(IndexSource::Coordinates)
///     .build()
///     .unwrap();
/// assert_eq!(config.resolver, ResolverStrategy::Exact);
/// assert_eq!(config.policy, ExtractionConfig::strict().policy);
/// ```
#[derive(Builder, Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[builder(default)]
pub struct ExtractionConfig {
    /// Handling of unresolved vertices.
    pub policy: ResolutionPolicy,
    /// Coordinate matching strategy.
    pub resolver: ResolverStrategy,
    /// Whether kernel vertex tags are trusted.
    pub index_source: IndexSource,
}

impl ExtractionConfig {
    /// Fails on the first unresolved vertex and matches coordinates exactly.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            policy: ResolutionPolicy::Strict,
            resolver: ResolverStrategy::Exact,
            index_source: IndexSource::PreferKernel,
        }
    }

    /// Tolerates tiny coordinate drift and drops what still does not resolve.
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            policy: ResolutionPolicy::Drop,
            resolver: ResolverStrategy::Tolerance { epsilon: 1e-9 },
            index_source: IndexSource::PreferKernel,
        }
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// Per-kind extraction counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplexTally {
    /// Simplices the kernel enumerated.
    pub enumerated: usize,
    /// Simplices inserted into the skeleton.
    pub inserted: usize,
    /// Simplices already present (shared through adjacency).
    pub duplicates: usize,
    /// Simplices dropped for an unresolved vertex.
    pub unresolved: usize,
    /// Simplices dropped as degenerate.
    pub degenerate: usize,
}

impl SimplexTally {
    /// Simplices that did not make it into the skeleton for a reason other
    /// than deduplication.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.unresolved + self.degenerate
    }
}

/// What happened during one extraction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Edge counters.
    pub edges: SimplexTally,
    /// Triangle counters.
    pub triangles: SimplexTally,
    /// Cell counters.
    pub cells: SimplexTally,
}

impl ExtractionReport {
    /// Counters for `kind`.
    #[must_use]
    pub const fn tally(&self, kind: SimplexKind) -> &SimplexTally {
        match kind {
            SimplexKind::Edge => &self.edges,
            SimplexKind::Triangle => &self.triangles,
            SimplexKind::Cell => &self.cells,
        }
    }

    /// Total dropped simplices across all kinds.
    #[must_use]
    pub const fn total_dropped(&self) -> usize {
        self.edges.dropped() + self.triangles.dropped() + self.cells.dropped()
    }

    /// Returns `true` if every enumerated simplex was accounted for by an
    /// insertion or a duplicate.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.total_dropped() == 0
    }
}

/// A skeleton together with its extraction report.
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    skeleton: Skeleton,
    report: ExtractionReport,
}

impl Extraction {
    /// The extracted skeleton.
    #[must_use]
    pub const fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// The extraction counters.
    #[must_use]
    pub const fn report(&self) -> &ExtractionReport {
        &self.report
    }

    /// Consumes the extraction, keeping only the skeleton.
    #[must_use]
    pub fn into_skeleton(self) -> Skeleton {
        self.skeleton
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Errors raised by [`extract_skeleton`].
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::extraction::ExtractionError;
///
/// let err = ExtractionError::VertexCountMismatch { kernel: 6, supplied: 5 };
/// assert_eq!(
///     err.to_string(),
///     "Triangulation reports 6 vertices but only 5 points were supplied"
/// );
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ExtractionError {
    /// The triangulation has no dimension or no vertices.
    #[error("Cannot extract a skeleton from an empty triangulation")]
    EmptyTriangulation,
    /// The triangulation holds more vertices than the caller supplied points.
    #[error("Triangulation reports {kernel} vertices but only {supplied} points were supplied")]
    VertexCountMismatch {
        /// Vertices reported by the kernel.
        kernel: usize,
        /// Points supplied by the caller.
        supplied: usize,
    },
    /// A vertex could not be resolved under [`ResolutionPolicy::Strict`].
    #[error("Unresolved vertex at slot {slot} of a {kind}: {point}")]
    UnresolvedVertex {
        /// Kind of the simplex being extracted.
        kind: SimplexKind,
        /// Local slot of the vertex.
        slot: usize,
        /// The point the kernel reported.
        point: Point,
    },
    /// The resolver could not be built.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// Extracts the skeleton of `triangulation` over the stable indices of
/// `points`.
///
/// # Errors
///
/// - [`ExtractionError::EmptyTriangulation`] if the triangulation has no
///   dimension or no vertices.
/// - [`ExtractionError::VertexCountMismatch`] if it reports more vertices than
///   `points` holds.
/// - [`ExtractionError::UnresolvedVertex`] under [`ResolutionPolicy::Strict`].
/// - [`ExtractionError::Resolution`] for an invalid resolver tolerance.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::extraction::{extract_skeleton, ExtractionConfig};
/// use power_skeleton::geometry::algorithms::lifted_hull::LiftedHullKernel;
/// use power_skeleton::geometry::kernel::TriangulationKernel;
/// use power_skeleton::geometry::point::WeightedPoint;
///
/// let points: Vec<WeightedPoint> = vec![
///     ([0.0, 0.0, 0.0], 0.0).into(),
///     ([1.0, 0.0, 0.0], 0.0).into(),
///     ([0.0, 1.0, 0.0], 0.0).into(),
///     ([0.0, 0.0, 1.0], 0.0).into(),
/// ];
/// let rt = LiftedHullKernel::new().triangulate(&points).unwrap();
/// let extraction = extract_skeleton(&rt, &points, &ExtractionConfig::strict()).unwrap();
///
/// assert_eq!(extraction.skeleton().number_of_cells(), 1);
/// assert_eq!(extraction.skeleton().number_of_triangles(), 4);
/// assert_eq!(extraction.skeleton().number_of_edges(), 6);
/// assert!(extraction.report().is_clean());
/// ```
pub fn extract_skeleton<T>(
    triangulation: &T,
    points: &[WeightedPoint],
    config: &ExtractionConfig,
) -> Result<Extraction, ExtractionError>
where
    T: RegularTriangulation,
{
    let vertex_count = triangulation.number_of_vertices();
    if triangulation.dimension().is_none() || vertex_count == 0 {
        return Err(ExtractionError::EmptyTriangulation);
    }
    if vertex_count > points.len() {
        return Err(ExtractionError::VertexCountMismatch {
            kernel: vertex_count,
            supplied: points.len(),
        });
    }

    let extractor = Extractor {
        triangulation,
        points,
        resolver: PointResolver::new(points, config.resolver)?,
        config,
    };

    let (edges, edge_tally) = extractor.collect::<2>(
        SimplexKind::Edge,
        triangulation
            .finite_edges()
            .map(|(cell, i, j)| (cell, [i, j].into_iter().collect::<Slots>())),
    )?;
    let (triangles, triangle_tally) = extractor.collect::<3>(
        SimplexKind::Triangle,
        triangulation.finite_facets().map(|(cell, opposite)| {
            (
                cell,
                (0..MAX_CELL_VERTICES)
                    .filter(|&s| s != opposite)
                    .collect::<Slots>(),
            )
        }),
    )?;
    let (cells, cell_tally) = extractor.collect::<4>(
        SimplexKind::Cell,
        triangulation
            .finite_cells()
            .map(|cell| (cell, (0..MAX_CELL_VERTICES).collect::<Slots>())),
    )?;

    let report = ExtractionReport {
        edges: edge_tally,
        triangles: triangle_tally,
        cells: cell_tally,
    };
    // Resolved indices are always positions in `points`.
    let skeleton = Skeleton::from_parts_unchecked(
        points.iter().map(WeightedPoint::point).collect(),
        edges,
        triangles,
        cells,
    );

    tracing::debug!(
        points = points.len(),
        edges = skeleton.number_of_edges(),
        triangles = skeleton.number_of_triangles(),
        cells = skeleton.number_of_cells(),
        dropped = report.total_dropped(),
        "skeleton extracted"
    );

    Ok(Extraction { skeleton, report })
}

type Slots = SmallBuffer<usize, MAX_CELL_VERTICES>;

/// Outcome of reading one vertex slot.
enum Slot {
    Index(usize),
    Unresolved(Point),
    Missing,
}

struct Extractor<'a, T: RegularTriangulation> {
    triangulation: &'a T,
    points: &'a [WeightedPoint],
    resolver: PointResolver<'a>,
    config: &'a ExtractionConfig,
}

impl<T: RegularTriangulation> Extractor<'_, T> {
    fn resolve_slot(&self, cell: T::Cell, slot: usize) -> Slot {
        let tag = match self.config.index_source {
            IndexSource::PreferKernel => self.triangulation.vertex_index(cell, slot),
            IndexSource::Coordinates => None,
        };
        if let Some(index) = tag {
            if index < self.points.len() {
                return Slot::Index(index);
            }
            return self
                .triangulation
                .vertex_point(cell, slot)
                .map_or(Slot::Missing, Slot::Unresolved);
        }

        match self.triangulation.vertex_point(cell, slot) {
            None => Slot::Missing,
            Some(point) => self
                .resolver
                .resolve(&point)
                .map_or(Slot::Unresolved(point), Slot::Index),
        }
    }

    fn collect<const K: usize>(
        &self,
        kind: SimplexKind,
        simplices: impl Iterator<Item = (T::Cell, Slots)>,
    ) -> Result<(BTreeSet<Simplex<K>>, SimplexTally), ExtractionError> {
        let mut set = BTreeSet::new();
        let mut tally = SimplexTally::default();

        for (cell, slots) in simplices {
            tally.enumerated += 1;

            let mut indices = Slots::new();
            let mut unresolved = None;
            let mut missing = None;
            for &slot in &slots {
                match self.resolve_slot(cell, slot) {
                    Slot::Index(index) => indices.push(index),
                    Slot::Unresolved(point) => {
                        unresolved.get_or_insert((slot, point));
                    }
                    Slot::Missing => {
                        missing.get_or_insert(slot);
                    }
                }
            }

            // Strict fails on any unresolved vertex, even in a simplex that
            // also has an unreadable slot.
            if let Some((slot, point)) = unresolved {
                if self.config.policy == ResolutionPolicy::Strict {
                    return Err(ExtractionError::UnresolvedVertex { kind, slot, point });
                }
            }
            if let Some(slot) = missing {
                tracing::debug!(%kind, ?cell, slot, "discarding simplex with unreadable slot");
                tally.degenerate += 1;
                continue;
            }
            if let Some((slot, point)) = unresolved {
                tracing::debug!(%kind, ?cell, slot, %point, "discarding simplex with unresolved vertex");
                tally.unresolved += 1;
                continue;
            }

            match Simplex::<K>::from_slice(&indices) {
                Ok(simplex) => {
                    if set.insert(simplex) {
                        tally.inserted += 1;
                    } else {
                        tally.duplicates += 1;
                    }
                }
                Err(err) => {
                    tracing::debug!(%kind, ?cell, ?indices, %err, "discarding degenerate simplex");
                    tally.degenerate += 1;
                }
            }
        }

        if tally.unresolved > 0 && self.config.policy == ResolutionPolicy::Warn {
            tracing::warn!(
                %kind,
                unresolved = tally.unresolved,
                enumerated = tally.enumerated,
                "dropped simplices whose vertices did not match any input point"
            );
        }

        Ok((set, tally))
    }
}
