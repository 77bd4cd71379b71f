//! Geometric kernel abstraction following CGAL's design.
//!
//! The skeleton extractor never builds a triangulation itself. It consumes one
//! through two traits:
//!
//! - [`TriangulationKernel`] constructs a regular triangulation from weighted
//!   points (construct-triangulation).
//! - [`RegularTriangulation`] is the resulting read-only handle: it enumerates
//!   finite edges, facets and cells in CGAL's `(cell, local index)` form and
//!   reports the point stored at each vertex slot.
//!
//! A cell handle has vertex slots `0..=dimension()`. A facet is a cell plus the
//! slot of the vertex *opposite* to it; an edge is a cell plus two slots. In a
//! 2D triangulation the faces play the role of cells and every facet is
//! reported with opposite slot 3, as CGAL does.

use std::fmt::Debug;

use thiserror::Error;

use crate::core::collections::{Entry, FastHashMap, fast_hash_map_with_capacity};
use crate::geometry::point::{Point, WeightedPoint};
use crate::geometry::predicates::PredicateError;

/// Minimum number of points a kernel accepts.
pub const MIN_TRIANGULATION_POINTS: usize = 4;

/// Errors raised while constructing a triangulation.
///
/// These are configuration errors: the caller must fix the input.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::kernel::KernelError;
///
/// let err = KernelError::InsufficientPoints { actual: 3, required: 4 };
/// assert_eq!(err.to_string(), "At least 4 weighted points are required, got 3");
/// ```
#[derive(Debug, Error)]
pub enum KernelError {
    /// Too few points to build a triangulation.
    #[error("At least {required} weighted points are required, got {actual}")]
    InsufficientPoints {
        /// Points supplied.
        actual: usize,
        /// Minimum accepted.
        required: usize,
    },
    /// A coordinate or weight is NaN or infinite.
    #[error("Weighted point {index} has a non-finite coordinate or weight: {point:?}")]
    NonFinite {
        /// Position in the caller's sequence.
        index: usize,
        /// The offending point.
        point: WeightedPoint,
    },
    /// Two points share the same coordinates.
    #[error("Weighted points {first} and {duplicate} are coincident at {point}")]
    DuplicatePoint {
        /// Index of the first occurrence.
        first: usize,
        /// Index of the repeated occurrence.
        duplicate: usize,
        /// The shared coordinates.
        point: Point,
    },
    /// A geometric predicate failed.
    #[error(transparent)]
    Predicate(#[from] PredicateError),
    /// A failure reported by an external kernel backend.
    #[error("Kernel backend failed: {message}")]
    Backend {
        /// Backend-specific description.
        message: String,
    },
}

/// Read-only handle to a constructed regular triangulation.
///
/// Implementations must enumerate only *finite* simplices, and must echo back
/// the exact coordinates they were given: [`vertex_point`](Self::vertex_point)
/// is compared bit-for-bit against the caller's points when no index tag is
/// available.
pub trait RegularTriangulation {
    /// Opaque cell handle.
    type Cell: Copy + Debug;

    /// Affine dimension of the triangulation (0 to 3), or `None` when empty.
    fn dimension(&self) -> Option<usize>;

    /// Number of finite vertices, hidden points excluded.
    fn number_of_vertices(&self) -> usize;

    /// Finite cells. Empty unless the dimension is 3.
    fn finite_cells(&self) -> impl Iterator<Item = Self::Cell> + '_;

    /// Finite facets as `(cell, opposite slot)`.
    fn finite_facets(&self) -> impl Iterator<Item = (Self::Cell, usize)> + '_;

    /// Finite edges as `(cell, slot, slot)`.
    fn finite_edges(&self) -> impl Iterator<Item = (Self::Cell, usize, usize)> + '_;

    /// Point stored at `slot` of `cell`, or `None` for an invalid slot.
    fn vertex_point(&self, cell: Self::Cell, slot: usize) -> Option<Point>;

    /// Caller index attached to the vertex at `slot`, if the kernel carries one.
    ///
    /// Kernels that cannot attach auxiliary data keep the default, and the
    /// extractor falls back to coordinate resolution.
    fn vertex_index(&self, _cell: Self::Cell, _slot: usize) -> Option<usize> {
        None
    }
}

/// Builder of regular triangulations.
pub trait TriangulationKernel {
    /// The handle type produced.
    type Triangulation: RegularTriangulation;

    /// Builds the regular triangulation of `points`.
    ///
    /// # Errors
    ///
    /// Returns a [`KernelError`] if the input cannot be triangulated.
    fn triangulate(&self, points: &[WeightedPoint]) -> Result<Self::Triangulation, KernelError>;
}

/// Checks the preconditions shared by all kernels.
///
/// - at least [`MIN_TRIANGULATION_POINTS`] points
/// - finite coordinates and weights
/// - no two points with equal coordinates
///
/// # Errors
///
/// Returns the first violated precondition as a [`KernelError`].
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::kernel::{validate_input, KernelError};
/// use power_skeleton::geometry::point::WeightedPoint;
///
/// let points: Vec<WeightedPoint> = vec![
///     ([0.0, 0.0, 0.0], 0.0).into(),
///     ([1.0, 0.0, 0.0], 0.0).into(),
///     ([0.0, 1.0, 0.0], 0.0).into(),
///     ([1.0, 0.0, 0.0], 2.0).into(),
/// ];
/// assert!(matches!(
///     validate_input(&points),
///     Err(KernelError::DuplicatePoint { first: 1, duplicate: 3, .. })
/// ));
/// ```
pub fn validate_input(points: &[WeightedPoint]) -> Result<(), KernelError> {
    if points.len() < MIN_TRIANGULATION_POINTS {
        return Err(KernelError::InsufficientPoints {
            actual: points.len(),
            required: MIN_TRIANGULATION_POINTS,
        });
    }

    let mut seen: FastHashMap<[u64; 3], usize> = fast_hash_map_with_capacity(points.len());
    for (index, wp) in points.iter().enumerate() {
        let key = match wp.point().exact_key() {
            Some(key) if wp.is_finite() => key,
            _ => {
                return Err(KernelError::NonFinite { index, point: *wp });
            }
        };
        match seen.entry(key) {
            Entry::Occupied(first) => {
                return Err(KernelError::DuplicatePoint {
                    first: *first.get(),
                    duplicate: index,
                    point: wp.point(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(index);
            }
        }
    }
    Ok(())
}
