//! The combinatorial skeleton of a regular triangulation.
//!
//! A [`Skeleton`] is the immutable result of extraction: the caller's points in
//! their original order plus deduplicated, ordered sets of canonical edges,
//! triangles and cells over stable indices. The sets are `BTreeSet`s, so
//! iteration is always ascending in the canonical tuple regardless of the
//! order the kernel enumerated the simplices in.

#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::simplex::{Cell, Edge, Simplex, SimplexKind, Triangle};
use crate::geometry::point::Point;

/// Number of simplices of each dimension (the f-vector of a skeleton).
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::skeleton::SimplexCounts;
///
/// // Single tetrahedron: χ = 4 - 6 + 4 - 1 = 1
/// let counts = SimplexCounts { vertices: 4, edges: 6, triangles: 4, cells: 1 };
/// assert_eq!(counts.euler_characteristic(), 1);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimplexCounts {
    /// Vertices referenced by at least one simplex.
    pub vertices: usize,
    /// Edges.
    pub edges: usize,
    /// Triangles.
    pub triangles: usize,
    /// Cells.
    pub cells: usize,
}

impl SimplexCounts {
    /// Count for one simplex kind.
    #[must_use]
    pub const fn count(&self, kind: SimplexKind) -> usize {
        match kind {
            SimplexKind::Edge => self.edges,
            SimplexKind::Triangle => self.triangles,
            SimplexKind::Cell => self.cells,
        }
    }

    /// Alternating sum `V - E + F - C`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // Simplex counts won't exceed isize::MAX in practice
    pub const fn euler_characteristic(&self) -> isize {
        self.vertices as isize - self.edges as isize + self.triangles as isize
            - self.cells as isize
    }
}

/// Errors produced when assembling a skeleton from parts.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SkeletonError {
    /// A simplex names a stable index with no corresponding point.
    #[error("{kind} references vertex {index}, but the skeleton has only {len} points")]
    IndexOutOfRange {
        /// Kind of the offending simplex.
        kind: SimplexKind,
        /// The out-of-range index.
        index: usize,
        /// Number of points in the skeleton.
        len: usize,
    },
}

/// Points plus the canonical simplex sets of one triangulation.
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeSet;
/// use power_skeleton::core::simplex::{Cell, Edge, Triangle};
/// use power_skeleton::core::skeleton::Skeleton;
/// use power_skeleton::geometry::point::Point;
///
/// let vertices = vec![
///     Point::new(0.0, 0.0, 0.0),
///     Point::new(1.0, 0.0, 0.0),
///     Point::new(0.0, 1.0, 0.0),
/// ];
/// let edges: BTreeSet<Edge> = [[0, 1], [0, 2], [1, 2]]
///     .into_iter()
///     .map(|e| Edge::new(e).unwrap())
///     .collect();
/// let triangles: BTreeSet<Triangle> = [Triangle::new([2, 0, 1]).unwrap()].into();
/// let skeleton = Skeleton::from_parts(vertices, edges, triangles, BTreeSet::new()).unwrap();
///
/// assert_eq!(skeleton.number_of_edges(), 3);
/// assert!(skeleton.contains_triangle(&Triangle::new([0, 1, 2]).unwrap()));
/// assert_eq!(skeleton.euler_characteristic(), 1);
/// assert_eq!(skeleton.dimension(), Some(2));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SkeletonParts")]
pub struct Skeleton {
    vertices: Vec<Point>,
    edges: BTreeSet<Edge>,
    triangles: BTreeSet<Triangle>,
    cells: BTreeSet<Cell>,
}

impl Skeleton {
    /// A skeleton with vertices and no simplices.
    #[must_use]
    pub const fn new(vertices: Vec<Point>) -> Self {
        Self {
            vertices,
            edges: BTreeSet::new(),
            triangles: BTreeSet::new(),
            cells: BTreeSet::new(),
        }
    }

    /// Assembles a skeleton from already-canonical simplex sets.
    ///
    /// # Errors
    ///
    /// Returns [`SkeletonError::IndexOutOfRange`] if any simplex references an
    /// index `>= vertices.len()`.
    pub fn from_parts(
        vertices: Vec<Point>,
        edges: BTreeSet<Edge>,
        triangles: BTreeSet<Triangle>,
        cells: BTreeSet<Cell>,
    ) -> Result<Self, SkeletonError> {
        let len = vertices.len();
        check_indices(SimplexKind::Edge, &edges, len)?;
        check_indices(SimplexKind::Triangle, &triangles, len)?;
        check_indices(SimplexKind::Cell, &cells, len)?;
        Ok(Self::from_parts_unchecked(vertices, edges, triangles, cells))
    }

    /// Assembles a skeleton whose indices the caller has already bounded by
    /// `vertices.len()`.
    pub(crate) const fn from_parts_unchecked(
        vertices: Vec<Point>,
        edges: BTreeSet<Edge>,
        triangles: BTreeSet<Triangle>,
        cells: BTreeSet<Cell>,
    ) -> Self {
        Self {
            vertices,
            edges,
            triangles,
            cells,
        }
    }

    /// The caller's points, aligned with stable indices.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Canonical edges in ascending order.
    #[must_use]
    pub const fn edges(&self) -> &BTreeSet<Edge> {
        &self.edges
    }

    /// Canonical triangles in ascending order.
    #[must_use]
    pub const fn triangles(&self) -> &BTreeSet<Triangle> {
        &self.triangles
    }

    /// Canonical cells in ascending order.
    #[must_use]
    pub const fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    /// Number of points (including hidden ones).
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn number_of_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of cells.
    #[must_use]
    pub fn number_of_cells(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the skeleton holds no simplices at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.triangles.is_empty() && self.cells.is_empty()
    }

    /// Returns `true` if `edge` is present.
    #[must_use]
    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    /// Returns `true` if `triangle` is present.
    #[must_use]
    pub fn contains_triangle(&self, triangle: &Triangle) -> bool {
        self.triangles.contains(triangle)
    }

    /// Returns `true` if `cell` is present.
    #[must_use]
    pub fn contains_cell(&self, cell: &Cell) -> bool {
        self.cells.contains(cell)
    }

    /// Highest simplex dimension present, or `None` for an empty skeleton.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        if !self.cells.is_empty() {
            Some(3)
        } else if !self.triangles.is_empty() {
            Some(2)
        } else if !self.edges.is_empty() {
            Some(1)
        } else {
            None
        }
    }

    /// Stable indices that appear in at least one simplex.
    #[must_use]
    pub fn referenced_vertices(&self) -> BTreeSet<usize> {
        let mut used = BTreeSet::new();
        used.extend(self.edges.iter().flat_map(|s| s.vertices().iter().copied()));
        used.extend(self.triangles.iter().flat_map(|s| s.vertices().iter().copied()));
        used.extend(self.cells.iter().flat_map(|s| s.vertices().iter().copied()));
        used
    }

    /// Stable indices of points that appear in no simplex.
    ///
    /// In a regular triangulation these are the points whose weight is too
    /// small relative to their neighbours for them to appear.
    #[must_use]
    pub fn hidden_vertices(&self) -> Vec<usize> {
        let used = self.referenced_vertices();
        (0..self.vertices.len())
            .filter(|i| !used.contains(i))
            .collect()
    }

    /// The f-vector over referenced vertices.
    #[must_use]
    pub fn simplex_counts(&self) -> SimplexCounts {
        SimplexCounts {
            vertices: self.referenced_vertices().len(),
            edges: self.edges.len(),
            triangles: self.triangles.len(),
            cells: self.cells.len(),
        }
    }

    /// `V - E + F - C` over referenced vertices.
    ///
    /// Any triangulated ball, disk or segment has characteristic 1.
    #[must_use]
    pub fn euler_characteristic(&self) -> isize {
        self.simplex_counts().euler_characteristic()
    }
}

/// Writes a labeled, indented list of simplices, one per line.
pub(crate) fn write_simplices<'a, const K: usize>(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    simplices: impl IntoIterator<Item = &'a Simplex<K>>,
) -> fmt::Result {
    writeln!(f, "{label}:")?;
    for simplex in simplices {
        writeln!(f, "  {simplex}")?;
    }
    Ok(())
}

impl fmt::Display for Skeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_simplices(f, SimplexKind::Edge.label(), &self.edges)?;
        write_simplices(f, SimplexKind::Triangle.label(), &self.triangles)?;
        write_simplices(f, SimplexKind::Cell.label(), &self.cells)
    }
}

fn check_indices<const K: usize>(
    kind: SimplexKind,
    simplices: &BTreeSet<Simplex<K>>,
    len: usize,
) -> Result<(), SkeletonError> {
    match simplices
        .iter()
        .filter_map(|s| s.vertices().last().copied())
        .find(|&index| index >= len)
    {
        Some(index) => Err(SkeletonError::IndexOutOfRange { kind, index, len }),
        None => Ok(()),
    }
}

// Deserialization goes through `from_parts` so stored skeletons are re-checked.
#[derive(Deserialize)]
struct SkeletonParts {
    vertices: Vec<Point>,
    edges: BTreeSet<Edge>,
    triangles: BTreeSet<Triangle>,
    cells: BTreeSet<Cell>,
}

impl TryFrom<SkeletonParts> for Skeleton {
    type Error = SkeletonError;

    fn try_from(parts: SkeletonParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.vertices, parts.edges, parts.triangles, parts.cells)
    }
}
