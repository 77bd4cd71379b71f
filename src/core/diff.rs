//! One-sided differences between two skeletons.
//!
//! The diff is meaningful when both skeletons share a stable index space,
//! typically the same points under two weight assignments. Each side of a
//! [`SimplexDiff`] is ascending in the canonical tuple, and swapping the
//! arguments of [`diff_skeletons`] swaps the two sides.

#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::simplex::{Simplex, SimplexKind};
use crate::core::skeleton::{Skeleton, write_simplices};

/// Difference between two sets of canonical `K`-vertex simplices.
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeSet;
/// use power_skeleton::core::diff::SimplexDiff;
/// use power_skeleton::core::simplex::Edge;
///
/// let a: BTreeSet<Edge> = [[0, 1], [1, 2]].map(|e| Edge::new(e).unwrap()).into();
/// let b: BTreeSet<Edge> = [[1, 2], [2, 3]].map(|e| Edge::new(e).unwrap()).into();
///
/// let diff = SimplexDiff::between(&a, &b);
/// assert_eq!(diff.only_in_first, vec![Edge::new([0, 1]).unwrap()]);
/// assert_eq!(diff.only_in_second, vec![Edge::new([2, 3]).unwrap()]);
/// assert_eq!(diff.shared, 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplexDiff<const K: usize> {
    /// Present in the first set only, ascending.
    pub only_in_first: Vec<Simplex<K>>,
    /// Present in the second set only, ascending.
    pub only_in_second: Vec<Simplex<K>>,
    /// Number of simplices present in both.
    pub shared: usize,
}

impl<const K: usize> SimplexDiff<K> {
    /// Computes `first \ second` and `second \ first`.
    #[must_use]
    pub fn between(first: &BTreeSet<Simplex<K>>, second: &BTreeSet<Simplex<K>>) -> Self {
        Self {
            only_in_first: first.difference(second).copied().collect(),
            only_in_second: second.difference(first).copied().collect(),
            shared: first.intersection(second).count(),
        }
    }

    /// Returns `true` if both sets were equal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.only_in_first.is_empty() && self.only_in_second.is_empty()
    }

    /// The same diff with the roles of the two sets exchanged.
    #[must_use]
    pub fn swapped(&self) -> Self {
        Self {
            only_in_first: self.only_in_second.clone(),
            only_in_second: self.only_in_first.clone(),
            shared: self.shared,
        }
    }

    /// Jaccard index `|A ∩ B| / |A ∪ B|`; `1.0` when both sets are empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Simplex counts stay far below 2^53
    pub fn jaccard_index(&self) -> f64 {
        let union = self.shared + self.only_in_first.len() + self.only_in_second.len();
        if union == 0 {
            return 1.0;
        }
        self.shared as f64 / union as f64
    }

    fn write_report(&self, f: &mut fmt::Formatter<'_>, kind: SimplexKind) -> fmt::Result {
        let label = kind.label();
        write_simplices(
            f,
            &format!("{label} in the first but not in the second"),
            &self.only_in_first,
        )?;
        write_simplices(
            f,
            &format!("{label} in the second but not in the first"),
            &self.only_in_second,
        )
    }
}

/// Number of simplices of one kind found on each side only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeCount {
    /// The simplex kind.
    pub kind: SimplexKind,
    /// Length of the first-only list.
    pub only_in_first: usize,
    /// Length of the second-only list.
    pub only_in_second: usize,
}

/// Per-kind differences between two skeletons.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangulationDiff {
    /// Edge differences.
    pub edges: SimplexDiff<2>,
    /// Triangle differences.
    pub triangles: SimplexDiff<3>,
    /// Cell differences.
    pub cells: SimplexDiff<4>,
}

impl TriangulationDiff {
    /// Returns `true` if the skeletons agree on every simplex kind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.triangles.is_empty() && self.cells.is_empty()
    }

    /// Sizes of the one-sided lists, per kind in increasing dimension.
    #[must_use]
    pub fn changed_counts(&self) -> [ChangeCount; 3] {
        [
            ChangeCount {
                kind: SimplexKind::Edge,
                only_in_first: self.edges.only_in_first.len(),
                only_in_second: self.edges.only_in_second.len(),
            },
            ChangeCount {
                kind: SimplexKind::Triangle,
                only_in_first: self.triangles.only_in_first.len(),
                only_in_second: self.triangles.only_in_second.len(),
            },
            ChangeCount {
                kind: SimplexKind::Cell,
                only_in_first: self.cells.only_in_first.len(),
                only_in_second: self.cells.only_in_second.len(),
            },
        ]
    }

    /// Jaccard index of the two sets of `kind`.
    #[must_use]
    pub fn jaccard_index(&self, kind: SimplexKind) -> f64 {
        match kind {
            SimplexKind::Edge => self.edges.jaccard_index(),
            SimplexKind::Triangle => self.triangles.jaccard_index(),
            SimplexKind::Cell => self.cells.jaccard_index(),
        }
    }

    /// The diff with the two skeletons exchanged.
    #[must_use]
    pub fn swapped(&self) -> Self {
        Self {
            edges: self.edges.swapped(),
            triangles: self.triangles.swapped(),
            cells: self.cells.swapped(),
        }
    }
}

impl fmt::Display for TriangulationDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.edges.write_report(f, SimplexKind::Edge)?;
        self.triangles.write_report(f, SimplexKind::Triangle)?;
        self.cells.write_report(f, SimplexKind::Cell)
    }
}

/// Diffs `first` against `second` for every simplex kind.
///
/// Skeletons over different point counts are still compared; a warning is
/// logged since their index spaces may not line up.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::diff::diff_skeletons;
/// use power_skeleton::core::skeleton::Skeleton;
///
/// let a = Skeleton::default();
/// let diff = diff_skeletons(&a, &a.clone());
/// assert!(diff.is_empty());
/// ```
#[must_use]
pub fn diff_skeletons(first: &Skeleton, second: &Skeleton) -> TriangulationDiff {
    if first.number_of_vertices() != second.number_of_vertices() {
        tracing::warn!(
            first = first.number_of_vertices(),
            second = second.number_of_vertices(),
            "diffing skeletons built over different point counts"
        );
    }

    let diff = TriangulationDiff {
        edges: SimplexDiff::between(first.edges(), second.edges()),
        triangles: SimplexDiff::between(first.triangles(), second.triangles()),
        cells: SimplexDiff::between(first.cells(), second.cells()),
    };

    tracing::debug!(changes = ?diff.changed_counts(), "skeletons diffed");
    diff
}
