//! Canonical simplices over stable point indices.
//!
//! A simplex is identified purely by the caller-assigned indices of its
//! vertices. [`Simplex::new`] sorts those indices ascending, so `(3, 1, 2)` and
//! `(1, 3, 2)` both become `(1, 2, 3)`, and rejects repeated indices so a
//! degenerate simplex can never be represented.
//!
//! ## Determinism
//!
//! `Simplex` ordering is lexicographic on the canonical index tuple. Ordered
//! collections of simplices therefore iterate in the same order regardless of
//! how the vertices were discovered.

#![forbid(unsafe_code)]

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors produced when building a canonical simplex.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::simplex::{Simplex, SimplexError};
///
/// let err = Simplex::new([4, 2, 4]).unwrap_err();
/// assert_eq!(err, SimplexError::RepeatedIndex { index: 4 });
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SimplexError {
    /// The same vertex index appears more than once.
    #[error("Vertex index {index} appears more than once in a simplex")]
    RepeatedIndex {
        /// The repeated index.
        index: usize,
    },
    /// The number of indices does not match the simplex arity.
    #[error("Expected {expected} vertex indices, got {actual}")]
    WrongArity {
        /// Required arity.
        expected: usize,
        /// Indices supplied.
        actual: usize,
    },
}

/// Sorts `indices` ascending.
///
/// This is the pure canonicalization step; it does not check for repeated
/// indices. Use [`Simplex::new`] to also enforce distinctness.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::simplex::canonicalize;
///
/// assert_eq!(canonicalize([3, 1, 2]), [1, 2, 3]);
/// assert_eq!(canonicalize([1, 3, 2]), [1, 2, 3]);
/// ```
#[inline]
#[must_use]
pub fn canonicalize<const K: usize>(mut indices: [usize; K]) -> [usize; K] {
    indices.sort_unstable();
    indices
}

/// A canonical simplex with `K` distinct vertex indices in ascending order.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::simplex::{Simplex, Triangle};
///
/// let a: Triangle = Simplex::new([3, 1, 2]).unwrap();
/// let b: Triangle = Simplex::new([1, 3, 2]).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.vertices(), &[1, 2, 3]);
/// assert_eq!(a.to_string(), "(1,2,3)");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Simplex<const K: usize> {
    vertices: [usize; K],
}

/// An edge: two distinct stable indices.
pub type Edge = Simplex<2>;
/// A triangular facet: three distinct stable indices.
pub type Triangle = Simplex<3>;
/// A tetrahedral cell: four distinct stable indices.
pub type Cell = Simplex<4>;

impl<const K: usize> Simplex<K> {
    /// Canonicalizes `indices` and checks that they are distinct.
    ///
    /// # Errors
    ///
    /// Returns [`SimplexError::RepeatedIndex`] if any index occurs twice.
    pub fn new(indices: [usize; K]) -> Result<Self, SimplexError> {
        let vertices = canonicalize(indices);
        if let Some(w) = vertices.windows(2).find(|w| w[0] == w[1]) {
            return Err(SimplexError::RepeatedIndex { index: w[0] });
        }
        Ok(Self { vertices })
    }

    /// Builds a simplex from a slice that must hold exactly `K` indices.
    ///
    /// # Errors
    ///
    /// Returns [`SimplexError::WrongArity`] for a slice of the wrong length and
    /// [`SimplexError::RepeatedIndex`] for repeated indices.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use power_skeleton::core::simplex::{Edge, SimplexError};
    ///
    /// assert_eq!(Edge::from_slice(&[5, 2]).unwrap().vertices(), &[2, 5]);
    /// assert_eq!(
    ///     Edge::from_slice(&[1, 2, 3]),
    ///     Err(SimplexError::WrongArity { expected: 2, actual: 3 })
    /// );
    /// ```
    pub fn from_slice(indices: &[usize]) -> Result<Self, SimplexError> {
        let array: [usize; K] = indices.try_into().map_err(|_| SimplexError::WrongArity {
            expected: K,
            actual: indices.len(),
        })?;
        Self::new(array)
    }

    /// The canonical (ascending) vertex indices.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> &[usize; K] {
        &self.vertices
    }

    /// Returns `true` if `index` is one of this simplex's vertices.
    #[inline]
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.vertices.binary_search(&index).is_ok()
    }

    /// The number of vertices, `K`.
    #[inline]
    #[must_use]
    pub const fn arity(&self) -> usize {
        K
    }
}

impl Triangle {
    /// The three edges of this triangle, in canonical order.
    #[must_use]
    pub const fn edges(&self) -> [Edge; 3] {
        let [a, b, c] = self.vertices;
        [
            Edge { vertices: [a, b] },
            Edge { vertices: [a, c] },
            Edge { vertices: [b, c] },
        ]
    }
}

impl Cell {
    /// The four triangular faces of this cell, in canonical order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use power_skeleton::core::simplex::{Cell, Triangle};
    ///
    /// let cell = Cell::new([3, 0, 2, 1]).unwrap();
    /// let faces = cell.triangles();
    /// assert_eq!(faces[0], Triangle::new([0, 1, 2]).unwrap());
    /// assert_eq!(faces[3], Triangle::new([1, 2, 3]).unwrap());
    /// ```
    #[must_use]
    pub const fn triangles(&self) -> [Triangle; 4] {
        let [a, b, c, d] = self.vertices;
        [
            Triangle { vertices: [a, b, c] },
            Triangle { vertices: [a, b, d] },
            Triangle { vertices: [a, c, d] },
            Triangle { vertices: [b, c, d] },
        ]
    }
}

impl<const K: usize> fmt::Display for Simplex<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.vertices.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, ")")
    }
}

impl<const K: usize> TryFrom<[usize; K]> for Simplex<K> {
    type Error = SimplexError;

    fn try_from(indices: [usize; K]) -> Result<Self, Self::Error> {
        Self::new(indices)
    }
}

// Serialized as a plain index list; deserialization re-validates the invariants.
impl<const K: usize> Serialize for Simplex<K> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.vertices.as_slice().serialize(serializer)
    }
}

impl<'de, const K: usize> Deserialize<'de> for Simplex<K> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let indices = Vec::<usize>::deserialize(deserializer)?;
        Self::from_slice(&indices).map_err(D::Error::custom)
    }
}

/// The three simplex kinds tracked by a skeleton.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SimplexKind {
    /// 1-simplices.
    Edge,
    /// 2-simplices (facets).
    Triangle,
    /// 3-simplices.
    Cell,
}

impl SimplexKind {
    /// All kinds, in increasing dimension.
    pub const ALL: [Self; 3] = [Self::Edge, Self::Triangle, Self::Cell];

    /// Number of vertices of a simplex of this kind.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Edge => 2,
            Self::Triangle => 3,
            Self::Cell => 4,
        }
    }

    /// Plural label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Edge => "Edges",
            Self::Triangle => "Triangles",
            Self::Cell => "Cells",
        }
    }
}

impl fmt::Display for SimplexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edge => write!(f, "edge"),
            Self::Triangle => write!(f, "triangle"),
            Self::Cell => write!(f, "cell"),
        }
    }
}
