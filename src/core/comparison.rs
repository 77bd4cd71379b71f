//! End-to-end comparison of two weight assignments.
//!
//! [`compare_weightings`] triangulates two weighted point sequences with the
//! same kernel, extracts both skeletons and diffs them. [`compare_reweighted`]
//! is the common special case of changing a single point's weight.

#![forbid(unsafe_code)]

use std::fmt;

use thiserror::Error;

use crate::core::diff::{TriangulationDiff, diff_skeletons};
use crate::core::extraction::{Extraction, ExtractionConfig, ExtractionError, extract_skeleton};
use crate::geometry::kernel::{KernelError, TriangulationKernel};
use crate::geometry::point::{PointSequenceError, WeightedPoint, reweighted};

/// Errors raised by the comparison pipeline.
#[derive(Debug, Error)]
pub enum ComparisonError {
    /// The kernel rejected a point sequence.
    #[error(transparent)]
    Kernel(#[from] KernelError),
    /// Extraction failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// The reweighted index does not exist.
    #[error(transparent)]
    PointSequence(#[from] PointSequenceError),
}

/// Triangulates `points` with `kernel` and extracts the skeleton.
///
/// # Errors
///
/// Returns [`ComparisonError::Kernel`] if the kernel rejects the input and
/// [`ComparisonError::Extraction`] if extraction fails.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::comparison::build_skeleton;
/// use power_skeleton::core::extraction::ExtractionConfig;
/// use power_skeleton::geometry::algorithms::lifted_hull::LiftedHullKernel;
/// use power_skeleton::geometry::point::WeightedPoint;
///
/// let points: Vec<WeightedPoint> = vec![
///     ([0.0, 0.0, 0.0], 0.0).into(),
///     ([1.0, 0.0, 0.0], 0.0).into(),
///     ([0.0, 1.0, 0.0], 0.0).into(),
///     ([1.0, 1.0, 0.0], 0.0).into(),
/// ];
/// let extraction = build_skeleton(&LiftedHullKernel::new(), &points, &ExtractionConfig::default()).unwrap();
/// // Coplanar input: two triangles, no cells.
/// assert_eq!(extraction.skeleton().number_of_cells(), 0);
/// assert_eq!(extraction.skeleton().number_of_triangles(), 2);
/// ```
pub fn build_skeleton<K>(
    kernel: &K,
    points: &[WeightedPoint],
    config: &ExtractionConfig,
) -> Result<Extraction, ComparisonError>
where
    K: TriangulationKernel,
{
    let triangulation = kernel.triangulate(points)?;
    Ok(extract_skeleton(&triangulation, points, config)?)
}

/// Two extractions and their difference.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightComparison {
    first: Extraction,
    second: Extraction,
    diff: TriangulationDiff,
}

impl WeightComparison {
    /// Extraction of the first point sequence.
    #[must_use]
    pub const fn first(&self) -> &Extraction {
        &self.first
    }

    /// Extraction of the second point sequence.
    #[must_use]
    pub const fn second(&self) -> &Extraction {
        &self.second
    }

    /// Differences, first against second.
    #[must_use]
    pub const fn diff(&self) -> &TriangulationDiff {
        &self.diff
    }
}

impl fmt::Display for WeightComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== First triangulation ===")?;
        write!(f, "{}", self.first.skeleton())?;
        writeln!(f)?;
        writeln!(f, "=== Second triangulation ===")?;
        write!(f, "{}", self.second.skeleton())?;
        writeln!(f)?;
        writeln!(f, "=== Differences ===")?;
        write!(f, "{}", self.diff)
    }
}

/// Builds and diffs the skeletons of two weight assignments.
///
/// # Errors
///
/// Propagates the first [`ComparisonError`] from either side.
pub fn compare_weightings<K>(
    kernel: &K,
    first: &[WeightedPoint],
    second: &[WeightedPoint],
    config: &ExtractionConfig,
) -> Result<WeightComparison, ComparisonError>
where
    K: TriangulationKernel,
{
    if first.len() != second.len() {
        tracing::warn!(
            first = first.len(),
            second = second.len(),
            "comparing point sequences of different lengths"
        );
    }

    let first = build_skeleton(kernel, first, config)?;
    let second = build_skeleton(kernel, second, config)?;
    let diff = diff_skeletons(first.skeleton(), second.skeleton());

    let (a, b) = (first.skeleton(), second.skeleton());
    if a.simplex_counts() != b.simplex_counts() {
        tracing::debug!(
            first = ?a.simplex_counts(),
            second = ?b.simplex_counts(),
            "weight change altered simplex counts"
        );
    }

    Ok(WeightComparison {
        first,
        second,
        diff,
    })
}

/// Compares `points` against a copy whose point `index` carries `weight`.
///
/// # Errors
///
/// Returns [`ComparisonError::PointSequence`] for an out-of-range `index`,
/// otherwise as [`compare_weightings`].
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::comparison::compare_reweighted;
/// use power_skeleton::core::extraction::ExtractionConfig;
/// use power_skeleton::geometry::algorithms::lifted_hull::LiftedHullKernel;
/// use power_skeleton::geometry::point::WeightedPoint;
///
/// let points: Vec<WeightedPoint> = vec![
///     ([0.0, 0.0, 0.0], 0.0).into(),
///     ([1.0, 0.0, 0.0], 0.0).into(),
///     ([0.0, 1.0, 0.0], 0.0).into(),
///     ([0.0, 0.0, 1.0], 0.0).into(),
///     ([1.0, 1.0, 1.0], 0.0).into(),
/// ];
/// let comparison = compare_reweighted(
///     &LiftedHullKernel::new(),
///     &points,
///     4,
///     100.0,
///     &ExtractionConfig::default(),
/// )
/// .unwrap();
/// assert!(!comparison.diff().cells.is_empty());
/// ```
pub fn compare_reweighted<K>(
    kernel: &K,
    points: &[WeightedPoint],
    index: usize,
    weight: f64,
    config: &ExtractionConfig,
) -> Result<WeightComparison, ComparisonError>
where
    K: TriangulationKernel,
{
    let modified = reweighted(points, index, weight)?;
    compare_weightings(kernel, points, &modified, config)
}
