//! Geometric predicates on lifted points.
//!
//! A weighted point `(p, w)` lifts to `(p, |p|² - w)`. Two predicates drive the
//! regular triangulation:
//!
//! - [`orientation`]: the sign of a simplex in its (local) affine frame.
//! - [`power_sphere`]: whether a lifted query point lies below, on, or above the
//!   hyperplane through a lifted simplex. "Below" means the query conflicts with
//!   the simplex (it lies inside the simplex's orthogonal sphere).
//!
//! Each determinant is evaluated with a fast LU filter first. When the result is
//! too close to zero to trust, the same rows are re-evaluated by cofactor
//! expansion, which is exact for coordinates whose products are representable.
//! [`perturbed_power_sphere`] additionally resolves exact ties by a symbolic
//! perturbation of the heights (`h_i + ε^(i+1)`), so it never reports
//! `BOUNDARY`.

#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::collections::SmallBuffer;
use crate::geometry::matrix::{SquareRows, StackMatrixDispatchError, adaptive_tolerance};

/// Round-off allowance for the cofactor expansion, relative to the Hadamard bound.
const EXPANSION_ERROR_FACTOR: f64 = 128.0 * f64::EPSILON;

/// Errors produced by the predicates.
#[derive(Debug, Error)]
pub enum PredicateError {
    /// The number of points passed does not match the dimension.
    #[error("Expected {expected} points for a {dimension}D simplex, got {actual}")]
    WrongPointCount {
        /// Points supplied.
        actual: usize,
        /// Points required.
        expected: usize,
        /// Local dimension.
        dimension: usize,
    },
    /// The simplex has zero volume, so no power sphere is defined.
    #[error("Simplex is degenerate (zero orientation determinant)")]
    DegenerateSimplex,
    /// A determinant evaluated to NaN or infinity.
    #[error("Determinant is not finite")]
    NonFinite,
    /// Matrix dispatch failure.
    #[error(transparent)]
    Matrix(#[from] StackMatrixDispatchError),
}

/// Tolerances used when classifying determinant signs.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::predicates::PredicateConfig;
///
/// let config = PredicateConfig::default();
/// assert_eq!(config.base_tolerance, 1e-12);
/// assert_eq!(config.relative_tolerance_factor, 1e-10);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredicateConfig {
    /// Absolute tolerance floor.
    pub base_tolerance: f64,
    /// Relative factor applied to the Hadamard bound of each matrix.
    pub relative_tolerance_factor: f64,
}

impl Default for PredicateConfig {
    fn default() -> Self {
        Self {
            base_tolerance: 1e-12,
            relative_tolerance_factor: 1e-10,
        }
    }
}

/// Represents the orientation of a simplex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The simplex has negative orientation (determinant < 0)
    NEGATIVE,
    /// The simplex is degenerate (determinant ≈ 0)
    DEGENERATE,
    /// The simplex has positive orientation (determinant > 0)
    POSITIVE,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

impl From<Ordering> for Orientation {
    fn from(sign: Ordering) -> Self {
        match sign {
            Ordering::Less => Self::NEGATIVE,
            Ordering::Equal => Self::DEGENERATE,
            Ordering::Greater => Self::POSITIVE,
        }
    }
}

/// Position of a lifted point relative to the lifted hyperplane of a simplex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerSphere {
    /// The lifted point is above the hyperplane (no conflict).
    OUTSIDE,
    /// The lifted point is on the hyperplane.
    BOUNDARY,
    /// The lifted point is strictly below the hyperplane (conflict).
    INSIDE,
}

impl fmt::Display for PowerSphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BOUNDARY => write!(f, "BOUNDARY"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

/// A point in a `D`-dimensional affine frame, with its lifted height and the
/// caller index that fixes its symbolic perturbation rank.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiftedPoint<const D: usize> {
    /// Coordinates in the local frame.
    pub coords: [f64; D],
    /// Height on the lifting paraboloid, `|p|² - w`.
    pub height: f64,
    /// Stable index; lower indices carry the larger perturbation.
    pub index: usize,
}

/// Classify the sign of a determinant.
///
/// # Errors
///
/// Returns [`PredicateError::NonFinite`] if neither evaluation is finite.
pub fn determinant_sign(
    rows: &SquareRows,
    config: &PredicateConfig,
) -> Result<Ordering, PredicateError> {
    let fast = rows.lu_determinant()?;
    let tol = adaptive_tolerance(
        rows,
        config.base_tolerance,
        config.relative_tolerance_factor,
    );
    if fast.is_finite() && fast.abs() > tol {
        return Ok(sign_of(fast));
    }

    let exact = rows.expansion_determinant();
    if !exact.is_finite() {
        return Err(PredicateError::NonFinite);
    }
    let zero_band = config
        .base_tolerance
        .max(EXPANSION_ERROR_FACTOR * rows.hadamard_bound());
    if exact.abs() <= zero_band {
        Ok(Ordering::Equal)
    } else {
        Ok(sign_of(exact))
    }
}

fn sign_of(value: f64) -> Ordering {
    if value > 0.0 {
        Ordering::Greater
    } else if value < 0.0 {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// Determine the orientation of a simplex in a `D`-dimensional frame.
///
/// The determinant is taken over rows `[x₁ … x_D, 1]`.
///
/// # Errors
///
/// Returns an error if `points.len() != D + 1` or a determinant is not finite.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::predicates::{orientation, Orientation, PredicateConfig};
///
/// let config = PredicateConfig::default();
/// let tri = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
/// assert_eq!(orientation(&tri, &config).unwrap(), Orientation::POSITIVE);
///
/// let collinear = [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
/// assert_eq!(orientation(&collinear, &config).unwrap(), Orientation::DEGENERATE);
/// ```
pub fn orientation<const D: usize>(
    points: &[[f64; D]],
    config: &PredicateConfig,
) -> Result<Orientation, PredicateError> {
    if points.len() != D + 1 {
        return Err(PredicateError::WrongPointCount {
            actual: points.len(),
            expected: D + 1,
            dimension: D,
        });
    }
    let mut rows = SquareRows::new(D + 1)?;
    for (r, coords) in points.iter().enumerate() {
        let mut row: SmallBuffer<f64, 5> = coords.iter().copied().collect();
        row.push(1.0);
        rows.set_row(r, &row);
    }
    Ok(determinant_sign(&rows, config)?.into())
}

fn lifted_rows<const D: usize>(
    simplex: &[LiftedPoint<D>],
    query: &LiftedPoint<D>,
) -> Result<SquareRows, PredicateError> {
    if simplex.len() != D + 1 {
        return Err(PredicateError::WrongPointCount {
            actual: simplex.len(),
            expected: D + 1,
            dimension: D,
        });
    }
    let mut rows = SquareRows::new(D + 2)?;
    for (r, p) in simplex.iter().chain(std::iter::once(query)).enumerate() {
        let mut row: SmallBuffer<f64, 5> = p.coords.iter().copied().collect();
        row.push(p.height);
        row.push(1.0);
        rows.set_row(r, &row);
    }
    Ok(rows)
}

fn simplex_sign<const D: usize>(
    simplex: &[LiftedPoint<D>],
    config: &PredicateConfig,
) -> Result<Ordering, PredicateError> {
    let coords: SmallBuffer<[f64; D], 4> = simplex.iter().map(|p| p.coords).collect();
    match orientation(&coords, config)? {
        Orientation::DEGENERATE => Err(PredicateError::DegenerateSimplex),
        Orientation::NEGATIVE => Ok(Ordering::Less),
        Orientation::POSITIVE => Ok(Ordering::Greater),
    }
}

/// Interpret the lifted determinant `det` against the simplex orientation.
///
/// With the query in the last row, `det = -δ · orient(S)` where `δ` is the
/// height of the lifted query above the hyperplane.
const fn classify(det: Ordering, simplex: Ordering) -> PowerSphere {
    match (det, simplex) {
        (Ordering::Equal, _) => PowerSphere::BOUNDARY,
        (Ordering::Less, Ordering::Less) | (Ordering::Greater, Ordering::Greater) => {
            PowerSphere::INSIDE
        }
        _ => PowerSphere::OUTSIDE,
    }
}

/// Test a lifted query point against the lifted hyperplane of a simplex.
///
/// # Errors
///
/// Returns an error if the simplex has the wrong number of points, is
/// degenerate, or a determinant is not finite.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::predicates::{
///     power_sphere, LiftedPoint, PowerSphere, PredicateConfig,
/// };
///
/// let lift = |x: f64, w: f64, index: usize| LiftedPoint { coords: [x], height: x * x - w, index };
/// let config = PredicateConfig::default();
/// let segment = [lift(0.0, 0.0, 0), lift(2.0, 0.0, 1)];
///
/// assert_eq!(power_sphere(&segment, &lift(1.0, 0.0, 2), &config).unwrap(), PowerSphere::INSIDE);
/// assert_eq!(power_sphere(&segment, &lift(3.0, 0.0, 2), &config).unwrap(), PowerSphere::OUTSIDE);
/// // A weight of -1 lifts the midpoint exactly onto the chord.
/// assert_eq!(power_sphere(&segment, &lift(1.0, -1.0, 2), &config).unwrap(), PowerSphere::BOUNDARY);
/// ```
pub fn power_sphere<const D: usize>(
    simplex: &[LiftedPoint<D>],
    query: &LiftedPoint<D>,
    config: &PredicateConfig,
) -> Result<PowerSphere, PredicateError> {
    let rows = lifted_rows(simplex, query)?;
    let orient = simplex_sign(simplex, config)?;
    Ok(classify(determinant_sign(&rows, config)?, orient))
}

/// [`power_sphere`] with exact ties broken by symbolic perturbation.
///
/// Heights are perturbed to `h_i + ε^(index_i + 1)`. The perturbed determinant
/// is `det + Σ ε^(index_i + 1) · C_i`, where `C_i` is the cofactor of row `i`
/// in the height column, so its sign is the sign of the first non-zero
/// cofactor in index order. The query's cofactor is `-orient(S)`, which is
/// never zero for a non-degenerate simplex, so a decision always exists.
///
/// # Errors
///
/// Same as [`power_sphere`].
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::predicates::{
///     perturbed_power_sphere, LiftedPoint, PowerSphere, PredicateConfig,
/// };
///
/// let lift = |x: f64, w: f64, index: usize| LiftedPoint { coords: [x], height: x * x - w, index };
/// let config = PredicateConfig::default();
/// let segment = [lift(0.0, 0.0, 1), lift(2.0, 0.0, 2)];
///
/// // Exactly on the chord: the lowest-index point (the query here) is lifted
/// // highest by the perturbation, so it ends up above.
/// let tie = lift(1.0, -1.0, 0);
/// assert_eq!(perturbed_power_sphere(&segment, &tie, &config).unwrap(), PowerSphere::OUTSIDE);
/// ```
pub fn perturbed_power_sphere<const D: usize>(
    simplex: &[LiftedPoint<D>],
    query: &LiftedPoint<D>,
    config: &PredicateConfig,
) -> Result<PowerSphere, PredicateError> {
    let rows = lifted_rows(simplex, query)?;
    let orient = simplex_sign(simplex, config)?;
    let det = determinant_sign(&rows, config)?;
    if det != Ordering::Equal {
        return Ok(classify(det, orient));
    }

    let height_col = D;
    let mut by_index: SmallBuffer<(usize, usize), 5> = simplex
        .iter()
        .chain(std::iter::once(query))
        .enumerate()
        .map(|(row, p)| (p.index, row))
        .collect();
    by_index.sort_unstable();

    for (_, row) in by_index {
        let minor = rows.minor(row, height_col)?;
        let minor_sign = determinant_sign(&minor, config)?;
        if minor_sign == Ordering::Equal {
            continue;
        }
        let cofactor = if (row + height_col) % 2 == 0 {
            minor_sign
        } else {
            minor_sign.reverse()
        };
        return Ok(classify(cofactor, orient));
    }

    Err(PredicateError::DegenerateSimplex)
}
