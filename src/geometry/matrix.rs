//! Matrix operations.
//!
//! Small, stack-allocated determinant helpers used by the orientation and
//! power predicates. Every matrix in this crate is at most 5×5: a lifted power
//! test in 3D is `(D+2)×(D+2)`.

#![forbid(unsafe_code)]

use la_stack::{LaError, Matrix as LaMatrix};
use thiserror::Error;

/// Stack-matrix dispatch limit.
///
/// - orientation: (D+1)×(D+1)
/// - lifted power test: (D+2)×(D+2)
///
/// With D ≤ 3 the largest matrix is 5×5.
pub const MAX_STACK_MATRIX_DIM: usize = 5;

/// Internal linear algebra matrix type used by this crate for fixed-size operations.
pub type Matrix<const D: usize> = LaMatrix<D>;

/// Error type for stack-matrix dispatch.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::matrix::StackMatrixDispatchError;
///
/// let err = StackMatrixDispatchError::UnsupportedDim { k: 9, max: 5 };
/// assert_eq!(err.to_string(), "unsupported stack matrix size: 9 (max 5)");
/// ```
#[derive(Debug, Error)]
pub enum StackMatrixDispatchError {
    /// The requested matrix size is not supported by the stack-matrix dispatcher.
    #[error("unsupported stack matrix size: {k} (max {max})")]
    UnsupportedDim {
        /// Requested matrix dimension.
        k: usize,
        /// Maximum supported matrix dimension.
        max: usize,
    },
    /// A linear algebra error originating from `la-stack`.
    #[error(transparent)]
    La(#[from] LaError),
}

/// Dispatch a runtime `k` (matrix dimension) to a stack-allocated `la_stack::Matrix<k>`.
///
/// # Panics
///
/// Panics if `k` is zero or exceeds [`MAX_STACK_MATRIX_DIM`].
macro_rules! with_la_stack_matrix {
    ($k:expr, |$m:ident| $body:block) => {{
        match $k {
            1 => {
                let mut $m = $crate::geometry::matrix::Matrix::<1>::zero();
                $body
            }
            2 => {
                let mut $m = $crate::geometry::matrix::Matrix::<2>::zero();
                $body
            }
            3 => {
                let mut $m = $crate::geometry::matrix::Matrix::<3>::zero();
                $body
            }
            4 => {
                let mut $m = $crate::geometry::matrix::Matrix::<4>::zero();
                $body
            }
            5 => {
                let mut $m = $crate::geometry::matrix::Matrix::<5>::zero();
                $body
            }
            k => panic!(
                "unsupported stack matrix size: {k} (max {max})",
                max = $crate::geometry::matrix::MAX_STACK_MATRIX_DIM
            ),
        }
    }};
}

/// Fallible variant of [`with_la_stack_matrix!`] that returns an error instead of panicking.
macro_rules! try_with_la_stack_matrix {
    ($k:expr, |$m:ident| $body:block) => {{
        let k = $k;
        if k == 0 || k > $crate::geometry::matrix::MAX_STACK_MATRIX_DIM {
            Err(
                $crate::geometry::matrix::StackMatrixDispatchError::UnsupportedDim {
                    k,
                    max: $crate::geometry::matrix::MAX_STACK_MATRIX_DIM,
                }
                .into(),
            )
        } else {
            with_la_stack_matrix!(k, |$m| $body)
        }
    }};
}

#[inline]
pub(crate) fn matrix_set<const D: usize>(m: &mut Matrix<D>, r: usize, c: usize, value: f64) {
    let ok = m.set(r, c, value);
    assert!(ok, "matrix index out of bounds: ({r}, {c}) for {D}x{D}");
}

/// Compute an LU-based determinant, returning 0.0 for singular matrices.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::matrix::{determinant, Matrix};
///
/// let m = Matrix::<2>::zero();
/// assert_eq!(determinant(&m), 0.0);
/// ```
#[inline]
#[must_use]
pub fn determinant<const D: usize>(m: &Matrix<D>) -> f64 {
    match m.det(0.0) {
        Ok(det) => det,
        Err(LaError::Singular { .. }) => 0.0,
        Err(LaError::NonFinite { .. }) => f64::NAN,
    }
}

// =============================================================================
// ROW BUFFER
// =============================================================================

/// A square matrix of runtime size `k ≤ MAX_STACK_MATRIX_DIM`, stored row-major
/// on the stack.
///
/// The same rows can be evaluated two ways: a fast LU determinant through
/// `la-stack`, and a cofactor expansion that is exact whenever every partial
/// product is representable (small integer coordinates, for instance).
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::matrix::SquareRows;
///
/// let mut rows = SquareRows::new(2).unwrap();
/// rows.set_row(0, &[1.0, 2.0]);
/// rows.set_row(1, &[3.0, 4.0]);
/// assert_eq!(rows.expansion_determinant(), -2.0);
/// assert!((rows.lu_determinant().unwrap() + 2.0).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquareRows {
    k: usize,
    data: [[f64; MAX_STACK_MATRIX_DIM]; MAX_STACK_MATRIX_DIM],
}

impl SquareRows {
    /// Creates a zero-filled `k×k` buffer.
    ///
    /// # Errors
    ///
    /// Returns [`StackMatrixDispatchError::UnsupportedDim`] if `k` is zero or
    /// larger than [`MAX_STACK_MATRIX_DIM`].
    pub fn new(k: usize) -> Result<Self, StackMatrixDispatchError> {
        if k == 0 || k > MAX_STACK_MATRIX_DIM {
            return Err(StackMatrixDispatchError::UnsupportedDim {
                k,
                max: MAX_STACK_MATRIX_DIM,
            });
        }
        Ok(Self {
            k,
            data: [[0.0; MAX_STACK_MATRIX_DIM]; MAX_STACK_MATRIX_DIM],
        })
    }

    /// Matrix dimension.
    #[inline]
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.k
    }

    /// Copies `values` into row `r`; extra values beyond `k` are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `r >= k`.
    pub fn set_row(&mut self, r: usize, values: &[f64]) {
        assert!(r < self.k, "row {r} out of bounds for {0}x{0}", self.k);
        for (dst, &v) in self.data[r].iter_mut().zip(values).take(self.k) {
            *dst = v;
        }
    }

    /// Entry at `(r, c)`.
    #[inline]
    #[must_use]
    pub const fn get(&self, r: usize, c: usize) -> f64 {
        self.data[r][c]
    }

    /// Returns the `(k-1)×(k-1)` minor obtained by deleting `row` and `col`.
    ///
    /// # Errors
    ///
    /// Returns [`StackMatrixDispatchError::UnsupportedDim`] for a 1×1 input.
    pub fn minor(&self, row: usize, col: usize) -> Result<Self, StackMatrixDispatchError> {
        let mut out = Self::new(self.k - 1)?;
        for (ro, r) in (0..self.k).filter(|&r| r != row).enumerate() {
            for (co, c) in (0..self.k).filter(|&c| c != col).enumerate() {
                out.data[ro][co] = self.data[r][c];
            }
        }
        Ok(out)
    }

    /// LU determinant through `la-stack`.
    ///
    /// # Errors
    ///
    /// Propagates [`StackMatrixDispatchError`] from the stack dispatcher.
    pub fn lu_determinant(&self) -> Result<f64, StackMatrixDispatchError> {
        try_with_la_stack_matrix!(self.k, |m| {
            for r in 0..self.k {
                for c in 0..self.k {
                    matrix_set(&mut m, r, c, self.data[r][c]);
                }
            }
            Ok(determinant(&m))
        })
    }

    /// Determinant by cofactor expansion along successive rows.
    #[must_use]
    pub fn expansion_determinant(&self) -> f64 {
        self.expand(0, 0)
    }

    fn expand(&self, row: usize, used_cols: u8) -> f64 {
        if row == self.k {
            return 1.0;
        }
        let mut sum = 0.0;
        let mut sign = 1.0;
        for c in 0..self.k {
            if used_cols & (1 << c) != 0 {
                continue;
            }
            let v = self.data[row][c];
            if v != 0.0 {
                sum += sign * v * self.expand(row + 1, used_cols | (1 << c));
            }
            sign = -sign;
        }
        sum
    }

    /// Hadamard bound `Π ||row||₂`, an upper bound on `|det|`.
    #[must_use]
    pub fn hadamard_bound(&self) -> f64 {
        self.data[..self.k]
            .iter()
            .map(|row| row[..self.k].iter().map(|v| v * v).sum::<f64>().sqrt())
            .product()
    }
}

/// Compute a tolerance for a determinant scaled by the matrix magnitude.
///
/// This computes `base_tol + rel_factor * H`, where `H` is the Hadamard bound
/// of the rows. LU round-off grows with `H`, so a determinant below this
/// threshold cannot be trusted to carry the right sign.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::matrix::{adaptive_tolerance, SquareRows};
///
/// let mut rows = SquareRows::new(2).unwrap();
/// rows.set_row(0, &[3.0, 4.0]);
/// rows.set_row(1, &[0.0, 2.0]);
/// let tol = adaptive_tolerance(&rows, 1e-12, 1e-10);
/// assert!((tol - (1e-12 + 1e-9)).abs() < 1e-20);
/// ```
#[must_use]
pub fn adaptive_tolerance(rows: &SquareRows, base_tol: f64, rel_factor: f64) -> f64 {
    rel_factor.mul_add(rows.hadamard_bound(), base_tol)
}
