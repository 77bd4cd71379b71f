//! Points and weighted points in 3D space.
//!
//! Both types are immutable values. The caller's ordered sequence of
//! [`WeightedPoint`]s is the only source of stable identity in this crate: a
//! point's position in that sequence is its *stable index*.
//!
//! # Equality Semantics
//!
//! `Point` equality is plain coordinate-wise IEEE 754 equality, so
//! `-0.0 == 0.0` and a `NaN` coordinate never compares equal. This is the
//! equality used when resolving kernel-reported points back to stable indices.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors produced when editing a weighted-point sequence.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::point::PointSequenceError;
///
/// let err = PointSequenceError::IndexOutOfRange { index: 7, len: 5 };
/// assert_eq!(err.to_string(), "Point index 7 is out of range for a sequence of 5 points");
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PointSequenceError {
    /// The requested index does not exist in the sequence.
    #[error("Point index {index} is out of range for a sequence of {len} points")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The sequence length.
        len: usize,
    },
}

// =============================================================================
// POINT
// =============================================================================

/// A point in 3D space.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::point::Point;
///
/// let p = Point::new(1.0, 2.0, 3.0);
/// assert_eq!(p.coords(), [1.0, 2.0, 3.0]);
/// assert_eq!(p, Point::from([1.0, 2.0, 3.0]));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
    z: f64,
}

impl Point {
    /// Creates a new point from its three coordinates.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The x coordinate.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// The y coordinate.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// The z coordinate.
    #[inline]
    #[must_use]
    pub const fn z(&self) -> f64 {
        self.z
    }

    /// The coordinates as an array `[x, y, z]`.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns `true` if every coordinate is finite.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use power_skeleton::geometry::point::Point;
    ///
    /// assert!(Point::new(0.0, 1.0, 2.0).is_finite());
    /// assert!(!Point::new(f64::NAN, 1.0, 2.0).is_finite());
    /// assert!(!Point::new(0.0, f64::INFINITY, 2.0).is_finite());
    /// ```
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.coords().iter().all(|c| c.is_finite())
    }

    /// Hashable key that agrees with `==`: `-0.0` and `0.0` share a key and a
    /// point with a `NaN` coordinate has none.
    pub(crate) fn exact_key(&self) -> Option<[u64; 3]> {
        let mut key = [0_u64; 3];
        for (slot, c) in key.iter_mut().zip(self.coords()) {
            if c.is_nan() {
                return None;
            }
            // -0.0 + 0.0 == +0.0
            *slot = (c + 0.0).to_bits();
        }
        Some(key)
    }

    /// Squared Euclidean norm `x² + y² + z²`.
    #[inline]
    #[must_use]
    pub fn squared_norm(&self) -> f64 {
        self.z.mul_add(self.z, self.x.mul_add(self.x, self.y * self.y))
    }

    /// Squared Euclidean distance to `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use power_skeleton::geometry::point::Point;
    ///
    /// let a = Point::new(0.0, 0.0, 0.0);
    /// let b = Point::new(1.0, 2.0, 2.0);
    /// assert_eq!(a.squared_distance(&b), 9.0);
    /// ```
    #[must_use]
    pub fn squared_distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy))
    }
}

impl From<[f64; 3]> for Point {
    #[inline]
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Point> for [f64; 3] {
    #[inline]
    fn from(p: Point) -> Self {
        p.coords()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// =============================================================================
// WEIGHTED POINT
// =============================================================================

/// A [`Point`] augmented with a scalar power-distance weight.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::point::{Point, WeightedPoint};
///
/// let wp = WeightedPoint::new(Point::new(1.0, 1.0, 1.0), 100.0);
/// assert_eq!(wp.point(), Point::new(1.0, 1.0, 1.0));
/// assert_eq!(wp.weight(), 100.0);
/// // Lifted height |p|² - w
/// assert_eq!(wp.lifted_height(), -97.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedPoint {
    point: Point,
    weight: f64,
}

impl WeightedPoint {
    /// Creates a new weighted point.
    #[inline]
    #[must_use]
    pub const fn new(point: Point, weight: f64) -> Self {
        Self { point, weight }
    }

    /// The underlying (unweighted) point.
    #[inline]
    #[must_use]
    pub const fn point(&self) -> Point {
        self.point
    }

    /// The weight.
    #[inline]
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns a copy of this point carrying a different weight.
    #[inline]
    #[must_use]
    pub const fn with_weight(&self, weight: f64) -> Self {
        Self::new(self.point, weight)
    }

    /// Returns `true` if the coordinates and the weight are all finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.point.is_finite() && self.weight.is_finite()
    }

    /// Power distance from this weighted point to `query`: `|p - q|² - w`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use power_skeleton::geometry::point::{Point, WeightedPoint};
    ///
    /// let wp = WeightedPoint::new(Point::new(0.0, 0.0, 0.0), 4.0);
    /// assert_eq!(wp.power_distance(&Point::new(2.0, 0.0, 0.0)), 0.0);
    /// assert!(wp.power_distance(&Point::new(1.0, 0.0, 0.0)) < 0.0);
    /// ```
    #[must_use]
    pub fn power_distance(&self, query: &Point) -> f64 {
        self.point.squared_distance(query) - self.weight
    }

    /// Height of this point on the lifting paraboloid: `|p|² - w`.
    ///
    /// The regular triangulation is the projection of the lower convex hull
    /// of the lifted points `(p, |p|² - w)`.
    #[inline]
    #[must_use]
    pub fn lifted_height(&self) -> f64 {
        self.point.squared_norm() - self.weight
    }
}

impl From<([f64; 3], f64)> for WeightedPoint {
    fn from((coords, weight): ([f64; 3], f64)) -> Self {
        Self::new(Point::from(coords), weight)
    }
}

/// Copies `points`, replacing the weight of the point at `index`.
///
/// # Errors
///
/// Returns [`PointSequenceError::IndexOutOfRange`] if `index` is not a valid
/// position in `points`.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::point::{reweighted, WeightedPoint};
///
/// let base: Vec<WeightedPoint> = vec![([0.0, 0.0, 0.0], 0.0).into(), ([1.0, 1.0, 1.0], 0.0).into()];
/// let modified = reweighted(&base, 1, 100.0).unwrap();
/// assert_eq!(modified[1].weight(), 100.0);
/// assert_eq!(base[1].weight(), 0.0);
/// assert!(reweighted(&base, 2, 1.0).is_err());
/// ```
pub fn reweighted(
    points: &[WeightedPoint],
    index: usize,
    weight: f64,
) -> Result<Vec<WeightedPoint>, PointSequenceError> {
    let mut out = points.to_vec();
    let len = out.len();
    let slot = out
        .get_mut(index)
        .ok_or(PointSequenceError::IndexOutOfRange { index, len })?;
    *slot = slot.with_weight(weight);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn point_equality_is_coordinatewise() {
        assert_eq!(Point::new(1.0, 2.0, 3.0), Point::new(1.0, 2.0, 3.0));
        assert_ne!(Point::new(1.0, 2.0, 3.0), Point::new(1.0, 2.0, 3.000_000_1));
        assert_eq!(Point::new(-0.0, 0.0, 0.0), Point::new(0.0, 0.0, 0.0));
        let nan = Point::new(f64::NAN, 0.0, 0.0);
        assert_ne!(nan, nan);
    }

    #[test]
    fn exact_key_agrees_with_equality() {
        let a = Point::new(-0.0, 1.5, 2.0);
        let b = Point::new(0.0, 1.5, 2.0);
        assert_eq!(a, b);
        assert_eq!(a.exact_key(), b.exact_key());
        assert_ne!(a.exact_key(), Point::new(0.0, 1.5, 2.5).exact_key());
        assert_eq!(Point::new(0.0, f64::NAN, 0.0).exact_key(), None);
    }

    #[test]
    fn weighted_point_power_distance_and_height() {
        let wp = WeightedPoint::new(Point::new(1.0, 2.0, 2.0), 5.0);
        assert_relative_eq!(wp.lifted_height(), 4.0);
        assert_relative_eq!(wp.power_distance(&Point::new(0.0, 0.0, 0.0)), 4.0);
        assert_relative_eq!(wp.power_distance(&wp.point()), -5.0);
    }

    #[test]
    fn with_weight_keeps_coordinates() {
        let wp = WeightedPoint::new(Point::new(1.0, 1.0, 1.0), 0.0);
        let heavy = wp.with_weight(100.0);
        assert_eq!(heavy.point(), wp.point());
        assert_relative_eq!(heavy.weight(), 100.0);
        assert_relative_eq!(wp.weight(), 0.0);
    }

    #[test]
    fn reweighted_rejects_out_of_range_index() {
        let points = vec![WeightedPoint::new(Point::new(0.0, 0.0, 0.0), 0.0)];
        assert_eq!(
            reweighted(&points, 3, 1.0),
            Err(PointSequenceError::IndexOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn finiteness_checks_weight_too() {
        let wp = WeightedPoint::new(Point::new(0.0, 0.0, 0.0), f64::INFINITY);
        assert!(wp.point().is_finite());
        assert!(!wp.is_finite());
    }

    #[test]
    fn point_serde_roundtrip() {
        let wp = WeightedPoint::new(Point::new(0.5, -1.0, 2.0), 3.0);
        let json = serde_json::to_string(&wp).unwrap();
        let back: WeightedPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wp);
    }
}
