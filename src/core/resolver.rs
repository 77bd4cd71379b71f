//! Resolution of kernel-reported points back to stable indices.
//!
//! A kernel that does not tag its vertices hands back bare coordinates. The
//! resolver recovers the caller's index for such a point by looking it up in
//! the caller's ordered [`WeightedPoint`] sequence.
//!
//! Exact matching is only sound because kernels echo back the coordinates they
//! were given. A kernel that snaps or re-projects coordinates breaks it
//! silently; [`ResolverStrategy::Tolerance`] exists for those kernels.
//!
//! # Strategies
//!
//! | Strategy | Lookup | Matches |
//! |----------|--------|---------|
//! | [`Linear`](ResolverStrategy::Linear) | `O(n)` scan | first index with `==` coordinates |
//! | [`Exact`](ResolverStrategy::Exact) | `O(1)` hash | same as `Linear` |
//! | [`Tolerance`](ResolverStrategy::Tolerance) | 27-cell grid walk | lowest index within `epsilon` |

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::collections::spatial_hash_grid::HashGridIndex;
use crate::core::collections::{FastHashMap, fast_hash_map_with_capacity};
use crate::geometry::point::{Point, WeightedPoint};

/// Errors raised while building a resolver.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::resolver::{PointResolver, ResolutionError, ResolverStrategy};
///
/// let err = PointResolver::new(&[], ResolverStrategy::Tolerance { epsilon: 0.0 }).unwrap_err();
/// assert_eq!(err, ResolutionError::InvalidTolerance { epsilon: 0.0 });
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ResolutionError {
    /// The tolerance is not a positive finite number.
    #[error("Resolution tolerance must be positive and finite, got {epsilon}")]
    InvalidTolerance {
        /// The rejected tolerance.
        epsilon: f64,
    },
}

/// How kernel-reported points are matched against the caller's sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ResolverStrategy {
    /// Scan the sequence for the first coordinate-wise equal point.
    Linear,
    /// Hash lookup with the same semantics as [`Linear`](Self::Linear).
    #[default]
    Exact,
    /// Lowest index whose point lies within `epsilon` (Euclidean).
    Tolerance {
        /// Matching radius.
        epsilon: f64,
    },
}

/// Returns the first index `i` with `points[i].point() == *query`.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::resolver::resolve_linear;
/// use power_skeleton::geometry::point::{Point, WeightedPoint};
///
/// let points: Vec<WeightedPoint> = vec![
///     ([0.0, 0.0, 0.0], 0.0).into(),
///     ([1.0, 1.0, 1.0], 100.0).into(),
/// ];
/// assert_eq!(resolve_linear(&Point::new(1.0, 1.0, 1.0), &points), Some(1));
/// assert_eq!(resolve_linear(&Point::new(1.0, 1.0, 1.000_001), &points), None);
/// ```
#[must_use]
pub fn resolve_linear(query: &Point, points: &[WeightedPoint]) -> Option<usize> {
    points.iter().position(|wp| wp.point() == *query)
}

/// [`ResolverStrategy::Linear`] over a borrowed sequence.
#[derive(Clone, Copy, Debug)]
pub struct LinearResolver<'a> {
    points: &'a [WeightedPoint],
}

impl<'a> LinearResolver<'a> {
    /// Wraps `points`.
    #[must_use]
    pub const fn new(points: &'a [WeightedPoint]) -> Self {
        Self { points }
    }

    /// The first index whose point equals `query`.
    #[must_use]
    pub fn resolve(&self, query: &Point) -> Option<usize> {
        resolve_linear(query, self.points)
    }
}

/// [`ResolverStrategy::Exact`]: a coordinate-key map built once.
#[derive(Clone, Debug)]
pub struct ExactResolver {
    index: FastHashMap<[u64; 3], usize>,
}

impl ExactResolver {
    /// Indexes `points`. For repeated coordinates the first index wins, and
    /// points with a `NaN` coordinate are never matched.
    #[must_use]
    pub fn new(points: &[WeightedPoint]) -> Self {
        let mut index = fast_hash_map_with_capacity(points.len());
        for (i, wp) in points.iter().enumerate() {
            if let Some(key) = wp.point().exact_key() {
                index.entry(key).or_insert(i);
            }
        }
        Self { index }
    }

    /// The first index whose coordinates are bitwise equal to `query`'s.
    #[must_use]
    pub fn resolve(&self, query: &Point) -> Option<usize> {
        self.index.get(&query.exact_key()?).copied()
    }
}

/// [`ResolverStrategy::Tolerance`] backed by a spatial hash grid.
#[derive(Clone, Debug)]
pub struct ToleranceResolver<'a> {
    points: &'a [WeightedPoint],
    epsilon: f64,
    grid: HashGridIndex,
}

impl<'a> ToleranceResolver<'a> {
    /// Indexes `points` in a grid with cell size `epsilon`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::InvalidTolerance`] unless `epsilon` is
    /// positive and finite.
    pub fn new(points: &'a [WeightedPoint], epsilon: f64) -> Result<Self, ResolutionError> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(ResolutionError::InvalidTolerance { epsilon });
        }
        let mut grid = HashGridIndex::new(epsilon);
        for (i, wp) in points.iter().enumerate() {
            grid.insert(i, wp.point().coords());
        }
        if !grid.is_usable() {
            tracing::debug!(
                epsilon,
                points = points.len(),
                "coordinates exceed grid resolution; tolerance lookups fall back to a scan"
            );
        }
        Ok(Self {
            points,
            epsilon,
            grid,
        })
    }

    /// The matching radius.
    #[must_use]
    pub const fn epsilon(&self) -> f64 {
        self.grid.cell_size()
    }

    fn within(&self, i: usize, query: &Point) -> bool {
        self.points[i].point().squared_distance(query) <= self.epsilon * self.epsilon
    }

    /// The lowest index whose point lies within `epsilon` of `query`.
    #[must_use]
    pub fn resolve(&self, query: &Point) -> Option<usize> {
        if !query.is_finite() {
            return None;
        }
        let mut best: Option<usize> = None;
        let used = self.grid.for_each_candidate(query.coords(), |i| {
            if self.within(i, query) && best.is_none_or(|b| i < b) {
                best = Some(i);
            }
            true
        });
        if used {
            return best;
        }
        (0..self.points.len()).find(|&i| self.within(i, query))
    }
}

/// A resolver for any [`ResolverStrategy`].
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::resolver::{PointResolver, ResolverStrategy};
/// use power_skeleton::geometry::point::{Point, WeightedPoint};
///
/// let points: Vec<WeightedPoint> = vec![
///     ([0.0, 0.0, 0.0], 0.0).into(),
///     ([1.0, 0.0, 0.0], 0.0).into(),
/// ];
///
/// let exact = PointResolver::new(&points, ResolverStrategy::Exact).unwrap();
/// assert_eq!(exact.resolve(&Point::new(1.0, 0.0, 0.0)), Some(1));
/// assert_eq!(exact.resolve(&Point::new(1.0 + 1e-12, 0.0, 0.0)), None);
///
/// let loose = PointResolver::new(&points, ResolverStrategy::Tolerance { epsilon: 1e-9 }).unwrap();
/// assert_eq!(loose.resolve(&Point::new(1.0 + 1e-12, 0.0, 0.0)), Some(1));
/// ```
#[derive(Clone, Debug)]
pub enum PointResolver<'a> {
    /// See [`LinearResolver`].
    Linear(LinearResolver<'a>),
    /// See [`ExactResolver`].
    Exact(ExactResolver),
    /// See [`ToleranceResolver`].
    Tolerance(ToleranceResolver<'a>),
}

impl<'a> PointResolver<'a> {
    /// Builds the resolver selected by `strategy` over `points`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::InvalidTolerance`] for a tolerance strategy
    /// with an unusable epsilon.
    pub fn new(
        points: &'a [WeightedPoint],
        strategy: ResolverStrategy,
    ) -> Result<Self, ResolutionError> {
        Ok(match strategy {
            ResolverStrategy::Linear => Self::Linear(LinearResolver::new(points)),
            ResolverStrategy::Exact => Self::Exact(ExactResolver::new(points)),
            ResolverStrategy::Tolerance { epsilon } => {
                Self::Tolerance(ToleranceResolver::new(points, epsilon)?)
            }
        })
    }

    /// The strategy this resolver implements.
    #[must_use]
    pub const fn strategy(&self) -> ResolverStrategy {
        match self {
            Self::Linear(_) => ResolverStrategy::Linear,
            Self::Exact(_) => ResolverStrategy::Exact,
            Self::Tolerance(r) => ResolverStrategy::Tolerance { epsilon: r.epsilon },
        }
    }

    /// The stable index of `query`, or `None`.
    #[must_use]
    pub fn resolve(&self, query: &Point) -> Option<usize> {
        match self {
            Self::Linear(r) => r.resolve(query),
            Self::Exact(r) => r.resolve(query),
            Self::Tolerance(r) => r.resolve(query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<WeightedPoint> {
        vec![
            ([0.0, 0.0, 0.0], 0.0).into(),
            ([1.0, 0.0, 0.0], 0.0).into(),
            ([0.0, 1.0, 0.0], 0.0).into(),
            ([1.0, 0.0, 0.0], 5.0).into(),
            ([0.0, f64::NAN, 0.0], 0.0).into(),
        ]
    }

    fn all_strategies() -> [ResolverStrategy; 3] {
        [
            ResolverStrategy::Linear,
            ResolverStrategy::Exact,
            ResolverStrategy::Tolerance { epsilon: 1e-9 },
        ]
    }

    #[test]
    fn first_index_wins_for_repeated_coordinates() {
        let points = sample();
        for strategy in all_strategies() {
            let resolver = PointResolver::new(&points, strategy).unwrap();
            assert_eq!(
                resolver.resolve(&Point::new(1.0, 0.0, 0.0)),
                Some(1),
                "{strategy:?}"
            );
        }
    }

    #[test]
    fn nan_never_matches() {
        let points = sample();
        let query = Point::new(0.0, f64::NAN, 0.0);
        for strategy in all_strategies() {
            let resolver = PointResolver::new(&points, strategy).unwrap();
            assert_eq!(resolver.resolve(&query), None, "{strategy:?}");
        }
    }

    #[test]
    fn signed_zero_matches_under_every_strategy() {
        let points = sample();
        for strategy in all_strategies() {
            let resolver = PointResolver::new(&points, strategy).unwrap();
            assert_eq!(
                resolver.resolve(&Point::new(-0.0, 1.0, -0.0)),
                Some(2),
                "{strategy:?}"
            );
        }
    }

    #[test]
    fn exact_agrees_with_linear() {
        let points = sample();
        let exact = ExactResolver::new(&points);
        let queries = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.5, 0.5, 0.5),
            Point::new(0.0, 1.0, 0.0),
        ];
        for q in queries {
            assert_eq!(exact.resolve(&q), resolve_linear(&q, &points));
        }
    }

    #[test]
    fn tolerance_picks_lowest_index_within_radius() {
        let points: Vec<WeightedPoint> = vec![
            ([0.0, 0.0, 0.0], 0.0).into(),
            ([0.3, 0.0, 0.0], 0.0).into(),
            ([0.1, 0.0, 0.0], 0.0).into(),
        ];
        let resolver = ToleranceResolver::new(&points, 0.25).unwrap();
        assert_eq!(resolver.resolve(&Point::new(0.2, 0.0, 0.0)), Some(0));
        assert_eq!(resolver.resolve(&Point::new(0.35, 0.0, 0.0)), Some(1));
        assert_eq!(resolver.resolve(&Point::new(2.0, 0.0, 0.0)), None);
    }

    #[test]
    fn tolerance_falls_back_to_scan_for_huge_coordinates() {
        let points: Vec<WeightedPoint> = vec![
            ([0.0, 0.0, 0.0], 0.0).into(),
            ([1e300, 0.0, 0.0], 0.0).into(),
        ];
        let resolver = ToleranceResolver::new(&points, 1e-300).unwrap();
        assert_eq!(resolver.resolve(&Point::new(1e300, 0.0, 0.0)), Some(1));
        assert_eq!(resolver.resolve(&Point::new(0.0, 0.0, 0.0)), Some(0));
    }

    #[test]
    fn invalid_tolerances_are_rejected() {
        for epsilon in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                PointResolver::new(&[], ResolverStrategy::Tolerance { epsilon }),
                Err(ResolutionError::InvalidTolerance { .. })
            ));
        }
    }

    #[test]
    fn strategy_round_trips() {
        let points = sample();
        for strategy in all_strategies() {
            let resolver = PointResolver::new(&points, strategy).unwrap();
            assert_eq!(resolver.strategy(), strategy);
        }
    }
}
