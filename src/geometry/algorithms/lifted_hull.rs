//! Reference regular-triangulation kernel based on the lifting map.
//!
//! The regular triangulation of weighted points `(pᵢ, wᵢ)` is the vertical
//! projection of the lower convex hull of the lifted points
//! `(pᵢ, |pᵢ|² - wᵢ)`. [`LiftedHullKernel`] computes it directly from that
//! definition: a non-degenerate `(d+1)`-subset is a cell iff no other lifted
//! point lies strictly below its lifted hyperplane. Exact ties are broken by
//! [`perturbed_power_sphere`], so cospherical input still yields a proper
//! triangulation and the result is unique.
//!
//! The test is `O(n^(d+2))`, which is fine for the small point sets this crate
//! studies and is not meant for large inputs.
//!
//! ## Lower-dimensional input
//!
//! Coplanar or collinear input is triangulated in its affine hull. Points are
//! projected by dropping coordinate axes (an affine bijection of the hull), while
//! heights are still computed from the 3D coordinates, which leaves the lower
//! hull unchanged. Enumeration then follows CGAL: 2D faces are reported as
//! facets with opposite slot 3, and there are no finite cells.
//!
//! The affine dimension is decided by [`orientation`] under the kernel's
//! [`PredicateConfig`], not by exact arithmetic. A point set that is flat only
//! up to the filter's tolerance is triangulated in the lower dimension, and
//! the points off the frame are projected onto it.

#![forbid(unsafe_code)]

use crate::core::collections::{FastHashSet, MAX_CELL_VERTICES, SmallBuffer};
use crate::geometry::kernel::{KernelError, RegularTriangulation, TriangulationKernel, validate_input};
use crate::geometry::point::{Point, WeightedPoint};
use crate::geometry::predicates::{
    LiftedPoint, Orientation, PowerSphere, PredicateConfig, orientation, perturbed_power_sphere,
};

/// Vertex slots of one cell, holding caller indices in ascending order.
type CellSlots = SmallBuffer<usize, MAX_CELL_VERTICES>;

/// Handle to a cell of a [`LiftedHullTriangulation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellHandle(usize);

impl CellHandle {
    /// Position of the cell in the triangulation's cell list.
    #[must_use]
    pub const fn position(self) -> usize {
        self.0
    }
}

/// Kernel that builds regular triangulations by brute-force lower-hull tests.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::geometry::algorithms::lifted_hull::LiftedHullKernel;
/// use power_skeleton::geometry::kernel::{RegularTriangulation, TriangulationKernel};
/// use power_skeleton::geometry::point::WeightedPoint;
///
/// let points: Vec<WeightedPoint> = vec![
///     ([0.0, 0.0, 0.0], 0.0).into(),
///     ([1.0, 0.0, 0.0], 0.0).into(),
///     ([0.0, 1.0, 0.0], 0.0).into(),
///     ([0.0, 0.0, 1.0], 0.0).into(),
/// ];
/// let rt = LiftedHullKernel::new().triangulate(&points).unwrap();
/// assert_eq!(rt.dimension(), Some(3));
/// assert_eq!(rt.finite_cells().count(), 1);
/// assert_eq!(rt.finite_facets().count(), 4);
/// assert_eq!(rt.finite_edges().count(), 6);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LiftedHullKernel {
    config: PredicateConfig,
}

impl LiftedHullKernel {
    /// Creates a kernel with the default predicate tolerances.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a kernel with custom predicate tolerances.
    #[must_use]
    pub const fn with_config(config: PredicateConfig) -> Self {
        Self { config }
    }

    /// The predicate tolerances in use.
    #[must_use]
    pub const fn config(&self) -> &PredicateConfig {
        &self.config
    }
}

impl TriangulationKernel for LiftedHullKernel {
    type Triangulation = LiftedHullTriangulation;

    fn triangulate(&self, points: &[WeightedPoint]) -> Result<Self::Triangulation, KernelError> {
        validate_input(points)?;

        let frame = AffineFrame::detect(points, &self.config)?;
        let cells = match frame {
            AffineFrame::Line(axis) => lower_hull_cells::<1>(points, [axis], &self.config)?,
            AffineFrame::Plane(axes) => lower_hull_cells::<2>(points, axes, &self.config)?,
            AffineFrame::Space => lower_hull_cells::<3>(points, [0, 1, 2], &self.config)?,
        };

        let triangulation = LiftedHullTriangulation::new(frame.dimension(), points, cells);
        tracing::debug!(
            dimension = triangulation.dimension,
            points = points.len(),
            vertices = triangulation.vertex_count,
            cells = triangulation.cells.len(),
            "lifted hull triangulation built"
        );
        Ok(triangulation)
    }
}

// =============================================================================
// AFFINE FRAME
// =============================================================================

/// Coordinate axes spanning the affine hull of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AffineFrame {
    Line(usize),
    Plane([usize; 2]),
    Space,
}

impl AffineFrame {
    const fn dimension(self) -> usize {
        match self {
            Self::Line(_) => 1,
            Self::Plane(_) => 2,
            Self::Space => 3,
        }
    }

    /// Finds the affine dimension with orientation predicates on the original
    /// coordinates. Input has already been validated (≥ 4 distinct points).
    fn detect(points: &[WeightedPoint], config: &PredicateConfig) -> Result<Self, KernelError> {
        let p0 = points[0].point().coords();
        // Distinct points: the second one always differs from the first.
        let pa = points[1].point().coords();

        let plane_pairs = [[0, 1], [0, 2], [1, 2]];
        let spans_plane = |pb: [f64; 3]| -> Result<bool, KernelError> {
            for [i, j] in plane_pairs {
                let tri = [[p0[i], p0[j]], [pa[i], pa[j]], [pb[i], pb[j]]];
                if orientation(&tri, config)? != Orientation::DEGENERATE {
                    return Ok(true);
                }
            }
            Ok(false)
        };

        let mut pb = None;
        for wp in &points[2..] {
            let candidate = wp.point().coords();
            if spans_plane(candidate)? {
                pb = Some(candidate);
                break;
            }
        }
        let Some(pb) = pb else {
            let dir = [pa[0] - p0[0], pa[1] - p0[1], pa[2] - p0[2]];
            return Ok(Self::Line(dominant_axis(dir)));
        };

        for wp in &points[2..] {
            let pc = wp.point().coords();
            if orientation(&[p0, pa, pb, pc], config)? != Orientation::DEGENERATE {
                return Ok(Self::Space);
            }
        }

        let u = [pa[0] - p0[0], pa[1] - p0[1], pa[2] - p0[2]];
        let v = [pb[0] - p0[0], pb[1] - p0[1], pb[2] - p0[2]];
        let normal = [
            u[1].mul_add(v[2], -(u[2] * v[1])),
            u[2].mul_add(v[0], -(u[0] * v[2])),
            u[0].mul_add(v[1], -(u[1] * v[0])),
        ];
        let dropped = dominant_axis(normal);
        let kept: SmallBuffer<usize, 3> = (0..3).filter(|&a| a != dropped).collect();
        Ok(Self::Plane([kept[0], kept[1]]))
    }
}

/// Axis with the largest absolute component.
fn dominant_axis(v: [f64; 3]) -> usize {
    let mut best = 0;
    for axis in 1..3 {
        if v[axis].abs() > v[best].abs() {
            best = axis;
        }
    }
    best
}

// =============================================================================
// LOWER HULL
// =============================================================================

fn lift<const D: usize>(points: &[WeightedPoint], axes: [usize; D]) -> Vec<LiftedPoint<D>> {
    points
        .iter()
        .enumerate()
        .map(|(index, wp)| {
            let c = wp.point().coords();
            LiftedPoint {
                coords: axes.map(|a| c[a]),
                height: wp.lifted_height(),
                index,
            }
        })
        .collect()
}

/// Enumerates every `(D+1)`-subset and keeps the lower-hull facets.
fn lower_hull_cells<const D: usize>(
    points: &[WeightedPoint],
    axes: [usize; D],
    config: &PredicateConfig,
) -> Result<Vec<CellSlots>, KernelError> {
    let lifted = lift(points, axes);
    let n = lifted.len();
    let k = D + 1;
    let mut cells = Vec::new();
    if n < k {
        return Ok(cells);
    }

    let mut combo: CellSlots = (0..k).collect();
    loop {
        let simplex: SmallBuffer<LiftedPoint<D>, MAX_CELL_VERTICES> =
            combo.iter().map(|&i| lifted[i]).collect();
        let coords: SmallBuffer<[f64; D], MAX_CELL_VERTICES> =
            simplex.iter().map(|p| p.coords).collect();

        if orientation(&coords, config)? != Orientation::DEGENERATE
            && is_lower_facet(&simplex, &combo, &lifted, config)?
        {
            cells.push(combo.clone());
        }

        // Advance to the next combination in lexicographic order.
        let Some(i) = (0..k).rev().find(|&i| combo[i] < n - k + i) else {
            break;
        };
        combo[i] += 1;
        for j in i + 1..k {
            combo[j] = combo[j - 1] + 1;
        }
    }
    Ok(cells)
}

fn is_lower_facet<const D: usize>(
    simplex: &[LiftedPoint<D>],
    members: &[usize],
    lifted: &[LiftedPoint<D>],
    config: &PredicateConfig,
) -> Result<bool, KernelError> {
    for query in lifted {
        if members.contains(&query.index) {
            continue;
        }
        if perturbed_power_sphere(simplex, query, config)? == PowerSphere::INSIDE {
            return Ok(false);
        }
    }
    Ok(true)
}

// =============================================================================
// TRIANGULATION HANDLE
// =============================================================================

/// A regular triangulation produced by [`LiftedHullKernel`].
///
/// Vertices are tagged with the caller's indices, and every point reported by
/// [`vertex_point`](RegularTriangulation::vertex_point) is the caller's point,
/// bit for bit.
#[derive(Clone, Debug)]
pub struct LiftedHullTriangulation {
    dimension: usize,
    points: Vec<Point>,
    cells: Vec<CellSlots>,
    facets: Vec<(CellHandle, usize)>,
    edges: Vec<(CellHandle, usize, usize)>,
    vertex_count: usize,
}

impl LiftedHullTriangulation {
    fn new(dimension: usize, points: &[WeightedPoint], cells: Vec<CellSlots>) -> Self {
        let mut facets = Vec::new();
        let mut edges = Vec::new();
        let mut seen_facets: FastHashSet<[usize; 3]> = FastHashSet::default();
        let mut seen_edges: FastHashSet<[usize; 2]> = FastHashSet::default();
        let mut used: FastHashSet<usize> = FastHashSet::default();

        for (position, slots) in cells.iter().enumerate() {
            let handle = CellHandle(position);
            used.extend(slots.iter().copied());

            match dimension {
                3 => {
                    for opposite in 0..slots.len() {
                        let mut key = [0; 3];
                        for (dst, (_, &v)) in key
                            .iter_mut()
                            .zip(slots.iter().enumerate().filter(|(s, _)| *s != opposite))
                        {
                            *dst = v;
                        }
                        if seen_facets.insert(key) {
                            facets.push((handle, opposite));
                        }
                    }
                }
                2 => facets.push((handle, 3)),
                _ => {}
            }

            for i in 0..slots.len() {
                for j in i + 1..slots.len() {
                    if seen_edges.insert([slots[i], slots[j]]) {
                        edges.push((handle, i, j));
                    }
                }
            }
        }

        Self {
            dimension,
            points: points.iter().map(WeightedPoint::point).collect(),
            cells,
            facets,
            edges,
            vertex_count: used.len(),
        }
    }

    fn slot(&self, cell: CellHandle, slot: usize) -> Option<usize> {
        if slot > self.dimension {
            return None;
        }
        self.cells.get(cell.0)?.get(slot).copied()
    }
}

impl RegularTriangulation for LiftedHullTriangulation {
    type Cell = CellHandle;

    fn dimension(&self) -> Option<usize> {
        (!self.cells.is_empty()).then_some(self.dimension)
    }

    fn number_of_vertices(&self) -> usize {
        self.vertex_count
    }

    fn finite_cells(&self) -> impl Iterator<Item = Self::Cell> + '_ {
        let count = if self.dimension == 3 {
            self.cells.len()
        } else {
            0
        };
        (0..count).map(CellHandle)
    }

    fn finite_facets(&self) -> impl Iterator<Item = (Self::Cell, usize)> + '_ {
        self.facets.iter().copied()
    }

    fn finite_edges(&self) -> impl Iterator<Item = (Self::Cell, usize, usize)> + '_ {
        self.edges.iter().copied()
    }

    fn vertex_point(&self, cell: Self::Cell, slot: usize) -> Option<Point> {
        self.slot(cell, slot).map(|i| self.points[i])
    }

    fn vertex_index(&self, cell: Self::Cell, slot: usize) -> Option<usize> {
        self.slot(cell, slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn wp(x: f64, y: f64, z: f64, w: f64) -> WeightedPoint {
        WeightedPoint::new(Point::new(x, y, z), w)
    }

    fn bipyramid(weight: f64) -> Vec<WeightedPoint> {
        vec![
            wp(0.0, 0.0, 0.0, 0.0),
            wp(1.0, 0.0, 0.0, 0.0),
            wp(0.0, 1.0, 0.0, 0.0),
            wp(0.0, 0.0, 1.0, 0.0),
            wp(1.0, 1.0, 1.0, weight),
        ]
    }

    fn cell_sets(rt: &LiftedHullTriangulation) -> BTreeSet<Vec<usize>> {
        rt.finite_cells()
            .map(|c| (0..4).filter_map(|s| rt.vertex_index(c, s)).collect())
            .collect()
    }

    #[test]
    fn cospherical_bipyramid_splits_through_shared_triangle() {
        let rt = LiftedHullKernel::new().triangulate(&bipyramid(0.0)).unwrap();
        assert_eq!(rt.dimension(), Some(3));
        let expected: BTreeSet<Vec<usize>> = [vec![0, 1, 2, 3], vec![1, 2, 3, 4]].into();
        assert_eq!(cell_sets(&rt), expected);
        assert_eq!(rt.finite_facets().count(), 7);
        assert_eq!(rt.finite_edges().count(), 9);
    }

    #[test]
    fn heavy_weight_triangulates_around_the_heavy_point() {
        let rt = LiftedHullKernel::new()
            .triangulate(&bipyramid(100.0))
            .unwrap();
        let expected: BTreeSet<Vec<usize>> =
            [vec![0, 1, 2, 4], vec![0, 1, 3, 4], vec![0, 2, 3, 4]].into();
        assert_eq!(cell_sets(&rt), expected);
        assert_eq!(rt.finite_facets().count(), 9);
        assert_eq!(rt.finite_edges().count(), 10);
    }

    #[test]
    fn interior_point_with_negative_weight_is_hidden() {
        let mut points = bipyramid(0.0);
        points.pop();
        points.push(wp(0.2, 0.2, 0.2, -10.0));
        let rt = LiftedHullKernel::new().triangulate(&points).unwrap();
        assert_eq!(rt.number_of_vertices(), 4);
        assert_eq!(rt.finite_cells().count(), 1);
    }

    #[test]
    fn coplanar_square_has_two_faces_and_no_cells() {
        let points = vec![
            wp(0.0, 0.0, 0.0, 0.0),
            wp(1.0, 0.0, 0.0, 0.0),
            wp(0.0, 1.0, 0.0, 0.0),
            wp(1.0, 1.0, 0.0, 0.0),
        ];
        let rt = LiftedHullKernel::new().triangulate(&points).unwrap();
        assert_eq!(rt.dimension(), Some(2));
        assert_eq!(rt.finite_cells().count(), 0);
        assert_eq!(rt.finite_facets().count(), 2);
        assert!(rt.finite_facets().all(|(_, opposite)| opposite == 3));
        assert_eq!(rt.finite_edges().count(), 5);
    }

    #[test]
    fn flatness_within_tolerance_selects_the_plane() {
        let mut points = vec![
            wp(0.0, 0.0, 0.0, 0.0),
            wp(1.0, 0.0, 0.0, 0.0),
            wp(0.0, 1.0, 0.0, 0.0),
            wp(1.0, 1.0, 0.0, 0.0),
            wp(0.5, 0.5, 1e-14, 0.0),
        ];
        let rt = LiftedHullKernel::new().triangulate(&points).unwrap();
        assert_eq!(rt.dimension(), Some(2));
        assert_eq!(rt.number_of_vertices(), 5);
        assert_eq!(rt.finite_cells().count(), 0);
        assert_eq!(rt.finite_facets().count(), 4);

        // Lifted clearly off the plane, the same points form a square pyramid.
        points[4] = wp(0.5, 0.5, 1e-3, 0.0);
        let rt = LiftedHullKernel::new().triangulate(&points).unwrap();
        assert_eq!(rt.dimension(), Some(3));
        assert_eq!(rt.finite_cells().count(), 2);
    }

    #[test]
    fn tilted_plane_is_detected() {
        // Plane x + y + z = 1.
        let points = vec![
            wp(1.0, 0.0, 0.0, 0.0),
            wp(0.0, 1.0, 0.0, 0.0),
            wp(0.0, 0.0, 1.0, 0.0),
            wp(2.0, -1.0, 0.0, 0.0),
            wp(0.5, 0.5, 0.0, 0.0),
        ];
        let rt = LiftedHullKernel::new().triangulate(&points).unwrap();
        assert_eq!(rt.dimension(), Some(2));
        assert_eq!(rt.finite_cells().count(), 0);
        assert!(rt.finite_facets().count() >= 2);
    }

    #[test]
    fn collinear_points_form_a_chain_of_segments() {
        let points = vec![
            wp(0.0, 0.0, 0.0, 0.0),
            wp(3.0, 3.0, 3.0, 0.0),
            wp(1.0, 1.0, 1.0, 0.0),
            wp(2.0, 2.0, 2.0, 0.0),
        ];
        let rt = LiftedHullKernel::new().triangulate(&points).unwrap();
        assert_eq!(rt.dimension(), Some(1));
        assert_eq!(rt.finite_facets().count(), 0);
        let edges: BTreeSet<[usize; 2]> = rt
            .finite_edges()
            .map(|(c, i, j)| {
                let a = rt.vertex_index(c, i).unwrap();
                let b = rt.vertex_index(c, j).unwrap();
                [a.min(b), a.max(b)]
            })
            .collect();
        let expected: BTreeSet<[usize; 2]> = [[0, 2], [2, 3], [1, 3]].into();
        assert_eq!(edges, expected);
    }

    #[test]
    fn vertex_point_rejects_out_of_range_slots() {
        let rt = LiftedHullKernel::new().triangulate(&bipyramid(0.0)).unwrap();
        let cell = rt.finite_cells().next().unwrap();
        assert!(rt.vertex_point(cell, 3).is_some());
        assert!(rt.vertex_point(cell, 4).is_none());
        assert!(rt.vertex_point(CellHandle(99), 0).is_none());
    }

    #[test]
    fn construction_errors_surface_before_any_geometry() {
        let kernel = LiftedHullKernel::new();
        assert!(matches!(
            kernel.triangulate(&bipyramid(0.0)[..3]),
            Err(KernelError::InsufficientPoints { .. })
        ));
    }
}
