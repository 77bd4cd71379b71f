//! Caller-owned view state for rendering a skeleton.
//!
//! Nothing here draws. A renderer keeps a [`SceneState`], mutates it in
//! response to input, and asks it for the [`SceneGeometry`] to draw from a
//! [`Skeleton`]. The skeleton stays a read-only input.

#![forbid(unsafe_code)]

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::core::skeleton::Skeleton;
use crate::geometry::point::Point;

/// Smallest camera distance.
pub const MIN_ZOOM: f64 = 0.5;
/// Largest camera distance.
pub const MAX_ZOOM: f64 = 10.0;
/// Largest absolute orbit angle, in radians.
pub const MAX_ANGLE: f64 = PI;

/// Orbit camera: two rotation angles (radians) and a distance.
///
/// Setters clamp instead of failing; a `NaN` input leaves the value unchanged.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::scene::{Camera, MAX_ZOOM};
///
/// let mut camera = Camera::default();
/// assert_eq!(camera.zoom(), 3.0);
/// camera.set_zoom(50.0);
/// assert_eq!(camera.zoom(), MAX_ZOOM);
/// camera.orbit(10.0, 0.0);
/// assert_eq!(camera.angle_x(), std::f64::consts::PI);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    angle_x: f64,
    angle_y: f64,
    zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            angle_x: 0.5,
            angle_y: 0.5,
            zoom: 3.0,
        }
    }
}

fn clamp_or_keep(value: f64, current: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        current
    } else {
        value.clamp(min, max)
    }
}

impl Camera {
    /// Creates a camera, clamping every component into range.
    #[must_use]
    pub fn new(angle_x: f64, angle_y: f64, zoom: f64) -> Self {
        let mut camera = Self::default();
        camera.set_angle_x(angle_x);
        camera.set_angle_y(angle_y);
        camera.set_zoom(zoom);
        camera
    }

    /// Rotation about the x axis.
    #[must_use]
    pub const fn angle_x(&self) -> f64 {
        self.angle_x
    }

    /// Rotation about the y axis.
    #[must_use]
    pub const fn angle_y(&self) -> f64 {
        self.angle_y
    }

    /// Distance from the origin.
    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the x rotation, clamped to `[-π, π]`.
    pub fn set_angle_x(&mut self, angle: f64) {
        self.angle_x = clamp_or_keep(angle, self.angle_x, -MAX_ANGLE, MAX_ANGLE);
    }

    /// Sets the y rotation, clamped to `[-π, π]`.
    pub fn set_angle_y(&mut self, angle: f64) {
        self.angle_y = clamp_or_keep(angle, self.angle_y, -MAX_ANGLE, MAX_ANGLE);
    }

    /// Sets the distance, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_or_keep(zoom, self.zoom, MIN_ZOOM, MAX_ZOOM);
    }

    /// Rotates by `(dx, dy)` radians.
    pub fn orbit(&mut self, dx: f64, dy: f64) {
        self.set_angle_x(self.angle_x + dx);
        self.set_angle_y(self.angle_y + dy);
    }

    /// Both angles in degrees, for fixed-function style rotation calls.
    #[must_use]
    pub fn rotation_degrees(&self) -> [f64; 2] {
        [self.angle_x.to_degrees(), self.angle_y.to_degrees()]
    }
}

/// A drawable layer of the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneLayer {
    /// Input points.
    Points,
    /// Edges as line segments.
    Edges,
    /// Triangles as translucent faces.
    Faces,
    /// Cells as the four faces of each tetrahedron.
    Cells,
}

/// Independent visibility toggles, one per [`SceneLayer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    /// Draw points.
    pub points: bool,
    /// Draw edges.
    pub edges: bool,
    /// Draw triangles.
    pub faces: bool,
    /// Draw cells.
    pub cells: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            points: true,
            edges: true,
            faces: false,
            cells: false,
        }
    }
}

impl Visibility {
    fn flag_mut(&mut self, layer: SceneLayer) -> &mut bool {
        match layer {
            SceneLayer::Points => &mut self.points,
            SceneLayer::Edges => &mut self.edges,
            SceneLayer::Faces => &mut self.faces,
            SceneLayer::Cells => &mut self.cells,
        }
    }

    /// Whether `layer` is drawn.
    #[must_use]
    pub const fn is_visible(&self, layer: SceneLayer) -> bool {
        match layer {
            SceneLayer::Points => self.points,
            SceneLayer::Edges => self.edges,
            SceneLayer::Faces => self.faces,
            SceneLayer::Cells => self.cells,
        }
    }

    /// Shows or hides `layer`.
    pub fn set(&mut self, layer: SceneLayer, visible: bool) {
        *self.flag_mut(layer) = visible;
    }

    /// Flips `layer` and returns its new state.
    pub fn toggle(&mut self, layer: SceneLayer) -> bool {
        let flag = self.flag_mut(layer);
        *flag = !*flag;
        *flag
    }
}

/// Geometry for the visible layers, ready to draw.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneGeometry {
    /// Points to draw.
    pub points: Vec<Point>,
    /// Edge endpoints.
    pub segments: Vec<[Point; 2]>,
    /// Triangle corners.
    pub faces: Vec<[Point; 3]>,
    /// Corners of the four faces of every cell.
    pub cell_faces: Vec<[Point; 3]>,
}

/// Sizes shown alongside the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneStats {
    /// Input points, hidden ones included.
    pub vertices: usize,
    /// Edges.
    pub edges: usize,
    /// Triangles.
    pub faces: usize,
    /// Cells.
    pub cells: usize,
}

/// Camera plus layer toggles.
///
/// # Examples
///
/// ```rust
/// use power_skeleton::core::comparison::build_skeleton;
/// use power_skeleton::core::extraction::ExtractionConfig;
/// use power_skeleton::core::scene::{SceneLayer, SceneState};
/// use power_skeleton::geometry::algorithms::lifted_hull::LiftedHullKernel;
/// use power_skeleton::geometry::point::WeightedPoint;
///
/// let points: Vec<WeightedPoint> = vec![
///     ([0.0, 0.0, 0.0], 0.0).into(),
///     ([1.0, 0.0, 0.0], 0.0).into(),
///     ([0.0, 1.0, 0.0], 0.0).into(),
///     ([0.0, 0.0, 1.0], 0.0).into(),
/// ];
/// let skeleton = build_skeleton(&LiftedHullKernel::new(), &points, &ExtractionConfig::default())
///     .unwrap()
///     .into_skeleton();
///
/// let mut scene = SceneState::default();
/// let geometry = scene.collect(&skeleton);
/// assert_eq!(geometry.points.len(), 4);
/// assert_eq!(geometry.segments.len(), 6);
/// assert!(geometry.faces.is_empty());
///
/// scene.visibility.toggle(SceneLayer::Cells);
/// assert_eq!(scene.collect(&skeleton).cell_faces.len(), 4);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    /// Orbit camera.
    pub camera: Camera,
    /// Layer toggles.
    pub visibility: Visibility,
}

impl SceneState {
    /// Geometry of the visible layers of `skeleton`.
    ///
    /// Simplices referring to indices outside the skeleton's vertices are
    /// skipped.
    #[must_use]
    pub fn collect(&self, skeleton: &Skeleton) -> SceneGeometry {
        let vertices = skeleton.vertices();
        let corners = |[a, b, c]: [usize; 3]| -> Option<[Point; 3]> {
            Some([*vertices.get(a)?, *vertices.get(b)?, *vertices.get(c)?])
        };

        let mut geometry = SceneGeometry::default();
        if self.visibility.points {
            geometry.points = vertices.to_vec();
        }
        if self.visibility.edges {
            geometry.segments = skeleton
                .edges()
                .iter()
                .filter_map(|e| {
                    let [a, b] = *e.vertices();
                    Some([*vertices.get(a)?, *vertices.get(b)?])
                })
                .collect();
        }
        if self.visibility.faces {
            geometry.faces = skeleton
                .triangles()
                .iter()
                .filter_map(|t| corners(*t.vertices()))
                .collect();
        }
        if self.visibility.cells {
            geometry.cell_faces = skeleton
                .cells()
                .iter()
                .flat_map(|c| c.triangles())
                .filter_map(|t| corners(*t.vertices()))
                .collect();
        }
        geometry
    }

    /// Counts shown in the overlay, independent of visibility.
    #[must_use]
    pub fn stats(skeleton: &Skeleton) -> SceneStats {
        SceneStats {
            vertices: skeleton.number_of_vertices(),
            edges: skeleton.number_of_edges(),
            faces: skeleton.number_of_triangles(),
            cells: skeleton.number_of_cells(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::simplex::{Cell, Edge, Triangle};
    use approx::assert_relative_eq;
    use std::collections::BTreeSet;

    fn sample_skeleton() -> Skeleton {
        let vertices = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
            Point::new(0.2, 0.2, 0.2),
        ];
        let cell = Cell::new([0, 1, 2, 3]).unwrap();
        let triangles: BTreeSet<Triangle> = cell.triangles().into();
        let edges: BTreeSet<Edge> = triangles.iter().flat_map(Triangle::edges).collect();
        Skeleton::from_parts(vertices, edges, triangles, [cell].into()).unwrap()
    }

    #[test]
    fn defaults_match_viewer_startup() {
        let scene = SceneState::default();
        assert_relative_eq!(scene.camera.angle_x(), 0.5);
        assert_relative_eq!(scene.camera.angle_y(), 0.5);
        assert_relative_eq!(scene.camera.zoom(), 3.0);
        assert!(scene.visibility.points && scene.visibility.edges);
        assert!(!scene.visibility.faces && !scene.visibility.cells);
    }

    #[test]
    fn camera_clamps_and_ignores_nan() {
        let mut camera = Camera::new(-10.0, 10.0, 0.0);
        assert_relative_eq!(camera.angle_x(), -PI);
        assert_relative_eq!(camera.angle_y(), PI);
        assert_relative_eq!(camera.zoom(), MIN_ZOOM);

        camera.set_zoom(f64::NAN);
        assert_relative_eq!(camera.zoom(), MIN_ZOOM);

        camera.orbit(PI, -PI);
        assert_relative_eq!(camera.angle_x(), 0.0);
        assert_relative_eq!(camera.angle_y(), 0.0);
        assert_eq!(camera.rotation_degrees(), [0.0, 0.0]);
    }

    #[test]
    fn visibility_toggles_are_independent() {
        let mut visibility = Visibility::default();
        assert!(visibility.toggle(SceneLayer::Faces));
        assert!(!visibility.toggle(SceneLayer::Points));
        assert!(visibility.is_visible(SceneLayer::Edges));
        visibility.set(SceneLayer::Edges, false);
        assert!(!visibility.is_visible(SceneLayer::Edges));
        assert!(!visibility.is_visible(SceneLayer::Cells));
    }

    #[test]
    fn collect_respects_visibility() {
        let skeleton = sample_skeleton();
        let mut scene = SceneState::default();

        let geometry = scene.collect(&skeleton);
        assert_eq!(geometry.points.len(), 5);
        assert_eq!(geometry.segments.len(), 6);
        assert!(geometry.faces.is_empty());
        assert!(geometry.cell_faces.is_empty());

        scene.visibility = Visibility {
            points: false,
            edges: false,
            faces: true,
            cells: true,
        };
        let geometry = scene.collect(&skeleton);
        assert!(geometry.points.is_empty());
        assert!(geometry.segments.is_empty());
        assert_eq!(geometry.faces.len(), 4);
        assert_eq!(geometry.cell_faces.len(), 4);
        assert_eq!(geometry.segments, Vec::<[Point; 2]>::new());
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let skeleton = Skeleton::from_parts_unchecked(
            vec![Point::new(0.0, 0.0, 0.0)],
            [Edge::new([0, 7]).unwrap()].into(),
            BTreeSet::new(),
            BTreeSet::new(),
        );
        assert!(SceneState::default().collect(&skeleton).segments.is_empty());
    }

    #[test]
    fn stats_count_all_points() {
        let stats = SceneState::stats(&sample_skeleton());
        assert_eq!(
            stats,
            SceneStats {
                vertices: 5,
                edges: 6,
                faces: 4,
                cells: 1
            }
        );
    }
}
