use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::{CameraConfig, SceneRange};
use crate::resources::version_tracker::ChangeTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionType {
    #[default]
    Orthographic,
    Perspective,
}

/// A look-at camera.
///
/// Unset bounds, `far` and `aspect` are derived from the scene range once the
/// camera is added to a scene. Matrices are recomputed by
/// [`Camera::update_matrices`]; getters return the cached values.
#[derive(Debug, Clone)]
pub struct Camera {
    pub id: String,
    pub position: Vec3,
    pub looking: Vec3,
    pub up: Vec3,
    pub near: f32,
    pub far: Option<f32>,
    pub projection: ProjectionType,
    /// Degrees.
    pub fovy: f32,
    pub aspect: Option<f32>,
    pub left: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub top: Option<f32>,

    range: Option<SceneRange>,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    matrix: Mat4,
    tracker: ChangeTracker,
}

impl Camera {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self::from_config(&CameraConfig {
            id: id.into(),
            ..CameraConfig::default()
        })
    }

    #[must_use]
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self {
            id: config.id.clone(),
            position: Vec3::from(config.position),
            looking: Vec3::from(config.looking),
            up: Vec3::from(config.up),
            near: config.near,
            far: config.far,
            projection: config.projection,
            fovy: config.fovy,
            aspect: config.aspect,
            left: config.left,
            right: config.right,
            bottom: config.bottom,
            top: config.top,
            range: None,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            matrix: Mat4::IDENTITY,
            tracker: ChangeTracker::new(),
        };
        camera.update_matrices();
        camera
    }

    #[must_use]
    pub fn perspective(id: impl Into<String>, fovy: f32) -> Self {
        Self::from_config(&CameraConfig {
            id: id.into(),
            projection: ProjectionType::Perspective,
            fovy,
            ..CameraConfig::default()
        })
    }

    /// Binds the camera to a scene extent and refreshes its matrices.
    pub fn set_range(&mut self, range: SceneRange) {
        self.range = Some(range);
        self.update_matrices();
    }

    #[must_use]
    pub fn range(&self) -> Option<SceneRange> {
        self.range
    }

    pub fn look_at(&mut self, position: Vec3, looking: Vec3, up: Vec3) {
        self.position = position;
        self.looking = looking;
        self.up = up;
        self.update_matrices();
    }

    /// `depth / 2 + position.z`, or the explicit far plane.
    #[must_use]
    pub fn far_plane(&self) -> f32 {
        match (self.far, self.range) {
            (Some(far), _) => far,
            (None, Some(range)) => range.depth / 2.0 + self.position.z,
            (None, None) => 100.0,
        }
    }

    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        match (self.aspect, self.range) {
            (Some(aspect), _) => aspect,
            (None, Some(range)) => range.width / range.height,
            (None, None) => 1.0,
        }
    }

    fn ortho_bounds(&self) -> (f32, f32, f32, f32) {
        let (half_w, half_h) = self
            .range
            .map_or((1.0, 1.0), |r| (r.width / 2.0, r.height / 2.0));
        (
            self.left.unwrap_or(-half_w),
            self.right.unwrap_or(half_w),
            self.bottom.unwrap_or(-half_h),
            self.top.unwrap_or(half_h),
        )
    }

    /// Recomputes view, projection and their product.
    pub fn update_matrices(&mut self) {
        self.view_matrix = Mat4::look_at_rh(self.position, self.looking, self.up);
        let far = self.far_plane();
        self.projection_matrix = match self.projection {
            ProjectionType::Orthographic => {
                let (left, right, bottom, top) = self.ortho_bounds();
                Mat4::orthographic_rh(left, right, bottom, top, self.near, far)
            }
            ProjectionType::Perspective => {
                Mat4::perspective_rh(self.fovy.to_radians(), self.aspect_ratio(), self.near, far)
            }
        };
        self.matrix = self.projection_matrix * self.view_matrix;
        self.tracker.changed();
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Projection × view.
    #[inline]
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> SceneRange {
        SceneRange {
            width: 8.0,
            height: 6.0,
            depth: 20.0,
        }
    }

    #[test]
    fn far_plane_follows_range() {
        let mut camera = Camera::new("c");
        camera.set_range(range());
        assert!((camera.far_plane() - 17.0).abs() < 1e-6);
    }

    #[test]
    fn orthographic_maps_range_corner_to_clip_corner() {
        let mut camera = Camera::new("c");
        camera.set_range(range());
        let clip = camera.matrix().project_point3(Vec3::new(4.0, 3.0, 0.0));
        assert!((clip.x - 1.0).abs() < 1e-5);
        assert!((clip.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn perspective_uses_range_aspect() {
        let mut camera = Camera::perspective("p", 30.0);
        camera.set_range(range());
        assert!((camera.aspect_ratio() - 8.0 / 6.0).abs() < 1e-6);
    }
}
