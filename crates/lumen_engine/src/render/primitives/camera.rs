//! # 3D Camera
//!
//! A perspective camera: a look-at view transform plus field of view and clipping
//! planes. The aspect ratio is not stored; it comes from whatever viewport the camera
//! is rendered into, so one camera can feed renderers of different sizes.
//!
//! ## Conventions
//! - Right-handed, Y-up world space; the camera looks down -Z in view space
//! - OpenGL clip space, depth in [-1, 1]
//! - Field of view is vertical and in radians

use crate::core::RendererConfig;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a perspective camera at `position` looking down -Z
    pub fn perspective(position: Vec3, fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: position - Vec3::z(),
            up: Vec3::y(),
            fov: utils::deg_to_rad(fov_degrees),
            near,
            far,
        }
    }

    /// Camera at the origin with the projection parameters of `config`
    pub fn from_config(config: &RendererConfig) -> Self {
        Self::perspective(Vec3::zeros(), config.fov_degrees, config.near_plane, config.far_plane)
    }

    /// Move the camera, keeping its viewing direction
    pub fn set_position(&mut self, position: Vec3) {
        let direction = self.target - self.position;
        self.position = position;
        self.target = position + direction;
    }

    /// Point the camera at `target`
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
    }

    /// World-to-view transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(&self.position, &self.target, &self.up)
    }

    /// View-to-clip transform for a viewport of the given aspect ratio (width / height)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_gl(self.fov, aspect, self.near, self.far)
    }

    /// `projection * view`
    pub fn view_projection_matrix(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&RendererConfig::default())
    }
}
