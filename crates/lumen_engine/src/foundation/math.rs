//! Math utilities and types
//!
//! Provides the vector and matrix value types used by the renderer. Everything is
//! backed by `nalgebra`; matrices are stored column-major, which is also the layout
//! uploaded to the GPU (see [`Mat4Ext::to_cols_array`]).
//!
//! # Transform order
//!
//! Model matrices are composed as **scale → rotate-x → rotate-y → rotate-z → translate**,
//! i.e. `M = T · Rz · Ry · Rx · S`. [`compose_model_matrix`] is the single place this
//! order is written down; entities and tests both go through it.

pub use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}

/// Extension trait for Mat4 with the explicit transform operations the renderer composes.
///
/// The constructors (`translation`, `rotation_x`, ...) build a fresh matrix. The
/// in-place operations (`translate`, `rotate_x`, ...) apply the transform *after*
/// whatever the matrix already does (`self = op · self`), so a chain of calls reads
/// in the order the transforms are applied to a vertex.
pub trait Mat4Ext {
    /// Create a translation matrix
    fn translation(offset: &Vec3) -> Mat4;

    /// Create a rotation matrix around the X axis (radians)
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis (radians)
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis (radians)
    fn rotation_z(angle: f32) -> Mat4;

    /// Create a uniform scale matrix
    fn uniform_scale(factor: f32) -> Mat4;

    /// Create a right-handed OpenGL perspective projection (clip depth in [-1, 1])
    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4;

    /// Apply a translation after the current transform
    fn translate(&mut self, offset: &Vec3);

    /// Apply a rotation around X after the current transform
    fn rotate_x(&mut self, angle: f32);

    /// Apply a rotation around Y after the current transform
    fn rotate_y(&mut self, angle: f32);

    /// Apply a rotation around Z after the current transform
    fn rotate_z(&mut self, angle: f32);

    /// Apply a uniform scale after the current transform
    fn scale_uniform(&mut self, factor: f32);

    /// Column-major copy of the 16 elements, ready for a uniform upload
    fn to_cols_array(&self) -> [f32; 16];
}

impl Mat4Ext for Mat4 {
    fn translation(offset: &Vec3) -> Mat4 {
        Mat4::new_translation(offset)
    }

    fn rotation_x(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c, -s, 0.0,
            0.0, s, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    fn rotation_y(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4::new(
            c, 0.0, s, 0.0,
            0.0, 1.0, 0.0, 0.0,
            -s, 0.0, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    fn rotation_z(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4::new(
            c, -s, 0.0, 0.0,
            s, c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    fn uniform_scale(factor: f32) -> Mat4 {
        Mat4::new_scaling(factor)
    }

    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        // Standard OpenGL projection. Both depth terms divide by the same (near - far)
        // so the handedness stays consistent between rows.
        //
        // P = [f/a  0   0            0          ]
        //     [0    f   0            0          ]
        //     [0    0   (f+n)/(n-f)  2fn/(n-f)  ]
        //     [0    0   -1           0          ]
        let cot = 1.0 / (fov_y * 0.5).tan();
        let frustum_length = near - far;

        let mut result = Mat4::zeros();
        result[(0, 0)] = cot / aspect;
        result[(1, 1)] = cot;
        result[(2, 2)] = (far + near) / frustum_length;
        result[(2, 3)] = (2.0 * far * near) / frustum_length;
        result[(3, 2)] = -1.0;
        result
    }

    fn look_at(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new_translation(&-eye);
        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }

    fn translate(&mut self, offset: &Vec3) {
        *self = Mat4::translation(offset) * *self;
    }

    fn rotate_x(&mut self, angle: f32) {
        *self = Mat4::rotation_x(angle) * *self;
    }

    fn rotate_y(&mut self, angle: f32) {
        *self = Mat4::rotation_y(angle) * *self;
    }

    fn rotate_z(&mut self, angle: f32) {
        *self = Mat4::rotation_z(angle) * *self;
    }

    fn scale_uniform(&mut self, factor: f32) {
        *self = Mat4::uniform_scale(factor) * *self;
    }

    fn to_cols_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.as_slice());
        out
    }
}

/// Compose a model matrix: scale → rotate-x → rotate-y → rotate-z → translate.
///
/// `rotation` holds per-axis angles in radians. The result is deterministic for
/// identical inputs, which is what lets [`crate::scene::Entity`] cache it.
pub fn compose_model_matrix(position: &Vec3, rotation: &Vec3, scale: f32) -> Mat4 {
    let mut matrix = Mat4::identity();
    matrix.scale_uniform(scale);
    matrix.rotate_x(rotation.x);
    matrix.rotate_y(rotation.y);
    matrix.rotate_z(rotation.z);
    matrix.translate(position);
    matrix
}
