//! Positioned model instances
//!
//! An [`Entity`] places a shared [`Model`] in the world. Its transform is plain
//! position / per-axis rotation / uniform scale, and the model matrix is computed
//! lazily: every mutator marks the cached matrix stale, and
//! [`Entity::model_matrix`] recomputes it only when stale.
//!
//! Mutators take `&self`. A [`Scene`](crate::scene::Scene) holds shared references to
//! its entities, and the application keeps moving them between frames through those
//! same references. The interior cells make the entity `!Sync`, which matches the
//! rule that scenes are only touched from the thread owning the graphics context.

use std::cell::Cell;

use crate::foundation::math::{compose_model_matrix, Mat4, Vec3};
use crate::render::primitives::Model;

use super::direction::DirectionMask;

/// A positioned, oriented, scaled instance of a [`Model`]
#[derive(Debug)]
pub struct Entity<'a> {
    model: &'a Model<'a>,
    position: Cell<Vec3>,
    rotation: Cell<Vec3>,
    scale: Cell<f32>,
    model_matrix: Cell<Mat4>,
    model_matrix_up_to_date: Cell<bool>,
}

impl<'a> Entity<'a> {
    /// Entity at the origin, unrotated, unit scale
    pub fn new(model: &'a Model<'a>) -> Self {
        Self {
            model,
            position: Cell::new(Vec3::zeros()),
            rotation: Cell::new(Vec3::zeros()),
            scale: Cell::new(1.0),
            model_matrix: Cell::new(Mat4::identity()),
            model_matrix_up_to_date: Cell::new(true),
        }
    }

    /// Builder: start at `position`
    pub fn at(self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    /// The instanced model
    pub fn model(&self) -> &'a Model<'a> {
        self.model
    }

    /// World-space position
    pub fn position(&self) -> Vec3 {
        self.position.get()
    }

    /// Accumulated per-axis rotation in radians
    pub fn rotation(&self) -> Vec3 {
        self.rotation.get()
    }

    /// Uniform scale factor
    pub fn scale(&self) -> f32 {
        self.scale.get()
    }

    /// Overwrite the position
    pub fn set_position(&self, position: Vec3) {
        self.position.set(position);
        self.invalidate();
    }

    /// Add to the rotation (radians). Angles accumulate without wrapping, so
    /// continuous spins stay continuous.
    pub fn rotate(&self, delta: Vec3) {
        self.rotation.set(self.rotation.get() + delta);
        self.invalidate();
    }

    /// Overwrite the uniform scale
    pub fn set_scale(&self, scale: f32) {
        self.scale.set(scale);
        self.invalidate();
    }

    /// Translate along the world axes
    pub fn absolute_move(&self, delta: Vec3) {
        self.position.set(self.position.get() + delta);
        self.invalidate();
    }

    /// Yaw by `turn_amount` radians, then move `move_amount` along the entity's own
    /// axes selected by `direction`
    ///
    /// The local axes (forward -Z, right +X, up +Y) are taken through the full
    /// rotation after the turn. Axes whose bits cancel contribute nothing at all,
    /// not a floating-point near-zero.
    pub fn relative_move(&self, direction: DirectionMask, move_amount: f32, turn_amount: f32) {
        let mut rotation = self.rotation.get();
        rotation.y += turn_amount;
        self.rotation.set(rotation);

        let orientation = compose_model_matrix(&Vec3::zeros(), &rotation, 1.0);
        let local_axes = [-Vec3::z(), Vec3::x(), Vec3::y()];

        let mut offset = Vec3::zeros();
        for (sign, axis) in direction.signs().into_iter().zip(local_axes) {
            if sign != 0 {
                offset += orientation.transform_vector(&axis) * f32::from(sign);
            }
        }

        if offset != Vec3::zeros() {
            self.position.set(self.position.get() + offset * move_amount);
        }
        self.invalidate();
    }

    /// Model matrix (scale, rotate X, rotate Y, rotate Z, translate), recomputed only
    /// when a mutator ran since the last call
    pub fn model_matrix(&self) -> Mat4 {
        if !self.model_matrix_up_to_date.get() {
            self.model_matrix
                .set(compose_model_matrix(&self.position.get(), &self.rotation.get(), self.scale.get()));
            self.model_matrix_up_to_date.set(true);
        }
        self.model_matrix.get()
    }

    /// Whether the cached model matrix is current
    pub fn model_matrix_up_to_date(&self) -> bool {
        self.model_matrix_up_to_date.get()
    }

    fn invalidate(&self) {
        self.model_matrix_up_to_date.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mutators_clear_the_flag() {
        let model = Model::new("test");
        let entity = Entity::new(&model);
        assert!(entity.model_matrix_up_to_date());

        entity.set_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(!entity.model_matrix_up_to_date());
        entity.model_matrix();
        assert!(entity.model_matrix_up_to_date());

        entity.rotate(Vec3::new(0.0, 0.1, 0.0));
        assert!(!entity.model_matrix_up_to_date());
        entity.model_matrix();

        entity.absolute_move(Vec3::new(0.0, 1.0, 0.0));
        assert!(!entity.model_matrix_up_to_date());
    }

    #[test]
    fn test_cached_matrix_matches_direct_composition() {
        let model = Model::new("test");
        let entity = Entity::new(&model);

        entity.set_position(Vec3::new(4.0, -1.0, 2.0));
        entity.rotate(Vec3::new(0.3, 0.0, 0.0));
        entity.model_matrix();
        entity.rotate(Vec3::new(0.0, 1.1, -0.4));
        entity.absolute_move(Vec3::new(-1.0, 0.5, 0.0));
        entity.set_scale(2.5);

        let expected = compose_model_matrix(&Vec3::new(3.0, -0.5, 2.0), &Vec3::new(0.3, 1.1, -0.4), 2.5);
        let first = entity.model_matrix();
        let second = entity.model_matrix();

        assert_eq!(first, expected);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rotation_accumulates_without_wrapping() {
        let model = Model::new("test");
        let entity = Entity::new(&model);

        for _ in 0..10 {
            entity.rotate(Vec3::new(0.0, 1.0, 0.0));
        }
        assert_relative_eq!(entity.rotation().y, 10.0);
    }

    #[test]
    fn test_forward_and_backward_cancel() {
        let model = Model::new("test");
        let entity = Entity::new(&model).at(Vec3::new(1.0, 2.0, 3.0));
        entity.rotate(Vec3::new(0.2, 0.7, 0.1));

        for amount in [0.0, 1.0, 123.456, -5.0] {
            entity.relative_move(DirectionMask::FORWARD | DirectionMask::BACKWARD, amount, 0.0);
            assert_eq!(entity.position(), Vec3::new(1.0, 2.0, 3.0));
        }
    }

    #[test]
    fn test_relative_forward_follows_yaw() {
        let model = Model::new("test");
        let entity = Entity::new(&model);

        entity.relative_move(DirectionMask::FORWARD, 2.0, std::f32::consts::FRAC_PI_2);

        // A quarter turn about +Y takes forward (-Z) to -X.
        assert_relative_eq!(entity.position(), Vec3::new(-2.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(entity.rotation().y, std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_relative_right_and_up() {
        let model = Model::new("test");
        let entity = Entity::new(&model);

        entity.relative_move(DirectionMask::RIGHT | DirectionMask::UP, 1.0, 0.0);
        assert_relative_eq!(entity.position(), Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-6);
    }
}
