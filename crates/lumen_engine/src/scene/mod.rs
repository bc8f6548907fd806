//! Scene data model
//!
//! - **`entity`**: [`Entity`], a transformed instance of a model
//! - **`direction`**: [`DirectionMask`] for relative movement
//! - **`scene`**: [`Scene`], the per-frame aggregate of entities, lights and environment

pub mod direction;
pub mod entity;
pub mod scene;

pub use direction::DirectionMask;
pub use entity::Entity;
pub use scene::{Scene, SceneError, SceneResult, GROWTH_STEP};
