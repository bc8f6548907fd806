//! Core primitive types for rendering
//!
//! Geometry ([`MeshData`], [`Mesh`], [`Model`]) and the [`Camera`].

pub mod camera;
pub mod mesh;
pub mod model;

pub use camera::Camera;
pub use mesh::{attribute, Mesh, MeshData};
pub use model::Model;
