//! GPU resources owned by the application
//!
//! - **`texture`**: [`Texture`] and its [`TextureKind`]
//! - **`shader`**: linked [`Shader`] programs
//! - **`material`**: [`Material`] factors and owned textures
//! - **`environment`**: image-based-lighting [`Environment`]

pub mod environment;
pub mod material;
pub mod shader;
pub mod texture;

pub use environment::{Environment, EnvironmentTextures};
pub use material::Material;
pub use shader::Shader;
pub use texture::{Texture, TextureKind};
