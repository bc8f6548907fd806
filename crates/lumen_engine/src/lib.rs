//! # Lumen Engine
//!
//! A small real-time 3D rendering toolkit on OpenGL.
//!
//! ## Features
//!
//! - **Scene aggregation**: entities grouped by model, lights and an optional environment
//! - **GPU resources**: meshes, models, textures, shaders and PBR materials with explicit lifetimes
//! - **Renderer**: per-frame orchestration with cached uniform lookups and idempotent activation
//! - **Window subsystem**: reference-counted GLFW lifetime and context loading (`window` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lumen_engine::prelude::*;
//!
//! fn frame<D: GraphicsDevice>(context: &mut GraphicsContext<D>) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RendererConfig::default();
//!     let shader = Shader::create(context.device_mut(), "pbr", "...", "...")?;
//!     let material = Material::default();
//!     let cube = Model::upload(context.device_mut(), "cube", &[MeshData::cube()], &shader, &material)?;
//!
//!     let entity = Entity::new(&cube);
//!     let sun = Light::directional(Vec3::new(0.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0), 3.0);
//!
//!     let mut scene = Scene::new();
//!     scene.add_entity(&entity)?;
//!     scene.add_light(&sun)?;
//!
//!     let mut renderer = Renderer::new(config.clone());
//!     renderer.render(context, &Camera::from_config(&config), &scene);
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod config;
pub mod core;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for toolkit users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, ModelLoader},
        config::{Config, ConfigError},
        core::{ApplicationConfig, RendererConfig, ShaderConfig, WindowConfig},
        foundation::math::{Mat4, Vec3},
        render::{
            Camera, Environment, EnvironmentTextures, GraphicsContext, GraphicsDevice, Light, LightType,
            Material, Mesh, MeshData, Model, RenderError, RenderResult, Renderer, Shader, Texture,
            TextureKind,
        },
        scene::{DirectionMask, Entity, Scene, SceneError},
    };

    #[cfg(feature = "window")]
    pub use crate::render::window::Window;
}
