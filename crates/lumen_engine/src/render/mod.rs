//! # Rendering System
//!
//! Everything between the application's scene and the GPU:
//! - **`api`**: the [`GraphicsDevice`](api::GraphicsDevice) seam and the
//!   [`GraphicsContext`](api::GraphicsContext) carrying the active-renderer marker
//! - **`backends`**: the OpenGL device and the in-memory recording device
//! - **`resources`**: textures, shaders, materials and IBL environments
//! - **`primitives`**: mesh data, uploaded meshes, models and the camera
//! - **`systems`**: lights
//! - **`renderer`**: the per-frame [`Renderer`]
//! - **`window`**: the windowing subsystem (glfw behind the `window` feature)
//!
//! ## Ownership
//! Resources are created once and destroyed explicitly with the device that created
//! them. Meshes borrow their shader and material; entities borrow their model; scenes
//! borrow entities, lights and the environment. The borrow checker therefore rules
//! out a scene outliving anything it draws.

pub mod api;
pub mod backends;
pub mod primitives;
pub mod renderer;
pub mod resources;
pub mod systems;
pub mod window;

use thiserror::Error;

pub use api::{DeviceError, GraphicsContext, GraphicsDevice};
pub use backends::{GlowDevice, RecordingDevice};
pub use primitives::{Camera, Mesh, MeshData, Model};
pub use renderer::Renderer;
pub use resources::{Environment, EnvironmentTextures, Material, Shader, Texture, TextureKind};
pub use systems::lighting::{Light, LightType, MAX_LIGHTS};

/// Errors from resource creation
///
/// Rendering itself never fails; only creating GPU resources does.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Input data is inconsistent; nothing was allocated
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The device could not allocate a resource; nothing was left allocated
    #[error("Resource allocation failed: {0}")]
    ResourceAllocation(#[from] DeviceError),

    /// Shader source could not be read
    #[error("Shader source unavailable: {0}")]
    ShaderSource(#[from] std::io::Error),

    /// A backend could not be brought up
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
