//! Backend-facing rendering API
//!
//! - **`device`**: the [`GraphicsDevice`] trait every GPU backend implements
//! - **`context`**: [`GraphicsContext`], the device plus the active-renderer marker

pub mod context;
pub mod device;

pub use context::{GraphicsContext, RendererId};
pub use device::{
    BufferId, BufferTarget, ClearFlags, CullFace, DepthFunction, DeviceError, DeviceResult, FrontFace,
    GraphicsDevice, PipelineState, ProgramId, ShaderStage, TextureId, TextureTarget, TextureUpload,
    UniformLocation, UniformValue, VertexArrayId,
};
