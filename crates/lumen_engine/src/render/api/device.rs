//! GPU device abstraction
//!
//! [`GraphicsDevice`] is the narrow set of GPU operations the renderer and the resource
//! wrappers need. The OpenGL backend implements it on `glow`; the recording backend
//! implements it in memory so the render-submission logic can be tested without a
//! context.
//!
//! # Handles
//! Every GPU object is referred to by a small `Copy` id. Ids are only meaningful to the
//! device that created them. Using an id after it was deleted is a caller error and
//! its effect is whatever the backend does with stale names; nothing here checks it.
//!
//! # Failure model
//! Only creation can fail, and it fails with [`DeviceError`]. Binding, uniform writes
//! and draws have no failure channel: driver errors surface through the backend's
//! debug output, not through return values.

use bitflags::bitflags;
use thiserror::Error;

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// GPU device errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device ran out of memory
    #[error("GPU out of memory")]
    OutOfMemory,

    /// An object could not be allocated for another reason
    #[error("GPU allocation failed: {0}")]
    AllocationFailed(String),

    /// A shader stage failed to compile
    #[error("{stage:?} shader compilation failed: {log}")]
    ShaderCompilation {
        /// Stage that failed
        stage: ShaderStage,
        /// Compiler output
        log: String,
    },

    /// The program failed to link
    #[error("Program link failed: {0}")]
    ProgramLink(String),
}

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);
    };
}

gpu_handle!(
    /// Vertex or index buffer
    BufferId
);
gpu_handle!(
    /// Vertex-array binding descriptor
    VertexArrayId
);
gpu_handle!(
    /// Texture object
    TextureId
);
gpu_handle!(
    /// Linked shader program
    ProgramId
);
gpu_handle!(
    /// Uniform location inside a program
    UniformLocation
);

/// What a buffer is bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data
    Vertex,
    /// Element indices
    Index,
}

/// Texture binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// Regular 2D image
    Texture2D,
    /// Six-faced cube map
    CubeMap,
}

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
}

/// Texture upload description
///
/// Pixels are tightly packed RGBA8. A cube map carries six faces in the order
/// +X, -X, +Y, -Y, +Z, -Z, each `width * height * 4` bytes.
#[derive(Debug, Clone, Copy)]
pub struct TextureUpload<'a> {
    /// Binding target
    pub target: TextureTarget,
    /// Width of one face in pixels
    pub width: u32,
    /// Height of one face in pixels
    pub height: u32,
    /// Pixel data, one slice per face
    pub faces: &'a [&'a [u8]],
    /// Generate a full mip chain after upload
    pub generate_mipmaps: bool,
}

/// A value written to a uniform location
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Signed integer (also used for sampler units)
    Int(i32),
    /// Unsigned integer
    UInt(u32),
    /// Scalar float
    Float(f32),
    /// Three-component vector
    Vec3([f32; 3]),
    /// 4x4 matrix, column-major
    Mat4([f32; 16]),
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFace {
    /// Cull back faces
    Back,
    /// Cull front faces
    Front,
}

/// Winding order considered front-facing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    /// Counter-clockwise
    CounterClockwise,
    /// Clockwise
    Clockwise,
}

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunction {
    /// Pass when incoming depth is less than stored depth
    Less,
    /// Pass when incoming depth is less or equal
    LessEqual,
}

/// Global pipeline state applied when a renderer becomes active
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineState {
    /// Clear color (RGBA)
    pub clear_color: [f32; 4],
    /// Face culling, `None` disables it
    pub cull_face: Option<CullFace>,
    /// Front-face winding
    pub front_face: FrontFace,
    /// Depth test, `None` disables it
    pub depth_test: Option<DepthFunction>,
    /// Multisample rasterization
    pub multisample: bool,
    /// Seamless filtering across cube-map faces
    pub seamless_cube_maps: bool,
}

impl PipelineState {
    /// The forward-rendering state: back-face culling with CCW front faces,
    /// depth test `Less`, multisampling and seamless cube maps.
    pub fn forward(clear_color: [f32; 4]) -> Self {
        Self {
            clear_color,
            cull_face: Some(CullFace::Back),
            front_face: FrontFace::CounterClockwise,
            depth_test: Some(DepthFunction::Less),
            multisample: true,
            seamless_cube_maps: true,
        }
    }
}

bitflags! {
    /// Buffers cleared at the start of a frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        /// Color attachment
        const COLOR = 1 << 0;
        /// Depth attachment
        const DEPTH = 1 << 1;
    }
}

/// GPU operations required by the resource wrappers and the renderer
///
/// All calls happen on the thread that owns the graphics context.
pub trait GraphicsDevice {
    /// Allocate a buffer and upload `data` once (static usage)
    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> DeviceResult<BufferId>;

    /// Release a buffer
    fn delete_buffer(&mut self, buffer: BufferId);

    /// Allocate a vertex-array binding descriptor
    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayId>;

    /// Release a vertex-array binding descriptor
    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId);

    /// Source attribute `location` from `buffer` as `components` tightly packed floats
    fn attach_vertex_buffer(&mut self, vertex_array: VertexArrayId, buffer: BufferId, location: u32, components: u32);

    /// Use `buffer` as the element source of `vertex_array`
    fn attach_index_buffer(&mut self, vertex_array: VertexArrayId, buffer: BufferId);

    /// Select a vertex array as the active draw source
    fn bind_vertex_array(&mut self, vertex_array: VertexArrayId);

    /// Allocate a texture and upload its pixels
    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> DeviceResult<TextureId>;

    /// Release a texture
    fn delete_texture(&mut self, texture: TextureId);

    /// Bind a texture to a texture unit
    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: TextureId);

    /// Compile both stages and link them into a program
    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> DeviceResult<ProgramId>;

    /// Release a program
    fn delete_program(&mut self, program: ProgramId);

    /// Make a program current
    fn use_program(&mut self, program: ProgramId);

    /// Look up a uniform; `None` when the program has no active uniform of that name
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Write a uniform of the current program
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Apply global pipeline state
    fn apply_pipeline_state(&mut self, state: &PipelineState);

    /// Set the viewport rectangle, origin at the lower-left corner
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clear the selected buffers
    fn clear(&mut self, flags: ClearFlags);

    /// Draw `index_count` indices (`u32`) of the bound vertex array as triangles
    fn draw_indexed(&mut self, index_count: u32);
}
