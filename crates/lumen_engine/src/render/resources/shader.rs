//! Linked shading programs

use std::fs;

use crate::core::ShaderConfig;
use crate::render::api::{GraphicsDevice, ProgramId};
use crate::render::RenderResult;

/// A compiled and linked vertex + fragment program
///
/// Meshes reference a shader; they never own it. The shader must outlive every mesh
/// that points at it, which the borrow in [`Mesh`](crate::render::primitives::Mesh)
/// enforces.
#[derive(Debug, PartialEq, Eq)]
pub struct Shader {
    program: ProgramId,
    name: String,
}

impl Shader {
    /// Compile and link a program from GLSL sources
    pub fn create<D: GraphicsDevice>(
        device: &mut D,
        name: impl Into<String>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> RenderResult<Self> {
        let name = name.into();
        let program = device.create_program(vertex_source, fragment_source)?;
        log::info!("Linked shader '{name}' as {program:?}");
        Ok(Self { program, name })
    }

    /// Read both stages from the paths in `config` and link them
    pub fn from_config<D: GraphicsDevice>(device: &mut D, config: &ShaderConfig) -> RenderResult<Self> {
        let vertex_source = fs::read_to_string(&config.vertex_shader_path)?;
        let fragment_source = fs::read_to_string(&config.fragment_shader_path)?;
        Self::create(device, config.vertex_shader_path.as_str(), &vertex_source, &fragment_source)
    }

    /// GPU program handle, also the key of the renderer's uniform cache
    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Debug name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Make this program current
    pub fn use_program<D: GraphicsDevice>(&self, device: &mut D) {
        device.use_program(self.program);
    }

    /// Release the program
    ///
    /// Renderers that drew with this shader keep a cached uniform table for its
    /// program id; call [`Renderer::forget_shader`](crate::render::Renderer::forget_shader)
    /// before the id can be reused.
    pub fn destroy<D: GraphicsDevice>(self, device: &mut D) {
        log::debug!("Destroying shader '{}'", self.name);
        device.delete_program(self.program);
    }
}
