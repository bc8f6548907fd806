//! [`GraphicsDevice`] implementation on top of `glow`
//!
//! Object names are the raw OpenGL names, so a [`BufferId`] is exactly the name
//! `glGenBuffers` returned. Each call assumes the context that created the device
//! is current on the calling thread.

use std::num::NonZeroU32;

use glow::HasContext;

use crate::render::api::device::{
    BufferId, BufferTarget, ClearFlags, CullFace, DepthFunction, DeviceError, DeviceResult, FrontFace,
    GraphicsDevice, PipelineState, ProgramId, ShaderStage, TextureId, TextureTarget, TextureUpload,
    UniformLocation, UniformValue, VertexArrayId,
};

/// OpenGL 4.x core-profile device
pub struct GlowDevice {
    gl: glow::Context,
}

impl GlowDevice {
    /// Wrap an already-loaded context
    pub fn new(gl: glow::Context) -> Self {
        log::info!(
            "OpenGL device: {} / {}",
            unsafe { gl.get_parameter_string(glow::VENDOR) },
            unsafe { gl.get_parameter_string(glow::RENDERER) },
        );
        Self { gl }
    }

    /// The underlying context
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    pub(super) fn gl_mut(&mut self) -> &mut glow::Context {
        &mut self.gl
    }

    fn buffer_target(target: BufferTarget) -> u32 {
        match target {
            BufferTarget::Vertex => glow::ARRAY_BUFFER,
            BufferTarget::Index => glow::ELEMENT_ARRAY_BUFFER,
        }
    }

    fn texture_target(target: TextureTarget) -> u32 {
        match target {
            TextureTarget::Texture2D => glow::TEXTURE_2D,
            TextureTarget::CubeMap => glow::TEXTURE_CUBE_MAP,
        }
    }

    fn allocation_error(message: String) -> DeviceError {
        if message.contains("OUT_OF_MEMORY") {
            DeviceError::OutOfMemory
        } else {
            DeviceError::AllocationFailed(message)
        }
    }

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> DeviceResult<glow::NativeShader> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };

        unsafe {
            let shader = self.gl.create_shader(shader_type).map_err(Self::allocation_error)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);

            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(DeviceError::ShaderCompilation { stage, log });
            }

            Ok(shader)
        }
    }
}

fn native<T>(name: u32, wrap: impl FnOnce(NonZeroU32) -> T) -> Option<T> {
    NonZeroU32::new(name).map(wrap)
}

impl GraphicsDevice for GlowDevice {
    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> DeviceResult<BufferId> {
        let gl_target = Self::buffer_target(target);
        unsafe {
            let buffer = self.gl.create_buffer().map_err(Self::allocation_error)?;
            self.gl.bind_buffer(gl_target, Some(buffer));
            self.gl.buffer_data_u8_slice(gl_target, data, glow::STATIC_DRAW);

            if self.gl.get_error() == glow::OUT_OF_MEMORY {
                self.gl.delete_buffer(buffer);
                return Err(DeviceError::OutOfMemory);
            }

            self.gl.bind_buffer(gl_target, None);
            Ok(BufferId(buffer.0.get()))
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if let Some(buffer) = native(buffer.0, glow::NativeBuffer) {
            unsafe { self.gl.delete_buffer(buffer) };
        }
    }

    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayId> {
        unsafe {
            let vertex_array = self.gl.create_vertex_array().map_err(Self::allocation_error)?;
            Ok(VertexArrayId(vertex_array.0.get()))
        }
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        if let Some(vertex_array) = native(vertex_array.0, glow::NativeVertexArray) {
            unsafe { self.gl.delete_vertex_array(vertex_array) };
        }
    }

    fn attach_vertex_buffer(&mut self, vertex_array: VertexArrayId, buffer: BufferId, location: u32, components: u32) {
        let components = i32::try_from(components).unwrap_or(4);
        unsafe {
            self.gl.bind_vertex_array(native(vertex_array.0, glow::NativeVertexArray));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, native(buffer.0, glow::NativeBuffer));
            self.gl.vertex_attrib_pointer_f32(location, components, glow::FLOAT, false, 0, 0);
            self.gl.enable_vertex_attrib_array(location);
            self.gl.bind_vertex_array(None);
        }
    }

    fn attach_index_buffer(&mut self, vertex_array: VertexArrayId, buffer: BufferId) {
        unsafe {
            self.gl.bind_vertex_array(native(vertex_array.0, glow::NativeVertexArray));
            // The element binding is vertex-array state, so it must stay bound until
            // the vertex array itself is unbound.
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, native(buffer.0, glow::NativeBuffer));
            self.gl.bind_vertex_array(None);
        }
    }

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayId) {
        unsafe { self.gl.bind_vertex_array(native(vertex_array.0, glow::NativeVertexArray)) };
    }

    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> DeviceResult<TextureId> {
        let target = Self::texture_target(upload.target);
        let width = i32::try_from(upload.width).map_err(|_| DeviceError::AllocationFailed("texture too wide".into()))?;
        let height =
            i32::try_from(upload.height).map_err(|_| DeviceError::AllocationFailed("texture too tall".into()))?;

        let face_targets: Vec<u32> = match upload.target {
            TextureTarget::Texture2D => vec![glow::TEXTURE_2D],
            TextureTarget::CubeMap => (0..6).map(|face| glow::TEXTURE_CUBE_MAP_POSITIVE_X + face).collect(),
        };

        unsafe {
            let texture = self.gl.create_texture().map_err(Self::allocation_error)?;
            self.gl.bind_texture(target, Some(texture));

            for (face_target, pixels) in face_targets.iter().zip(upload.faces.iter()) {
                self.gl.tex_image_2d(
                    *face_target,
                    0,
                    glow::RGBA8 as i32,
                    width,
                    height,
                    0,
                    glow::RGBA,
                    glow::UNSIGNED_BYTE,
                    Some(*pixels),
                );
            }

            let min_filter = if upload.generate_mipmaps {
                self.gl.generate_mipmap(target);
                glow::LINEAR_MIPMAP_LINEAR
            } else {
                glow::LINEAR
            };
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, min_filter as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);

            let wrap = match upload.target {
                TextureTarget::Texture2D => glow::REPEAT,
                TextureTarget::CubeMap => glow::CLAMP_TO_EDGE,
            };
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, wrap as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, wrap as i32);
            if upload.target == TextureTarget::CubeMap {
                self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_R, wrap as i32);
            }

            if self.gl.get_error() == glow::OUT_OF_MEMORY {
                self.gl.delete_texture(texture);
                return Err(DeviceError::OutOfMemory);
            }

            self.gl.bind_texture(target, None);
            Ok(TextureId(texture.0.get()))
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if let Some(texture) = native(texture.0, glow::NativeTexture) {
            unsafe { self.gl.delete_texture(texture) };
        }
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: TextureId) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(Self::texture_target(target), native(texture.0, glow::NativeTexture));
        }
    }

    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> DeviceResult<ProgramId> {
        let vertex = self.compile_stage(ShaderStage::Vertex, vertex_source)?;
        let fragment = match self.compile_stage(ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(e) => {
                unsafe { self.gl.delete_shader(vertex) };
                return Err(e);
            }
        };

        unsafe {
            let program = match self.gl.create_program() {
                Ok(program) => program,
                Err(e) => {
                    self.gl.delete_shader(vertex);
                    self.gl.delete_shader(fragment);
                    return Err(Self::allocation_error(e));
                }
            };

            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);

            // The stages are no longer needed once linked (or once linking failed).
            self.gl.detach_shader(program, vertex);
            self.gl.detach_shader(program, fragment);
            self.gl.delete_shader(vertex);
            self.gl.delete_shader(fragment);

            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(DeviceError::ProgramLink(log));
            }

            Ok(ProgramId(program.0.get()))
        }
    }

    fn delete_program(&mut self, program: ProgramId) {
        if let Some(program) = native(program.0, glow::NativeProgram) {
            unsafe { self.gl.delete_program(program) };
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        unsafe { self.gl.use_program(native(program.0, glow::NativeProgram)) };
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let program = native(program.0, glow::NativeProgram)?;
        unsafe { self.gl.get_uniform_location(program, name) }.map(|location| UniformLocation(location.0))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let location = glow::NativeUniformLocation(location.0);
        let location = Some(&location);
        unsafe {
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
                UniformValue::UInt(v) => self.gl.uniform_1_u32(location, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(location, x, y, z),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, &m),
            }
        }
    }

    fn apply_pipeline_state(&mut self, state: &PipelineState) {
        let [r, g, b, a] = state.clear_color;
        unsafe {
            self.gl.clear_color(r, g, b, a);

            match state.cull_face {
                Some(face) => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(match face {
                        CullFace::Back => glow::BACK,
                        CullFace::Front => glow::FRONT,
                    });
                }
                None => self.gl.disable(glow::CULL_FACE),
            }

            self.gl.front_face(match state.front_face {
                FrontFace::CounterClockwise => glow::CCW,
                FrontFace::Clockwise => glow::CW,
            });

            match state.depth_test {
                Some(function) => {
                    self.gl.enable(glow::DEPTH_TEST);
                    self.gl.depth_func(match function {
                        DepthFunction::Less => glow::LESS,
                        DepthFunction::LessEqual => glow::LEQUAL,
                    });
                }
                None => self.gl.disable(glow::DEPTH_TEST),
            }

            if state.multisample {
                self.gl.enable(glow::MULTISAMPLE);
            } else {
                self.gl.disable(glow::MULTISAMPLE);
            }

            if state.seamless_cube_maps {
                self.gl.enable(glow::TEXTURE_CUBE_MAP_SEAMLESS);
            } else {
                self.gl.disable(glow::TEXTURE_CUBE_MAP_SEAMLESS);
            }
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        unsafe { self.gl.viewport(0, 0, width, height) };
    }

    fn clear(&mut self, flags: ClearFlags) {
        let mut mask = 0;
        if flags.contains(ClearFlags::COLOR) {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::DEPTH) {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        unsafe { self.gl.clear(mask) };
    }

    fn draw_indexed(&mut self, index_count: u32) {
        let count = i32::try_from(index_count).unwrap_or(i32::MAX);
        unsafe { self.gl.draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_INT, 0) };
    }
}
