//! In-memory recording backend
//!
//! [`RecordingDevice`] implements [`GraphicsDevice`] without a GPU. Every call is
//! appended to an ordered log and GPU objects are tracked as live ids, so tests (and
//! headless tools) can assert on exactly what the renderer submitted: how many draws,
//! which uniforms, whether global state was re-applied, whether a failed creation
//! leaked anything.
//!
//! Two failure hooks exist:
//! - [`RecordingDevice::fail_allocation_after`] makes the n-th following allocation
//!   return [`DeviceError::OutOfMemory`]
//! - [`RecordingDevice::hide_uniform`] makes a uniform name resolve to "not found"

use std::collections::{HashMap, HashSet};

use crate::render::api::device::{
    BufferId, BufferTarget, ClearFlags, DeviceError, DeviceResult, GraphicsDevice, PipelineState, ProgramId,
    TextureId, TextureTarget, TextureUpload, UniformLocation, UniformValue, VertexArrayId,
};

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// `create_buffer`
    CreateBuffer {
        /// New buffer
        buffer: BufferId,
        /// Binding target
        target: BufferTarget,
        /// Uploaded byte count
        size: usize,
    },
    /// `delete_buffer`
    DeleteBuffer(BufferId),
    /// `create_vertex_array`
    CreateVertexArray(VertexArrayId),
    /// `delete_vertex_array`
    DeleteVertexArray(VertexArrayId),
    /// `attach_vertex_buffer`
    AttachVertexBuffer {
        /// Vertex array being configured
        vertex_array: VertexArrayId,
        /// Source buffer
        buffer: BufferId,
        /// Attribute location
        location: u32,
        /// Floats per vertex
        components: u32,
    },
    /// `attach_index_buffer`
    AttachIndexBuffer {
        /// Vertex array being configured
        vertex_array: VertexArrayId,
        /// Index buffer
        buffer: BufferId,
    },
    /// `bind_vertex_array`
    BindVertexArray(VertexArrayId),
    /// `create_texture`
    CreateTexture {
        /// New texture
        texture: TextureId,
        /// Binding target
        target: TextureTarget,
    },
    /// `delete_texture`
    DeleteTexture(TextureId),
    /// `bind_texture`
    BindTexture {
        /// Texture unit
        unit: u32,
        /// Binding target
        target: TextureTarget,
        /// Bound texture
        texture: TextureId,
    },
    /// `create_program`
    CreateProgram(ProgramId),
    /// `delete_program`
    DeleteProgram(ProgramId),
    /// `use_program`
    UseProgram(ProgramId),
    /// `uniform_location`
    LookupUniform {
        /// Program queried
        program: ProgramId,
        /// Uniform name
        name: String,
        /// Whether a location was returned
        found: bool,
    },
    /// `set_uniform`
    SetUniform {
        /// Target location
        location: UniformLocation,
        /// Written value
        value: UniformValue,
    },
    /// `apply_pipeline_state`
    ApplyPipelineState(PipelineState),
    /// `set_viewport`
    SetViewport {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// `clear`
    Clear(ClearFlags),
    /// `draw_indexed`
    DrawIndexed {
        /// Indices drawn
        index_count: u32,
    },
}

/// Graphics device that records calls instead of talking to a GPU
#[derive(Debug, Default)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    next_id: u32,
    allocations_before_failure: Option<usize>,
    live_buffers: HashSet<BufferId>,
    live_vertex_arrays: HashSet<VertexArrayId>,
    live_textures: HashSet<TextureId>,
    live_programs: HashSet<ProgramId>,
    hidden_uniforms: HashSet<String>,
    uniform_names: HashMap<UniformLocation, String>,
    uniform_locations: HashMap<(ProgramId, String), UniformLocation>,
}

impl RecordingDevice {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `successes` more allocations succeed, then fail the next one with `OutOfMemory`
    pub fn fail_allocation_after(&mut self, successes: usize) {
        self.allocations_before_failure = Some(successes);
    }

    /// Make every program report `name` as not found
    pub fn hide_uniform(&mut self, name: impl Into<String>) {
        self.hidden_uniforms.insert(name.into());
    }

    /// Every call so far, in order
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Drop the call log (live-object tracking is kept)
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of indexed draws issued
    pub fn draw_call_count(&self) -> usize {
        self.count(|call| matches!(call, DeviceCall::DrawIndexed { .. }))
    }

    /// Number of times global pipeline state was applied
    pub fn state_setup_count(&self) -> usize {
        self.count(|call| matches!(call, DeviceCall::ApplyPipelineState(_)))
    }

    /// Number of clears
    pub fn clear_count(&self) -> usize {
        self.count(|call| matches!(call, DeviceCall::Clear(_)))
    }

    /// Number of uniform-location lookups
    pub fn uniform_lookup_count(&self) -> usize {
        self.count(|call| matches!(call, DeviceCall::LookupUniform { .. }))
    }

    /// Number of `use_program` calls
    pub fn program_switch_count(&self) -> usize {
        self.count(|call| matches!(call, DeviceCall::UseProgram(_)))
    }

    /// Values written to the uniform called `name`, in order
    pub fn uniform_writes(&self, name: &str) -> Vec<UniformValue> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::SetUniform { location, value }
                    if self.uniform_names.get(location).map(String::as_str) == Some(name) =>
                {
                    Some(*value)
                }
                _ => None,
            })
            .collect()
    }

    /// Live buffers
    pub fn live_buffer_count(&self) -> usize {
        self.live_buffers.len()
    }

    /// Live vertex arrays
    pub fn live_vertex_array_count(&self) -> usize {
        self.live_vertex_arrays.len()
    }

    /// Live textures
    pub fn live_texture_count(&self) -> usize {
        self.live_textures.len()
    }

    /// Live programs
    pub fn live_program_count(&self) -> usize {
        self.live_programs.len()
    }

    /// Whether anything allocated is still alive
    pub fn has_live_objects(&self) -> bool {
        !(self.live_buffers.is_empty()
            && self.live_vertex_arrays.is_empty()
            && self.live_textures.is_empty()
            && self.live_programs.is_empty())
    }

    fn count(&self, predicate: impl Fn(&DeviceCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    fn allocate(&mut self) -> DeviceResult<u32> {
        if let Some(remaining) = self.allocations_before_failure.as_mut() {
            if *remaining == 0 {
                self.allocations_before_failure = None;
                return Err(DeviceError::OutOfMemory);
            }
            *remaining -= 1;
        }
        self.next_id += 1;
        Ok(self.next_id)
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> DeviceResult<BufferId> {
        let buffer = BufferId(self.allocate()?);
        self.live_buffers.insert(buffer);
        self.calls.push(DeviceCall::CreateBuffer {
            buffer,
            target,
            size: data.len(),
        });
        Ok(buffer)
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.live_buffers.remove(&buffer);
        self.calls.push(DeviceCall::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayId> {
        let vertex_array = VertexArrayId(self.allocate()?);
        self.live_vertex_arrays.insert(vertex_array);
        self.calls.push(DeviceCall::CreateVertexArray(vertex_array));
        Ok(vertex_array)
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        self.live_vertex_arrays.remove(&vertex_array);
        self.calls.push(DeviceCall::DeleteVertexArray(vertex_array));
    }

    fn attach_vertex_buffer(&mut self, vertex_array: VertexArrayId, buffer: BufferId, location: u32, components: u32) {
        self.calls.push(DeviceCall::AttachVertexBuffer {
            vertex_array,
            buffer,
            location,
            components,
        });
    }

    fn attach_index_buffer(&mut self, vertex_array: VertexArrayId, buffer: BufferId) {
        self.calls.push(DeviceCall::AttachIndexBuffer { vertex_array, buffer });
    }

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayId) {
        self.calls.push(DeviceCall::BindVertexArray(vertex_array));
    }

    fn create_texture(&mut self, upload: &TextureUpload<'_>) -> DeviceResult<TextureId> {
        let texture = TextureId(self.allocate()?);
        self.live_textures.insert(texture);
        self.calls.push(DeviceCall::CreateTexture {
            texture,
            target: upload.target,
        });
        Ok(texture)
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.live_textures.remove(&texture);
        self.calls.push(DeviceCall::DeleteTexture(texture));
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: TextureId) {
        self.calls.push(DeviceCall::BindTexture { unit, target, texture });
    }

    fn create_program(&mut self, _vertex_source: &str, _fragment_source: &str) -> DeviceResult<ProgramId> {
        let program = ProgramId(self.allocate()?);
        self.live_programs.insert(program);
        self.calls.push(DeviceCall::CreateProgram(program));
        Ok(program)
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.live_programs.remove(&program);
        self.calls.push(DeviceCall::DeleteProgram(program));
    }

    fn use_program(&mut self, program: ProgramId) {
        self.calls.push(DeviceCall::UseProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let location = if self.hidden_uniforms.contains(name) {
            None
        } else {
            let next = UniformLocation(u32::try_from(self.uniform_names.len()).unwrap_or(u32::MAX));
            let location = *self
                .uniform_locations
                .entry((program, name.to_string()))
                .or_insert(next);
            self.uniform_names.insert(location, name.to_string());
            Some(location)
        };

        self.calls.push(DeviceCall::LookupUniform {
            program,
            name: name.to_string(),
            found: location.is_some(),
        });
        location
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.calls.push(DeviceCall::SetUniform { location, value });
    }

    fn apply_pipeline_state(&mut self, state: &PipelineState) {
        self.calls.push(DeviceCall::ApplyPipelineState(*state));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(DeviceCall::SetViewport { width, height });
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.calls.push(DeviceCall::Clear(flags));
    }

    fn draw_indexed(&mut self, index_count: u32) {
        self.calls.push(DeviceCall::DrawIndexed { index_count });
    }
}
