//! Mesh geometry on the CPU and on the GPU
//!
//! [`MeshData`] holds the vertex streams as separate arrays (positions, normals, UVs
//! and optional tangent frames) plus a `u32` index list. [`Mesh`] is the uploaded
//! form: one static buffer per stream, an index buffer and a vertex array wiring them
//! to the fixed attribute locations in [`attribute`].
//!
//! # Creation is all-or-nothing
//! [`Mesh::create`] validates the streams before touching the device, so inconsistent
//! data fails with [`RenderError::InvalidArgument`] and no GPU call. If an allocation
//! fails halfway, everything allocated so far is released before the error is
//! returned; a failed create never leaves live GPU objects behind.

use crate::foundation::math::Vec3;
use crate::render::api::{BufferId, BufferTarget, DeviceResult, GraphicsDevice, VertexArrayId};
use crate::render::resources::{Material, Shader};
use crate::render::{RenderError, RenderResult};

/// Vertex attribute locations shared with the shaders
pub mod attribute {
    /// `vec3` object-space position
    pub const POSITION: u32 = 0;
    /// `vec3` object-space normal
    pub const NORMAL: u32 = 1;
    /// `vec2` texture coordinate
    pub const UV: u32 = 2;
    /// `vec3` tangent
    pub const TANGENT: u32 = 3;
    /// `vec3` bitangent
    pub const BITANGENT: u32 = 4;
}

/// CPU-side vertex streams of one mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, one per position
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates, one per position
    pub uvs: Vec<[f32; 2]>,
    /// Optional tangents, one per position
    pub tangents: Option<Vec<[f32; 3]>>,
    /// Optional bitangents, one per position
    pub bitangents: Option<Vec<[f32; 3]>>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Check that every stream matches the position count and every index is in range
    pub fn validate(&self) -> RenderResult<()> {
        let vertex_count = self.positions.len();
        if vertex_count == 0 {
            return Err(RenderError::InvalidArgument("Mesh has no vertices".to_string()));
        }

        let streams = [
            ("normal", Some(self.normals.len())),
            ("uv", Some(self.uvs.len())),
            ("tangent", self.tangents.as_ref().map(Vec::len)),
            ("bitangent", self.bitangents.as_ref().map(Vec::len)),
        ];
        for (name, len) in streams {
            if let Some(len) = len.filter(|len| *len != vertex_count) {
                return Err(RenderError::InvalidArgument(format!(
                    "Mesh has {vertex_count} positions but {len} {name}s"
                )));
            }
        }

        if self.indices.is_empty() || self.indices.len() % 3 != 0 {
            return Err(RenderError::InvalidArgument(format!(
                "Index count {} is not a non-empty triangle list",
                self.indices.len()
            )));
        }

        if let Some(index) = self.indices.iter().find(|index| **index as usize >= vertex_count) {
            return Err(RenderError::InvalidArgument(format!(
                "Index {index} out of range for {vertex_count} vertices"
            )));
        }

        Ok(())
    }

    /// Axis-aligned cube from -1 to 1 with per-face normals and tangent frames
    ///
    /// 24 vertices (four per face, so normals stay flat) and 36 indices, wound
    /// counter-clockwise when seen from outside.
    pub fn cube() -> Self {
        // (normal, tangent, bitangent) with tangent x bitangent = normal
        let faces = [
            (Vec3::x(), -Vec3::z(), Vec3::y()),
            (-Vec3::x(), Vec3::z(), Vec3::y()),
            (Vec3::y(), Vec3::x(), -Vec3::z()),
            (-Vec3::y(), Vec3::x(), Vec3::z()),
            (Vec3::z(), Vec3::x(), Vec3::y()),
            (-Vec3::z(), -Vec3::x(), Vec3::y()),
        ];
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut data = Self {
            tangents: Some(Vec::with_capacity(24)),
            bitangents: Some(Vec::with_capacity(24)),
            ..Self::default()
        };

        for (normal, tangent, bitangent) in faces {
            let base = u32::try_from(data.positions.len()).unwrap_or(0);

            for (s, t) in corners {
                let position = normal + tangent * s + bitangent * t;
                data.positions.push(position.into());
                data.normals.push(normal.into());
                data.uvs.push([(s + 1.0) * 0.5, (t + 1.0) * 0.5]);
                data.tangents.get_or_insert_with(Vec::new).push(tangent.into());
                data.bitangents.get_or_insert_with(Vec::new).push(bitangent.into());
            }

            data.indices.extend([0, 1, 2, 2, 3, 0].map(|offset| base + offset));
        }

        data
    }
}

/// GPU-resident mesh bound to a shader and a material
///
/// The shader and material are borrowed: several meshes can share them, and both
/// must outlive the mesh.
#[derive(Debug)]
pub struct Mesh<'a> {
    vertex_array: VertexArrayId,
    vertex_buffers: Vec<BufferId>,
    index_buffer: BufferId,
    index_count: u32,
    shader: &'a Shader,
    material: &'a Material,
}

impl<'a> Mesh<'a> {
    /// Validate `data` and upload it as static buffers
    pub fn create<D: GraphicsDevice>(
        device: &mut D,
        data: &MeshData,
        shader: &'a Shader,
        material: &'a Material,
    ) -> RenderResult<Self> {
        data.validate()?;
        let index_count = u32::try_from(data.indices.len())
            .map_err(|_| RenderError::InvalidArgument("Too many indices for one draw".to_string()))?;

        let vertex_array = device.create_vertex_array()?;
        let mut vertex_buffers = Vec::with_capacity(5);

        match Self::upload_streams(device, vertex_array, data, &mut vertex_buffers) {
            Ok(index_buffer) => {
                log::debug!(
                    "Created mesh {:?}: {} vertices, {} indices",
                    vertex_array,
                    data.vertex_count(),
                    index_count
                );
                Ok(Self {
                    vertex_array,
                    vertex_buffers,
                    index_buffer,
                    index_count,
                    shader,
                    material,
                })
            }
            Err(e) => {
                log::warn!("Mesh upload failed, releasing partial resources: {e}");
                for buffer in vertex_buffers {
                    device.delete_buffer(buffer);
                }
                device.delete_vertex_array(vertex_array);
                Err(e.into())
            }
        }
    }

    /// Upload every stream, pushing each created vertex buffer into `created` as soon
    /// as it exists so the caller can release them on failure
    fn upload_streams<D: GraphicsDevice>(
        device: &mut D,
        vertex_array: VertexArrayId,
        data: &MeshData,
        created: &mut Vec<BufferId>,
    ) -> DeviceResult<BufferId> {
        let streams: [(u32, u32, Option<&[u8]>); 5] = [
            (attribute::POSITION, 3, Some(bytemuck::cast_slice(&data.positions))),
            (attribute::NORMAL, 3, Some(bytemuck::cast_slice(&data.normals))),
            (attribute::UV, 2, Some(bytemuck::cast_slice(&data.uvs))),
            (attribute::TANGENT, 3, data.tangents.as_deref().map(bytemuck::cast_slice)),
            (attribute::BITANGENT, 3, data.bitangents.as_deref().map(bytemuck::cast_slice)),
        ];

        for (location, components, bytes) in streams {
            let Some(bytes) = bytes else { continue };
            let buffer = device.create_buffer(BufferTarget::Vertex, bytes)?;
            created.push(buffer);
            device.attach_vertex_buffer(vertex_array, buffer, location, components);
        }

        let index_buffer = device.create_buffer(BufferTarget::Index, bytemuck::cast_slice(&data.indices))?;
        device.attach_index_buffer(vertex_array, index_buffer);
        Ok(index_buffer)
    }

    /// Select this mesh's vertex array as the draw source
    pub fn bind<D: GraphicsDevice>(&self, device: &mut D) {
        device.bind_vertex_array(self.vertex_array);
    }

    /// Number of indices drawn
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Shader this mesh is drawn with
    pub fn shader(&self) -> &'a Shader {
        self.shader
    }

    /// Material this mesh is shaded with
    pub fn material(&self) -> &'a Material {
        self.material
    }

    /// Release the buffers and the vertex array
    pub fn destroy<D: GraphicsDevice>(self, device: &mut D) {
        log::debug!("Destroying mesh {:?}", self.vertex_array);
        device.delete_vertex_array(self.vertex_array);
        for buffer in self.vertex_buffers {
            device.delete_buffer(buffer);
        }
        device.delete_buffer(self.index_buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::DeviceError;
    use crate::render::backends::recording::RecordingDevice;

    fn triangle() -> MeshData {
        MeshData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            tangents: None,
            bitangents: None,
            indices: vec![0, 1, 2],
        }
    }

    fn shader_and_material(device: &mut RecordingDevice) -> (Shader, Material) {
        (Shader::create(device, "mesh test", "", "").unwrap(), Material::new())
    }

    #[test]
    fn test_cube_structure() {
        let cube = MeshData::cube();

        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.validate().is_ok());
    }

    #[test]
    fn test_cube_winding_faces_outward() {
        let cube = MeshData::cube();

        for triangle in cube.indices.chunks(3) {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| Vec3::from(cube.positions[i as usize]));
            let face_normal = (b - a).cross(&(c - a));
            let stored_normal = Vec3::from(cube.normals[triangle[0] as usize]);

            assert!(face_normal.dot(&stored_normal) > 0.0);
        }
    }

    #[test]
    fn test_mismatched_streams_fail_without_gpu_calls() {
        let mut device = RecordingDevice::new();
        let (shader, material) = shader_and_material(&mut device);
        device.clear_calls();

        let mut data = triangle();
        data.uvs.pop();

        let result = Mesh::create(&mut device, &data, &shader, &material);
        assert!(matches!(result, Err(RenderError::InvalidArgument(_))));
        assert!(device.calls().is_empty());
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut data = triangle();
        data.indices = vec![0, 1, 3];
        assert!(matches!(data.validate(), Err(RenderError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        assert!(MeshData::default().validate().is_err());
    }

    #[test]
    fn test_create_and_destroy_release_everything() {
        let mut device = RecordingDevice::new();
        let (shader, material) = shader_and_material(&mut device);

        let mesh = Mesh::create(&mut device, &MeshData::cube(), &shader, &material).unwrap();
        assert_eq!(mesh.index_count(), 36);
        assert_eq!(device.live_buffer_count(), 6);
        assert_eq!(device.live_vertex_array_count(), 1);

        mesh.destroy(&mut device);
        assert_eq!(device.live_buffer_count(), 0);
        assert_eq!(device.live_vertex_array_count(), 0);
    }

    #[test]
    fn test_failed_allocation_leaves_nothing_live() {
        // Vertex array + 5 vertex buffers + index buffer = 7 allocations for a cube.
        for successes in 0..7 {
            let mut device = RecordingDevice::new();
            let (shader, material) = shader_and_material(&mut device);
            device.fail_allocation_after(successes);

            let result = Mesh::create(&mut device, &MeshData::cube(), &shader, &material);

            assert!(matches!(
                result,
                Err(RenderError::ResourceAllocation(DeviceError::OutOfMemory))
            ));
            assert_eq!(device.live_buffer_count(), 0, "leaked buffers after {successes} allocations");
            assert_eq!(device.live_vertex_array_count(), 0);
        }
    }
}
