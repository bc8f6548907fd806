//! Models: ordered groups of meshes

use crate::render::api::GraphicsDevice;
use crate::render::resources::{Material, Shader};
use crate::render::RenderResult;

use super::mesh::{Mesh, MeshData};

/// One logical object made of meshes drawn in storage order
///
/// A model owns its meshes. Entities reference a model, so the model must outlive
/// every entity (and therefore every scene) that points at it.
#[derive(Debug)]
pub struct Model<'a> {
    name: String,
    meshes: Vec<Mesh<'a>>,
}

impl<'a> Model<'a> {
    /// Empty model
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meshes: Vec::new(),
        }
    }

    /// Upload `meshes` with a shared shader and material
    ///
    /// All-or-nothing: if any mesh fails, the ones already uploaded are destroyed and
    /// the error is returned.
    pub fn upload<D: GraphicsDevice>(
        device: &mut D,
        name: impl Into<String>,
        meshes: &[MeshData],
        shader: &'a Shader,
        material: &'a Material,
    ) -> RenderResult<Self> {
        let mut model = Self::new(name);
        model.meshes.reserve_exact(meshes.len());

        for data in meshes {
            match Mesh::create(device, data, shader, material) {
                Ok(mesh) => model.meshes.push(mesh),
                Err(e) => {
                    log::warn!("Model '{}' failed to upload: {e}", model.name);
                    model.destroy(device);
                    return Err(e);
                }
            }
        }

        log::debug!("Uploaded model '{}' with {} meshes", model.name, model.meshes.len());
        Ok(model)
    }

    /// Append an already created mesh
    pub fn push_mesh(&mut self, mesh: Mesh<'a>) {
        self.meshes.push(mesh);
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Meshes in draw order
    pub fn meshes(&self) -> &[Mesh<'a>] {
        &self.meshes
    }

    /// Destroy every mesh
    pub fn destroy<D: GraphicsDevice>(self, device: &mut D) {
        for mesh in self.meshes {
            mesh.destroy(device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::recording::RecordingDevice;
    use crate::render::RenderError;

    #[test]
    fn test_upload_keeps_order() {
        let mut device = RecordingDevice::new();
        let shader = Shader::create(&mut device, "model test", "", "").unwrap();
        let material = Material::new();

        let model = Model::upload(&mut device, "cubes", &[MeshData::cube(), MeshData::cube()], &shader, &material)
            .unwrap();

        assert_eq!(model.name(), "cubes");
        assert_eq!(model.meshes().len(), 2);
        assert!(model.meshes().iter().all(|mesh| mesh.index_count() == 36));

        model.destroy(&mut device);
        assert_eq!(device.live_buffer_count(), 0);
    }

    #[test]
    fn test_upload_failure_destroys_earlier_meshes() {
        let mut device = RecordingDevice::new();
        let shader = Shader::create(&mut device, "model test", "", "").unwrap();
        let material = Material::new();

        let result = Model::upload(&mut device, "broken", &[MeshData::cube(), MeshData::default()], &shader, &material);

        assert!(matches!(result, Err(RenderError::InvalidArgument(_))));
        assert_eq!(device.live_buffer_count(), 0);
        assert_eq!(device.live_vertex_array_count(), 0);
    }
}
