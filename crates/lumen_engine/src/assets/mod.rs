//! Asset-loading seam
//!
//! File formats are parsed outside the toolkit. A [`ModelLoader`] turns a path into
//! CPU-side [`MeshData`] streams and [`load_model`] uploads them as one [`Model`].

use std::path::Path;

use thiserror::Error;

use crate::render::{GraphicsDevice, Material, MeshData, Model, RenderError, Shader};

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents could not be parsed
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Format not handled by this loader
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Parsed meshes could not be turned into GPU resources
    #[error("Upload failed: {0}")]
    Upload(#[from] RenderError),
}

/// Parses a model file into mesh streams
pub trait ModelLoader {
    /// Load every mesh in the file at `path`
    fn load(&self, path: &Path) -> Result<Vec<MeshData>, AssetError>;
}

/// Load `path` through `loader` and upload it as a model named after the file stem.
///
/// Either every mesh is uploaded or none is.
pub fn load_model<'a, L, D>(
    loader: &L,
    device: &mut D,
    path: &Path,
    shader: &'a Shader,
    material: &'a Material,
) -> Result<Model<'a>, AssetError>
where
    L: ModelLoader + ?Sized,
    D: GraphicsDevice,
{
    let meshes = loader.load(path)?;
    if meshes.is_empty() {
        return Err(AssetError::InvalidData(format!("{} contains no meshes", path.display())));
    }

    let name = path
        .file_stem()
        .map_or_else(|| path.display().to_string(), |stem| stem.to_string_lossy().into_owned());
    log::info!("Loaded {} mesh(es) from {}", meshes.len(), path.display());

    Ok(Model::upload(device, name, &meshes, shader, material)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::recording::RecordingDevice;

    struct CubeLoader {
        copies: usize,
    }

    impl ModelLoader for CubeLoader {
        fn load(&self, path: &Path) -> Result<Vec<MeshData>, AssetError> {
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("cube") => Ok(vec![MeshData::cube(); self.copies]),
                _ => Err(AssetError::UnsupportedFormat(path.display().to_string())),
            }
        }
    }

    fn shader(device: &mut RecordingDevice) -> Shader {
        Shader::create(device, "test", "void main() {}", "void main() {}").unwrap()
    }

    #[test]
    fn test_load_model_uploads_every_mesh() {
        let mut device = RecordingDevice::new();
        let shader = shader(&mut device);
        let material = Material::default();

        let model = load_model(&CubeLoader { copies: 2 }, &mut device, Path::new("assets/box.cube"), &shader, &material)
            .unwrap();
        assert_eq!(model.name(), "box");
        assert_eq!(model.meshes().len(), 2);

        model.destroy(&mut device);
        assert_eq!(device.live_buffer_count(), 0);
    }

    #[test]
    fn test_loader_errors_propagate() {
        let mut device = RecordingDevice::new();
        let shader = shader(&mut device);
        let material = Material::default();

        let result = load_model(&CubeLoader { copies: 1 }, &mut device, Path::new("box.obj"), &shader, &material);
        assert!(matches!(result, Err(AssetError::UnsupportedFormat(_))));

        let result = load_model(&CubeLoader { copies: 0 }, &mut device, Path::new("box.cube"), &shader, &material);
        assert!(matches!(result, Err(AssetError::InvalidData(_))));
    }

    #[test]
    fn test_upload_failure_leaves_nothing_behind() {
        let mut device = RecordingDevice::new();
        let shader = shader(&mut device);
        let material = Material::default();
        device.fail_allocation_after(9);

        let result = load_model(&CubeLoader { copies: 2 }, &mut device, Path::new("box.cube"), &shader, &material);
        assert!(matches!(result, Err(AssetError::Upload(_))));
        assert_eq!(device.live_buffer_count(), 0);
        assert_eq!(device.live_vertex_array_count(), 0);
    }
}
