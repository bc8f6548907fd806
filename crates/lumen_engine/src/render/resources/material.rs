//! Surface shading parameters
//!
//! Factors follow the glTF metallic-roughness model. Each texture slot is keyed by
//! [`TextureKind`], so a texture always lands in the slot (and unit) its kind names.

use crate::foundation::math::Vec3;
use crate::render::api::GraphicsDevice;

use super::texture::{Texture, TextureKind};

/// Shading parameters shared by any number of meshes
#[derive(Debug, PartialEq)]
pub struct Material {
    /// Optional name for debugging
    pub name: Option<String>,
    /// Linear RGB multiplier of the base color
    pub base_color_factor: Vec3,
    /// Metalness multiplier
    pub metallic_factor: f32,
    /// Roughness multiplier
    pub roughness_factor: f32,
    /// Scale applied to the sampled normal's XY
    pub normal_scale: f32,
    /// Blend between no occlusion (0) and full occlusion (1)
    pub occlusion_strength: f32,
    /// Linear RGB multiplier of the emissive texture
    pub emissive_factor: Vec3,
    textures: [Option<Texture>; 5],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: Vec3::new(1.0, 1.0, 1.0),
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            normal_scale: 1.0,
            occlusion_strength: 1.0,
            emissive_factor: Vec3::zeros(),
            textures: Default::default(),
        }
    }
}

impl Material {
    /// Untextured white material with glTF default factors
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the material name for debugging
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the base color factor
    pub fn with_base_color(mut self, color: Vec3) -> Self {
        self.base_color_factor = color;
        self
    }

    /// Set metallic and roughness factors
    pub fn with_metallic_roughness(mut self, metallic: f32, roughness: f32) -> Self {
        self.metallic_factor = metallic;
        self.roughness_factor = roughness;
        self
    }

    /// Set the emissive factor
    pub fn with_emissive(mut self, emissive: Vec3) -> Self {
        self.emissive_factor = emissive;
        self
    }

    /// Store `texture` in the slot of its kind
    ///
    /// Returns whichever texture the material no longer holds: the one previously in
    /// that slot, or `texture` itself when its kind is an environment kind. The caller
    /// owns the returned texture and is responsible for destroying it.
    pub fn set_texture(&mut self, texture: Texture) -> Option<Texture> {
        let kind = texture.kind();
        if !kind.is_material_kind() {
            log::warn!("{kind:?} texture cannot be used by a material");
            return Some(texture);
        }

        self.textures[kind.unit() as usize].replace(texture)
    }

    /// Texture in the slot of `kind`, if any
    pub fn texture(&self, kind: TextureKind) -> Option<&Texture> {
        self.textures.get(kind.unit() as usize).and_then(Option::as_ref)
    }

    /// All textures the material holds, in unit order
    pub fn textures(&self) -> impl Iterator<Item = &Texture> {
        self.textures.iter().flatten()
    }

    /// Release every texture
    pub fn destroy<D: GraphicsDevice>(self, device: &mut D) {
        for texture in self.textures.into_iter().flatten() {
            texture.destroy(device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::recording::RecordingDevice;

    fn texture(device: &mut RecordingDevice, kind: TextureKind) -> Texture {
        Texture::create_2d(device, kind, 1, 1, &[255; 4]).unwrap()
    }

    #[test]
    fn test_defaults_match_gltf() {
        let material = Material::new();
        assert_eq!(material.base_color_factor, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(material.metallic_factor, 1.0);
        assert_eq!(material.emissive_factor, Vec3::zeros());
        assert_eq!(material.textures().count(), 0);
    }

    #[test]
    fn test_texture_lands_in_its_kind_slot() {
        let mut device = RecordingDevice::new();
        let mut material = Material::new().with_name("brick");

        assert!(material.set_texture(texture(&mut device, TextureKind::Normal)).is_none());
        assert!(material.texture(TextureKind::Normal).is_some());
        assert!(material.texture(TextureKind::BaseColor).is_none());

        let replaced = material.set_texture(texture(&mut device, TextureKind::Normal));
        assert!(replaced.is_some());
        if let Some(old) = replaced {
            old.destroy(&mut device);
        }

        material.destroy(&mut device);
        assert_eq!(device.live_texture_count(), 0);
    }

    #[test]
    fn test_environment_texture_is_handed_back() {
        let mut device = RecordingDevice::new();
        let mut material = Material::new();

        let lut = texture(&mut device, TextureKind::GgxLut);
        let returned = material.set_texture(lut);

        assert_eq!(returned.map(|texture| texture.kind()), Some(TextureKind::GgxLut));
        assert_eq!(material.textures().count(), 0);
    }
}
