//! GPU textures and their shading role
//!
//! A [`Texture`] is an owned GPU image tagged with a [`TextureKind`]. The kind fixes the
//! texture unit and the binding target, so a material or environment never has to
//! carry binding information of its own.

use crate::render::api::{GraphicsDevice, TextureId, TextureTarget, TextureUpload};
use crate::render::{RenderError, RenderResult};

/// Shading role of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// Albedo (sRGB color)
    BaseColor,
    /// Metalness in B, roughness in G
    MetallicRoughness,
    /// Tangent-space normal map
    Normal,
    /// Ambient occlusion in R
    Occlusion,
    /// Emitted color
    Emissive,
    /// Diffuse irradiance cube map
    Lambertian,
    /// Prefiltered specular (GGX) cube map
    Ggx,
    /// GGX BRDF lookup table
    GgxLut,
    /// Prefiltered sheen (Charlie) cube map
    Charlie,
    /// Charlie BRDF lookup table
    CharlieLut,
}

impl TextureKind {
    /// All kinds, in texture-unit order
    pub const ALL: [Self; 10] = [
        Self::BaseColor,
        Self::MetallicRoughness,
        Self::Normal,
        Self::Occlusion,
        Self::Emissive,
        Self::Lambertian,
        Self::Ggx,
        Self::GgxLut,
        Self::Charlie,
        Self::CharlieLut,
    ];

    /// Texture unit this kind is always bound to
    pub fn unit(self) -> u32 {
        match self {
            Self::BaseColor => 0,
            Self::MetallicRoughness => 1,
            Self::Normal => 2,
            Self::Occlusion => 3,
            Self::Emissive => 4,
            Self::Lambertian => 5,
            Self::Ggx => 6,
            Self::GgxLut => 7,
            Self::Charlie => 8,
            Self::CharlieLut => 9,
        }
    }

    /// Binding target: environment maps are cube maps, everything else is 2D
    pub fn target(self) -> TextureTarget {
        match self {
            Self::Lambertian | Self::Ggx | Self::Charlie => TextureTarget::CubeMap,
            _ => TextureTarget::Texture2D,
        }
    }

    /// Whether this kind belongs to a material (as opposed to an environment)
    pub fn is_material_kind(self) -> bool {
        self.unit() < Self::Lambertian.unit()
    }

    /// Environment maps get a mip chain for roughness lookups, lookup tables do not
    fn wants_mipmaps(self) -> bool {
        !matches!(self, Self::GgxLut | Self::CharlieLut)
    }
}

/// GPU texture owned by a material or an environment
#[derive(Debug, PartialEq, Eq)]
pub struct Texture {
    id: TextureId,
    kind: TextureKind,
    width: u32,
    height: u32,
}

impl Texture {
    /// Upload a 2D RGBA8 image
    ///
    /// Fails with [`RenderError::InvalidArgument`] when `kind` is a cube-map kind or
    /// `pixels` is not exactly `width * height * 4` bytes.
    pub fn create_2d<D: GraphicsDevice>(
        device: &mut D,
        kind: TextureKind,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> RenderResult<Self> {
        if kind.target() != TextureTarget::Texture2D {
            return Err(RenderError::InvalidArgument(format!("{kind:?} textures are cube maps")));
        }
        Self::check_face(width, height, pixels)?;

        Self::upload(device, kind, width, height, &[pixels])
    }

    /// Upload a cube map from six square RGBA8 faces (+X, -X, +Y, -Y, +Z, -Z)
    pub fn create_cube<D: GraphicsDevice>(
        device: &mut D,
        kind: TextureKind,
        size: u32,
        faces: [&[u8]; 6],
    ) -> RenderResult<Self> {
        if kind.target() != TextureTarget::CubeMap {
            return Err(RenderError::InvalidArgument(format!("{kind:?} textures are not cube maps")));
        }
        for face in faces {
            Self::check_face(size, size, face)?;
        }

        Self::upload(device, kind, size, size, &faces)
    }

    /// Upload a decoded image
    pub fn from_image<D: GraphicsDevice>(device: &mut D, kind: TextureKind, image: &image::RgbaImage) -> RenderResult<Self> {
        let (width, height) = image.dimensions();
        Self::create_2d(device, kind, width, height, image.as_raw())
    }

    fn check_face(width: u32, height: u32, pixels: &[u8]) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidArgument("Texture dimensions must be non-zero".to_string()));
        }

        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderError::InvalidArgument(format!(
                "Expected {expected} bytes for a {width}x{height} RGBA8 image, got {}",
                pixels.len()
            )));
        }
        Ok(())
    }

    fn upload<D: GraphicsDevice>(
        device: &mut D,
        kind: TextureKind,
        width: u32,
        height: u32,
        faces: &[&[u8]],
    ) -> RenderResult<Self> {
        let id = device.create_texture(&TextureUpload {
            target: kind.target(),
            width,
            height,
            faces,
            generate_mipmaps: kind.wants_mipmaps(),
        })?;

        log::debug!("Created {kind:?} texture {}x{} ({:?})", width, height, id);
        Ok(Self { id, kind, width, height })
    }

    /// GPU handle
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Shading role
    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    /// Width and height of one face in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bind to the unit of this texture's kind
    pub fn bind<D: GraphicsDevice>(&self, device: &mut D) {
        device.bind_texture(self.kind.unit(), self.kind.target(), self.id);
    }

    /// Release the GPU image
    pub fn destroy<D: GraphicsDevice>(self, device: &mut D) {
        log::debug!("Destroying {:?} texture {:?}", self.kind, self.id);
        device.delete_texture(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::recording::{DeviceCall, RecordingDevice};

    #[test]
    fn test_units_are_unique_and_ordered() {
        let units: Vec<u32> = TextureKind::ALL.iter().map(|kind| kind.unit()).collect();
        assert_eq!(units, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_environment_maps_are_cube_maps() {
        assert_eq!(TextureKind::Ggx.target(), TextureTarget::CubeMap);
        assert_eq!(TextureKind::GgxLut.target(), TextureTarget::Texture2D);
        assert!(TextureKind::Emissive.is_material_kind());
        assert!(!TextureKind::Lambertian.is_material_kind());
    }

    #[test]
    fn test_create_2d_rejects_short_pixel_data() {
        let mut device = RecordingDevice::new();
        let result = Texture::create_2d(&mut device, TextureKind::BaseColor, 2, 2, &[0; 15]);

        assert!(matches!(result, Err(RenderError::InvalidArgument(_))));
        assert!(device.calls().is_empty());
    }

    #[test]
    fn test_create_2d_rejects_cube_kind() {
        let mut device = RecordingDevice::new();
        let result = Texture::create_2d(&mut device, TextureKind::Lambertian, 1, 1, &[0; 4]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_image_binds_to_kind_unit() {
        let mut device = RecordingDevice::new();
        let image = image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]));

        let texture = Texture::from_image(&mut device, TextureKind::Normal, &image).unwrap();
        assert_eq!(texture.size(), (4, 2));

        texture.bind(&mut device);
        assert!(device.calls().contains(&DeviceCall::BindTexture {
            unit: 2,
            target: TextureTarget::Texture2D,
            texture: texture.id(),
        }));

        texture.destroy(&mut device);
        assert_eq!(device.live_texture_count(), 0);
    }

    #[test]
    fn test_create_cube_uploads_six_faces() {
        let mut device = RecordingDevice::new();
        let face: &[u8] = &[128; 4 * 4 * 4];

        let texture = Texture::create_cube(&mut device, TextureKind::Ggx, 4, [face; 6]).unwrap();

        assert_eq!(texture.kind().target(), TextureTarget::CubeMap);
        assert_eq!(device.live_texture_count(), 1);
    }
}
