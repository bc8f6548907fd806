//! Image-based lighting environment

use crate::render::api::GraphicsDevice;
use crate::render::{RenderError, RenderResult};

use super::texture::{Texture, TextureKind};

/// Prefiltered environment maps and lookup tables for image-based lighting
///
/// A [`Scene`](crate::scene::Scene) references at most one environment. The renderer
/// binds all five textures before the first draw of a frame.
#[derive(Debug, PartialEq)]
pub struct Environment {
    mip_count: u32,
    lambertian: Texture,
    ggx: Texture,
    ggx_lut: Texture,
    charlie: Texture,
    charlie_lut: Texture,
}

/// The five textures that make up an [`Environment`]
#[derive(Debug)]
pub struct EnvironmentTextures {
    /// Diffuse irradiance cube map
    pub lambertian: Texture,
    /// Prefiltered specular cube map
    pub ggx: Texture,
    /// Specular BRDF lookup table
    pub ggx_lut: Texture,
    /// Prefiltered sheen cube map
    pub charlie: Texture,
    /// Sheen BRDF lookup table
    pub charlie_lut: Texture,
}

impl EnvironmentTextures {
    fn into_array(self) -> [Texture; 5] {
        [self.lambertian, self.ggx, self.ggx_lut, self.charlie, self.charlie_lut]
    }
}

impl Environment {
    /// Assemble an environment from its textures
    ///
    /// `mip_count` is the number of mip levels of the specular maps. When a texture has
    /// the wrong kind, all five are destroyed and [`RenderError::InvalidArgument`] is
    /// returned.
    pub fn new<D: GraphicsDevice>(device: &mut D, mip_count: u32, textures: EnvironmentTextures) -> RenderResult<Self> {
        const EXPECTED: [TextureKind; 5] = [
            TextureKind::Lambertian,
            TextureKind::Ggx,
            TextureKind::GgxLut,
            TextureKind::Charlie,
            TextureKind::CharlieLut,
        ];

        let textures = textures.into_array();
        let mismatch = textures
            .iter()
            .zip(EXPECTED)
            .find(|(texture, expected)| texture.kind() != *expected)
            .map(|(texture, expected)| format!("expected a {expected:?} texture, got {:?}", texture.kind()));

        if let Some(message) = mismatch {
            for texture in textures {
                texture.destroy(device);
            }
            return Err(RenderError::InvalidArgument(message));
        }

        let [lambertian, ggx, ggx_lut, charlie, charlie_lut] = textures;
        Ok(Self {
            mip_count,
            lambertian,
            ggx,
            ggx_lut,
            charlie,
            charlie_lut,
        })
    }

    /// Mip levels of the specular maps
    pub fn mip_count(&self) -> u32 {
        self.mip_count
    }

    /// All five textures, in unit order
    pub fn textures(&self) -> [&Texture; 5] {
        [&self.lambertian, &self.ggx, &self.ggx_lut, &self.charlie, &self.charlie_lut]
    }

    /// Bind every texture to its unit
    pub fn bind<D: GraphicsDevice>(&self, device: &mut D) {
        for texture in self.textures() {
            texture.bind(device);
        }
    }

    /// Release all textures
    pub fn destroy<D: GraphicsDevice>(self, device: &mut D) {
        for texture in [self.lambertian, self.ggx, self.ggx_lut, self.charlie, self.charlie_lut] {
            texture.destroy(device);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::render::backends::recording::RecordingDevice;

    pub(crate) fn environment_textures(device: &mut RecordingDevice) -> EnvironmentTextures {
        let face: &[u8] = &[0; 4];
        let cube = |device: &mut RecordingDevice, kind| Texture::create_cube(device, kind, 1, [face; 6]).unwrap();
        let lut = |device: &mut RecordingDevice, kind| Texture::create_2d(device, kind, 1, 1, face).unwrap();

        EnvironmentTextures {
            lambertian: cube(device, TextureKind::Lambertian),
            ggx: cube(device, TextureKind::Ggx),
            ggx_lut: lut(device, TextureKind::GgxLut),
            charlie: cube(device, TextureKind::Charlie),
            charlie_lut: lut(device, TextureKind::CharlieLut),
        }
    }

    #[test]
    fn test_environment_binds_all_units() {
        let mut device = RecordingDevice::new();
        let textures = environment_textures(&mut device);
        let environment = Environment::new(&mut device, 10, textures).unwrap();

        device.clear_calls();
        environment.bind(&mut device);
        assert_eq!(device.calls().len(), 5);
        assert_eq!(environment.mip_count(), 10);

        environment.destroy(&mut device);
        assert_eq!(device.live_texture_count(), 0);
    }

    #[test]
    fn test_wrong_kind_destroys_everything() {
        let mut device = RecordingDevice::new();
        let mut textures = environment_textures(&mut device);
        let swapped = std::mem::replace(
            &mut textures.ggx_lut,
            Texture::create_2d(&mut device, TextureKind::BaseColor, 1, 1, &[0; 4]).unwrap(),
        );
        swapped.destroy(&mut device);

        let result = Environment::new(&mut device, 1, textures);

        assert!(matches!(result, Err(RenderError::InvalidArgument(_))));
        assert_eq!(device.live_texture_count(), 0);
    }
}
