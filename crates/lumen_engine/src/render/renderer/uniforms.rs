//! Uniform names and per-program location tables
//!
//! Looking a uniform up by name is a driver round-trip, so each program's locations
//! are resolved once into a [`UniformLocations`] table and reused every frame. A
//! name the program does not use resolves to `None`; writes to it are skipped.

use crate::render::api::{GraphicsDevice, ProgramId, UniformLocation, UniformValue};
use crate::render::resources::TextureKind;
use crate::render::systems::lighting::{LightSlotNames, MAX_LIGHTS};

/// Combined projection * view matrix
pub const VIEW_PROJECTION: &str = "u_ViewProjectionMatrix";
/// Per-entity model matrix
pub const MODEL_MATRIX: &str = "u_ModelMatrix";
/// Per-entity normal matrix
pub const NORMAL_MATRIX: &str = "u_NormalMatrix";
/// Tone-mapping exposure
pub const EXPOSURE: &str = "u_Exposure";
/// World-space camera position
pub const CAMERA: &str = "u_Camera";
/// Number of populated light slots
pub const LIGHT_COUNT: &str = "u_LightCount";

/// Material base color factor
pub const BASE_COLOR_FACTOR: &str = "u_BaseColorFactor";
/// Material metallic factor
pub const METALLIC_FACTOR: &str = "u_MetallicFactor";
/// Material roughness factor
pub const ROUGHNESS_FACTOR: &str = "u_RoughnessFactor";
/// Material normal scale
pub const NORMAL_SCALE: &str = "u_NormalScale";
/// Material occlusion strength
pub const OCCLUSION_STRENGTH: &str = "u_OcclusionStrength";
/// Material emissive factor
pub const EMISSIVE_FACTOR: &str = "u_EmissiveFactor";

/// Mip levels of the environment's specular maps
pub const MIP_COUNT: &str = "u_MipCount";
/// Whether an environment is bound
pub const HAS_ENVIRONMENT: &str = "u_HasEnvironment";

const UNIT_COUNT: usize = TextureKind::ALL.len();

/// Sampler uniform of a texture kind
pub fn sampler_name(kind: TextureKind) -> &'static str {
    match kind {
        TextureKind::BaseColor => "u_BaseColorSampler",
        TextureKind::MetallicRoughness => "u_MetallicRoughnessSampler",
        TextureKind::Normal => "u_NormalSampler",
        TextureKind::Occlusion => "u_OcclusionSampler",
        TextureKind::Emissive => "u_EmissiveSampler",
        TextureKind::Lambertian => "u_LambertianEnvSampler",
        TextureKind::Ggx => "u_GGXEnvSampler",
        TextureKind::GgxLut => "u_GGXLUT",
        TextureKind::Charlie => "u_CharlieEnvSampler",
        TextureKind::CharlieLut => "u_CharlieLUT",
    }
}

/// "Texture present" flag uniform of a material texture kind
pub fn texture_flag_name(kind: TextureKind) -> Option<&'static str> {
    match kind {
        TextureKind::BaseColor => Some("u_HasBaseColorMap"),
        TextureKind::MetallicRoughness => Some("u_HasMetallicRoughnessMap"),
        TextureKind::Normal => Some("u_HasNormalMap"),
        TextureKind::Occlusion => Some("u_HasOcclusionMap"),
        TextureKind::Emissive => Some("u_HasEmissiveMap"),
        _ => None,
    }
}

/// Locations of one `u_Lights[i]` slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LightSlotLocations {
    pub light_type: Option<UniformLocation>,
    pub position: Option<UniformLocation>,
    pub direction: Option<UniformLocation>,
    pub color: Option<UniformLocation>,
    pub intensity: Option<UniformLocation>,
    pub range: Option<UniformLocation>,
    pub inner_cone_cos: Option<UniformLocation>,
    pub outer_cone_cos: Option<UniformLocation>,
}

/// Every location the renderer writes, for one program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct UniformLocations {
    pub view_projection: Option<UniformLocation>,
    pub model_matrix: Option<UniformLocation>,
    pub normal_matrix: Option<UniformLocation>,
    pub exposure: Option<UniformLocation>,
    pub camera: Option<UniformLocation>,
    pub light_count: Option<UniformLocation>,
    pub base_color_factor: Option<UniformLocation>,
    pub metallic_factor: Option<UniformLocation>,
    pub roughness_factor: Option<UniformLocation>,
    pub normal_scale: Option<UniformLocation>,
    pub occlusion_strength: Option<UniformLocation>,
    pub emissive_factor: Option<UniformLocation>,
    pub mip_count: Option<UniformLocation>,
    pub has_environment: Option<UniformLocation>,
    /// Indexed by texture unit
    pub samplers: [Option<UniformLocation>; UNIT_COUNT],
    /// Indexed by texture unit, material kinds only
    pub texture_flags: [Option<UniformLocation>; UNIT_COUNT],
    pub lights: [LightSlotLocations; MAX_LIGHTS],
}

impl UniformLocations {
    /// Look every name up in `program`
    pub(crate) fn resolve<D: GraphicsDevice>(device: &mut D, program: ProgramId) -> Self {
        let mut lookup = |name: &str| device.uniform_location(program, name);

        let mut locations = Self {
            view_projection: lookup(VIEW_PROJECTION),
            model_matrix: lookup(MODEL_MATRIX),
            normal_matrix: lookup(NORMAL_MATRIX),
            exposure: lookup(EXPOSURE),
            camera: lookup(CAMERA),
            light_count: lookup(LIGHT_COUNT),
            base_color_factor: lookup(BASE_COLOR_FACTOR),
            metallic_factor: lookup(METALLIC_FACTOR),
            roughness_factor: lookup(ROUGHNESS_FACTOR),
            normal_scale: lookup(NORMAL_SCALE),
            occlusion_strength: lookup(OCCLUSION_STRENGTH),
            emissive_factor: lookup(EMISSIVE_FACTOR),
            mip_count: lookup(MIP_COUNT),
            has_environment: lookup(HAS_ENVIRONMENT),
            ..Self::default()
        };

        for kind in TextureKind::ALL {
            let unit = kind.unit() as usize;
            locations.samplers[unit] = lookup(sampler_name(kind));
            locations.texture_flags[unit] = texture_flag_name(kind).and_then(&mut lookup);
        }

        for (index, slot) in locations.lights.iter_mut().enumerate() {
            let names = LightSlotNames::for_slot(index);
            *slot = LightSlotLocations {
                light_type: lookup(names.light_type.as_str()),
                position: lookup(names.position.as_str()),
                direction: lookup(names.direction.as_str()),
                color: lookup(names.color.as_str()),
                intensity: lookup(names.intensity.as_str()),
                range: lookup(names.range.as_str()),
                inner_cone_cos: lookup(names.inner_cone_cos.as_str()),
                outer_cone_cos: lookup(names.outer_cone_cos.as_str()),
            };
        }

        log::debug!("Resolved uniform locations for {program:?}");
        locations
    }
}

/// Write `value` if the uniform exists
pub(crate) fn write<D: GraphicsDevice>(device: &mut D, location: Option<UniformLocation>, value: UniformValue) {
    if let Some(location) = location {
        device.set_uniform(location, value);
    }
}
