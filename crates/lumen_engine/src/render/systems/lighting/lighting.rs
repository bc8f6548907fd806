//! Light descriptors
//!
//! A [`Light`] is a plain value: it owns no GPU resources and is referenced by a
//! [`Scene`](crate::scene::Scene) for as long as it is registered there. The renderer
//! uploads the first [`MAX_LIGHTS`] lights of a scene per draw; the rest are ignored.
//!
//! Spot cones are stored as cosines of the half-angles, which is what the shader
//! compares against, so the renderer never has to take a cosine per frame.

use crate::foundation::math::Vec3;

/// Number of lights the shading program has slots for
pub const MAX_LIGHTS: usize = 4;

/// Light types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    /// Directional light (like sunlight)
    Directional,
    /// Point light (like a lightbulb)
    Point,
    /// Spot light (like a flashlight)
    Spot,
}

impl LightType {
    /// Integer tag written to the `type` field of a shader light slot
    pub fn shader_code(self) -> i32 {
        match self {
            Self::Directional => 0,
            Self::Point => 1,
            Self::Spot => 2,
        }
    }
}

/// Light source
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Light type
    pub light_type: LightType,
    /// Light position (point/spot)
    pub position: Vec3,
    /// Light direction (directional/spot)
    pub direction: Vec3,
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Attenuation range (point/spot)
    pub range: f32,
    /// Cosine of the inner cone half-angle (spot)
    pub inner_cone_cos: f32,
    /// Cosine of the outer cone half-angle (spot)
    pub outer_cone_cos: f32,
}

impl Light {
    /// A white, unit-intensity light of the given type at the origin, pointing down -Z
    pub fn new(light_type: LightType) -> Self {
        Self {
            light_type,
            position: Vec3::zeros(),
            direction: Vec3::new(0.0, 0.0, -1.0),
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            range: 1.0,
            inner_cone_cos: 0.0,
            outer_cone_cos: 0.0,
        }
    }

    /// Create a directional light
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.normalize(),
            color,
            intensity,
            ..Self::new(LightType::Directional)
        }
    }

    /// Create a point light
    pub fn point(position: Vec3, color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            range,
            ..Self::new(LightType::Point)
        }
    }

    /// Create a spot light from cone half-angles in radians
    pub fn spot(position: Vec3, direction: Vec3, color: Vec3, intensity: f32, inner_angle: f32, outer_angle: f32) -> Self {
        Self {
            position,
            direction: direction.normalize(),
            color,
            intensity,
            inner_cone_cos: inner_angle.cos(),
            outer_cone_cos: outer_angle.cos(),
            ..Self::new(LightType::Spot)
        }
    }

    /// Builder: set the attenuation range
    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(LightType::Directional)
    }
}

/// Uniform names of one light slot in the shading program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightSlotNames {
    /// `u_Lights[i].type`
    pub light_type: String,
    /// `u_Lights[i].position`
    pub position: String,
    /// `u_Lights[i].direction`
    pub direction: String,
    /// `u_Lights[i].color`
    pub color: String,
    /// `u_Lights[i].intensity`
    pub intensity: String,
    /// `u_Lights[i].range`
    pub range: String,
    /// `u_Lights[i].innerConeCos`
    pub inner_cone_cos: String,
    /// `u_Lights[i].outerConeCos`
    pub outer_cone_cos: String,
}

impl LightSlotNames {
    /// Names for slot `index`
    pub fn for_slot(index: usize) -> Self {
        let field = |name: &str| format!("u_Lights[{index}].{name}");
        Self {
            light_type: field("type"),
            position: field("position"),
            direction: field("direction"),
            color: field("color"),
            intensity: field("intensity"),
            range: field("range"),
            inner_cone_cos: field("innerConeCos"),
            outer_cone_cos: field("outerConeCos"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_light_defaults() {
        let light = Light::new(LightType::Point);

        assert_eq!(light.light_type, LightType::Point);
        assert_eq!(light.position, Vec3::zeros());
        assert_eq!(light.direction, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(light.color, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(light.intensity, 1.0);
        assert_eq!(light.range, 1.0);
    }

    #[test]
    fn test_directional_light_normalizes_direction() {
        let light = Light::directional(Vec3::new(0.0, -4.0, 0.0), Vec3::new(1.0, 0.9, 0.8), 2.0);

        assert_relative_eq!(light.direction.norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(light.direction.y, -1.0, epsilon = 1e-6);
        assert_eq!(light.intensity, 2.0);
    }

    #[test]
    fn test_spot_light_stores_cone_cosines() {
        let light = Light::spot(
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            1.0,
            0.0,
            std::f32::consts::FRAC_PI_3,
        );

        assert_relative_eq!(light.inner_cone_cos, 1.0, epsilon = 1e-6);
        assert_relative_eq!(light.outer_cone_cos, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_shader_codes_are_distinct() {
        let codes = [LightType::Directional, LightType::Point, LightType::Spot].map(LightType::shader_code);
        assert_eq!(codes, [0, 1, 2]);
    }

    #[test]
    fn test_slot_names() {
        let names = LightSlotNames::for_slot(3);
        assert_eq!(names.light_type, "u_Lights[3].type");
        assert_eq!(names.outer_cone_cos, "u_Lights[3].outerConeCos");
    }
}
