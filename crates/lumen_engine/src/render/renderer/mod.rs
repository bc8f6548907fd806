//! # Renderer
//!
//! The per-frame orchestrator. [`Renderer::render`] takes a camera and a scene and
//! turns them into device calls:
//!
//! 1. Activate this renderer on the context. Global pipeline state (clear color,
//!    back-face culling with CCW front faces, depth test `Less`, multisampling,
//!    seamless cube maps) is applied only when another renderer (or none) was active.
//! 2. Clear color and depth.
//! 3. Compute the view-projection matrix once for the frame.
//! 4. Walk entities in storage order and, for each, the meshes of its model: bind the
//!    mesh, its program (skipped when already current), material, environment, camera
//!    and light uniforms, the model and normal matrices and the exposure, then draw.
//!
//! Presenting the frame is left to the caller.
//!
//! ## Uniform cache
//! Locations are resolved lazily, once per program, and kept in a map keyed by
//! program id. Recreating a shader under the same id requires
//! [`Renderer::forget_shader`]. Uniforms a program does not declare are skipped.
//!
//! ## Known limitation
//! The normal matrix is uploaded as the model matrix itself. That is only correct
//! for rotations with uniform scale, which is all an [`Entity`] can express.
//!
//! ## Failure model
//! Rendering never fails. Missing uniforms are skipped, lights beyond the configured
//! limit are ignored, and driver errors only surface through the backend's debug output.

pub mod uniforms;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::core::RendererConfig;
use crate::foundation::math::{Mat4, Mat4Ext};
use crate::render::api::{
    ClearFlags, GraphicsContext, GraphicsDevice, PipelineState, ProgramId, RendererId, UniformValue,
};
use crate::render::primitives::{Camera, Mesh};
use crate::render::resources::{Environment, Material, Shader, TextureKind};
use crate::render::systems::lighting::Light;
use crate::scene::{Entity, Scene};

use uniforms::{write, UniformLocations};

/// Values shared by every draw of one frame
struct FrameUniforms<'f> {
    view_projection: [f32; 16],
    camera_position: [f32; 3],
    exposure: f32,
    lights: &'f [&'f Light],
    environment: Option<&'f Environment>,
}

/// Forward renderer drawing a [`Scene`] through a [`GraphicsContext`]
#[derive(Debug)]
pub struct Renderer {
    id: RendererId,
    config: RendererConfig,
    viewport: (u32, u32),
    viewport_dirty: bool,
    start: Instant,
    uniform_cache: HashMap<ProgramId, UniformLocations>,
}

impl Renderer {
    /// Create a renderer with the viewport and constants of `config`
    pub fn new(config: RendererConfig) -> Self {
        let viewport = (config.viewport_width.max(1), config.viewport_height.max(1));
        log::info!(
            "Renderer created: {}x{} viewport, {} light slots",
            viewport.0,
            viewport.1,
            config.light_limit()
        );

        Self {
            id: RendererId::next(),
            config,
            viewport,
            viewport_dirty: true,
            start: Instant::now(),
            uniform_cache: HashMap::new(),
        }
    }

    /// Identity used for the context's active-renderer check
    pub fn id(&self) -> RendererId {
        self.id
    }

    /// Current configuration
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Viewport size in pixels
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Width over height of the viewport
    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    /// Change the viewport, applied on the next render
    ///
    /// A zero dimension (minimized window) keeps the previous viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {width}x{height}");
            return;
        }
        if self.viewport != (width, height) {
            self.viewport = (width, height);
            self.viewport_dirty = true;
        }
    }

    /// Exposure uploaded as `u_Exposure`
    pub fn exposure(&self) -> f32 {
        self.config.exposure
    }

    /// Change the exposure
    pub fn set_exposure(&mut self, exposure: f32) {
        self.config.exposure = exposure;
    }

    /// Time since the renderer was created
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Projection of `camera` into this renderer's viewport
    pub fn projection_matrix(&self, camera: &Camera) -> Mat4 {
        camera.projection_matrix(self.aspect_ratio())
    }

    /// Drop the cached uniform table of `shader`'s program
    pub fn forget_shader(&mut self, shader: &Shader) {
        if self.uniform_cache.remove(&shader.program()).is_some() {
            log::debug!("Forgot uniform locations of shader '{}'", shader.name());
        }
    }

    /// Make this the context's active renderer, applying global state if it was not
    ///
    /// Returns whether state was applied.
    pub fn activate<D: GraphicsDevice>(&mut self, context: &mut GraphicsContext<D>) -> bool {
        if !context.switch_to(self.id) {
            return false;
        }

        log::trace!("Activating renderer {:?}", self.id);
        let device = context.device_mut();
        device.apply_pipeline_state(&PipelineState::forward(self.config.clear_color));
        device.set_viewport(self.viewport.0, self.viewport.1);
        self.viewport_dirty = false;
        true
    }

    /// Draw one frame of `scene` as seen by `camera`
    pub fn render<D: GraphicsDevice>(&mut self, context: &mut GraphicsContext<D>, camera: &Camera, scene: &Scene<'_>) {
        self.activate(context);
        let device = context.device_mut();

        if self.viewport_dirty {
            device.set_viewport(self.viewport.0, self.viewport.1);
            self.viewport_dirty = false;
        }

        device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

        let light_count = scene.light_count().min(self.config.light_limit());
        if light_count < scene.light_count() {
            log::trace!("Ignoring {} lights beyond the limit", scene.light_count() - light_count);
        }

        let frame = FrameUniforms {
            view_projection: camera.view_projection_matrix(self.aspect_ratio()).to_cols_array(),
            camera_position: camera.position.into(),
            exposure: self.config.exposure,
            lights: &scene.lights()[..light_count],
            environment: scene.environment(),
        };

        if let Some(environment) = frame.environment {
            environment.bind(device);
        }

        let mut current_program = None;
        for entity in scene.entities() {
            self.draw_entity(device, entity, &frame, &mut current_program);
        }
    }

    fn draw_entity<D: GraphicsDevice>(
        &mut self,
        device: &mut D,
        entity: &Entity<'_>,
        frame: &FrameUniforms<'_>,
        current_program: &mut Option<ProgramId>,
    ) {
        let model_matrix = entity.model_matrix().to_cols_array();

        for mesh in entity.model().meshes() {
            mesh.bind(device);

            let program = mesh.shader().program();
            if *current_program != Some(program) {
                mesh.shader().use_program(device);
                *current_program = Some(program);
            }

            let locations = self
                .uniform_cache
                .entry(program)
                .or_insert_with(|| UniformLocations::resolve(device, program));

            bind_material(device, locations, mesh.material());
            bind_environment(device, locations, frame.environment);
            bind_frame(device, locations, frame);

            write(device, locations.model_matrix, UniformValue::Mat4(model_matrix));
            write(device, locations.normal_matrix, UniformValue::Mat4(model_matrix));

            draw(device, mesh);
        }
    }
}

fn bind_material<D: GraphicsDevice>(device: &mut D, locations: &UniformLocations, material: &Material) {
    write(device, locations.base_color_factor, UniformValue::Vec3(material.base_color_factor.into()));
    write(device, locations.metallic_factor, UniformValue::Float(material.metallic_factor));
    write(device, locations.roughness_factor, UniformValue::Float(material.roughness_factor));
    write(device, locations.normal_scale, UniformValue::Float(material.normal_scale));
    write(device, locations.occlusion_strength, UniformValue::Float(material.occlusion_strength));
    write(device, locations.emissive_factor, UniformValue::Vec3(material.emissive_factor.into()));

    for kind in TextureKind::ALL.into_iter().filter(|kind| kind.is_material_kind()) {
        let unit = kind.unit() as usize;
        let texture = material.texture(kind);

        if let Some(texture) = texture {
            texture.bind(device);
            write(device, locations.samplers[unit], UniformValue::Int(unit_index(kind)));
        }
        write(device, locations.texture_flags[unit], UniformValue::Int(i32::from(texture.is_some())));
    }
}

fn bind_environment<D: GraphicsDevice>(device: &mut D, locations: &UniformLocations, environment: Option<&Environment>) {
    write(device, locations.has_environment, UniformValue::Int(i32::from(environment.is_some())));

    let Some(environment) = environment else { return };
    write(device, locations.mip_count, UniformValue::UInt(environment.mip_count()));
    for texture in environment.textures() {
        let kind = texture.kind();
        write(device, locations.samplers[kind.unit() as usize], UniformValue::Int(unit_index(kind)));
    }
}

fn bind_frame<D: GraphicsDevice>(device: &mut D, locations: &UniformLocations, frame: &FrameUniforms<'_>) {
    write(device, locations.view_projection, UniformValue::Mat4(frame.view_projection));
    write(device, locations.camera, UniformValue::Vec3(frame.camera_position));
    write(device, locations.exposure, UniformValue::Float(frame.exposure));

    let count = i32::try_from(frame.lights.len()).unwrap_or(i32::MAX);
    write(device, locations.light_count, UniformValue::Int(count));

    for (light, slot) in frame.lights.iter().zip(&locations.lights) {
        write(device, slot.light_type, UniformValue::Int(light.light_type.shader_code()));
        write(device, slot.position, UniformValue::Vec3(light.position.into()));
        write(device, slot.direction, UniformValue::Vec3(light.direction.into()));
        write(device, slot.color, UniformValue::Vec3(light.color.into()));
        write(device, slot.intensity, UniformValue::Float(light.intensity));
        write(device, slot.range, UniformValue::Float(light.range));
        write(device, slot.inner_cone_cos, UniformValue::Float(light.inner_cone_cos));
        write(device, slot.outer_cone_cos, UniformValue::Float(light.outer_cone_cos));
    }
}

fn draw<D: GraphicsDevice>(device: &mut D, mesh: &Mesh<'_>) {
    log::trace!("Drawing {} indices", mesh.index_count());
    device.draw_indexed(mesh.index_count());
}

fn unit_index(kind: TextureKind) -> i32 {
    i32::try_from(kind.unit()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::api::TextureTarget;
    use crate::render::backends::recording::{DeviceCall, RecordingDevice};
    use crate::render::resources::Texture;
    use crate::render::primitives::{MeshData, Model};
    use crate::render::resources::environment::tests::environment_textures;
    use crate::render::systems::lighting::{LightType, MAX_LIGHTS};
    use approx::assert_relative_eq;

    fn context() -> GraphicsContext<RecordingDevice> {
        GraphicsContext::new(RecordingDevice::new())
    }

    fn shader(context: &mut GraphicsContext<RecordingDevice>) -> Shader {
        Shader::create(context.device_mut(), "renderer test", "", "").unwrap()
    }

    fn model<'a>(
        context: &mut GraphicsContext<RecordingDevice>,
        mesh_count: usize,
        shader: &'a Shader,
        material: &'a Material,
    ) -> Model<'a> {
        let meshes = vec![MeshData::cube(); mesh_count];
        Model::upload(context.device_mut(), "cubes", &meshes, shader, material).unwrap()
    }

    #[test]
    fn test_activation_applies_state_once() {
        let mut context = context();
        let mut renderer = Renderer::new(RendererConfig::default());

        assert!(renderer.activate(&mut context));
        assert!(!renderer.activate(&mut context));
        renderer.render(&mut context, &Camera::default(), &Scene::new());

        assert_eq!(context.device().state_setup_count(), 1);
        assert_eq!(context.active_renderer(), Some(renderer.id()));
    }

    #[test]
    fn test_switching_between_renderers_reapplies_state() {
        let mut context = context();
        let mut first = Renderer::new(RendererConfig::default());
        let mut second = Renderer::new(RendererConfig::default());
        let camera = Camera::default();
        let scene = Scene::new();

        first.render(&mut context, &camera, &scene);
        second.render(&mut context, &camera, &scene);
        first.render(&mut context, &camera, &scene);
        first.render(&mut context, &camera, &scene);

        assert_eq!(context.device().state_setup_count(), 3);

        context.invalidate_state();
        first.render(&mut context, &camera, &scene);
        assert_eq!(context.device().state_setup_count(), 4);
    }

    #[test]
    fn test_forward_pipeline_state() {
        let mut context = context();
        let mut renderer = Renderer::new(RendererConfig::default());
        renderer.activate(&mut context);

        let expected = PipelineState::forward([0.0, 0.0, 0.0, 1.0]);
        assert!(context.device().calls().contains(&DeviceCall::ApplyPipelineState(expected)));
    }

    #[test]
    fn test_empty_scene_clears_without_drawing() {
        let mut context = context();
        let mut renderer = Renderer::new(RendererConfig::default());

        renderer.render(&mut context, &Camera::default(), &Scene::new());

        assert_eq!(context.device().clear_count(), 1);
        assert_eq!(context.device().draw_call_count(), 0);
        assert!(context
            .device()
            .calls()
            .contains(&DeviceCall::Clear(ClearFlags::COLOR | ClearFlags::DEPTH)));
    }

    #[test]
    fn test_one_draw_per_mesh_per_entity() {
        let mut context = context();
        let shader = shader(&mut context);
        let material = Material::new();
        let model = model(&mut context, 2, &shader, &material);
        let entities: Vec<Entity> = (0..3).map(|_| Entity::new(&model)).collect();

        let mut scene = Scene::new();
        for entity in &entities {
            scene.add_entity(entity).unwrap();
        }

        let mut renderer = Renderer::new(RendererConfig::default());
        context.device_mut().clear_calls();
        renderer.render(&mut context, &Camera::default(), &scene);

        let device = context.device();
        assert_eq!(device.draw_call_count(), 6);
        assert!(device
            .calls()
            .iter()
            .filter(|call| matches!(call, DeviceCall::DrawIndexed { .. }))
            .all(|call| *call == DeviceCall::DrawIndexed { index_count: 36 }));
        assert_eq!(device.program_switch_count(), 1);
    }

    #[test]
    fn test_uniform_locations_resolved_once() {
        let mut context = context();
        let shader = shader(&mut context);
        let material = Material::new();
        let model = model(&mut context, 1, &shader, &material);
        let entity = Entity::new(&model);

        let mut scene = Scene::new();
        scene.add_entity(&entity).unwrap();

        let mut renderer = Renderer::new(RendererConfig::default());
        let camera = Camera::default();

        renderer.render(&mut context, &camera, &scene);
        let after_first = context.device().uniform_lookup_count();
        assert!(after_first > 0);

        renderer.render(&mut context, &camera, &scene);
        renderer.render(&mut context, &camera, &scene);
        assert_eq!(context.device().uniform_lookup_count(), after_first);

        renderer.forget_shader(&shader);
        renderer.render(&mut context, &camera, &scene);
        assert_eq!(context.device().uniform_lookup_count(), after_first * 2);
    }

    #[test]
    fn test_missing_uniforms_are_skipped() {
        let mut context = context();
        context.device_mut().hide_uniform(uniforms::EXPOSURE);
        context.device_mut().hide_uniform(uniforms::NORMAL_MATRIX);

        let shader = shader(&mut context);
        let material = Material::new();
        let model = model(&mut context, 1, &shader, &material);
        let entity = Entity::new(&model);
        let mut scene = Scene::new();
        scene.add_entity(&entity).unwrap();

        let mut renderer = Renderer::new(RendererConfig::default());
        renderer.render(&mut context, &Camera::default(), &scene);

        let device = context.device();
        assert!(device.uniform_writes(uniforms::EXPOSURE).is_empty());
        assert!(device.uniform_writes(uniforms::NORMAL_MATRIX).is_empty());
        assert_eq!(device.uniform_writes(uniforms::MODEL_MATRIX).len(), 1);
        assert_eq!(device.draw_call_count(), 1);
    }

    #[test]
    fn test_normal_matrix_is_model_matrix() {
        let mut context = context();
        let shader = shader(&mut context);
        let material = Material::new();
        let model = model(&mut context, 1, &shader, &material);
        let entity = Entity::new(&model).at(Vec3::new(1.0, 2.0, 3.0));
        entity.rotate(Vec3::new(0.0, 0.5, 0.0));

        let mut scene = Scene::new();
        scene.add_entity(&entity).unwrap();

        let mut renderer = Renderer::new(RendererConfig::default());
        renderer.render(&mut context, &Camera::default(), &scene);

        let device = context.device();
        let model_writes = device.uniform_writes(uniforms::MODEL_MATRIX);
        assert_eq!(model_writes, vec![UniformValue::Mat4(entity.model_matrix().to_cols_array())]);
        assert_eq!(device.uniform_writes(uniforms::NORMAL_MATRIX), model_writes);
    }

    #[test]
    fn test_lights_beyond_limit_are_ignored() {
        let mut context = context();
        let shader = shader(&mut context);
        let material = Material::new();
        let model = model(&mut context, 1, &shader, &material);
        let entity = Entity::new(&model);
        let lights: Vec<Light> = (0..MAX_LIGHTS + 2).map(|_| Light::new(LightType::Point)).collect();

        let mut scene = Scene::new();
        scene.add_entity(&entity).unwrap();
        for light in &lights {
            scene.add_light(light).unwrap();
        }

        let mut renderer = Renderer::new(RendererConfig::default());
        renderer.render(&mut context, &Camera::default(), &scene);

        let device = context.device();
        let limit = i32::try_from(MAX_LIGHTS).unwrap();
        assert_eq!(device.uniform_writes(uniforms::LIGHT_COUNT), vec![UniformValue::Int(limit)]);
        assert_eq!(device.uniform_writes(&format!("u_Lights[{}].type", MAX_LIGHTS - 1)).len(), 1);
        assert!(device.uniform_writes(&format!("u_Lights[{MAX_LIGHTS}].type")).is_empty());
        assert_eq!(device.draw_call_count(), 1);
    }

    #[test]
    fn test_configured_light_limit() {
        let mut context = context();
        let shader = shader(&mut context);
        let material = Material::new();
        let model = model(&mut context, 1, &shader, &material);
        let entity = Entity::new(&model);
        let lights = [Light::new(LightType::Directional), Light::new(LightType::Spot), Light::new(LightType::Point)];

        let mut scene = Scene::new();
        scene.add_entity(&entity).unwrap();
        for light in &lights {
            scene.add_light(light).unwrap();
        }

        let config = RendererConfig {
            max_lights: 2,
            ..RendererConfig::default()
        };
        let mut renderer = Renderer::new(config);
        renderer.render(&mut context, &Camera::default(), &scene);

        let device = context.device();
        assert_eq!(device.uniform_writes(uniforms::LIGHT_COUNT), vec![UniformValue::Int(2)]);
        assert_eq!(device.uniform_writes("u_Lights[1].type"), vec![UniformValue::Int(2)]);
        assert!(device.uniform_writes("u_Lights[2].type").is_empty());
    }

    #[test]
    fn test_material_textures_and_factors() {
        let mut context = context();
        let shader = shader(&mut context);
        let mut material = Material::new().with_metallic_roughness(0.25, 0.75);
        let texture = Texture::create_2d(context.device_mut(), TextureKind::BaseColor, 1, 1, &[255; 4]).unwrap();
        let texture_id = texture.id();
        assert!(material.set_texture(texture).is_none());

        let model = model(&mut context, 1, &shader, &material);
        let entity = Entity::new(&model);
        let mut scene = Scene::new();
        scene.add_entity(&entity).unwrap();

        let mut renderer = Renderer::new(RendererConfig::default());
        renderer.render(&mut context, &Camera::default(), &scene);

        let device = context.device();
        assert_eq!(device.uniform_writes(uniforms::METALLIC_FACTOR), vec![UniformValue::Float(0.25)]);
        assert_eq!(device.uniform_writes("u_BaseColorSampler"), vec![UniformValue::Int(0)]);
        assert_eq!(device.uniform_writes("u_HasBaseColorMap"), vec![UniformValue::Int(1)]);
        assert_eq!(device.uniform_writes("u_HasNormalMap"), vec![UniformValue::Int(0)]);
        assert!(device.calls().contains(&DeviceCall::BindTexture {
            unit: 0,
            target: TextureTarget::Texture2D,
            texture: texture_id,
        }));
    }

    #[test]
    fn test_environment_is_bound_when_assigned() {
        let mut context = context();
        let shader = shader(&mut context);
        let material = Material::new();
        let model = model(&mut context, 1, &shader, &material);
        let entity = Entity::new(&model);
        let textures = environment_textures(context.device_mut());
        let environment = Environment::new(context.device_mut(), 8, textures).unwrap();

        let mut scene = Scene::new();
        scene.add_entity(&entity).unwrap();
        scene.assign_environment(&environment);

        let mut renderer = Renderer::new(RendererConfig::default());
        renderer.render(&mut context, &Camera::default(), &scene);

        let device = context.device();
        assert_eq!(device.uniform_writes(uniforms::MIP_COUNT), vec![UniformValue::UInt(8)]);
        assert_eq!(device.uniform_writes(uniforms::HAS_ENVIRONMENT), vec![UniformValue::Int(1)]);
        assert_eq!(device.uniform_writes("u_GGXLUT"), vec![UniformValue::Int(7)]);
    }

    #[test]
    fn test_projection_matrix_closed_form() {
        let config = RendererConfig::default().with_viewport(1920, 1080);
        let renderer = Renderer::new(config.clone());
        let camera = Camera::from_config(&config);

        let cols = renderer.projection_matrix(&camera).to_cols_array();
        let aspect = 16.0 / 9.0;

        assert_relative_eq!(renderer.aspect_ratio(), aspect, epsilon = 1e-6);
        assert_relative_eq!(cols[0], 1.0 / aspect, epsilon = 1e-5);
        assert_relative_eq!(cols[5], 1.0, epsilon = 1e-5);
        assert_relative_eq!(cols[10], (1000.0 + 0.1) / (0.1 - 1000.0), epsilon = 1e-5);
        assert_relative_eq!(cols[14], (2.0 * 1000.0 * 0.1) / (0.1 - 1000.0), epsilon = 1e-5);
    }

    #[test]
    fn test_resize_updates_viewport_on_next_render() {
        let mut context = context();
        let mut renderer = Renderer::new(RendererConfig::default());
        let camera = Camera::default();
        let scene = Scene::new();

        renderer.render(&mut context, &camera, &scene);
        context.device_mut().clear_calls();

        renderer.resize(800, 600);
        renderer.resize(0, 600);
        renderer.render(&mut context, &camera, &scene);

        assert_eq!(renderer.viewport(), (800, 600));
        assert!(context.device().calls().contains(&DeviceCall::SetViewport { width: 800, height: 600 }));
        assert_eq!(context.device().state_setup_count(), 0);
    }
}
