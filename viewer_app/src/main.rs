//! Cube viewer
//!
//! Opens a window, uploads a procedural cube and renders it under a single
//! directional light until the window is closed.
//!
//! Settings are read from `viewer.toml` (or `viewer.ron`) in the working directory
//! when present. WASD moves the cube, Q/E turn it, R/F raise and lower it and
//! Escape quits.

use std::path::Path;
use std::process::ExitCode;

use glfw::{Action, Key, WindowEvent};
use lumen_engine::foundation::logging;
use lumen_engine::prelude::*;

const CONFIG_FILES: [&str; 2] = ["viewer.toml", "viewer.ron"];
const MOVE_SPEED: f32 = 2.0;
const TURN_SPEED: f32 = 1.5;
const SPIN_SPEED: f32 = 0.4;

fn load_config() -> Result<ApplicationConfig, ConfigError> {
    let Some(path) = CONFIG_FILES.iter().map(Path::new).find(|path| path.exists()) else {
        log::info!("No viewer config found, using defaults");
        return Ok(ApplicationConfig::default());
    };

    log::info!("Loading config from {}", path.display());
    let config = ApplicationConfig::load_from_file(path)?;
    config.validate()?;
    Ok(config)
}

/// Track held movement keys in `held`
fn update_held_directions(events: &[WindowEvent], held: &mut DirectionMask) {
    for event in events {
        if let WindowEvent::Key(key, _, action, _) = event {
            let direction = match key {
                Key::W => DirectionMask::FORWARD,
                Key::S => DirectionMask::BACKWARD,
                Key::A => DirectionMask::LEFT,
                Key::D => DirectionMask::RIGHT,
                Key::R => DirectionMask::UP,
                Key::F => DirectionMask::DOWN,
                _ => continue,
            };
            match action {
                Action::Press => held.insert(direction),
                Action::Release => held.remove(direction),
                Action::Repeat => {}
            }
        }
    }
}

fn update_turning(events: &[WindowEvent], turning: &mut f32) {
    for event in events {
        match event {
            WindowEvent::Key(Key::Q, _, Action::Press, _) => *turning = 1.0,
            WindowEvent::Key(Key::E, _, Action::Press, _) => *turning = -1.0,
            WindowEvent::Key(Key::Q | Key::E, _, Action::Release, _) => *turning = 0.0,
            _ => {}
        }
    }
}

fn run(config: ApplicationConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut window = Window::create(&config.window)?;
    let mut context = GraphicsContext::new(window.load_device()?);

    let shader = Shader::from_config(context.device_mut(), &config.shaders)?;
    let material = Material::new()
        .with_name("brushed copper")
        .with_base_color(Vec3::new(0.95, 0.64, 0.54))
        .with_metallic_roughness(1.0, 0.35);
    let cube = Model::upload(context.device_mut(), "cube", &[MeshData::cube()], &shader, &material)?;

    let entity = Entity::new(&cube).at(Vec3::new(0.0, 0.0, -4.0));
    let sun = Light::directional(Vec3::new(-0.4, -1.0, -0.6), Vec3::new(1.0, 0.96, 0.9), 3.0);
    let fill = Light::point(Vec3::new(2.0, 1.5, -2.0), Vec3::new(0.3, 0.5, 1.0), 4.0, 10.0);

    let mut scene = Scene::new();
    scene.add_entity(&entity)?;
    scene.add_light(&sun)?;
    scene.add_light(&fill)?;

    let camera = Camera::from_config(&config.renderer);
    let mut renderer = Renderer::new(config.renderer.clone());
    let (width, height) = window.framebuffer_size();
    renderer.resize(width, height);

    let mut held = DirectionMask::empty();
    let mut turning = 0.0_f32;
    let mut last_frame = window.elapsed();

    while !window.closed() {
        let events = window.poll_events();
        for event in &events {
            match event {
                WindowEvent::Key(Key::Escape, _, Action::Press, _) => window.close(),
                WindowEvent::FramebufferSize(width, height) => {
                    renderer.resize(u32::try_from(*width).unwrap_or(0), u32::try_from(*height).unwrap_or(0));
                }
                _ => {}
            }
        }
        update_held_directions(&events, &mut held);
        update_turning(&events, &mut turning);

        let now = window.elapsed();
        let dt = (now - last_frame).as_secs_f32();
        last_frame = now;

        // Idle spin plus whatever the player is steering.
        let yaw = (SPIN_SPEED + turning * TURN_SPEED) * dt;
        entity.relative_move(held, MOVE_SPEED * dt, yaw);

        renderer.render(&mut context, &camera, &scene);
        window.swap_buffers();
    }

    log::info!("Rendered for {:.1}s", renderer.elapsed().as_secs_f32());

    drop(scene);
    cube.destroy(context.device_mut());
    material.destroy(context.device_mut());
    shader.destroy(context.device_mut());
    Ok(())
}

fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    run(config)
}

fn main() -> ExitCode {
    logging::init_with_level(log::LevelFilter::Info);
    log::info!("Starting cube viewer");

    match try_main() {
        Ok(()) => {
            log::info!("Viewer exited cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Viewer failed: {e}");
            ExitCode::FAILURE
        }
    }
}
