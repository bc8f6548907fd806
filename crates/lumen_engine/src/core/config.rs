//! # Unified Configuration
//!
//! Settings for the renderer, the window and the shader sources, plus an
//! [`ApplicationConfig`] aggregate that can be loaded from a single TOML or RON file.
//!
//! All types have sensible defaults so an application can start without any file:
//!
//! ```toml
//! [renderer]
//! fov_degrees = 90.0
//! near_plane = 0.1
//! far_plane = 1000.0
//! viewport_width = 1280
//! viewport_height = 720
//! clear_color = [0.0, 0.0, 0.0, 1.0]
//! exposure = 1.0
//! max_lights = 4
//!
//! [window]
//! width = 1280
//! height = 720
//! title = "Lumen"
//! fullscreen = false
//! samples = 4
//! vsync = true
//! debug_context = false
//!
//! [shaders]
//! vertex_shader_path = "shaders/pbr.vert"
//! fragment_shader_path = "shaders/pbr.frag"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use crate::config::{Config, ConfigError};
use crate::render::systems::lighting::MAX_LIGHTS;

/// # Shader Configuration
///
/// Paths of the GLSL sources for the main shading program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderConfig {
    /// Path to the vertex shader source
    pub vertex_shader_path: String,
    /// Path to the fragment shader source
    pub fragment_shader_path: String,
}

impl ShaderConfig {
    /// Create a new shader configuration
    pub fn new(vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            vertex_shader_path: vertex_path.into(),
            fragment_shader_path: fragment_path.into(),
        }
    }

    /// Create shader config with automatic path resolution
    ///
    /// Tries a few common locations so applications can be run from the workspace
    /// root or from their own directory.
    pub fn with_path_resolution(base_vertex: &str, base_fragment: &str) -> Self {
        const SHADER_DIRS: [&str; 4] = ["resources/shaders/", "shaders/", "../resources/shaders/", "./"];

        let resolve = |base: &str| {
            SHADER_DIRS
                .iter()
                .map(|dir| format!("{dir}{base}"))
                .find(|candidate| Path::new(candidate).exists())
                .unwrap_or_else(|| format!("shaders/{base}"))
        };

        Self {
            vertex_shader_path: resolve(base_vertex),
            fragment_shader_path: resolve(base_fragment),
        }
    }

    /// Validate that shader files exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.vertex_shader_path, &self.fragment_shader_path] {
            if !Path::new(path).exists() {
                return Err(ConfigError::Invalid(format!("Shader source not found: {path}")));
            }
        }
        Ok(())
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self::with_path_resolution("pbr.vert", "pbr.frag")
    }
}

/// # Renderer Configuration
///
/// Projection parameters, the initial viewport and the per-frame constants the
/// renderer pushes to every shader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Distance to the near clipping plane
    pub near_plane: f32,
    /// Distance to the far clipping plane
    pub far_plane: f32,
    /// Initial viewport width in pixels
    pub viewport_width: u32,
    /// Initial viewport height in pixels
    pub viewport_height: u32,
    /// Color the frame is cleared to (RGBA)
    pub clear_color: [f32; 4],
    /// Tone-mapping exposure uploaded as `u_Exposure`
    pub exposure: f32,
    /// Number of scene lights uploaded per draw, clamped to [`MAX_LIGHTS`]
    pub max_lights: usize,
}

impl RendererConfig {
    /// Set the field of view in degrees
    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov_degrees = fov_degrees;
        self
    }

    /// Set near and far clipping planes
    pub fn with_planes(mut self, near: f32, far: f32) -> Self {
        self.near_plane = near;
        self.far_plane = far;
        self
    }

    /// Set the initial viewport size
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Lights actually uploaded per draw
    pub fn light_limit(&self) -> usize {
        self.max_lights.min(MAX_LIGHTS)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "Field of view must be within (0, 180) degrees, got {}",
                self.fov_degrees
            )));
        }

        if self.near_plane <= 0.0 || self.far_plane <= self.near_plane {
            return Err(ConfigError::Invalid(format!(
                "Clipping planes must satisfy 0 < near < far, got near={} far={}",
                self.near_plane, self.far_plane
            )));
        }

        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::Invalid("Viewport dimensions must be non-zero".to_string()));
        }

        Ok(())
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 90.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            viewport_width: 1280,
            viewport_height: 720,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            exposure: 1.0,
            max_lights: MAX_LIGHTS,
        }
    }
}

/// # Window Configuration
///
/// Parameters handed to the windowing collaborator. A width or height of `0`
/// falls back to the primary monitor's resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in screen coordinates (0 = monitor width)
    pub width: u32,
    /// Window height in screen coordinates (0 = monitor height)
    pub height: u32,
    /// Window title
    pub title: String,
    /// Fullscreen on the primary monitor
    pub fullscreen: bool,
    /// Multisampling sample count
    pub samples: u32,
    /// Wait for one display refresh per buffer swap
    pub vsync: bool,
    /// Request a debug OpenGL context (ignored on macOS)
    pub debug_context: bool,
}

impl WindowConfig {
    /// Create a windowed configuration
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
            ..Self::default()
        }
    }

    /// Fullscreen at the primary monitor's resolution
    pub fn fullscreen(title: impl Into<String>) -> Self {
        Self {
            width: 0,
            height: 0,
            title: title.into(),
            fullscreen: true,
            ..Self::default()
        }
    }

    /// Whether a debug context should actually be requested on this platform
    ///
    /// macOS tops out at OpenGL 4.1, and debug output needs 4.3.
    pub fn wants_debug_context(&self) -> bool {
        self.debug_context && !cfg!(target_os = "macos")
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Lumen".to_string(),
            fullscreen: false,
            samples: 4,
            vsync: true,
            debug_context: cfg!(debug_assertions),
        }
    }
}

/// # Application Configuration
///
/// Everything a viewer needs, loadable from one file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Renderer settings
    pub renderer: RendererConfig,
    /// Window settings
    pub window: WindowConfig,
    /// Shader source locations
    pub shaders: ShaderConfig,
}

impl Config for ApplicationConfig {}

impl ApplicationConfig {
    /// Validate every section that can be checked without touching the GPU
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.renderer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_defaults_are_valid() {
        let config = RendererConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fov_degrees, 90.0);
        assert_eq!(config.light_limit(), MAX_LIGHTS);
    }

    #[test]
    fn test_renderer_rejects_inverted_planes() {
        let config = RendererConfig::default().with_planes(10.0, 1.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_renderer_rejects_zero_viewport() {
        let config = RendererConfig::default().with_viewport(0, 720);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_light_limit_is_clamped() {
        let config = RendererConfig {
            max_lights: MAX_LIGHTS + 10,
            ..RendererConfig::default()
        };
        assert_eq!(config.light_limit(), MAX_LIGHTS);
    }

    #[test]
    fn test_fullscreen_window_uses_monitor_resolution() {
        let config = WindowConfig::fullscreen("Test");
        assert!(config.fullscreen);
        assert_eq!((config.width, config.height), (0, 0));
    }

    #[test]
    fn test_application_config_toml_roundtrip() {
        let mut config = ApplicationConfig::default();
        config.renderer.fov_degrees = 70.0;
        config.window.title = "Roundtrip".to_string();

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ApplicationConfig = toml::from_str(&text).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let parsed: ApplicationConfig = toml::from_str("[renderer]\nfov_degrees = 60.0\n").unwrap();

        assert_eq!(parsed.renderer.fov_degrees, 60.0);
        assert_eq!(parsed.renderer.far_plane, 1000.0);
        assert_eq!(parsed.window, WindowConfig::default());
    }

    #[test]
    fn test_load_from_file_rejects_unknown_extension() {
        let result = ApplicationConfig::load_from_file("settings.ini");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_format_is_checked_before_reading() {
        let path = std::env::temp_dir().join(format!("lumen_config_{}.ini", std::process::id()));
        std::fs::write(&path, "[renderer]\n").unwrap();
        let result = ApplicationConfig::load_from_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));

        let missing = std::env::temp_dir().join(format!("lumen_missing_{}.toml", std::process::id()));
        let result = ApplicationConfig::load_from_file(&missing);
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_save_and_load_ron() {
        let path = std::env::temp_dir().join(format!("lumen_config_{}.ron", std::process::id()));
        let mut config = ApplicationConfig::default();
        config.renderer.exposure = 2.5;

        config.save_to_file(&path).unwrap();
        let loaded = ApplicationConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.renderer.exposure, 2.5);
    }
}
