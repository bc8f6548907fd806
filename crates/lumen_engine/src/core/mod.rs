//! Core settings shared by the renderer, the window subsystem and applications.

pub mod config;

pub use config::{ApplicationConfig, RendererConfig, ShaderConfig, WindowConfig};
