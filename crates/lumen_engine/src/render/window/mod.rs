//! Windowing subsystem
//!
//! [`Subsystem`] is the reference-counted init/terminate logic. The glfw-backed
//! [`Window`] that uses it is compiled only with the `window` feature, so headless
//! builds (and the test suite) do not need glfw at all.

pub mod subsystem;

#[cfg(feature = "window")]
mod handle;

use thiserror::Error;

pub use subsystem::{Subsystem, SubsystemBackend};

#[cfg(feature = "window")]
pub use handle::Window;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// The windowing library could not be initialized
    #[error("Windowing library initialization failed: {0}")]
    InitializationFailed(String),

    /// The window or its context could not be created
    #[error("Window creation failed")]
    CreationFailed,

    /// The context does not provide the required OpenGL version
    #[error("OpenGL context unusable: {0}")]
    ContextLoad(String),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;
