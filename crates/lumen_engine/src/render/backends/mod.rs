//! Graphics device implementations

pub mod opengl;
pub mod recording;

pub use opengl::GlowDevice;
pub use recording::{DeviceCall, RecordingDevice};
