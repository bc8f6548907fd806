//! OpenGL backend
//!
//! Everything in here talks to the driver through `glow` and is therefore `unsafe`
//! at the call sites; the rest of the crate only sees [`GlowDevice`] through the
//! [`GraphicsDevice`](crate::render::api::GraphicsDevice) trait.

#![allow(unsafe_code)]

mod debug;
mod device;

pub use device::GlowDevice;
