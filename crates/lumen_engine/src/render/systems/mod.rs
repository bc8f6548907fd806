//! Rendering systems
//!
//! Scene-level data the renderer consumes but that owns no GPU resources.

pub mod lighting;
