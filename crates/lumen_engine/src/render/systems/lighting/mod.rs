//! Lighting system
//!
//! Light descriptors and the fixed per-draw light budget.

pub mod lighting;

pub use lighting::*;
