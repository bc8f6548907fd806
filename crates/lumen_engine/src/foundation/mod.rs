//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the toolkit:
//! - Math types and transform composition
//! - Logging initialization

pub mod math;
pub mod logging;
