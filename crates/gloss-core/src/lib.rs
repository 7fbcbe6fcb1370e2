//! Gloss Core
//!
//! Shared building blocks for the gloss crates: colors, math helpers,
//! logging setup and profiling scopes.

pub mod color;
pub mod logging;
pub mod math;
pub mod profiling;

pub use color::Color;
