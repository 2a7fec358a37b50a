//! # fibra-math
//!
//! Geometry primitives for the fibra filament engine.
//!
//! Provides:
//! - Re-exports of `glam` types (`Vec3`, `Vec2`)
//! - [`Domain`]: axis-aligned simulation box with per-axis periodicity
//! - [`Modulo`]: minimum-image folding of displacement vectors
//! - [`Segment`]: projection and closest-approach queries on straight segments

pub mod domain;
pub mod modulo;
pub mod segment;

pub use domain::Domain;
pub use modulo::Modulo;
pub use segment::{Approach, Projection, Segment};

// Re-export glam types as the canonical math types for fibra.
pub use glam::{Vec2, Vec3};
