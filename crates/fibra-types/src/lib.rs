//! # fibra-types
//!
//! Shared types, identifiers, error types, and numeric constants
//! for the fibra filament mechanics engine.
//!
//! This crate has zero domain logic; it defines the vocabulary
//! that all other fibra crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{FibraError, FibraResult};
pub use ids::{BodyId, GroupId, PropId};
