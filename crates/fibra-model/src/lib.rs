//! # fibra-model
//!
//! The object model scanned once per step by the steric driver:
//! piecewise-linear filaments, beads, spheres and multi-point solids,
//! together with the shared property records that enable and size
//! their steric interactions.
//!
//! Every object is addressed by a [`BodyId`](fibra_types::BodyId)
//! handed out by the [`Scene`]; bodies attached to each other share a
//! [`GroupId`](fibra_types::GroupId).

pub mod generators;
pub mod objects;
pub mod props;
pub mod scene;

pub use objects::{Bead, Fiber, Solid, Sphere};
pub use props::{BodyProp, FiberProp};
pub use scene::{BodyKind, Scene};
