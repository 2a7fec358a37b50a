//! # fibra-steric
//!
//! Steric (excluded-volume) interactions between filaments, beads,
//! spheres and solid vertices.
//!
//! Each simulation step runs one detection pass:
//! 1. **Grid**: a uniform lattice sized from the largest contact distance,
//!    with a precomputed table of forward neighbour cells
//! 2. **Registry**: point and segment records binned per cell and per pane
//! 3. **Narrow phase**: point–point, point–segment and segment–segment
//!    proximity tests, after a structural exclusion filter
//! 4. **Emission**: every close pair becomes a spring handed to a [`LinkSink`]
//!
//! [`StericEngine`] owns the grid and registry; [`StericDriver`] fills it
//! from a [`Scene`](fibra_model::Scene) and runs the pass.

pub mod config;
pub mod driver;
pub mod emitter;
pub mod engine;
pub mod exclusion;
pub mod grid;
pub mod link;
pub mod narrow;
pub mod registry;
pub mod sizing;

pub use config::{StericConfig, StericParams};
pub use driver::StericDriver;
pub use engine::{EnginePhase, PassReport, StericEngine};
pub use grid::{GridGeometry, SpatialGrid};
pub use link::{Anchor, Interpolation, LinkBuffer, LinkSink, PointRef, Regime, StericLink};
pub use narrow::FiberSource;
pub use registry::{CellStore, PointRecord, SegmentRecord};
pub use sizing::{size_grid, GridSizing};
