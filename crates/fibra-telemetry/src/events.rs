//! Step event types.
//!
//! Events are plain values carrying just enough data to monitor the
//! steric engine from outside: how the grid was sized and what each
//! pass produced.

use serde::{Deserialize, Serialize};

/// An event emitted during a simulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Step number (0-indexed).
    pub step: u32,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Step started.
    StepBegin {
        /// Simulated time at the start of the step.
        sim_time: f64,
    },

    /// Step completed.
    StepEnd {
        /// Wall-clock time of the whole step (seconds).
        wall_time: f64,
    },

    /// The steric grid was (re)built.
    GridBuilt {
        /// Cells along each axis.
        dims: [usize; 3],
        /// Total cells.
        cells: usize,
        /// Operative minimum cell width.
        width: f32,
    },

    /// The operative steric width was raised above the configured one.
    RangeAdjusted {
        /// Configured width, if any.
        configured: Option<f32>,
        /// Width actually used.
        operative: f32,
    },

    /// A steric pass completed.
    StericPass {
        points: usize,
        segments: usize,
        pairs_tested: usize,
        pairs_excluded: usize,
        push_links: usize,
        pull_links: usize,
        /// Wall-clock time of the pass (seconds).
        wall_time: f64,
    },

    /// Steric interactions are enabled but no object takes part.
    NoStericObjects,

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl StepEvent {
    /// Creates a new event for the given step.
    pub fn new(step: u32, kind: EventKind) -> Self {
        Self { step, kind }
    }
}

impl EventKind {
    /// Short stable name, used as a log target and CSV column.
    pub fn label(&self) -> &str {
        match self {
            EventKind::StepBegin { .. } => "step_begin",
            EventKind::StepEnd { .. } => "step_end",
            EventKind::GridBuilt { .. } => "grid_built",
            EventKind::RangeAdjusted { .. } => "range_adjusted",
            EventKind::StericPass { .. } => "steric_pass",
            EventKind::NoStericObjects => "no_steric_objects",
            EventKind::Custom { label, .. } => label,
        }
    }
}
