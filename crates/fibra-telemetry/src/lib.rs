//! # fibra-telemetry
//!
//! Event bus for steric-pass telemetry. The step driver emits
//! structured events (grid rebuilds, range adjustments, pass counters)
//! that pluggable sinks consume: an in-memory log, `tracing`, or a
//! JSON-lines stream.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, StepEvent};
pub use sinks::{EventSink, JsonLinesSink, TracingSink, VecSink};
