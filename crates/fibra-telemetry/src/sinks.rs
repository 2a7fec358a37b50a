//! Pluggable event sinks.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::events::{EventKind, StepEvent};

/// Trait for event consumers.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &StepEvent);

    /// Called when the run ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events in memory.
///
/// The event list is shared, so a clone kept outside the bus can
/// inspect what the boxed sink received.
#[derive(Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<StepEvent>>>,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<StepEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of events received so far.
    pub fn len(&self) -> usize {
        self.events.lock().map_or(0, |e| e.len())
    }

    /// Returns true if nothing was received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &StepEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Logs events through `tracing`.
///
/// Step boundaries go to `debug`, everything else to `info`, except
/// `NoStericObjects` which is a warning.
#[derive(Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &StepEvent) {
        match &event.kind {
            EventKind::StepBegin { .. } | EventKind::StepEnd { .. } => {
                tracing::debug!(step = event.step, event = ?event.kind, "step_event");
            }
            EventKind::NoStericObjects => {
                tracing::warn!(step = event.step, "no steric objects");
            }
            EventKind::StericPass {
                points,
                segments,
                push_links,
                pull_links,
                wall_time,
                ..
            } => {
                tracing::info!(
                    step = event.step,
                    points,
                    segments,
                    push_links,
                    pull_links,
                    wall_ms = wall_time * 1e3,
                    "steric_pass"
                );
            }
            kind => {
                tracing::info!(step = event.step, event = ?kind, "step_event");
            }
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}

/// Writes one JSON object per line.
pub struct JsonLinesSink {
    out: Box<dyn Write + Send>,
    failed: bool,
}

impl JsonLinesSink {
    /// Wraps any writer (file, stdout, buffer).
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out, failed: false }
    }

    /// Returns true if a write failed; later events are dropped.
    pub fn failed(&self) -> bool {
        self.failed
    }
}

impl EventSink for JsonLinesSink {
    fn handle(&mut self, event: &StepEvent) {
        if self.failed {
            return;
        }
        let written = serde_json::to_string(event)
            .map_err(std::io::Error::other)
            .and_then(|line| writeln!(self.out, "{line}"));
        if let Err(err) = written {
            tracing::warn!("json telemetry sink disabled: {err}");
            self.failed = true;
        }
    }

    fn finalize(&mut self) {
        if let Err(err) = self.out.flush() {
            tracing::warn!("json telemetry sink flush failed: {err}");
        }
    }

    fn name(&self) -> &str {
        "json_lines_sink"
    }
}
