//! Event bus: channel-backed dispatch to pluggable sinks.
//!
//! Producers call `emit`, or `emit_pass` to describe a whole steric pass;
//! events queue on an `mpsc` channel until the owner calls `flush`, which
//! hands each event to every sink in order.

use std::sync::mpsc;

use fibra_steric::PassReport;

use crate::events::{EventKind, StepEvent};
use crate::sinks::EventSink;

/// Broadcast event bus for step telemetry.
pub struct EventBus {
    sender: mpsc::Sender<StepEvent>,
    receiver: mpsc::Receiver<StepEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    /// Disabled bus drops events on emit.
    enabled: bool,
}

impl EventBus {
    /// Creates a new event bus with no sinks.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: true,
        }
    }

    /// Registers a sink to receive events.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Enables or disables the bus.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns true if the bus is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A sender usable from other threads.
    pub fn sender(&self) -> mpsc::Sender<StepEvent> {
        self.sender.clone()
    }

    /// Queues an event. No-op when disabled.
    pub fn emit(&self, event: StepEvent) {
        if !self.enabled {
            return;
        }
        // the receiver lives in `self`, so send cannot fail here
        let _ = self.sender.send(event);
    }

    /// Queues the events of one steric pass: `GridBuilt` and
    /// `RangeAdjusted` when the report says so, then `StericPass`.
    pub fn emit_pass(&self, step: u32, report: &PassReport, wall_time: f64) {
        if report.grid_rebuilt {
            self.emit(StepEvent::new(
                step,
                EventKind::GridBuilt {
                    dims: report.grid_dims,
                    cells: report.cells,
                    width: report.operative_range,
                },
            ));
        }
        if report.range_adjusted {
            self.emit(StepEvent::new(
                step,
                EventKind::RangeAdjusted {
                    configured: report.configured_range,
                    operative: report.operative_range,
                },
            ));
        }
        self.emit(StepEvent::new(
            step,
            EventKind::StericPass {
                points: report.points,
                segments: report.segments,
                pairs_tested: report.pairs_tested,
                pairs_excluded: report.pairs_excluded,
                push_links: report.push_links,
                pull_links: report.pull_links,
                wall_time,
            },
        ));
    }

    /// Dispatches every queued event to the sinks. Returns the number of events.
    pub fn flush(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.receiver.try_recv() {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
            count += 1;
        }
        count
    }

    /// Flushes, then lets every sink finalize.
    pub fn finish(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    /// Returns the number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Names of the registered sinks, in registration order.
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
