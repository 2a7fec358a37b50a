//! Integration tests for fibra-telemetry.

use std::io::Write;
use std::sync::{Arc, Mutex};

use fibra_steric::PassReport;
use fibra_telemetry::bus::EventBus;
use fibra_telemetry::events::{EventKind, StepEvent};
use fibra_telemetry::sinks::{JsonLinesSink, TracingSink, VecSink};

/// A writer whose bytes stay readable after being boxed.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn pass_event(step: u32) -> StepEvent {
    StepEvent::new(
        step,
        EventKind::StericPass {
            points: 10,
            segments: 20,
            pairs_tested: 30,
            pairs_excluded: 4,
            push_links: 5,
            pull_links: 1,
            wall_time: 0.002,
        },
    )
}

// ─── Bus Tests ────────────────────────────────────────────────

#[test]
fn emit_and_flush() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    bus.emit(StepEvent::new(0, EventKind::StepBegin { sim_time: 0.0 }));
    bus.emit(pass_event(0));
    bus.emit(StepEvent::new(0, EventKind::StepEnd { wall_time: 0.001 }));
    assert!(sink.is_empty());

    assert_eq!(bus.flush(), 3);
    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[1], pass_event(0));
}

#[test]
fn disabled_bus_drops_events() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));
    bus.set_enabled(false);
    bus.emit(StepEvent::new(0, EventKind::NoStericObjects));
    assert_eq!(bus.flush(), 0);
    assert!(sink.is_empty());
}

#[test]
fn every_sink_sees_every_event() {
    let mut bus = EventBus::new();
    let a = VecSink::new();
    let b = VecSink::new();
    bus.add_sink(Box::new(a.clone()));
    bus.add_sink(Box::new(b.clone()));
    bus.add_sink(Box::new(TracingSink::new()));
    assert_eq!(bus.sink_count(), 3);
    assert_eq!(bus.sink_names(), vec!["vec_sink", "vec_sink", "tracing_sink"]);

    bus.emit(pass_event(1));
    bus.emit(pass_event(2));
    bus.flush();
    assert_eq!(a.len(), 2);
    assert_eq!(b.len(), 2);
}

#[test]
fn events_from_another_thread() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));
    let sender = bus.sender();
    std::thread::spawn(move || {
        for step in 0..4 {
            sender.send(pass_event(step)).unwrap();
        }
    })
    .join()
    .unwrap();
    bus.flush();
    assert_eq!(sink.len(), 4);
}

#[test]
fn pass_report_becomes_events() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    let report = PassReport {
        points: 10,
        segments: 20,
        pairs_tested: 30,
        pairs_excluded: 4,
        push_links: 5,
        pull_links: 1,
        cells: 27,
        grid_dims: [3, 3, 3],
        configured_range: Some(1.0),
        operative_range: 1.5,
        grid_rebuilt: true,
        range_adjusted: true,
    };
    bus.emit_pass(7, &report, 0.002);
    assert_eq!(bus.flush(), 3);

    let events = sink.events();
    assert_eq!(
        events[0].kind,
        EventKind::GridBuilt {
            dims: [3, 3, 3],
            cells: 27,
            width: 1.5,
        }
    );
    assert_eq!(
        events[1].kind,
        EventKind::RangeAdjusted {
            configured: Some(1.0),
            operative: 1.5,
        }
    );
    assert_eq!(events[2], pass_event(7));
}

#[test]
fn steady_pass_is_a_single_event() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    let report = PassReport {
        push_links: 2,
        ..PassReport::default()
    };
    bus.emit_pass(3, &report, 0.0);
    bus.flush();
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind.label(), "steric_pass");
}

// ─── Sink Tests ───────────────────────────────────────────────

#[test]
fn json_lines_sink_writes_one_line_per_event() {
    let buffer = SharedBuffer::default();
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(JsonLinesSink::new(Box::new(buffer.clone()))));
    bus.emit(StepEvent::new(
        3,
        EventKind::GridBuilt {
            dims: [12, 12, 12],
            cells: 1728,
            width: 1.5,
        },
    ));
    bus.emit(pass_event(3));
    bus.finish();

    let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: StepEvent = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first.step, 3);
    assert!(matches!(first.kind, EventKind::GridBuilt { cells: 1728, .. }));
}

// ─── Event Tests ──────────────────────────────────────────────

#[test]
fn event_serialization() {
    let event = StepEvent::new(
        5,
        EventKind::RangeAdjusted {
            configured: Some(1.0),
            operative: 1.414,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    let recovered: StepEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, event);
}

#[test]
fn event_labels() {
    assert_eq!(pass_event(0).kind.label(), "steric_pass");
    assert_eq!(EventKind::NoStericObjects.label(), "no_steric_objects");
    let custom = EventKind::Custom {
        label: "relax".into(),
        payload: "{}".into(),
    };
    assert_eq!(custom.label(), "relax");
}
