//! Benchmark runner: executes scenarios and collects metrics.
//!
//! Each step jitters every position of the scene, then runs one steric
//! pass into a [`LinkBuffer`]. Pass reports are forwarded to the event
//! bus as [`StepEvent`]s.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fibra_steric::{LinkBuffer, PassReport, StericDriver};
use fibra_telemetry::{EventBus, EventKind, StepEvent};
use fibra_types::FibraResult;
use tracing::info;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Run a single scenario, reporting to `bus`.
    ///
    /// The scenario's scene is left untouched; the run works on a copy.
    pub fn run(scenario: &Scenario, bus: &EventBus) -> FibraResult<BenchmarkMetrics> {
        let mut scene = scenario.scene.clone();
        scene.validate()?;
        let mut driver = StericDriver::new(scenario.config.clone())?;
        let mut rng = StdRng::seed_from_u64(scenario.seed);
        let mut links = LinkBuffer::new();
        let dims = scene.domain.dims();
        let steric = StericDriver::has_steric_objects(&scene);

        let mut pass_times: Vec<f64> = Vec::with_capacity(scenario.steps as usize);
        let mut total_pairs = 0usize;
        let mut total_push = 0usize;
        let mut total_links = 0usize;
        let mut rebuilds = 0u32;
        let mut last = PassReport::default();

        let total_start = Instant::now();

        for step in 0..scenario.steps {
            bus.emit(StepEvent::new(step, EventKind::StepBegin { sim_time: f64::from(step) }));
            let step_start = Instant::now();

            let jitter = scenario.jitter;
            if jitter > 0.0 {
                scene.for_each_position_mut(|p| {
                    for d in 0..dims {
                        p[d] += rng.gen_range(-jitter..=jitter);
                    }
                });
            }

            links.clear();
            let pass_start = Instant::now();
            let report = driver.step(&scene, &mut links)?;
            let pass_time = pass_start.elapsed().as_secs_f64();

            if steric {
                bus.emit_pass(step, &report, pass_time);
            } else {
                bus.emit(StepEvent::new(step, EventKind::NoStericObjects));
            }

            pass_times.push(pass_time);
            total_pairs += report.pairs_tested;
            total_push += report.push_links;
            total_links += report.links();
            if report.grid_rebuilt {
                rebuilds += 1;
            }
            last = report;

            bus.emit(StepEvent::new(
                step,
                EventKind::StepEnd {
                    wall_time: step_start.elapsed().as_secs_f64(),
                },
            ));
        }

        let total_wall_time = total_start.elapsed().as_secs_f64();

        let n = pass_times.len().max(1) as f64;
        let avg_pass = pass_times.iter().sum::<f64>() / n;
        let min_pass = pass_times.iter().copied().fold(f64::MAX, f64::min);
        let max_pass = pass_times.iter().copied().fold(0.0, f64::max);
        let push_fraction = if total_links > 0 {
            total_push as f64 / total_links as f64
        } else {
            0.0
        };

        info!(
            scenario = scenario.kind.name(),
            steps = scenario.steps,
            avg_pass_ms = avg_pass * 1e3,
            "benchmark finished"
        );

        Ok(BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            bodies: scene.body_count(),
            points: last.points,
            segments: last.segments,
            steps: scenario.steps,
            parallel: scenario.config.parallel,
            total_wall_time,
            avg_pass_time: avg_pass,
            min_pass_time: if pass_times.is_empty() { 0.0 } else { min_pass },
            max_pass_time: max_pass,
            avg_pairs_tested: total_pairs as f64 / n,
            avg_links: total_links as f64 / n,
            push_fraction,
            cells: last.cells,
            operative_range: last.operative_range,
            grid_rebuilds: rebuilds,
        })
    }

    /// Run every scenario and return metrics for each.
    pub fn run_all(bus: &EventBus, parallel: bool) -> FibraResult<Vec<BenchmarkMetrics>> {
        let mut results = Vec::new();
        for &kind in ScenarioKind::all() {
            let scenario = Scenario::from_kind(kind)?.with_parallel(parallel);
            results.push(Self::run(&scenario, bus)?);
        }
        Ok(results)
    }
}
