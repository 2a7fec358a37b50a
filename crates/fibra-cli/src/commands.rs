//! CLI command implementations.

use fibra_bench::metrics::BenchmarkMetrics;
use fibra_bench::runner::BenchmarkRunner;
use fibra_bench::scenarios::{Scenario, ScenarioKind};
use fibra_bench::RunFile;
use fibra_model::Scene;
use fibra_steric::{size_grid, SpatialGrid, StericConfig, StericDriver};
use fibra_telemetry::{EventBus, TracingSink};

fn lookup(name: &str) -> Result<ScenarioKind, Box<dyn std::error::Error>> {
    ScenarioKind::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
        format!("Unknown scenario: '{name}'. Available: {}", names.join(", ")).into()
    })
}

fn print_metrics(metrics: &BenchmarkMetrics) {
    println!("  Wall time:     {:.3}s", metrics.total_wall_time);
    println!("  Avg pass:      {:.3}ms", metrics.avg_pass_time * 1000.0);
    println!("  Cells:         {}", metrics.cells);
    println!("  Range:         {:.4}", metrics.operative_range);
    println!("  Avg pairs:     {:.1}", metrics.avg_pairs_tested);
    println!("  Avg links:     {:.1} ({:.0}% push)", metrics.avg_links, metrics.push_fraction * 100.0);
    println!();
}

/// Run benchmark suite.
pub fn benchmark(
    scenario_name: &str,
    output_path: Option<&str>,
    parallel: bool,
    steps: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Fibra Benchmark Suite");
    println!("═════════════════════");
    println!();

    let scenarios: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        vec![lookup(scenario_name)?]
    };

    let mut bus = EventBus::new();
    bus.add_sink(Box::new(TracingSink::new()));

    let mut all_metrics = Vec::new();
    for &kind in &scenarios {
        let mut scenario = Scenario::from_kind(kind)?.with_parallel(parallel);
        if let Some(steps) = steps {
            scenario = scenario.with_steps(steps);
        }

        println!(
            "Running: {} ({} bodies, {} passes{})",
            kind.name(),
            scenario.scene.body_count(),
            scenario.steps,
            if parallel { ", parallel" } else { "" },
        );

        let metrics = BenchmarkRunner::run(&scenario, &bus).map_err(|e| format!("Benchmark failed: {e}"))?;
        bus.flush();
        print_metrics(&metrics);
        all_metrics.push(metrics);
    }
    bus.finish();

    let csv = BenchmarkMetrics::to_csv(&all_metrics);
    if let Some(path) = output_path {
        std::fs::write(path, &csv)?;
        println!("Results written to: {path}");
    } else {
        println!("CSV Output:");
        println!("{csv}");
    }

    Ok(())
}

/// Print the grid a scenario would be given on its first pass.
pub fn grid(scenario_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Fibra Grid Inspector");
    println!("────────────────────");
    println!();

    let scenario = Scenario::from_kind(lookup(scenario_name)?)?;
    let required = StericDriver::estimate_required_range(&scenario.scene);
    let config = &scenario.config;
    let sizing = size_grid(&scenario.scene.domain, required, config.max_range, config.max_cells)?;
    let grid = SpatialGrid::new(sizing.geometry)?;

    println!("Scenario:      {}", scenario_name);
    println!("Required:      {required:.4}");
    if let Some(user) = config.max_range {
        println!("Configured:    {user:.4}");
    }
    println!("Operative:     {:.4} ({} coarsening steps)", sizing.width, sizing.coarsening_steps);
    println!("{}", grid.summary());

    let cells = grid.cell_count();
    let (mut total, mut widest) = (0usize, 0usize);
    for cell in 0..cells {
        let n = grid.forward_neighbours(cell).count();
        total += n;
        widest = widest.max(n);
    }
    println!(
        "Regions:       {:.2} forward neighbours per cell (max {widest}, {total} cell pairs)",
        total as f64 / cells.max(1) as f64
    );

    Ok(())
}

/// Run a scenario described by a TOML run file.
pub fn run(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Fibra Run");
    println!("─────────");
    println!("Run file: {path}");
    println!();

    let scenario = RunFile::load(path)?.scenario()?;

    let mut bus = EventBus::new();
    bus.add_sink(Box::new(TracingSink::new()));

    println!("Running: {} ({} passes)", scenario.kind.name(), scenario.steps);
    let metrics = BenchmarkRunner::run(&scenario, &bus)?;
    bus.finish();
    print_metrics(&metrics);

    Ok(())
}

/// Validate a steric config, a run file or a scene.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Fibra Validator");
    println!("───────────────");
    println!();

    if path.ends_with(".toml") {
        let content = std::fs::read_to_string(path)?;
        if let Ok(file) = RunFile::from_toml(&content) {
            println!("Validating run file: {path}");
            match file.scenario() {
                Ok(s) => println!("✅ Run file is valid ({}, {} passes).", s.kind.name(), s.steps),
                Err(e) => println!("❌ Run file validation failed: {e}"),
            }
        } else {
            println!("Validating steric config: {path}");
            let config: StericConfig = toml::from_str(&content)?;
            match config.validate().and_then(|_| config.params()) {
                Ok(p) => println!("✅ Config is valid (push {}, pull {}).", p.push, p.pull),
                Err(e) => println!("❌ Config validation failed: {e}"),
            }
        }
    } else if path.ends_with(".json") {
        println!("Validating scene: {path}");
        let content = std::fs::read_to_string(path)?;
        let scene: Scene = serde_json::from_str(&content)?;
        match scene.validate() {
            Ok(()) => println!(
                "✅ Scene is valid ({} bodies, required steric range {:.4}).",
                scene.body_count(),
                StericDriver::estimate_required_range(&scene)
            ),
            Err(e) => println!("❌ Scene validation failed: {e}"),
        }
    } else {
        println!("Unsupported file format. Use .toml (config or run file) or .json (scene).");
    }

    Ok(())
}
