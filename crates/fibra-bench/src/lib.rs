//! # fibra-bench
//!
//! Benchmark suite for the steric engine.
//!
//! Provides 3 procedural scenarios, a runner that jitters the scene
//! between passes and times them, and CSV export for regression tracking.

pub mod metrics;
pub mod run_file;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use run_file::RunFile;
pub use runner::BenchmarkRunner;
pub use scenarios::{Scenario, ScenarioKind};
