//! Benchmark metrics: data collected during a benchmark run.

use serde::{Deserialize, Serialize};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Objects in the scene.
    pub bodies: usize,
    /// Point records per pass.
    pub points: usize,
    /// Segment records per pass.
    pub segments: usize,
    /// Passes executed.
    pub steps: u32,
    /// Whether cells were traversed in parallel.
    pub parallel: bool,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    /// Average pass time (seconds).
    pub avg_pass_time: f64,
    /// Fastest pass.
    pub min_pass_time: f64,
    /// Slowest pass.
    pub max_pass_time: f64,
    /// Average candidate pairs tested per pass.
    pub avg_pairs_tested: f64,
    /// Average links per pass.
    pub avg_links: f64,
    /// Fraction of links in the push regime.
    pub push_fraction: f64,
    /// Grid cells in the last pass.
    pub cells: usize,
    /// Operative cell width in the last pass.
    pub operative_range: f32,
    /// Number of passes that rebuilt the grid.
    pub grid_rebuilds: u32,
}

impl BenchmarkMetrics {
    /// CSV header line.
    pub fn to_csv_header() -> String {
        "scenario,bodies,points,segments,steps,parallel,total_wall_time_s,avg_pass_ms,min_pass_ms,max_pass_ms,avg_pairs,avg_links,push_fraction,cells,operative_range,grid_rebuilds".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.1},{:.1},{:.3},{},{:.4},{}",
            self.scenario,
            self.bodies,
            self.points,
            self.segments,
            self.steps,
            self.parallel,
            self.total_wall_time,
            self.avg_pass_time * 1000.0,
            self.min_pass_time * 1000.0,
            self.max_pass_time * 1000.0,
            self.avg_pairs_tested,
            self.avg_links,
            self.push_fraction,
            self.cells,
            self.operative_range,
            self.grid_rebuilds,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }
}
