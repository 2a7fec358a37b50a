//! Fibra CLI: steric benchmarks, grid inspection and input validation.
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=fibra_steric=debug`) to see per-pass logs.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "fibra")]
#[command(version, about = "Fibra: steric interactions for cytoskeleton simulations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark suite.
    Benchmark {
        /// Which scenario to run (bead_suspension, fiber_network, aster, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Output CSV file path.
        #[arg(short, long)]
        output: Option<String>,

        /// Traverse cells on the rayon thread pool.
        #[arg(long)]
        parallel: bool,

        /// Override the number of passes per scenario.
        #[arg(long)]
        steps: Option<u32>,
    },

    /// Print the grid a scenario would use.
    Grid {
        /// Scenario name.
        #[arg(short, long, default_value = "bead_suspension")]
        scenario: String,
    },

    /// Run a scenario described by a TOML run file.
    Run {
        /// Path to the run file.
        path: String,
    },

    /// Validate a steric config / run file (TOML) or a scene (JSON).
    Validate {
        /// Path to the input file.
        path: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Benchmark {
            scenario,
            output,
            parallel,
            steps,
        } => commands::benchmark(&scenario, output.as_deref(), parallel, steps),
        Commands::Grid { scenario } => commands::grid(&scenario),
        Commands::Run { path } => commands::run(&path),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
