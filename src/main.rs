//! scc-fuzz - differential fuzzing of the iterative SCC solver
//!
//! Generates random CSR graphs, solves each with the crate's Tarjan and with
//! a petgraph reference, and stops at the first disagreement after writing
//! the failing graph to disk.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scc_fast::config::HarnessConfig;
use scc_fast::reference::ReferenceKind;
use scc_fast::{DifferentialHarness, HarnessError};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Differential SCC fuzzer
#[derive(Parser, Debug)]
#[command(name = "scc-fuzz")]
#[command(
    version,
    about = "Fuzz the iterative SCC solver against petgraph on random CSR graphs",
    after_help = "\
Examples:
  scc-fuzz --nodes 1000000 --degree 6 --seed 1       One large graph
  scc-fuzz --nodes 5000 --iterations 500 --parallel  Many small graphs on all cores
  scc-fuzz --config scc-fuzz.toml                    Settings from a TOML file
  scc-fuzz replay scc-failures/seed-17               Re-check a saved failure"
)]
struct Cli {
    /// TOML config file; flags below override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG wins if set
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    log_level: String,

    /// Reference solver (petgraph): kosaraju
    #[arg(long, global = true)]
    reference: Option<ReferenceKind>,

    /// Nodes per graph (N)
    #[arg(long, short = 'n')]
    nodes: Option<usize>,

    /// Exclusive out-degree bound (k)
    #[arg(long, short = 'k')]
    degree: Option<usize>,

    /// Base seed; iteration i uses seed + i
    #[arg(long, short = 's')]
    seed: Option<u64>,

    /// Number of graphs to check
    #[arg(long, short = 'i')]
    iterations: Option<u64>,

    /// Check graphs concurrently
    #[arg(long)]
    parallel: bool,

    /// Directory for failure reproductions
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Re-run both solvers on a saved indptr.npy / indices.npy pair
    Replay {
        /// Directory holding the reproduction
        dir: PathBuf,
    },
}

impl Cli {
    fn harness_config(&self) -> Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => HarnessConfig::default(),
        };
        if let Some(nodes) = self.nodes {
            config.node_count = nodes;
        }
        if let Some(degree) = self.degree {
            config.degree_bound = degree;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if self.parallel {
            config.parallel = true;
        }
        if let Some(reference) = self.reference {
            config.reference = reference;
        }
        if let Some(out) = &self.out {
            config.artifact_dir = out.clone();
        }
        Ok(config)
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = cli.harness_config()?;
    let harness = DifferentialHarness::new(config);

    let outcome = match &cli.command {
        Some(Commands::Replay { dir }) => harness.replay(dir).map(|run| {
            info!(
                nodes = run.node_count,
                edges = run.edge_count,
                components = run.components,
                "replayed graph: solvers agree"
            );
        }),
        None => harness.run().map(|session| {
            println!(
                "{} graphs, {} nodes, {} edges, {} components: all agree",
                session.graphs, session.nodes, session.edges, session.components
            );
        }),
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(HarnessError::Mismatch(mismatch)) => {
            eprintln!("MISMATCH: {}", mismatch);
            for file in &mismatch.files {
                eprintln!("  {}", file.display());
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
