//! Unified `latenso` command-line interface
//!
//! # Commands
//!
//! - `afd simulate <scenario>` - Dense serving view of an analytic run
//! - `large-ep evaluate <scenario>` - Expert-parallel view of the same run
//!
//! Both commands take the runtime shape on the command line (`--batch`,
//! `--seq`, optional `--micro-batch` and `--tokens-per-expert`), print the
//! per-layer table and totals to stdout, and optionally dump the raw result
//! as JSON. Passing `--model` swaps the analytic backend for the
//! fallback-wrapped learned backend. `RUST_LOG` controls log verbosity;
//! logs go to stderr so tables stay pipeable.

#![deny(warnings)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use latenso_core::{RuntimeShape, SimulationResult};
use latenso_scenario::{
    load_scenario, render_dense_table, render_expert_parallel_table, render_totals,
    result_to_json, Scenario,
};
use latenso_sim::{
    simulate, AnalyticBackend, EstimatorBackend, FallbackBackend, LearnedBackend,
    LearnedLatencyModel,
};

#[derive(Debug, Parser)]
#[command(name = "latenso", about = "Analytic latency simulation for LLM serving", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Attention-FFN disaggregation workflows
    Afd {
        #[command(subcommand)]
        command: AfdCommands,
    },
    /// Large expert-parallel workflows
    #[command(name = "large-ep")]
    LargeEp {
        #[command(subcommand)]
        command: LargeEpCommands,
    },
}

#[derive(Debug, Subcommand)]
enum AfdCommands {
    /// Run the analytic AFD simulation
    Simulate(SimulateArgs),
}

#[derive(Debug, Subcommand)]
enum LargeEpCommands {
    /// Run the expert-parallel analytic simulation
    Evaluate(SimulateArgs),
}

#[derive(Debug, Args)]
struct SimulateArgs {
    /// Path to the scenario YAML
    scenario: PathBuf,

    /// Batch size
    #[arg(long)]
    batch: u32,

    /// Sequence length
    #[arg(long)]
    seq: u32,

    /// Micro-batch split for pipelined serving
    #[arg(long)]
    micro_batch: Option<u32>,

    /// Tokens routed to each expert, overriding the configured average
    #[arg(long)]
    tokens_per_expert: Option<f64>,

    /// Learned regressor weights (JSON); runs the fallback-wrapped
    /// learned backend instead of the analytic one
    #[arg(long)]
    model: Option<PathBuf>,

    /// Dump the raw result as pretty JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl SimulateArgs {
    fn runtime(&self) -> RuntimeShape {
        RuntimeShape {
            batch_size: self.batch,
            seq_len: self.seq,
            micro_batch: self.micro_batch,
            tokens_per_expert: self.tokens_per_expert,
        }
    }
}

/// Which per-layer table the workflow renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableView {
    Dense,
    ExpertParallel,
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Afd {
            command: AfdCommands::Simulate(args),
        } => run_simulation(&args, TableView::Dense),
        Commands::LargeEp {
            command: LargeEpCommands::Evaluate(args),
        } => run_simulation(&args, TableView::ExpertParallel),
    }
}

fn run_simulation(args: &SimulateArgs, view: TableView) -> Result<()> {
    let scenario = load_scenario(&args.scenario)?;
    let runtime = args.runtime();
    let backend = build_backend(args.model.as_deref())?;
    debug!(backend = backend.name(), "selected estimator backend");
    let result = simulate(&scenario.layers, &scenario.hardware, &runtime, backend.as_ref())
        .with_context(|| format!("simulation of scenario `{}` failed", scenario.name))?;
    print_report(&scenario, &result, view, args.output.as_deref())
}

fn build_backend(model_path: Option<&Path>) -> Result<Box<dyn EstimatorBackend>> {
    match model_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read model weights {}", path.display()))?;
            let model: LearnedLatencyModel = serde_json::from_str(&text)
                .with_context(|| format!("failed to parse model weights {}", path.display()))?;
            Ok(Box::new(FallbackBackend::new(LearnedBackend::new(model))))
        }
        None => Ok(Box::new(AnalyticBackend)),
    }
}

fn print_report(
    scenario: &Scenario,
    result: &SimulationResult,
    view: TableView,
    output: Option<&Path>,
) -> Result<()> {
    println!("Scenario: {}", scenario.name);
    println!("Hardware: {}", scenario.hardware.name);
    let table = match view {
        TableView::Dense => render_dense_table(result),
        TableView::ExpertParallel => render_expert_parallel_table(result),
    };
    println!("{table}");
    println!();
    println!("{}", render_totals(result));

    if let Some(path) = output {
        let json = result_to_json(result)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write result to {}", path.display()))?;
        println!();
        println!("Saved raw result to {}", path.display());
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}
