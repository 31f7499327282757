//! CLI for streamcorr — streaming pairwise correlation matrices.

mod commands;
mod driver;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "streamcorr")]
#[command(about = "streamcorr — streaming pairwise correlation matrices")]
#[command(version = streamcorr_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dataflow graph a configuration would build
    Plan {
        /// Number of generated streams (matrix dimension)
        #[arg(long, default_value = "10")]
        variables: usize,

        /// Print the full topology as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the pipeline and pump it to completion
    Run {
        /// Number of generated streams (matrix dimension)
        #[arg(long, default_value = "10")]
        variables: usize,

        /// Target samples per second for each stream
        #[arg(long, default_value = "100.0")]
        rate: f64,

        /// Samples required per channel before an operator fires
        #[arg(long, default_value = "5")]
        window: usize,

        /// Total samples each stream produces
        #[arg(long, default_value = "15")]
        iterations: u64,

        /// Seed for reproducible runs (per-stream seeds are derived)
        #[arg(long)]
        seed: Option<u64>,

        /// Incomplete batches the aggregator retains before evicting the oldest
        #[arg(long, default_value = "64")]
        max_pending: usize,

        /// Write completed matrices as JSON
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan { variables, json } => commands::plan::run(variables, json),
        Commands::Run {
            variables,
            rate,
            window,
            iterations,
            seed,
            max_pending,
            output,
        } => commands::run::run(commands::run::RunCommandConfig {
            variables,
            rate,
            window,
            iterations,
            seed,
            max_pending,
            output,
        }),
    }
}
