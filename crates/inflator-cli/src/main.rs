//! Inflator CLI - offline rendering and inspection of the inflator chain.

mod commands;
mod settings;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "inflator")]
#[command(author, version, about = "Inflator waveshaper CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the full chain
    Process(commands::process::ProcessArgs),

    /// Print the blended transfer curve
    Curves(commands::curves::CurvesArgs),

    /// Print the latency of every oversampling ratio
    Latency(commands::latency::LatencyArgs),

    /// Print the default settings as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Curves(args) => commands::curves::run(args),
        Commands::Latency(args) => commands::latency::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
