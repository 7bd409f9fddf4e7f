//! polyanalog CLI - render, inspect and manage sounds for the polyanalog synth engine.

mod commands;
mod script;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "polyanalog")]
#[command(author, version, about = "Polyanalog synth engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an event script to a WAV file
    Render(commands::render::RenderArgs),

    /// List the engine parameters
    Params(commands::params::ParamsArgs),

    /// Manage the preset bank
    Preset(commands::preset::PresetArgs),

    /// Show WAV file information
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Params(args) => commands::params::run(args),
        Commands::Preset(args) => commands::preset::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
