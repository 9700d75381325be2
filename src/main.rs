//! Finite-automaton engine CLI

use automata_engine::{Config, Result, VERSION, cli, init_logging};
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let config = if let Some(config_path) = &args.config {
        Config::from_file(config_path)?
    } else {
        Config::load()?
    };

    // RUST_LOG still overrides the configured level
    init_logging(&config.logging.level);

    tracing::info!("Automata engine v{}", VERSION);
    tracing::debug!("Parsed arguments: {:?}", args);
    tracing::debug!("Loaded configuration: {:?}", config);

    cli::execute(args, config)?;

    Ok(())
}
