//! CLI module
//!
//! This module defines the command-line interface using clap and implements
//! the command execution logic.

use crate::{Config, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

pub mod commands;
pub mod output;

/// Finite-automaton engine CLI
#[derive(Parser, Debug)]
#[command(name = "automata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "AUTOMATA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print structural statistics of an automaton
    Inspect {
        /// GraphML document or snapshot
        input: PathBuf,

        /// Input format
        #[arg(short, long, value_enum, default_value = "auto")]
        format: InputFormat,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Feed characters to an automaton from its start state
    Run {
        /// GraphML document or snapshot
        input: PathBuf,

        /// Symbols to consume, one per character
        symbols: String,

        /// Input format
        #[arg(short, long, value_enum, default_value = "auto")]
        format: InputFormat,
    },

    /// Convert an automaton to another format
    Convert {
        /// GraphML document or snapshot
        input: PathBuf,

        /// Destination file
        output: PathBuf,

        /// Target format
        #[arg(short, long, value_enum)]
        to: TargetFormat,

        /// Input format
        #[arg(short, long, value_enum, default_value = "auto")]
        format: InputFormat,
    },

    /// Render an automaton as Graphviz DOT
    Render {
        /// GraphML document or snapshot
        input: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input format
        #[arg(short, long, value_enum, default_value = "auto")]
        format: InputFormat,
    },
}

/// Input format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Guess from the file extension
    Auto,
    /// GraphML document
    Graphml,
    /// Binary snapshot
    Snapshot,
}

impl InputFormat {
    /// Resolve `Auto` by extension: `.snap` and `.bin` are snapshots.
    pub fn resolve(self, path: &Path) -> InputFormat {
        match self {
            InputFormat::Auto => match path.extension().and_then(|e| e.to_str()) {
                Some("snap") | Some("bin") => InputFormat::Snapshot,
                _ => InputFormat::Graphml,
            },
            other => other,
        }
    }
}

/// Conversion target types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetFormat {
    /// GraphML document
    Graphml,
    /// Binary snapshot
    Snapshot,
    /// DOT format (Graphviz)
    Dot,
}

/// Execute the CLI command
pub fn execute(args: Cli, config: Config) -> Result<()> {
    match args.command {
        Commands::Inspect {
            input,
            format,
            json,
        } => commands::inspect::execute(&input, format, json),
        Commands::Run {
            input,
            symbols,
            format,
        } => commands::run::execute(&input, &symbols, format),
        Commands::Convert {
            input,
            output,
            to,
            format,
        } => commands::convert::execute(&input, &output, to, format, &config),
        Commands::Render {
            input,
            output,
            format,
        } => commands::render::execute(&input, output.as_deref(), format, &config),
    }
}
