//! Command-line interface for strictly_chess.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strictly_chess::Engine;

/// Strictly Chess - play chess against a remote move service
#[derive(Parser, Debug)]
#[command(name = "strictly_chess")]
#[command(about = "Play chess in the terminal against a remote move service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game in the terminal
    Play {
        /// Path to a TOML session config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pick a side before the game starts
        #[arg(long)]
        choose_color: bool,

        /// Move service engine profile
        #[arg(long, value_enum)]
        engine: Option<Engine>,

        /// Full move service URL, overriding base URL and engine
        #[arg(long)]
        endpoint: Option<String>,

        /// Write logs to this file instead of stderr
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
}
