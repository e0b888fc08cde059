//! Strictly Chess - terminal client
//!
//! Plays a human against a remote move service from the command line.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strictly_chess::{
    Engine, HELP, HttpMoveService, InputError, SessionCommand, SessionConfig, SessionEvent,
    SessionRunner, SessionView, TerminalInput, parse_input, render_event, render_history,
    render_view,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            choose_color,
            engine,
            endpoint,
            log_file,
        } => {
            init_tracing(log_file.as_deref())?;
            let config = load_config(config, choose_color, engine, endpoint)?;
            run_play(config).await
        }
    }
}

/// Sends logs to `log_file`, or stderr when absent.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Layers the config file, the environment and CLI flags.
#[instrument]
fn load_config(
    path: Option<PathBuf>,
    choose_color: bool,
    engine: Option<Engine>,
    endpoint: Option<String>,
) -> Result<SessionConfig> {
    let mut config = match path {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    }
    .with_env_overrides();

    if choose_color {
        config = config.with_allow_color_choice(true);
    }
    if let Some(engine) = engine {
        config = config.with_engine(engine);
    }
    if let Some(endpoint) = endpoint {
        config = config.with_endpoint(endpoint);
    }
    Ok(config)
}

/// Runs the session loop and the stdin reader until `quit` or end of input.
async fn run_play(config: SessionConfig) -> Result<()> {
    info!(url = %config.move_service_url(), "Starting terminal session");

    let service = Arc::new(HttpMoveService::new(config.move_service_url()));
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let runner = SessionRunner::from_config(&config, service, event_tx)?;
    let session = tokio::spawn(runner.run(command_rx));

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_view: Option<SessionView> = None;

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => {
                if let SessionEvent::StateChanged(view) = &event {
                    last_view = Some(view.clone());
                }
                if let Some(text) = render_event(&event) {
                    println!("{text}");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Ok(TerminalInput::Quit) => break,
                    Ok(TerminalInput::Help) => println!("{HELP}"),
                    Ok(TerminalInput::ShowBoard) => {
                        if let Some(view) = &last_view {
                            println!("{}", render_view(view));
                        }
                    }
                    Ok(TerminalInput::ShowHistory) => {
                        if let Some(view) = &last_view {
                            println!("{}", render_history(view));
                        }
                    }
                    Ok(TerminalInput::Command(command)) => command_tx.send(command)?,
                    Err(InputError::Empty) => {}
                    Err(e) => println!("{e}"),
                }
            }
        }
    }

    // The loop may already have stopped; a closed channel is fine here.
    let _ = command_tx.send(SessionCommand::Shutdown);
    session.await?;
    info!("Terminal session ended");
    Ok(())
}
