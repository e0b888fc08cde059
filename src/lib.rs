//! Strictly Chess library - a human plays chess against a remote move service
//!
//! The session controller owns the authoritative game, enforces whose turn it
//! is, and never trusts a move it did not validate itself.
//!
//! # Architecture
//!
//! - **Games**: position state, move application and history (rules from `shakmaty`)
//! - **Highlight**: pure selection → square-style mapping
//! - **Bot**: request lifecycle and the HTTP move service client
//! - **Session**: color choice, turn alternation, busy gate, game over
//! - **Runner**: async loop pairing a session with a move service
//! - **View / Terminal**: board snapshots and a line-oriented front-end
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_chess::{HttpMoveService, SessionCommand, SessionConfig, SessionRunner};
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SessionConfig::default();
//! let service = Arc::new(HttpMoveService::new(config.move_service_url()));
//! let (event_tx, _event_rx) = mpsc::unbounded_channel();
//! let (command_tx, command_rx) = mpsc::unbounded_channel();
//!
//! let runner = SessionRunner::from_config(&config, service, event_tx)?;
//! command_tx.send(SessionCommand::Shutdown)?;
//! runner.run(command_rx).await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod bot;
mod config;
mod games;
mod highlight;
mod runner;
mod session;
mod terminal;
mod view;

// Crate-level exports - Chess
pub use games::chess::{
    AlternatingTurnInvariant, ChessInvariants, DrawReason, Game, GameStatus, History, Invariant,
    InvariantSet, InvariantViolation, Move, MoveError, MovePair, MoveToken, Position, Role, Side,
    Square, TurnParityInvariant,
};

// Crate-level exports - Highlighting
pub use highlight::{HighlightMap, StyleTag, compute_highlights};

// Crate-level exports - Bot
pub use bot::{
    BotOrchestrator, BotPhase, BotTicket, HttpMoveService, MoveRequest, MoveResponse, MoveService,
    MoveServiceError,
};

// Crate-level exports - Session
pub use session::{
    BotOutcome, ClickOutcome, ControllerOptions, SessionController, SessionError, SessionPhase,
    SessionState,
};

// Crate-level exports - Runner
pub use runner::{SessionCommand, SessionEvent, SessionRunner, SessionView};

// Crate-level exports - Configuration
pub use config::{ConfigError, Engine, MOVE_SERVICE_URL_ENV, SessionConfig};

// Crate-level exports - View
pub use view::{BoardSnapshot, render_board};

// Crate-level exports - Terminal front-end
pub use terminal::{
    HELP, InputError, TerminalInput, parse_input, render_event, render_history, render_view,
};
