//! Chess position state, move application and history.
//!
//! Rules come from `shakmaty`; this module decides who may move, validates
//! untrusted move tokens and keeps the display history.

mod game;
mod history;
mod invariants;
mod moves;
mod position;
mod types;

pub use game::Game;
pub use history::{History, MovePair};
pub use invariants::{
    AlternatingTurnInvariant, ChessInvariants, Invariant, InvariantSet, InvariantViolation,
    TurnParityInvariant,
};
pub use moves::{Move, MoveError, MoveToken};
pub use position::Position;
pub use shakmaty::{Role, Square};
pub use types::{DrawReason, GameStatus, Side};
