//! Move applier: the only code path that advances the position.

use super::history::History;
use super::invariants::assert_invariants;
use super::moves::{Move, MoveError, MoveToken};
use super::position::Position;
use super::types::{DrawReason, GameStatus, Side};
use shakmaty::Square;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, instrument, warn};

/// Current position plus the history that led to it.
#[derive(Debug, Clone)]
pub struct Game {
    start: Position,
    position: Position,
    history: History,
    seen: HashMap<String, u8>,
}

impl Game {
    /// Creates a game from the standard starting position.
    #[instrument]
    pub fn new() -> Self {
        Self::from_position(Position::new())
    }

    /// Creates a game starting from `start`.
    #[instrument(skip(start), fields(fen = %start.fen()))]
    pub fn from_position(start: Position) -> Self {
        let mut seen = HashMap::new();
        seen.insert(start.repetition_key(), 1);
        Self {
            history: History::starting_with(start.side_to_move()),
            position: start.clone(),
            start,
            seen,
        }
    }

    /// The current position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Moves played so far.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Side to move.
    pub fn turn(&self) -> Side {
        self.position.side_to_move()
    }

    /// Serialized current position.
    pub fn fen(&self) -> String {
        self.position.fen()
    }

    /// Game status, including threefold repetition.
    pub fn status(&self) -> GameStatus {
        match self.position.status() {
            GameStatus::InProgress if self.repetitions() >= 3 => {
                GameStatus::Draw(DrawReason::ThreefoldRepetition)
            }
            status => status,
        }
    }

    /// Squares the piece on `square` may move to.
    ///
    /// Empty when the square is empty, holds a piece of the side not to move,
    /// or the game is over.
    pub fn select_legal_targets(&self, square: Square) -> BTreeSet<Square> {
        if self.status().is_terminal() {
            return BTreeSet::new();
        }
        self.position.legal_targets_from(square)
    }

    /// Plays a move made on the board.
    ///
    /// A pawn reaching the last rank promotes to a queen.
    #[instrument(skip(self), fields(from = %from, to = %to))]
    pub fn apply_local_move(&mut self, from: Square, to: Square) -> Result<Move, MoveError> {
        self.commit(MoveToken::new(from, to, None))
    }

    /// Plays a move suggested by the move service.
    ///
    /// The token is checked against a freshly computed legal-move set before
    /// anything is applied. The promotion letter only has to match when the
    /// from/to pair is a promotion.
    #[instrument(skip(self))]
    pub fn apply_remote_move(&mut self, token: &str) -> Result<Move, MoveError> {
        let parsed = MoveToken::parse(token).map_err(|e| {
            warn!(token, error = %e, "Rejecting malformed external move");
            MoveError::IllegalExternalMove(token.to_string())
        })?;

        let legal = self.position.legal_moves();
        let pair: Vec<&MoveToken> = legal
            .iter()
            .filter(|m| m.from() == parsed.from() && m.to() == parsed.to())
            .collect();
        let is_promotion = pair.iter().any(|m| m.promotion().is_some());
        let is_member = if is_promotion {
            match parsed.promotion() {
                Some(role) => pair.iter().any(|m| m.promotion() == Some(role)),
                None => true,
            }
        } else {
            !pair.is_empty()
        };

        if !is_member || self.status().is_terminal() {
            warn!(token, legal_count = legal.len(), "Rejecting illegal external move");
            return Err(MoveError::IllegalExternalMove(token.to_string()));
        }

        self.commit(parsed)
            .map_err(|_| MoveError::IllegalExternalMove(token.to_string()))
    }

    /// Restores the starting position and clears the history.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        info!("Resetting game");
        *self = Self::from_position(self.start.clone());
    }

    fn commit(&mut self, token: MoveToken) -> Result<Move, MoveError> {
        if self.status().is_terminal() {
            debug!("Move attempted after game over");
            return Err(MoveError::GameOver);
        }

        let mv = self.position.apply(token)?;
        self.history.push(mv.clone());
        *self.seen.entry(self.position.repetition_key()).or_insert(0) += 1;

        info!(
            san = %mv.san(),
            side = %mv.side(),
            ply = self.history.len(),
            status = ?self.status(),
            "Move applied"
        );

        assert_invariants(self);
        Ok(mv)
    }

    fn repetitions(&self) -> u8 {
        self.seen
            .get(&self.position.repetition_key())
            .copied()
            .unwrap_or(0)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
