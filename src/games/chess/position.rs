//! Authoritative position state backed by the `shakmaty` rules engine.

use super::moves::{Move, MoveError, MoveToken};
use super::types::{DrawReason, GameStatus, Side};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, EnPassantMode, File, Position as _, Role, Square};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// A legal move addressed the way board gestures and move tokens address it.
#[derive(Debug, Clone)]
struct Candidate {
    token: MoveToken,
    capture: bool,
    raw: shakmaty::Move,
}

impl Candidate {
    fn from_rules_move(raw: shakmaty::Move) -> Option<Self> {
        let (from, to, promotion, capture) = match &raw {
            shakmaty::Move::Normal {
                from,
                to,
                capture,
                promotion,
                ..
            } => (*from, *to, *promotion, capture.is_some()),
            shakmaty::Move::EnPassant { from, to, .. } => (*from, *to, None, true),
            shakmaty::Move::Castle { king, rook, .. } => {
                // Castling is addressed king square to king destination.
                let file = if rook.file() == File::H { File::G } else { File::C };
                (*king, Square::from_coords(file, king.rank()), None, false)
            }
            shakmaty::Move::Put { .. } => return None,
        };

        Some(Self {
            token: MoveToken::new(from, to, promotion),
            capture,
            raw,
        })
    }
}

/// Board, side to move and clocks of the game in progress.
///
/// Read access is public. Only the move applier ([`super::Game`]) advances it.
#[derive(Debug, Clone)]
pub struct Position {
    chess: Chess,
}

impl Position {
    /// The standard starting position.
    pub fn new() -> Self {
        Self {
            chess: Chess::default(),
        }
    }

    /// Loads a position from FEN.
    #[instrument]
    pub fn from_fen(fen: &str) -> Result<Self, MoveError> {
        let parsed = fen
            .parse::<Fen>()
            .map_err(|e| MoveError::InvalidPosition(e.to_string()))?;
        let chess: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| MoveError::InvalidPosition(e.to_string()))?;
        Ok(Self { chess })
    }

    /// Side to move.
    pub fn side_to_move(&self) -> Side {
        self.chess.turn().into()
    }

    /// Side and role of the piece on `square`, if any.
    pub fn piece_at(&self, square: Square) -> Option<(Side, Role)> {
        self.chess
            .board()
            .piece_at(square)
            .map(|piece| (piece.color.into(), piece.role))
    }

    /// Whether the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.chess.is_check()
    }

    /// Every legal move for the side to move.
    ///
    /// A pawn reaching the last rank yields one token per promotion piece.
    pub fn legal_moves(&self) -> Vec<MoveToken> {
        self.candidates().into_iter().map(|c| c.token).collect()
    }

    /// Destination squares reachable from `square` by the side to move.
    pub fn legal_targets_from(&self, square: Square) -> BTreeSet<Square> {
        self.candidates()
            .into_iter()
            .filter(|c| c.token.from() == square)
            .map(|c| c.token.to())
            .collect()
    }

    /// Whether moving from `from` to `to` is a legal capture.
    pub fn is_capture(&self, from: Square, to: Square) -> bool {
        self.candidates()
            .iter()
            .any(|c| c.token.from() == from && c.token.to() == to && c.capture)
    }

    /// Classifies the position as running or finished.
    ///
    /// Repetition is not visible from a single position; [`super::Game`]
    /// layers threefold detection on top.
    pub fn status(&self) -> GameStatus {
        if self.chess.is_checkmate() {
            GameStatus::Checkmate {
                winner: self.side_to_move().opponent(),
            }
        } else if self.chess.is_stalemate() {
            GameStatus::Draw(DrawReason::Stalemate)
        } else if self.chess.is_insufficient_material() {
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        } else if self.chess.halfmoves() >= 100 {
            GameStatus::Draw(DrawReason::FiftyMoveRule)
        } else if self.chess.legal_moves().is_empty() {
            GameStatus::Other
        } else {
            GameStatus::InProgress
        }
    }

    /// Portable position string (FEN).
    pub fn fen(&self) -> String {
        Fen::from_position(&self.chess, EnPassantMode::Legal).to_string()
    }

    /// FEN without the move clocks; equal keys mean a repeated position.
    pub(crate) fn repetition_key(&self) -> String {
        self.fen()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Applies a move addressed by `token`.
    ///
    /// When the from/to pair is a promotion, the requested piece must be one
    /// of the legal choices and defaults to a queen when absent. For any other
    /// pair the promotion letter is ignored. On error the position is left
    /// untouched.
    #[instrument(skip(self), fields(token = %token))]
    pub(crate) fn apply(&mut self, token: MoveToken) -> Result<Move, MoveError> {
        let illegal = MoveError::IllegalMove {
            from: token.from(),
            to: token.to(),
        };

        let matching: Vec<Candidate> = self
            .candidates()
            .into_iter()
            .filter(|c| c.token.from() == token.from() && c.token.to() == token.to())
            .collect();

        let chosen = if matching.iter().any(|c| c.token.promotion().is_some()) {
            let wanted = token.promotion().unwrap_or(Role::Queen);
            matching
                .into_iter()
                .find(|c| c.token.promotion() == Some(wanted))
        } else {
            matching.into_iter().next()
        };

        let Some(candidate) = chosen else {
            debug!("No legal move matches token");
            return Err(illegal);
        };

        let side = self.side_to_move();
        let next = self
            .chess
            .clone()
            .play(candidate.raw.clone())
            .map_err(|_| illegal)?;
        let san = SanPlus::from_move(self.chess.clone(), candidate.raw.clone()).to_string();

        self.chess = next;

        Ok(Move::new(
            side,
            candidate.token.from(),
            candidate.token.to(),
            candidate.token.promotion(),
            san,
            candidate.capture,
        ))
    }

    fn candidates(&self) -> Vec<Candidate> {
        self.chess
            .legal_moves()
            .into_iter()
            .filter_map(Candidate::from_rules_move)
            .collect()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.fen() == other.fen()
    }
}

impl Eq for Position {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_has_twenty_moves() {
        let pos = Position::new();
        assert_eq!(pos.legal_moves().len(), 20);
        assert_eq!(pos.side_to_move(), Side::White);
        assert_eq!(
            pos.fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn castling_is_addressed_by_king_destination() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let targets = pos.legal_targets_from(Square::E1);
        assert!(targets.contains(&Square::G1));
        assert!(targets.contains(&Square::C1));
        assert!(!targets.contains(&Square::H1));
    }

    #[test]
    fn failed_apply_leaves_position_untouched() {
        let mut pos = Position::new();
        let before = pos.fen();
        let err = pos
            .apply(MoveToken::new(Square::E2, Square::E5, None))
            .unwrap_err();
        assert!(matches!(err, MoveError::IllegalMove { .. }));
        assert_eq!(pos.fen(), before);
    }

    #[test]
    fn san_marks_check_and_promotion() {
        let mut pos = Position::from_fen("4k3/P7/8/8/8/8/8/4K2R w - - 0 1").unwrap();
        let mv = pos
            .apply(MoveToken::new(Square::A7, Square::A8, Some(Role::Knight)))
            .unwrap();
        assert_eq!(mv.san(), "a8=N");

        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 0 1").unwrap();
        let mv = pos
            .apply(MoveToken::new(Square::H1, Square::H8, None))
            .unwrap();
        assert_eq!(mv.san(), "Rh8+");
    }

    #[test]
    fn rejects_garbage_fen() {
        assert!(matches!(
            Position::from_fen("not a fen"),
            Err(MoveError::InvalidPosition(_))
        ));
    }
}
