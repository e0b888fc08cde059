//! Core domain types shared by the chess modules.

use serde::{Deserialize, Serialize};
use shakmaty::Color;

/// One of the two sides of a chess game.
///
/// Every turn and color decision in the crate goes through this enum; raw
/// rules-engine color codes never leak past [`super::Position`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Side {
    /// White (moves first from the standard start).
    White,
    /// Black.
    Black,
}

impl Side {
    /// Returns the opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Capitalized label for status lines.
    pub fn label(self) -> &'static str {
        match self {
            Side::White => "White",
            Side::Black => "Black",
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

/// Why a game was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum DrawReason {
    /// Side to move has no legal move and is not in check.
    Stalemate,
    /// Neither side can possibly deliver mate.
    #[strum(serialize = "insufficient material")]
    InsufficientMaterial,
    /// One hundred plies without a capture or pawn move.
    #[strum(serialize = "fifty-move rule")]
    FiftyMoveRule,
    /// The same position arose three times.
    #[strum(serialize = "threefold repetition")]
    ThreefoldRepetition,
}

/// Terminal classification of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// The side to move is mated.
    Checkmate {
        /// Side that delivered mate.
        winner: Side,
    },
    /// Game ended in a draw.
    Draw(DrawReason),
    /// Game is over for a reason the rules engine does not classify further.
    Other,
}

impl GameStatus {
    /// Whether no further moves may be played.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// Status line shown next to the board, or `None` while the game runs.
    pub fn status_text(self) -> Option<String> {
        match self {
            GameStatus::InProgress => None,
            GameStatus::Checkmate { winner } => {
                Some(format!("Checkmate! {} wins!", winner.label()))
            }
            GameStatus::Draw(_) => Some("Draw!".to_string()),
            GameStatus::Other => Some("Game Over!".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_round_trips_through_rules_engine_color() {
        assert_eq!(Side::from(Color::from(Side::Black)), Side::Black);
        assert_eq!(Side::White.opponent(), Side::Black);
    }

    #[test]
    fn side_parses_case_insensitively() {
        assert_eq!("Black".parse::<Side>().ok(), Some(Side::Black));
        assert_eq!(Side::White.to_string(), "white");
    }

    #[test]
    fn status_text_matches_outcome() {
        assert_eq!(GameStatus::InProgress.status_text(), None);
        assert_eq!(
            GameStatus::Checkmate { winner: Side::Black }.status_text().as_deref(),
            Some("Checkmate! Black wins!")
        );
        assert_eq!(
            GameStatus::Draw(DrawReason::Stalemate).status_text().as_deref(),
            Some("Draw!")
        );
        assert!(GameStatus::Other.is_terminal());
    }
}
