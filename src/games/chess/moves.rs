//! Played moves, move tokens and move errors.
//!
//! A [`MoveToken`] is an intent (`e2e4`, `e7e8q`) that has not been checked
//! against any position. A [`Move`] is the immutable record produced once a
//! token has been validated and applied.

use super::Side;
use shakmaty::{Role, Square};
use std::str::FromStr;
use tracing::instrument;

/// A ply that has been applied to a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    side: Side,
    from: Square,
    to: Square,
    promotion: Option<Role>,
    san: String,
    captured: bool,
}

impl Move {
    pub(crate) fn new(
        side: Side,
        from: Square,
        to: Square,
        promotion: Option<Role>,
        san: String,
        captured: bool,
    ) -> Self {
        Self {
            side,
            from,
            to,
            promotion,
            san,
            captured,
        }
    }

    /// Side that played this move.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Origin square (the king's square for castling).
    pub fn from(&self) -> Square {
        self.from
    }

    /// Destination square (the king's destination for castling).
    pub fn to(&self) -> Square {
        self.to
    }

    /// Promotion piece, if the move promoted a pawn.
    pub fn promotion(&self) -> Option<Role> {
        self.promotion
    }

    /// Standard algebraic notation including check markers.
    pub fn san(&self) -> &str {
        &self.san
    }

    /// Whether the move captured a piece (en passant included).
    pub fn captured(&self) -> bool {
        self.captured
    }

    /// The move expressed as a token.
    pub fn token(&self) -> MoveToken {
        MoveToken::new(self.from, self.to, self.promotion)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.san)
    }
}

/// Compact `<from><to>[promotion]` move encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveToken {
    from: Square,
    to: Square,
    promotion: Option<Role>,
}

impl MoveToken {
    /// Creates a token from its parts.
    pub fn new(from: Square, to: Square, promotion: Option<Role>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }

    /// Origin square.
    pub fn from(&self) -> Square {
        self.from
    }

    /// Destination square.
    pub fn to(&self) -> Square {
        self.to
    }

    /// Requested promotion piece.
    pub fn promotion(&self) -> Option<Role> {
        self.promotion
    }

    /// Parses a move-service token.
    ///
    /// Accepts exactly `^[a-h][1-8][a-h][1-8][qrbn]?$`.
    #[instrument]
    pub fn parse(token: &str) -> Result<Self, MoveError> {
        let invalid = || MoveError::InvalidToken(token.to_string());
        let bytes = token.as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return Err(invalid());
        }

        let from = parse_square(&bytes[0..2]).ok_or_else(invalid)?;
        let to = parse_square(&bytes[2..4]).ok_or_else(invalid)?;
        let promotion = match bytes.get(4) {
            None => None,
            Some(&c) => Some(promotion_role(c).ok_or_else(invalid)?),
        };

        Ok(Self::new(from, to, promotion))
    }
}

impl FromStr for MoveToken {
    type Err = MoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for MoveToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

fn parse_square(bytes: &[u8]) -> Option<Square> {
    match bytes {
        [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => {
            let text = [*file, *rank];
            std::str::from_utf8(&text).ok()?.parse().ok()
        }
        _ => None,
    }
}

fn promotion_role(c: u8) -> Option<Role> {
    if !c.is_ascii_lowercase() {
        return None;
    }
    Role::from_char(char::from(c)).filter(|role| !matches!(role, Role::Pawn | Role::King))
}

/// Error that can occur when validating or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The move is not legal in the current position.
    #[display("Illegal move {from}{to}")]
    IllegalMove {
        /// Origin square.
        from: Square,
        /// Destination square.
        to: Square,
    },

    /// A token did not match the move-token grammar.
    #[display("Malformed move token {:?}", _0)]
    InvalidToken(String),

    /// A move supplied by the move service failed the legality re-check.
    #[display("Illegal external move {:?}", _0)]
    IllegalExternalMove(String),

    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// A position string could not be loaded.
    #[display("Invalid position: {}", _0)]
    InvalidPosition(String),
}

impl std::error::Error for MoveError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_promotion_tokens() {
        let token = MoveToken::parse("e2e4").unwrap();
        assert_eq!(token.from(), Square::E2);
        assert_eq!(token.to(), Square::E4);
        assert_eq!(token.promotion(), None);

        let token: MoveToken = "e7e8n".parse().unwrap();
        assert_eq!(token.promotion(), Some(Role::Knight));
        assert_eq!(token.to_string(), "e7e8n");
    }

    #[test]
    fn rejects_tokens_outside_the_grammar() {
        for bad in ["", "e2", "zz99", "e2e9", "i2e4", "e2e4k", "e2e4Q", "E2E4", "e2e4qq", " e2e4"] {
            assert_eq!(
                MoveToken::parse(bad),
                Err(MoveError::InvalidToken(bad.to_string())),
                "token {bad:?} should be rejected"
            );
        }
    }
}
