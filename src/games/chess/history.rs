//! Append-only move history used for display and move numbering.

use super::{Move, Side};

/// One numbered row of a move list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePair {
    /// Full-move number, starting at 1.
    pub number: usize,
    /// White's move, absent when the history starts with Black.
    pub white: Option<String>,
    /// Black's reply, absent until played.
    pub black: Option<String>,
}

/// Moves in the order they were played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    first_side: Side,
    moves: Vec<Move>,
}

impl History {
    /// Empty history for a game where `first_side` makes the first move.
    pub fn starting_with(first_side: Side) -> Self {
        Self {
            first_side,
            moves: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    /// All moves, oldest first.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Number of plies played.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Whether no move has been played.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Most recent move.
    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// Side that opened this history.
    pub fn first_side(&self) -> Side {
        self.first_side
    }

    /// SAN of every move, oldest first.
    pub fn san_list(&self) -> Vec<String> {
        self.moves.iter().map(|m| m.san().to_string()).collect()
    }

    /// Numbered rows of white/black moves.
    pub fn pairs(&self) -> Vec<MovePair> {
        let offset = usize::from(self.first_side == Side::Black);
        let mut pairs: Vec<MovePair> = Vec::new();

        for (index, mv) in self.moves.iter().enumerate() {
            let number = (index + offset) / 2 + 1;
            if pairs.last().map(|p| p.number) != Some(number) {
                pairs.push(MovePair {
                    number,
                    white: None,
                    black: None,
                });
            }
            if let Some(pair) = pairs.last_mut() {
                match mv.side() {
                    Side::White => pair.white = Some(mv.san().to_string()),
                    Side::Black => pair.black = Some(mv.san().to_string()),
                }
            }
        }

        pairs
    }

    /// One display line per move: `"1. e4"` for White, `"1... e5"` for Black.
    pub fn lines(&self) -> Vec<String> {
        self.pairs()
            .into_iter()
            .flat_map(|pair| {
                let white = pair.white.map(|san| format!("{}. {}", pair.number, san));
                let black = pair.black.map(|san| format!("{}... {}", pair.number, san));
                white.into_iter().chain(black)
            })
            .collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::starting_with(Side::White)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Square;

    fn mv(side: Side, san: &str) -> Move {
        Move::new(side, Square::A1, Square::A2, None, san.to_string(), false)
    }

    #[test]
    fn numbers_moves_from_white() {
        let mut history = History::default();
        history.push(mv(Side::White, "e4"));
        history.push(mv(Side::Black, "e5"));
        history.push(mv(Side::White, "Nf3"));

        assert_eq!(history.lines(), vec!["1. e4", "1... e5", "2. Nf3"]);
        assert_eq!(history.pairs().len(), 2);
        assert_eq!(history.pairs()[1].black, None);
    }

    #[test]
    fn numbers_moves_when_black_opens() {
        let mut history = History::starting_with(Side::Black);
        history.push(mv(Side::Black, "Kh7"));
        history.push(mv(Side::White, "Qf5+"));

        let pairs = history.pairs();
        assert_eq!(pairs[0].white, None);
        assert_eq!(pairs[0].black.as_deref(), Some("Kh7"));
        assert_eq!(pairs[1].number, 2);
        assert_eq!(pairs[1].white.as_deref(), Some("Qf5+"));
    }
}
