//! Selection and highlight mapping.

use crate::games::chess::{Position, Square};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Visual tag a board view applies to one square.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StyleTag {
    /// The selected piece.
    Selected,
    /// A quiet destination.
    Move,
    /// A destination that captures.
    Capture,
}

impl StyleTag {
    /// Background used by graphical views.
    pub fn background(self) -> &'static str {
        match self {
            StyleTag::Selected => "rgba(255, 255, 0, 0.4)",
            StyleTag::Move => "rgba(0, 128, 0, 0.4)",
            StyleTag::Capture => "rgba(255, 0, 0, 0.3)",
        }
    }

    /// Brackets drawn around the square on the text board.
    pub fn brackets(self) -> (char, char) {
        match self {
            StyleTag::Selected => ('[', ']'),
            StyleTag::Move => ('(', ')'),
            StyleTag::Capture => ('<', '>'),
        }
    }
}

/// Style overlay keyed by square.
pub type HighlightMap = BTreeMap<Square, StyleTag>;

/// Computes the highlight overlay for `selection` in `position`.
///
/// Empty when nothing is selected, or when the selected square has no legal
/// targets for the side to move.
pub fn compute_highlights(position: &Position, selection: Option<Square>) -> HighlightMap {
    let Some(selected) = selection else {
        return HighlightMap::new();
    };

    let targets = position.legal_targets_from(selected);
    if targets.is_empty() {
        return HighlightMap::new();
    }

    let mut map: HighlightMap = targets
        .into_iter()
        .map(|target| {
            let tag = if position.is_capture(selected, target) {
                StyleTag::Capture
            } else {
                StyleTag::Move
            };
            (target, tag)
        })
        .collect();
    map.insert(selected, StyleTag::Selected);
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_selection_is_empty() {
        assert!(compute_highlights(&Position::new(), None).is_empty());
    }

    #[test]
    fn opening_pawn_has_two_quiet_targets() {
        let map = compute_highlights(&Position::new(), Some(Square::E2));
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&Square::E2), Some(&StyleTag::Selected));
        assert_eq!(map.get(&Square::E3), Some(&StyleTag::Move));
        assert_eq!(map.get(&Square::E4), Some(&StyleTag::Move));
    }

    #[test]
    fn en_passant_target_is_a_capture() {
        let position =
            Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let map = compute_highlights(&position, Some(Square::E5));
        assert_eq!(map.get(&Square::F6), Some(&StyleTag::Capture));
        assert_eq!(map.get(&Square::E6), Some(&StyleTag::Move));
    }
}
