//! Invariants the move applier maintains after every committed ply.
//!
//! They are checked in debug builds after each apply and can be tested
//! independently.

use super::Game;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: sides alternate, starting with the side that opened the game.
pub struct AlternatingTurnInvariant;

impl Invariant<Game> for AlternatingTurnInvariant {
    fn holds(game: &Game) -> bool {
        let history = game.history();
        let mut expected = history.first_side();

        for mv in history.moves() {
            if mv.side() != expected {
                return false;
            }
            expected = expected.opponent();
        }

        game.turn() == expected
    }

    fn description() -> &'static str {
        "Sides alternate turns and the side to move follows the last mover"
    }
}

/// Invariant: the turn parity matches the number of plies played.
pub struct TurnParityInvariant;

impl Invariant<Game> for TurnParityInvariant {
    fn holds(game: &Game) -> bool {
        let first = game.history().first_side();
        let expected = if game.history().len() % 2 == 0 {
            first
        } else {
            first.opponent()
        };
        game.turn() == expected
    }

    fn description() -> &'static str {
        "Side to move is the opener after an even number of plies"
    }
}

/// All invariants of a chess game.
pub type ChessInvariants = (AlternatingTurnInvariant, TurnParityInvariant);

/// Panics in debug builds if any invariant is violated.
pub(crate) fn assert_invariants(game: &Game) {
    if !cfg!(debug_assertions) {
        return;
    }
    if let Err(violations) = ChessInvariants::check_all(game) {
        let descriptions: Vec<_> = violations.iter().map(|v| v.description.as_str()).collect();
        panic!("Invariant violation: {}", descriptions.join("; "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::chess::Side;

    #[test]
    fn fresh_game_holds() {
        let game = Game::new();
        assert!(ChessInvariants::check_all(&game).is_ok());
        assert_eq!(game.turn(), Side::White);
    }

    #[test]
    fn holds_after_several_plies() {
        let mut game = Game::new();
        for token in ["e2e4", "e7e5", "g1f3"] {
            game.apply_remote_move(token).unwrap();
        }
        assert!(AlternatingTurnInvariant::holds(&game));
        assert!(TurnParityInvariant::holds(&game));
    }
}
