//! Tests for the chess move applier, position state and history.

use strictly_chess::{DrawReason, Game, GameStatus, MoveError, Position, Role, Side, Square};

fn play(game: &mut Game, tokens: &[&str]) {
    for token in tokens {
        game.apply_remote_move(token)
            .unwrap_or_else(|e| panic!("{token} should be legal: {e}"));
    }
}

fn all_squares() -> Vec<Square> {
    let mut squares = Vec::new();
    for file in ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'] {
        for rank in 1..=8 {
            squares.push(format!("{file}{rank}").parse().unwrap());
        }
    }
    squares
}

#[test]
fn test_local_move_updates_turn_and_history() {
    let mut game = Game::new();
    let mv = game.apply_local_move(Square::E2, Square::E4).unwrap();

    assert_eq!(mv.san(), "e4");
    assert_eq!(mv.side(), Side::White);
    assert!(!mv.captured());
    assert_eq!(game.turn(), Side::Black);
    assert_eq!(game.history().san_list(), vec!["e4"]);
    assert_eq!(game.history().lines(), vec!["1. e4"]);
}

#[test]
fn test_rejected_local_move_changes_nothing() {
    let mut game = Game::new();
    play(&mut game, &["e2e4"]);
    let fen = game.fen();

    let err = game.apply_local_move(Square::E4, Square::E6).unwrap_err();
    assert_eq!(
        err,
        MoveError::IllegalMove {
            from: Square::E4,
            to: Square::E6
        }
    );
    assert_eq!(game.fen(), fen);
    assert_eq!(game.history().len(), 1);
    assert_eq!(game.turn(), Side::Black);
}

#[test]
fn test_every_from_to_pair_is_legal_or_harmless() {
    let game = Game::new();
    let fen = game.fen();
    let mut accepted = 0;

    for from in all_squares() {
        for to in all_squares() {
            let mut attempt = game.clone();
            let legal = game.select_legal_targets(from).contains(&to);
            match attempt.apply_local_move(from, to) {
                Ok(_) => {
                    assert!(legal, "{from}{to} accepted but not listed as a target");
                    accepted += 1;
                }
                Err(_) => {
                    assert!(!legal, "{from}{to} listed as a target but rejected");
                    assert_eq!(attempt.fen(), fen);
                    assert!(attempt.history().is_empty());
                }
            }
        }
    }

    assert_eq!(accepted, 20);
}

#[test]
fn test_remote_move_rejects_tokens_outside_legal_set() {
    let mut game = Game::new();
    let fen = game.fen();

    for token in ["zz99", "e2e5", "e7e5", "e1e2", "", "e2e4e"] {
        assert_eq!(
            game.apply_remote_move(token),
            Err(MoveError::IllegalExternalMove(token.to_string())),
            "{token:?} should be rejected"
        );
        assert_eq!(game.fen(), fen);
    }
    assert!(game.history().is_empty());
}

/// Plays every `from`/`to`/letter token against `game` and checks that
/// exactly the legal pairs are accepted.
fn sweep_remote_tokens(game: &Game) -> usize {
    let fen = game.fen();
    let plies = game.history().len();
    let mut accepted = 0;

    for from in all_squares() {
        let targets = game.select_legal_targets(from);
        for to in all_squares() {
            for letter in ["", "q", "r", "b", "n"] {
                let token = format!("{from}{to}{letter}");
                let mut attempt = game.clone();
                match attempt.apply_remote_move(&token) {
                    Ok(mv) => {
                        assert!(targets.contains(&to), "{token} accepted but not legal");
                        assert_eq!(attempt.history().len(), plies + 1);
                        if let Some(role) = mv.promotion() {
                            let wanted = match letter {
                                "r" => Role::Rook,
                                "b" => Role::Bishop,
                                "n" => Role::Knight,
                                _ => Role::Queen,
                            };
                            assert_eq!(role, wanted, "{token} promoted to the wrong piece");
                            assert_eq!(
                                attempt.position().piece_at(to).map(|(_, r)| r),
                                Some(wanted)
                            );
                        }
                        if letter.is_empty() {
                            accepted += 1;
                        }
                    }
                    Err(err) => {
                        assert!(!targets.contains(&to), "{token} is legal but was rejected");
                        assert_eq!(err, MoveError::IllegalExternalMove(token.clone()));
                        assert_eq!(attempt.fen(), fen);
                        assert_eq!(attempt.history().len(), plies);
                    }
                }
            }
        }
    }

    accepted
}

#[test]
fn test_remote_tokens_accepted_only_when_legal_mid_game() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"]);

    let pairs = game
        .position()
        .legal_moves()
        .iter()
        .map(|token| (token.from(), token.to()))
        .collect::<std::collections::BTreeSet<_>>();
    assert_eq!(sweep_remote_tokens(&game), pairs.len());
}

#[test]
fn test_remote_tokens_accepted_only_when_legal_with_promotion() {
    let start = Position::from_fen("r3k3/1P6/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    let game = Game::from_position(start);

    assert!(game.select_legal_targets(Square::B7).contains(&Square::A8));
    assert!(game.select_legal_targets(Square::B7).contains(&Square::B8));

    let pairs = game
        .position()
        .legal_moves()
        .iter()
        .map(|token| (token.from(), token.to()))
        .collect::<std::collections::BTreeSet<_>>();
    assert_eq!(sweep_remote_tokens(&game), pairs.len());
}

#[test]
fn test_remote_move_ignores_promotion_letter_on_plain_moves() {
    let mut game = Game::new();
    let mv = game.apply_remote_move("e2e4q").unwrap();
    assert_eq!(mv.san(), "e4");
    assert_eq!(mv.promotion(), None);
}

#[test]
fn test_promotion_defaults_to_queen_and_honours_letter() {
    let start = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();

    let mut game = Game::from_position(start.clone());
    let mv = game.apply_remote_move("a7a8").unwrap();
    assert_eq!(mv.promotion(), Some(Role::Queen));

    let mut game = Game::from_position(start.clone());
    let mv = game.apply_remote_move("a7a8n").unwrap();
    assert_eq!(mv.promotion(), Some(Role::Knight));
    assert_eq!(
        game.position().piece_at(Square::A8),
        Some((Side::White, Role::Knight))
    );

    let mut game = Game::from_position(start);
    let mv = game.apply_local_move(Square::A7, Square::A8).unwrap();
    assert_eq!(mv.promotion(), Some(Role::Queen));
}

#[test]
fn test_castling_is_addressed_by_king_move() {
    let start = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let mut game = Game::from_position(start);

    let mv = game.apply_local_move(Square::E1, Square::G1).unwrap();
    assert_eq!(mv.san(), "O-O");
    assert_eq!(game.position().piece_at(Square::F1), Some((Side::White, Role::Rook)));

    let mv = game.apply_remote_move("e8c8").unwrap();
    assert_eq!(mv.san(), "O-O-O");
    assert_eq!(game.position().piece_at(Square::D8), Some((Side::Black, Role::Rook)));
}

#[test]
fn test_en_passant_counts_as_capture() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);

    let mv = game.apply_local_move(Square::E5, Square::D6).unwrap();
    assert!(mv.captured());
    assert_eq!(mv.san(), "exd6");
    assert_eq!(game.position().piece_at(Square::D5), None);
}

#[test]
fn test_turn_parity_after_n_applies() {
    let mut game = Game::new();
    let tokens = ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5a4"];

    for (n, token) in tokens.iter().enumerate() {
        play(&mut game, &[token]);
        let expected = if (n + 1) % 2 == 0 { Side::White } else { Side::Black };
        assert_eq!(game.turn(), expected);
        assert_eq!(game.history().len(), n + 1);
    }
}

#[test]
fn test_history_pairs_number_full_moves() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "e7e5", "g1f3"]);

    let pairs = game.history().pairs();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].number, 1);
    assert_eq!(pairs[0].white.as_deref(), Some("e4"));
    assert_eq!(pairs[0].black.as_deref(), Some("e5"));
    assert_eq!(pairs[1].white.as_deref(), Some("Nf3"));
    assert_eq!(game.history().lines(), vec!["1. e4", "1... e5", "2. Nf3"]);
}

#[test]
fn test_checkmate_ends_the_game() {
    let mut game = Game::new();
    play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);

    assert_eq!(game.status(), GameStatus::Checkmate { winner: Side::Black });
    assert_eq!(
        game.status().status_text().as_deref(),
        Some("Checkmate! Black wins!")
    );
    assert_eq!(game.history().last().map(|m| m.san()), Some("Qh4#"));
    assert!(game.select_legal_targets(Square::E1).is_empty());
    assert_eq!(
        game.apply_local_move(Square::A2, Square::A3),
        Err(MoveError::GameOver)
    );
}

#[test]
fn test_stalemate_is_a_draw() {
    let game = Game::from_position(Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap());
    assert_eq!(game.status(), GameStatus::Draw(DrawReason::Stalemate));
    assert_eq!(game.status().status_text().as_deref(), Some("Draw!"));
}

#[test]
fn test_insufficient_material_is_a_draw() {
    let game = Game::from_position(Position::from_fen("8/8/8/8/8/8/8/K6k w - - 0 1").unwrap());
    assert_eq!(
        game.status(),
        GameStatus::Draw(DrawReason::InsufficientMaterial)
    );
}

#[test]
fn test_fifty_move_rule_is_a_draw() {
    let game =
        Game::from_position(Position::from_fen("8/8/8/8/8/8/R7/K6k w - - 100 80").unwrap());
    assert_eq!(game.status(), GameStatus::Draw(DrawReason::FiftyMoveRule));
}

#[test]
fn test_threefold_repetition_is_a_draw() {
    let mut game = Game::new();
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];

    play(&mut game, &shuffle);
    assert_eq!(game.status(), GameStatus::InProgress);

    play(&mut game, &shuffle);
    assert_eq!(
        game.status(),
        GameStatus::Draw(DrawReason::ThreefoldRepetition)
    );
}

#[test]
fn test_reset_restores_start_position() {
    let start = Position::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1").unwrap();
    let mut game = Game::from_position(start.clone());
    play(&mut game, &["e8d8", "e2e4"]);

    game.reset();
    assert_eq!(game.position(), &start);
    assert!(game.history().is_empty());
    assert_eq!(game.turn(), Side::Black);
    assert_eq!(game.history().first_side(), Side::Black);
}
