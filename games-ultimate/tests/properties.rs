//! Property-based tests for the rule engine.
//!
//! Games are generated by random playouts from the empty board so every state
//! under test is reachable through legal play.

use games_ultimate::{Authority, GameState, Move, MoveError, Outcome};
use proptest::prelude::*;

/// Play `picks.len()` moves, choosing among the legal moves by index.
fn playout(picks: &[usize]) -> GameState {
    let mut state = GameState::new();
    for &pick in picks {
        let moves = state.legal_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[pick % moves.len()];
        state.play(mv, Authority::Local).unwrap();
    }
    state
}

fn arb_state() -> impl Strategy<Value = GameState> {
    proptest::collection::vec(0usize..81, 0..90).prop_map(|picks| playout(&picks))
}

fn arb_move() -> impl Strategy<Value = Move> {
    (0usize..9, 0usize..9).prop_map(|(board, cell)| Move { board, cell })
}

proptest! {
    #[test]
    fn current_player_flips_only_on_accepted_moves(state in arb_state(), mv in arb_move()) {
        let mut in_place = state;
        match in_place.play(mv, Authority::Local) {
            Ok(()) => prop_assert_eq!(in_place.current_mark(), state.current_mark().opponent()),
            Err(_) => prop_assert_eq!(in_place, state),
        }
    }

    #[test]
    fn occupied_cells_never_change(state in arb_state(), mv in arb_move()) {
        if let Ok(next) = state.apply_move(mv, Authority::Local) {
            for board in 0..9 {
                for cell in 0..9 {
                    if let Some(mark) = state.cell(board, cell) {
                        prop_assert_eq!(next.cell(board, cell), Some(mark));
                    }
                }
            }
            prop_assert_eq!(next.moves_played(), state.moves_played() + 1);
        }
    }

    #[test]
    fn won_boards_always_reject(state in arb_state(), cell in 0usize..9) {
        for board in (0..9).filter(|&b| state.board_winner(b).is_some()) {
            // The constraint never points at a won board.
            prop_assert_ne!(state.active_board(), Some(board));
            let result = state.apply_move(Move { board, cell }, Authority::Local);
            match (state.is_over(), state.active_board()) {
                (true, _) => prop_assert_eq!(result, Err(MoveError::GameOver)),
                (false, None) => prop_assert_eq!(result, Err(MoveError::BoardAlreadyWon { board })),
                (false, Some(_)) => {
                    let wrong_board = matches!(result, Err(MoveError::WrongBoard { .. }));
                    prop_assert!(wrong_board, "expected WrongBoard, got {:?}", result);
                }
            }
        }
    }

    #[test]
    fn board_winners_are_permanent(state in arb_state(), mv in arb_move()) {
        if let Ok(next) = state.apply_move(mv, Authority::Local) {
            for board in 0..9 {
                if let Some(mark) = state.board_winner(board) {
                    prop_assert_eq!(next.board_winner(board), Some(mark));
                }
            }
        }
    }

    #[test]
    fn active_board_follows_the_cell_played(state in arb_state(), mv in arb_move()) {
        if let Ok(next) = state.apply_move(mv, Authority::Local) {
            let target = mv.cell;
            let open = next.board_winner(target).is_none()
                && next.board(target).map(|b| !b.is_full()).unwrap_or(false);
            if open {
                prop_assert_eq!(next.active_board(), Some(target));
            } else {
                prop_assert_eq!(next.active_board(), None);
            }
        }
    }

    #[test]
    fn terminal_states_accept_nothing(state in arb_state(), mv in arb_move()) {
        if state.is_over() {
            prop_assert_eq!(state.apply_move(mv, Authority::Local), Err(MoveError::GameOver));
            prop_assert!(state.legal_moves().is_empty());
        } else {
            prop_assert!(!state.legal_moves().is_empty());
        }
    }

    #[test]
    fn legal_moves_are_exactly_the_playable_ones(state in arb_state()) {
        let legal = state.legal_moves();
        for board in 0..9 {
            for cell in 0..9 {
                let mv = Move { board, cell };
                prop_assert_eq!(legal.contains(&mv), state.can_play(mv).is_ok());
            }
        }
    }

    #[test]
    fn networked_moves_require_the_turn_owner(state in arb_state()) {
        if let Some(&mv) = state.legal_moves().first() {
            let owner = state.current_mark();
            let intruder = owner.opponent();
            prop_assert_eq!(
                state.apply_move(mv, Authority::Networked(intruder)),
                Err(MoveError::NotYourTurn { expected: owner, actual: intruder })
            );
            prop_assert!(state.apply_move(mv, Authority::Networked(owner)).is_ok());
        }
    }

    #[test]
    fn meta_winner_matches_winning_combination(state in arb_state()) {
        match state.winner() {
            Some(Outcome::Winner(mark)) => {
                let combination = state.winning_combination().expect("a meta win names its line");
                for board in combination {
                    prop_assert_eq!(state.board_winner(board), Some(mark));
                }
            }
            Some(Outcome::Tie) | None => prop_assert_eq!(state.winning_combination(), None),
        }
    }
}

#[test]
fn full_random_games_terminate() {
    for seed in 0..50u64 {
        let picks: Vec<usize> = (0..200u64).map(|i| ((seed * 31 + i * 17) % 81) as usize).collect();
        let state = playout(&picks);
        assert!(state.is_over(), "seed {} did not finish", seed);
        assert!(state.moves_played() <= 81);
    }
}
