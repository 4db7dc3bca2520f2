//! Rule engine: the one place moves are validated and applied.
//!
//! Local hot-seat play, the bot scheduler and the room server all go through
//! [`GameState::apply_move`]; they differ only in the [`Authority`] they pass.

use crate::board::{Mark, SubBoard};
use crate::error::MoveError;
use crate::state::{GameState, Move, Outcome};

/// Who is asking for the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// Local or bot play: turn ownership is implicit, the mover is whoever is
    /// to move.
    Local,
    /// Networked play: the server vouches that the request came from the
    /// player holding this mark.
    Networked(Mark),
}

impl GameState {
    /// Legality checks shared by every caller, in order: game over, wrong
    /// board, board already won, cell occupied. Turn ownership is not checked.
    pub fn can_play(&self, mv: Move) -> Result<(), MoveError> {
        let Move { board, cell } = mv;
        if board >= 9 || cell >= 9 {
            return Err(MoveError::InvalidIndex { board, cell });
        }
        if self.winner.is_some() {
            return Err(MoveError::GameOver);
        }
        if let Some(expected) = self.active_board {
            if expected != board {
                return Err(MoveError::WrongBoard {
                    expected,
                    requested: board,
                });
            }
        }
        if self.meta.board_winners[board].is_some() {
            return Err(MoveError::BoardAlreadyWon { board });
        }
        if !self.meta.boards[board].is_empty_at(cell) {
            return Err(MoveError::CellOccupied { board, cell });
        }
        Ok(())
    }

    /// Validate `mv` and return the successor state. `self` is untouched.
    pub fn apply_move(&self, mv: Move, authority: Authority) -> Result<GameState, MoveError> {
        self.can_play(mv)?;
        if let Authority::Networked(actual) = authority {
            if actual != self.current_player {
                return Err(MoveError::NotYourTurn {
                    expected: self.current_player,
                    actual,
                });
            }
        }

        let mut next = *self;
        let mark = self.current_player;
        let Move { board, cell } = mv;

        next.meta.boards[board].set(cell, mark);
        if let Some(won_by) = next.meta.boards[board].winner() {
            next.meta.board_winners[board] = Some(won_by);
        }

        // The cell just played names the sub-board the opponent must use.
        next.active_board = if next.meta.is_open(cell) { Some(cell) } else { None };

        if let Some((won_by, combination)) = next.meta.winners_grid().winning_line() {
            next.winner = Some(Outcome::Winner(won_by));
            next.meta.winning_combination = Some(combination);
        } else if (0..9).all(|b| !next.meta.is_open(b)) {
            // Every sub-board is won or full: nobody can move any more.
            next.winner = Some(Outcome::Tie);
        }

        next.current_player = mark.opponent();
        Ok(next)
    }

    /// In-place variant of [`GameState::apply_move`]; leaves `self` unchanged
    /// on error.
    pub fn play(&mut self, mv: Move, authority: Authority) -> Result<(), MoveError> {
        *self = self.apply_move(mv, authority)?;
        Ok(())
    }

    /// Every move the player to move may make. Empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.winner.is_some() {
            return Vec::new();
        }
        let boards: Vec<usize> = match self.active_board {
            Some(board) => vec![board],
            None => (0..9).collect(),
        };
        boards
            .into_iter()
            .filter(|&board| self.meta.board_winners[board].is_none())
            .flat_map(|board| {
                let sub: &SubBoard = &self.meta.boards[board];
                (0..9)
                    .filter(move |&cell| sub.is_empty_at(cell))
                    .map(move |cell| Move { board, cell })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(board: usize, cell: usize) -> Move {
        Move::new(board, cell).unwrap()
    }

    fn play_all(moves: &[(usize, usize)]) -> GameState {
        let mut state = GameState::new();
        for &(board, cell) in moves {
            state.play(mv(board, cell), Authority::Local).unwrap();
        }
        state
    }

    /// Hand-build a state with the given sub-board winners, bypassing play.
    fn with_board_winners(winners: [Option<Mark>; 9]) -> GameState {
        let mut state = GameState::new();
        for (board, winner) in winners.iter().enumerate() {
            if let Some(mark) = winner {
                for cell in [0, 1, 2] {
                    state.meta.boards[board].set(cell, *mark);
                }
                state.meta.board_winners[board] = Some(*mark);
            }
        }
        state
    }

    #[test]
    fn test_center_move_activates_center_board() {
        let state = play_all(&[(4, 4)]);
        assert_eq!(state.active_board(), Some(4));
        assert_eq!(state.cell(4, 4), Some(Mark::X));
        assert_eq!(state.current_mark(), Mark::O);
    }

    #[test]
    fn test_wrong_board_rejected_without_mutation() {
        let state = play_all(&[(4, 4)]);
        let before = state;
        let result = state.apply_move(mv(0, 0), Authority::Local);
        assert_eq!(
            result,
            Err(MoveError::WrongBoard {
                expected: 4,
                requested: 0
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_occupied_cell_rejected() {
        // X: 4/4, O: 4/0 sends X to board 0, X: 0/4 sends O back to 4
        let mut state = play_all(&[(4, 4), (4, 0), (0, 4)]);
        assert_eq!(
            state.play(mv(4, 4), Authority::Local),
            Err(MoveError::CellOccupied { board: 4, cell: 4 })
        );
        assert_eq!(state.current_mark(), Mark::O);
        assert_eq!(state.cell(4, 4), Some(Mark::X));
    }

    #[test]
    fn test_sub_board_win_blocks_further_moves() {
        // O completes the bottom row of board 0 while every X move routes O back
        let state = play_all(&[
            (0, 0), // X, O → board 0
            (0, 3), // O, X → board 3
            (3, 0), // X, O → board 0
            (0, 5), // O, X → board 5
            (5, 0), // X, O → board 0
            (0, 8), // O, X → board 8
            (8, 0), // X, O → board 0
            (0, 6), // O, X → board 6
            (6, 0), // X, O → board 0
            (0, 7), // O, X → board 7
            (7, 1), // X, O → board 1
            (1, 0), // O, X → board 0
        ]);
        assert_eq!(state.board_winner(0), Some(Mark::O));
        // board 0 is won, so the move into it reset the constraint
        assert_eq!(state.active_board(), None);

        let mut state = state;
        assert_eq!(
            state.play(mv(0, 1), Authority::Local),
            Err(MoveError::BoardAlreadyWon { board: 0 })
        );
    }

    #[test]
    fn test_completing_a_line_wins_the_sub_board() {
        let mut state = GameState::new();
        state.meta.boards[0].set(0, Mark::X);
        state.meta.boards[0].set(1, Mark::X);

        state.play(mv(0, 2), Authority::Local).unwrap();
        assert_eq!(state.board_winner(0), Some(Mark::X));

        // Every remaining empty cell of board 0 is rejected now.
        for cell in 3..9 {
            let free = GameState { active_board: None, winner: None, ..state };
            assert_eq!(
                free.apply_move(mv(0, cell), Authority::Local),
                Err(MoveError::BoardAlreadyWon { board: 0 })
            );
        }
    }

    #[test]
    fn test_won_board_rejected_even_when_active() {
        let mut state = with_board_winners([Some(Mark::X), None, None, None, None, None, None, None, None]);
        state.active_board = Some(0);
        assert_eq!(
            state.apply_move(mv(0, 5), Authority::Local),
            Err(MoveError::BoardAlreadyWon { board: 0 })
        );
    }

    #[test]
    fn test_move_into_closed_board_frees_choice() {
        let mut state = with_board_winners([None, None, None, None, None, None, None, None, Some(Mark::O)]);
        state.play(mv(4, 8), Authority::Local).unwrap();
        assert_eq!(state.active_board(), None);
    }

    #[test]
    fn test_move_into_full_board_frees_choice() {
        let mut state = GameState::new();
        // X O X / O X O / O X O, full and unwon
        let marks = [
            Mark::X, Mark::O, Mark::X,
            Mark::O, Mark::X, Mark::O,
            Mark::O, Mark::X, Mark::O,
        ];
        for (cell, mark) in marks.into_iter().enumerate() {
            state.meta.boards[2].set(cell, mark);
        }
        state.play(mv(0, 2), Authority::Local).unwrap();
        assert_eq!(state.board_winner(2), None);
        assert_eq!(state.active_board(), None);
    }

    #[test]
    fn test_meta_win_sets_winner_and_combination() {
        let mut state = with_board_winners([Some(Mark::X), Some(Mark::X), None, None, None, None, None, None, None]);
        state.meta.boards[2].set(0, Mark::X);
        state.meta.boards[2].set(1, Mark::X);

        state.play(mv(2, 2), Authority::Local).unwrap();
        assert_eq!(state.winner(), Some(Outcome::Winner(Mark::X)));
        assert_eq!(state.winning_combination(), Some([0, 1, 2]));
        assert!(state.legal_moves().is_empty());
        assert_eq!(state.apply_move(mv(5, 5), Authority::Local), Err(MoveError::GameOver));
    }

    #[test]
    fn test_all_boards_won_without_line_is_a_tie() {
        use Mark::{O, X};
        // X O X / X O O / O X X, board 8 still open for O
        let mut state = with_board_winners([Some(X), Some(O), Some(X), Some(X), Some(O), Some(O), Some(O), Some(X), None]);
        state.current_player = X;
        state.meta.boards[8].set(0, X);
        state.meta.boards[8].set(1, X);

        state.play(mv(8, 2), Authority::Local).unwrap();
        assert_eq!(state.board_winner(8), Some(X));
        assert_eq!(state.winner(), Some(Outcome::Tie));
        assert_eq!(state.winning_combination(), None);
    }

    #[test]
    fn test_full_unwon_boards_count_towards_a_tie() {
        use Mark::{O, X};
        // Boards 0-7 split between X and O without a meta line; board 8 ends
        // full with nobody holding a line.
        let mut state = with_board_winners([Some(X), Some(O), Some(X), Some(X), Some(O), Some(O), Some(O), Some(X), None]);
        let drawn = [X, O, X, O, X, O, O, X, O];
        for (cell, mark) in drawn.into_iter().enumerate().skip(1) {
            state.meta.boards[8].set(cell, mark);
        }
        state.current_player = X;

        state.play(mv(8, 0), Authority::Local).unwrap();
        assert_eq!(state.board_winner(8), None);
        assert_eq!(state.winner(), Some(Outcome::Tie));
        assert!(state.legal_moves().is_empty());
    }

    #[test]
    fn test_meta_win_takes_priority_over_tie() {
        use Mark::{O, X};
        // all nine boards end up won and X holds the 0-4-8 diagonal
        let mut state = with_board_winners([Some(X), Some(O), Some(O), Some(O), Some(X), Some(X), Some(X), Some(O), None]);
        state.current_player = X;
        state.meta.boards[8].set(3, X);
        state.meta.boards[8].set(4, X);

        state.play(mv(8, 5), Authority::Local).unwrap();
        assert_eq!(state.winner(), Some(Outcome::Winner(X)));
        assert_eq!(state.winning_combination(), Some([0, 4, 8]));
    }

    #[test]
    fn test_networked_turn_ownership() {
        let state = GameState::new();
        assert_eq!(
            state.apply_move(mv(4, 4), Authority::Networked(Mark::O)),
            Err(MoveError::NotYourTurn {
                expected: Mark::X,
                actual: Mark::O
            })
        );
        let next = state.apply_move(mv(4, 4), Authority::Networked(Mark::X)).unwrap();
        assert_eq!(next.current_mark(), Mark::O);
    }

    #[test]
    fn test_board_checks_run_before_turn_check() {
        let state = play_all(&[(4, 4)]);
        // X tries to play out of turn and on the wrong board: board check wins
        assert_eq!(
            state.apply_move(mv(0, 0), Authority::Networked(Mark::X)),
            Err(MoveError::WrongBoard {
                expected: 4,
                requested: 0
            })
        );
    }

    #[test]
    fn test_out_of_range_move_rejected() {
        let state = GameState::new();
        let bogus = Move { board: 9, cell: 0 };
        assert_eq!(
            state.apply_move(bogus, Authority::Local),
            Err(MoveError::InvalidIndex { board: 9, cell: 0 })
        );
    }

    #[test]
    fn test_legal_moves_respect_active_board() {
        let state = GameState::new();
        assert_eq!(state.legal_moves().len(), 81);

        let state = play_all(&[(4, 4)]);
        let legal = state.legal_moves();
        assert_eq!(legal.len(), 8);
        assert!(legal.iter().all(|m| m.board == 4 && m.cell != 4));
    }

    #[test]
    fn test_legal_moves_skip_won_boards() {
        let state = with_board_winners([Some(Mark::X), None, None, None, None, None, None, None, None]);
        let legal = state.legal_moves();
        assert_eq!(legal.len(), 72);
        assert!(legal.iter().all(|m| m.board != 0));
    }
}
