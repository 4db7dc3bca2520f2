use crate::board::Mark;

/// Reasons the rule engine refuses a move. A refused move never mutates state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("Invalid move coordinates: board {board}, cell {cell}")]
    InvalidIndex { board: usize, cell: usize },
    #[error("The game is already over")]
    GameOver,
    #[error("You must play in board {expected}, not board {requested}")]
    WrongBoard { expected: usize, requested: usize },
    #[error("Board {board} has already been won")]
    BoardAlreadyWon { board: usize },
    #[error("Cell {cell} of board {board} is already occupied")]
    CellOccupied { board: usize, cell: usize },
    #[error("It is {expected}'s turn, not {actual}'s")]
    NotYourTurn { expected: Mark, actual: Mark },
}

impl MoveError {
    /// Short machine-readable code, used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            MoveError::InvalidIndex { .. } => "invalid_index",
            MoveError::GameOver => "game_over",
            MoveError::WrongBoard { .. } => "wrong_board",
            MoveError::BoardAlreadyWon { .. } => "board_already_won",
            MoveError::CellOccupied { .. } => "cell_occupied",
            MoveError::NotYourTurn { .. } => "not_your_turn",
        }
    }
}
