//! Plain-text board rendering.
//!
//! Boards the next move may go into are bracketed. A won board shows its
//! winner in every cell, and boards on the winning line are starred.

use games_ultimate::{GameState, Mark, Outcome};

const SEPARATOR: &str = "-------+-------+-------";

fn symbol(mark: Option<Mark>) -> char {
    match mark {
        Some(Mark::X) => 'X',
        Some(Mark::O) => 'O',
        None => '.',
    }
}

fn is_playable(state: &GameState, board: usize) -> bool {
    if state.is_over() {
        return false;
    }
    match state.active_board() {
        Some(active) => active == board,
        None => state.meta().is_open(board),
    }
}

fn segment(state: &GameState, board: usize, row: usize) -> String {
    let on_winning_line = state
        .winning_combination()
        .map_or(false, |line| line.contains(&board));

    let cells: Vec<char> = match state.board_winner(board) {
        Some(mark) => vec![symbol(Some(mark)); 3],
        None => (0..3).map(|col| symbol(state.cell(board, row * 3 + col))).collect(),
    };
    let (open, close) = if on_winning_line {
        ('*', '*')
    } else if is_playable(state, board) {
        ('[', ']')
    } else {
        (' ', ' ')
    };
    format!("{}{} {} {}{}", open, cells[0], cells[1], cells[2], close)
}

/// One-line description of whose turn it is or how the game ended.
pub fn status_line(state: &GameState) -> String {
    match state.winner() {
        Some(Outcome::Winner(mark)) => format!("{} wins the game", mark),
        Some(Outcome::Tie) => "The game is a tie".to_string(),
        None => match state.active_board() {
            Some(board) => format!("{} to move in board {}", state.current_mark(), board),
            None => format!("{} to move in any open board", state.current_mark()),
        },
    }
}

pub fn render(state: &GameState) -> String {
    let mut out = String::new();
    for meta_row in 0..3 {
        if meta_row > 0 {
            out.push_str(SEPARATOR);
            out.push('\n');
        }
        for row in 0..3 {
            let line: Vec<String> = (0..3)
                .map(|meta_col| segment(state, meta_row * 3 + meta_col, row))
                .collect();
            out.push_str(&line.join("|"));
            out.push('\n');
        }
    }
    out.push_str(&status_line(state));
    out.push('\n');
    out
}
