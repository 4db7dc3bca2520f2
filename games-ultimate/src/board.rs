//! Board model: marks, the 3×3 sub-board and the 9×9 meta-board.
//!
//! Everything here is plain data plus pure queries. The rule engine in
//! [`crate::rules`] decides when cells get written and caches the facts these
//! queries return.

use serde::{Deserialize, Serialize};

/// Winning lines of a 3×3 grid, row-major indices.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8], // rows
    [0, 3, 6], [1, 4, 7], [2, 5, 8], // columns
    [0, 4, 8], [2, 4, 6],            // diagonals
];

/// Center cell of a 3×3 grid.
pub const CENTER: usize = 4;

/// Corner cells of a 3×3 grid.
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

/// A player's symbol. Player 0 plays `X`, player 1 plays `O`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Mark of the player with the given turn index (0 or 1).
    pub fn from_index(index: usize) -> Option<Mark> {
        match index {
            0 => Some(Mark::X),
            1 => Some(Mark::O),
            _ => None,
        }
    }

    /// Turn index of this mark: 0 for `X`, 1 for `O`.
    pub fn index(self) -> usize {
        match self {
            Mark::X => 0,
            Mark::O => 1,
        }
    }

    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mark::X => f.write_str("X"),
            Mark::O => f.write_str("O"),
        }
    }
}

/// One inner 3×3 grid. `None` is an empty cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubBoard([Option<Mark>; 9]);

impl SubBoard {
    /// Build a grid from raw cells. Also used to treat the nine sub-board
    /// winners as a grid of their own for the meta-board scan.
    pub fn from_cells(cells: [Option<Mark>; 9]) -> Self {
        Self(cells)
    }

    pub fn cells(&self) -> &[Option<Mark>; 9] {
        &self.0
    }

    /// Cell contents, `None` when empty or out of range.
    pub fn get(&self, cell: usize) -> Option<Mark> {
        self.0.get(cell).copied().flatten()
    }

    pub fn is_empty_at(&self, cell: usize) -> bool {
        matches!(self.0.get(cell), Some(None))
    }

    pub(crate) fn set(&mut self, cell: usize, mark: Mark) {
        self.0[cell] = Some(mark);
    }

    /// Mark holding three in a line, if any.
    pub fn winner(&self) -> Option<Mark> {
        self.winning_line().map(|(mark, _)| mark)
    }

    /// Mark holding three in a line together with the first such line.
    pub fn winning_line(&self) -> Option<(Mark, [usize; 3])> {
        LINES.iter().find_map(|&[a, b, c]| match self.0[a] {
            Some(mark) if self.0[b] == Some(mark) && self.0[c] == Some(mark) => {
                Some((mark, [a, b, c]))
            }
            _ => None,
        })
    }

    /// True iff all nine cells are occupied.
    pub fn is_full(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// Number of lines holding exactly two of `mark` and one empty cell.
    pub fn open_twos(&self, mark: Mark) -> usize {
        LINES
            .iter()
            .filter(|line| {
                let owned = line.iter().filter(|&&i| self.0[i] == Some(mark)).count();
                let empty = line.iter().filter(|&&i| self.0[i].is_none()).count();
                owned == 2 && empty == 1
            })
            .count()
    }

    /// Copy of this grid with `mark` written at `cell`, for look-ahead.
    pub fn with_mark(&self, cell: usize, mark: Mark) -> SubBoard {
        let mut next = *self;
        next.set(cell, mark);
        next
    }
}

/// The 3×3 arrangement of sub-boards plus the cached facts about them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaBoard {
    #[serde(rename = "board")]
    pub(crate) boards: [SubBoard; 9],
    /// Mirrors `boards[i].winner()`; set once and never cleared.
    pub(crate) board_winners: [Option<Mark>; 9],
    /// The three sub-board indices forming the meta win.
    pub(crate) winning_combination: Option<[usize; 3]>,
}

impl MetaBoard {
    pub fn boards(&self) -> &[SubBoard; 9] {
        &self.boards
    }

    pub fn board_winners(&self) -> &[Option<Mark>; 9] {
        &self.board_winners
    }

    pub fn winning_combination(&self) -> Option<[usize; 3]> {
        self.winning_combination
    }

    /// Whether sub-board `board` can still receive moves.
    pub fn is_open(&self, board: usize) -> bool {
        self.board_winners[board].is_none() && !self.boards[board].is_full()
    }

    /// The sub-board winners viewed as a grid of their own.
    pub fn winners_grid(&self) -> SubBoard {
        SubBoard::from_cells(self.board_winners)
    }
}
