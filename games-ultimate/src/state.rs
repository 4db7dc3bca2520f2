//! Game state as seen by every caller: the meta-board, whose turn it is, the
//! active board constraint and the terminal outcome.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::board::{Mark, MetaBoard, SubBoard, LINES};
use crate::error::MoveError;

/// A move: sub-board index and cell index within it, both 0–8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub board: usize,
    pub cell: usize,
}

impl Move {
    /// Build a move, rejecting coordinates outside the 9×9 grid.
    pub fn new(board: usize, cell: usize) -> Result<Self, MoveError> {
        if board >= 9 || cell >= 9 {
            return Err(MoveError::InvalidIndex { board, cell });
        }
        Ok(Self { board, cell })
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.board, self.cell)
    }
}

/// Terminal result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Mark),
    Tie,
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Winner(Mark::X) => serializer.serialize_str("X"),
            Outcome::Winner(Mark::O) => serializer.serialize_str("O"),
            Outcome::Tie => serializer.serialize_str("tie"),
        }
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "X" => Ok(Outcome::Winner(Mark::X)),
            "O" => Ok(Outcome::Winner(Mark::O)),
            "tie" => Ok(Outcome::Tie),
            other => Err(serde::de::Error::custom(format!("Invalid outcome: {}", other))),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(mark) => write!(f, "{} wins", mark),
            Outcome::Tie => f.write_str("tie"),
        }
    }
}

/// Complete state of an Ultimate Tic-Tac-Toe game.
///
/// Serializes to the snapshot shape broadcast to clients:
/// `board`, `boardWinners`, `winningCombination`, `currentPlayer` (0 or 1),
/// `activeBoard` (null = free choice) and `winner` (`"X"`, `"O"`, `"tie"` or
/// null).
///
/// Deserializing rejects snapshots whose cached facts disagree with the
/// grid or whose indices fall outside the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Snapshot")]
pub struct GameState {
    #[serde(flatten)]
    pub(crate) meta: MetaBoard,
    #[serde(with = "player_index")]
    pub(crate) current_player: Mark,
    pub(crate) active_board: Option<usize>,
    pub(crate) winner: Option<Outcome>,
}

impl GameState {
    /// Empty board, X to move anywhere.
    pub fn new() -> Self {
        Self {
            meta: MetaBoard::default(),
            current_player: Mark::X,
            active_board: None,
            winner: None,
        }
    }

    /// Turn index of the player to move (0 or 1).
    pub fn current_player(&self) -> usize {
        self.current_player.index()
    }

    /// Mark of the player to move.
    pub fn current_mark(&self) -> Mark {
        self.current_player
    }

    /// Sub-board the next move is constrained to; `None` is free choice.
    pub fn active_board(&self) -> Option<usize> {
        self.active_board
    }

    pub fn winner(&self) -> Option<Outcome> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn meta(&self) -> &MetaBoard {
        &self.meta
    }

    pub fn board(&self, board: usize) -> Option<&SubBoard> {
        self.meta.boards.get(board)
    }

    pub fn board_winner(&self, board: usize) -> Option<Mark> {
        self.meta.board_winners.get(board).copied().flatten()
    }

    pub fn winning_combination(&self) -> Option<[usize; 3]> {
        self.meta.winning_combination
    }

    pub fn cell(&self, board: usize, cell: usize) -> Option<Mark> {
        self.board(board).and_then(|b| b.get(cell))
    }

    /// Number of occupied cells across the whole grid.
    pub fn moves_played(&self) -> usize {
        self.meta
            .boards
            .iter()
            .map(|b| b.cells().iter().filter(|c| c.is_some()).count())
            .sum()
    }
}

/// Unchecked wire form of [`GameState`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    #[serde(flatten)]
    meta: MetaBoard,
    #[serde(with = "player_index")]
    current_player: Mark,
    active_board: Option<usize>,
    winner: Option<Outcome>,
}

impl TryFrom<Snapshot> for GameState {
    type Error = String;

    fn try_from(snapshot: Snapshot) -> Result<Self, Self::Error> {
        let Snapshot {
            meta,
            current_player,
            active_board,
            winner,
        } = snapshot;

        for (board, sub) in meta.boards.iter().enumerate() {
            if meta.board_winners[board] != sub.winner() {
                return Err(format!("Board winner {} does not match its grid", board));
            }
        }
        if let Some(line) = meta.winning_combination {
            if !LINES.contains(&line) {
                return Err(format!("Invalid winning combination: {:?}", line));
            }
        }
        if let Some(board) = active_board {
            if board >= 9 || !meta.is_open(board) || winner.is_some() {
                return Err(format!("Invalid active board: {}", board));
            }
        }

        Ok(Self {
            meta,
            current_player,
            active_board,
            winner,
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// `current_player` travels as its turn index.
mod player_index {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::board::Mark;

    pub fn serialize<S: Serializer>(mark: &Mark, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(mark.index() as u8)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Mark, D::Error> {
        let index = u8::deserialize(deserializer)?;
        Mark::from_index(index as usize)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid current player: {}", index)))
    }
}
