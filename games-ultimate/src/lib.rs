//! Ultimate Tic-Tac-Toe rules for the room server and the play client
//!
//! This crate is the single rule engine every front end goes through:
//! - `board`: marks, sub-boards and the meta-board with line scans
//! - `rules`: move validation, win/tie detection and next-board routing
//! - `bot`: difficulty-parameterized move selection
//!
//! A game is a [`GameState`]; callers submit a [`Move`] together with an
//! [`Authority`] and act on the returned `Result`.

pub mod board;
pub mod bot;
pub mod error;
pub mod rules;
pub mod state;

// Re-export main types for convenience
pub use board::{Mark, MetaBoard, SubBoard};
pub use bot::{choose_move, Difficulty, HeuristicPolicy, Policy, RandomPolicy};
pub use error::MoveError;
pub use rules::Authority;
pub use state::{GameState, Move, Outcome};
