//! Bot move selection.
//!
//! Bots pick from [`GameState::legal_moves`] with a fixed greedy ranking; the
//! difficulty only controls how often the ranking is consulted instead of a
//! uniformly random legal move.

use rand::prelude::*;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Mark, SubBoard, CENTER, CORNERS};
use crate::state::{GameState, Move};

/// Bot strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Impossible,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Impossible,
    ];

    /// Probability of choosing the ranked move over a random one.
    pub fn optimal_probability(self) -> f64 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Medium => 0.75,
            Difficulty::Hard => 0.95,
            Difficulty::Impossible => 1.0,
        }
    }

    /// Fork creation and the opponent-safety filter are reserved for the top
    /// tier.
    pub fn is_top_tier(self) -> bool {
        self == Difficulty::Impossible
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Impossible => "impossible",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "impossible" => Ok(Difficulty::Impossible),
            other => Err(format!("Unknown difficulty: {}", other)),
        }
    }
}

/// Trait for move selection policies
pub trait Policy: Send {
    /// Pick a move for the player to move, `None` when no legal move exists.
    fn select_move(&mut self, state: &GameState) -> Option<Move>;
}

/// Uniformly random legal moves.
pub struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RandomPolicy {
    fn select_move(&mut self, state: &GameState) -> Option<Move> {
        state.legal_moves().choose(&mut self.rng).copied()
    }
}

/// Difficulty-parameterized greedy bot.
pub struct HeuristicPolicy {
    difficulty: Difficulty,
    rng: ChaCha20Rng,
}

impl HeuristicPolicy {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            difficulty,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

impl Policy for HeuristicPolicy {
    fn select_move(&mut self, state: &GameState) -> Option<Move> {
        choose_move(state, self.difficulty, &mut self.rng)
    }
}

/// Choose a move for the player to move at the given difficulty.
pub fn choose_move<R: Rng>(
    state: &GameState,
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<Move> {
    let moves = state.legal_moves();
    if moves.is_empty() {
        return None;
    }

    if difficulty.is_top_tier() || rng.gen::<f64>() < difficulty.optimal_probability() {
        ranked_move(state, moves, difficulty.is_top_tier(), rng)
    } else {
        moves.choose(rng).copied()
    }
}

/// Greedy ranking; the first non-empty tier wins and ties are broken at random.
fn ranked_move<R: Rng>(
    state: &GameState,
    moves: Vec<Move>,
    top_tier: bool,
    rng: &mut R,
) -> Option<Move> {
    let bot = state.current_mark();
    let opponent = bot.opponent();
    let grid = |mv: Move| -> SubBoard { state.meta().boards()[mv.board] };
    let completes = |mv: Move, mark: Mark| grid(mv).with_mark(mv.cell, mark).winner() == Some(mark);

    let wins: Vec<Move> = moves.iter().copied().filter(|&mv| completes(mv, bot)).collect();
    if let Some(mv) = wins.choose(rng) {
        return Some(*mv);
    }

    let blocks: Vec<Move> = moves.iter().copied().filter(|&mv| completes(mv, opponent)).collect();
    if let Some(mv) = blocks.choose(rng) {
        return Some(*mv);
    }

    if top_tier {
        let forks: Vec<Move> = moves
            .iter()
            .copied()
            .filter(|&mv| grid(mv).with_mark(mv.cell, bot).open_twos(bot) >= 2)
            .collect();
        if let Some(mv) = forks.choose(rng) {
            return Some(*mv);
        }
    }

    let centers: Vec<Move> = moves.iter().copied().filter(|mv| mv.cell == CENTER).collect();
    if let Some(mv) = centers.choose(rng) {
        return Some(*mv);
    }

    let corners: Vec<Move> = moves
        .iter()
        .copied()
        .filter(|mv| CORNERS.contains(&mv.cell))
        .collect();
    if let Some(mv) = corners.choose(rng) {
        return Some(*mv);
    }

    let mut remaining = moves;
    if top_tier {
        // Skip cells that would give the opponent an open two if they took them.
        let safe: Vec<Move> = remaining
            .iter()
            .copied()
            .filter(|&mv| grid(mv).with_mark(mv.cell, opponent).open_twos(opponent) == 0)
            .collect();
        if !safe.is_empty() {
            remaining = safe;
        }
    }

    remaining.choose(rng).copied()
}
