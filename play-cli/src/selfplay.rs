use anyhow::{anyhow, Result};
use games_ultimate::{Authority, GameState, HeuristicPolicy, Mark, Outcome, Policy};
use tracing::{debug, info};

use crate::config::Config;

/// Results of a self-play batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub x_wins: u32,
    pub o_wins: u32,
    pub ties: u32,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Winner(Mark::X) => self.x_wins += 1,
            Outcome::Winner(Mark::O) => self.o_wins += 1,
            Outcome::Tie => self.ties += 1,
        }
    }

    pub fn games(&self) -> u32 {
        self.x_wins + self.o_wins + self.ties
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} games: X {} / O {} / tie {}",
            self.games(),
            self.x_wins,
            self.o_wins,
            self.ties
        )
    }
}

/// Play one game to the end and return the final state.
pub fn play_game(x: &mut dyn Policy, o: &mut dyn Policy) -> Result<GameState> {
    let mut state = GameState::new();
    while !state.is_over() {
        let mv = match state.current_mark() {
            Mark::X => x.select_move(&state),
            Mark::O => o.select_move(&state),
        }
        .ok_or_else(|| anyhow!("no move available in a running game"))?;
        state.play(mv, Authority::Local)?;
    }
    Ok(state)
}

pub fn run_batch(config: &Config) -> Result<Tally> {
    let (mut x, mut o) = match config.seed {
        Some(seed) => (
            HeuristicPolicy::with_seed(config.difficulty, seed),
            HeuristicPolicy::with_seed(config.opponent_difficulty(), seed.wrapping_add(1)),
        ),
        None => (
            HeuristicPolicy::new(config.difficulty),
            HeuristicPolicy::new(config.opponent_difficulty()),
        ),
    };
    info!(
        games = config.games,
        x = %x.difficulty(),
        o = %o.difficulty(),
        "Starting self-play"
    );

    let mut tally = Tally::default();
    for game in 1..=config.games {
        let state = play_game(&mut x, &mut o)?;
        let outcome = state
            .winner()
            .ok_or_else(|| anyhow!("game {} ended without a result", game))?;
        debug!(game, %outcome, moves = state.moves_played(), "Game finished");
        tally.record(outcome);

        if game % 10 == 0 {
            info!("Completed {} games", game);
        }
    }

    info!(
        x_wins = tally.x_wins,
        o_wins = tally.o_wins,
        ties = tally.ties,
        "Self-play finished"
    );
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use games_ultimate::{Difficulty, RandomPolicy};

    fn config(args: &[&str]) -> Config {
        Config::try_parse_from(
            ["uttt-play", "--mode", "self-play"]
                .into_iter()
                .chain(args.iter().copied()),
        )
        .unwrap()
    }

    #[test]
    fn test_tally_record() {
        let mut tally = Tally::default();
        tally.record(Outcome::Winner(Mark::X));
        tally.record(Outcome::Winner(Mark::X));
        tally.record(Outcome::Winner(Mark::O));
        tally.record(Outcome::Tie);

        assert_eq!(tally, Tally { x_wins: 2, o_wins: 1, ties: 1 });
        assert_eq!(tally.games(), 4);
        assert_eq!(tally.to_string(), "4 games: X 2 / O 1 / tie 1");
    }

    #[test]
    fn test_play_game_finishes() {
        let mut x = RandomPolicy::with_seed(1);
        let mut o = HeuristicPolicy::with_seed(Difficulty::Hard, 2);
        let state = play_game(&mut x, &mut o).unwrap();

        assert!(state.is_over());
        assert!(state.legal_moves().is_empty());
    }

    #[test]
    fn test_play_game_with_boxed_policies() {
        let mut x: Box<dyn Policy> = Box::new(HeuristicPolicy::with_seed(Difficulty::Easy, 5));
        let mut o: Box<dyn Policy> = Box::new(RandomPolicy::with_seed(6));
        let state = play_game(x.as_mut(), o.as_mut()).unwrap();

        assert!(state.is_over());
        assert!(state.winner().is_some());
    }

    #[test]
    fn test_batch_counts_every_game() {
        let tally = run_batch(&config(&["--games", "12", "--seed", "3"])).unwrap();
        assert_eq!(tally.games(), 12);
    }

    #[test]
    fn test_seeded_batches_repeat() {
        let args = ["--games", "8", "--seed", "11", "--difficulty", "easy"];
        let first = run_batch(&config(&args)).unwrap();
        let second = run_batch(&config(&args)).unwrap();
        assert_eq!(first, second);
    }
}
