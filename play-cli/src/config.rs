use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use games_ultimate::Difficulty;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Two players sharing one terminal
    Local,
    /// Play against the bot
    Bot,
    /// Bot against bot, reporting results
    SelfPlay,
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "uttt-play")]
#[command(about = "Ultimate Tic-Tac-Toe in the terminal")]
#[command(long_about = "Play Ultimate Tic-Tac-Toe in the terminal.

Moves are entered as `<board> <cell>` with both indices in 0..=8, row-major.
Type `new` to restart the game or `quit` to leave.")]
pub struct Config {
    /// What to play
    #[arg(long, value_enum, env = "UTTT_MODE", default_value = "bot")]
    pub mode: Mode,

    /// Bot strength (easy, medium, hard, impossible)
    #[arg(long, env = "UTTT_DIFFICULTY", default_value = "medium")]
    pub difficulty: Difficulty,

    /// Strength of the second bot in self-play, defaults to --difficulty
    #[arg(long, env = "UTTT_OPPONENT_DIFFICULTY")]
    pub opponent_difficulty: Option<Difficulty>,

    /// Let the bot play X and move first
    #[arg(long, env = "UTTT_BOT_FIRST")]
    pub bot_first: bool,

    /// Pause before each bot move in milliseconds
    #[arg(long, env = "UTTT_BOT_DELAY_MS", default_value = "800")]
    pub bot_delay_ms: u64,

    /// Pause before the bot's opening move in milliseconds
    #[arg(long, env = "UTTT_FIRST_BOT_DELAY_MS", default_value = "1000")]
    pub first_bot_delay_ms: u64,

    /// Number of self-play games
    #[arg(long, env = "UTTT_GAMES", default_value = "100")]
    pub games: u32,

    /// Seed for the bots' random number generators
    #[arg(long, env = "UTTT_SEED")]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "UTTT_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.mode == Mode::SelfPlay && self.games == 0 {
            return Err(anyhow!("games must be greater than 0"));
        }

        if self.log_level.is_empty() {
            return Err(anyhow!("log_level cannot be empty"));
        }

        Ok(())
    }

    pub fn opponent_difficulty(&self) -> Difficulty {
        self.opponent_difficulty.unwrap_or(self.difficulty)
    }

    /// Delay before a bot move, longer for the opening move of a game.
    pub fn bot_delay(&self, opening: bool) -> Duration {
        if opening {
            Duration::from_millis(self.first_bot_delay_ms)
        } else {
            Duration::from_millis(self.bot_delay_ms)
        }
    }
}
