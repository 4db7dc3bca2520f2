use anyhow::{Context, Result};
use clap::Parser;
use games_ultimate::Mark;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod local;
mod render;
mod scheduler;
mod selfplay;

use crate::config::{Config, Mode};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Validate configuration
    config.validate()?;

    // Logs go to stderr so they do not interleave with the board
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_level).context("invalid log level")?)
        .with_writer(std::io::stderr)
        .init();

    info!(mode = ?config.mode, difficulty = %config.difficulty, "Starting");

    match config.mode {
        Mode::Local => local::run(&config, None).await,
        Mode::Bot => {
            let bot = if config.bot_first { Mark::X } else { Mark::O };
            local::run(&config, Some(bot)).await
        }
        Mode::SelfPlay => {
            let tally = selfplay::run_batch(&config)?;
            println!("{}", tally);
            Ok(())
        }
    }
}
