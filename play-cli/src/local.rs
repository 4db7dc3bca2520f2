//! Interactive terminal play: two humans, or a human against the bot.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use games_ultimate::{GameState, HeuristicPolicy, Mark, Move, MoveError, Policy};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::Config;
use crate::render::render;
use crate::scheduler::{BotScheduler, SharedPolicy, SharedTable, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Move),
    NewGame,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Enter a move as `<board> <cell>`, or `new` / `quit`")]
    Format,
    #[error(transparent)]
    Move(#[from] MoveError),
}

pub fn parse_command(line: &str) -> Result<Command, InputError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["q"] | ["quit"] | ["exit"] => Ok(Command::Quit),
        ["n"] | ["new"] => Ok(Command::NewGame),
        [board, cell] => {
            let board = board.parse().map_err(|_| InputError::Format)?;
            let cell = cell.parse().map_err(|_| InputError::Format)?;
            Ok(Command::Move(Move::new(board, cell)?))
        }
        _ => Err(InputError::Format),
    }
}

pub fn make_policy(config: &Config) -> Box<dyn Policy> {
    match config.seed {
        Some(seed) => Box::new(HeuristicPolicy::with_seed(config.difficulty, seed)),
        None => Box::new(HeuristicPolicy::new(config.difficulty)),
    }
}

fn lock(table: &SharedTable) -> Result<MutexGuard<'_, Table>> {
    table.lock().map_err(|_| anyhow!("game table lock poisoned"))
}

fn show(state: &GameState) {
    println!("\n{}", render(state));
    if state.is_over() {
        println!("Type `new` for another game or `quit` to leave.");
    }
}

/// Play until the user quits. `bot` is the mark the bot plays, if any.
pub async fn run(config: &Config, bot: Option<Mark>) -> Result<()> {
    let table = Table::shared();
    let policy: SharedPolicy = Arc::new(Mutex::new(make_policy(config)));
    let (bot_tx, mut bot_moves) = mpsc::unbounded_channel();
    let mut scheduler = BotScheduler::new();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    info!(bot = ?bot, difficulty = %config.difficulty, "Starting game");
    show(lock(&table)?.state());

    loop {
        let state = *lock(&table)?.state();
        let bots_turn = !state.is_over() && Some(state.current_mark()) == bot;
        if bots_turn && !scheduler.is_pending() {
            let delay = config.bot_delay(state.moves_played() == 0);
            scheduler.schedule(&table, &policy, state.current_mark(), delay, bot_tx.clone());
        }

        tokio::select! {
            Some(played) = bot_moves.recv() => {
                debug!(mv = %played.mv, generation = played.generation, "Bot moved");
                println!("Bot plays {}", played.mv);
                show(lock(&table)?.state());
            }
            line = input.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::NewGame) => {
                        scheduler.cancel();
                        let mut guard = lock(&table)?;
                        guard.restart();
                        info!(generation = guard.generation(), "New game");
                        show(guard.state());
                    }
                    Ok(Command::Move(_)) if bots_turn => println!("Wait for the bot to move."),
                    Ok(Command::Move(mv)) => {
                        let mut guard = lock(&table)?;
                        match guard.play(mv) {
                            Ok(()) => show(guard.state()),
                            Err(err) => println!("{}", err),
                        }
                    }
                    Err(err) => println!("{}", err),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    scheduler.cancel();
    info!("Leaving game");
    Ok(())
}
