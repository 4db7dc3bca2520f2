//! Delayed bot moves
//!
//! A bot move is a spawned task that sleeps for the pacing delay and then
//! plays into the shared table. The task is owned by a [`BotScheduler`]:
//! cancelling or dropping the scheduler aborts it, and a task that fires
//! after the game ended or was restarted does nothing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use games_ultimate::{Authority, GameState, Mark, Move, MoveError, Policy};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// The game being played locally plus a counter bumped on every restart.
#[derive(Debug, Default)]
pub struct Table {
    state: GameState,
    generation: u64,
}

pub type SharedTable = Arc<Mutex<Table>>;
pub type SharedPolicy = Arc<Mutex<Box<dyn Policy>>>;

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedTable {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn play(&mut self, mv: Move) -> Result<(), MoveError> {
        self.state.play(mv, Authority::Local)
    }

    /// Start a new game; moves scheduled for the old one become stale.
    pub fn restart(&mut self) {
        self.state = GameState::new();
        self.generation += 1;
    }
}

/// A bot move that was applied to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotMove {
    pub mv: Move,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct BotScheduler {
    pending: Option<JoinHandle<()>>,
}

impl BotScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a move for `bot` after `delay`, replacing any pending one.
    ///
    /// When it fires the task re-reads the table and only plays if the game
    /// is the same one, still running, and `bot` is to move.
    pub fn schedule(
        &mut self,
        table: &SharedTable,
        policy: &SharedPolicy,
        bot: Mark,
        delay: Duration,
        events: mpsc::UnboundedSender<BotMove>,
    ) {
        self.cancel();

        let generation = match table.lock() {
            Ok(guard) => guard.generation(),
            Err(_) => return,
        };
        let table = Arc::clone(table);
        let policy = Arc::clone(policy);

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(played) = fire(&table, &policy, bot, generation) {
                let _ = events.send(played);
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }
}

impl Drop for BotScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn fire(table: &SharedTable, policy: &SharedPolicy, bot: Mark, generation: u64) -> Option<BotMove> {
    let mut table = table.lock().ok()?;
    if table.generation() != generation {
        debug!(generation, "Skipping bot move for a restarted game");
        return None;
    }
    if table.state().is_over() || table.state().current_mark() != bot {
        debug!("Skipping bot move, not the bot's turn");
        return None;
    }

    let mv = policy.lock().ok()?.select_move(table.state())?;
    match table.play(mv) {
        Ok(()) => Some(BotMove { mv, generation }),
        Err(err) => {
            warn!(%mv, error = %err, "Bot chose an illegal move");
            None
        }
    }
}
