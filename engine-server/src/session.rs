//! Per-room turn/session state machine
//!
//! A session moves `Waiting -> Playing -> Finished`. It owns the room's only
//! `GameState` and answers every request with the notifications it produces,
//! so the caller just has to deliver them.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use games_ultimate::{Authority, GameState, Mark, Move};

use crate::error::SessionError;
use crate::protocol::{ClientId, RoomId, ServerMessage};

/// Entrants needed to start a game.
pub const MAX_PLAYERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Waiting,
    Playing,
    Finished,
}

/// A message addressed to one client.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: ClientId,
    pub message: ServerMessage,
}

impl Outbound {
    pub fn new(to: ClientId, message: ServerMessage) -> Self {
        Self { to, message }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    room_id: RoomId,
    players: Vec<ClientId>,
    status: SessionStatus,
    game: Option<GameState>,
}

impl Session {
    pub fn new(room_id: impl Into<RoomId>) -> Self {
        Self {
            room_id: room_id.into(),
            players: Vec::with_capacity(MAX_PLAYERS),
            status: SessionStatus::Waiting,
            game: None,
        }
    }

    /// A waiting room whose creator is already its first entrant.
    pub fn created_by(room_id: impl Into<RoomId>, creator: ClientId) -> Self {
        let mut session = Self::new(room_id);
        session.players.push(creator);
        session
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn players(&self) -> &[ClientId] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub fn contains(&self, client: ClientId) -> bool {
        self.players.contains(&client)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Mark played by `client`, from its join order.
    pub fn mark_of(&self, client: ClientId) -> Option<Mark> {
        self.players
            .iter()
            .position(|&p| p == client)
            .and_then(Mark::from_index)
    }

    /// Add `client` to the room.
    ///
    /// The first message returned is always the joiner's `join-result`. When
    /// the second entrant arrives the game starts and the `game-started`
    /// and `game-update` notifications follow.
    pub fn join(&mut self, client: ClientId) -> Result<Vec<Outbound>, SessionError> {
        if self.contains(client) {
            return Ok(vec![self.join_result(client)]);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(SessionError::RoomFull);
        }

        self.players.push(client);
        info!(
            room_id = %self.room_id,
            client = %client,
            players = self.players.len(),
            "Player joined room"
        );

        let mut out = vec![self.join_result(client)];
        if self.players.len() == MAX_PLAYERS {
            out.extend(self.start());
        }
        Ok(out)
    }

    fn join_result(&self, client: ClientId) -> Outbound {
        Outbound::new(
            client,
            ServerMessage::JoinResult {
                room_id: self.room_id.clone(),
                success: true,
                message: None,
                player_count: Some(self.players.len()),
            },
        )
    }

    fn start(&mut self) -> Vec<Outbound> {
        let game = GameState::new();
        self.game = Some(game);
        self.status = SessionStatus::Playing;
        info!(room_id = %self.room_id, "Game started");

        let mut out: Vec<Outbound> = self
            .players
            .iter()
            .enumerate()
            .filter_map(|(index, &player)| {
                let mark = Mark::from_index(index)?;
                Some(Outbound::new(
                    player,
                    ServerMessage::GameStarted {
                        room_id: self.room_id.clone(),
                        players: self.players.clone(),
                        your_turn: index == game.current_player(),
                        mark,
                    },
                ))
            })
            .collect();
        out.extend(self.broadcast(ServerMessage::GameUpdate {
            room_id: self.room_id.clone(),
            state: game,
        }));
        out
    }

    /// Apply a move submitted by `client`.
    ///
    /// On rejection nothing changes and the error is returned for the
    /// caller to report to the sender alone.
    pub fn make_move(&mut self, client: ClientId, mv: Move) -> Result<Vec<Outbound>, SessionError> {
        let mark = self.mark_of(client).ok_or(SessionError::NotInRoom)?;
        let game = match (self.status, self.game.as_mut()) {
            (SessionStatus::Waiting, _) | (_, None) => {
                return Err(SessionError::GameNotInProgress)
            }
            (_, Some(game)) => game,
        };

        game.play(mv, Authority::Networked(mark))?;
        let state = *game;
        debug!(room_id = %self.room_id, %mark, %mv, "Move accepted");

        let mut out = self.broadcast(ServerMessage::GameUpdate {
            room_id: self.room_id.clone(),
            state,
        });
        if let Some(winner) = state.winner() {
            self.status = SessionStatus::Finished;
            info!(room_id = %self.room_id, %winner, "Game over");
            out.extend(self.broadcast(ServerMessage::GameOver {
                room_id: self.room_id.clone(),
                winner,
            }));
        }
        Ok(out)
    }

    /// Remove `client` from the room.
    ///
    /// Returns `None` if the client was not an entrant. A remaining entrant
    /// is told about the departure and the room goes back to waiting with no
    /// game; an emptied room is left for the registry to drop.
    pub fn leave(&mut self, client: ClientId) -> Option<Vec<Outbound>> {
        let index = self.players.iter().position(|&p| p == client)?;
        self.players.remove(index);
        self.status = SessionStatus::Waiting;
        self.game = None;
        info!(
            room_id = %self.room_id,
            client = %client,
            players = self.players.len(),
            "Player left room"
        );

        Some(self.broadcast(ServerMessage::PlayerDisconnected {
            room_id: self.room_id.clone(),
        }))
    }

    fn broadcast(&self, message: ServerMessage) -> Vec<Outbound> {
        self.players
            .iter()
            .map(|&player| Outbound::new(player, message.clone()))
            .collect()
    }
}
