//! Room service
//!
//! Thin adapter between decoded client messages and the session registry.
//! Every request is answered through the hub; rule and room errors go back
//! to the sender as `move-rejected` or a failed `join-result`.

use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use games_ultimate::Move;

use crate::error::SessionError;
use crate::hub::ClientHub;
use crate::protocol::{ClientId, ClientMessage, RoomId, ServerMessage};
use crate::registry::{RegistryStats, SessionRegistry};

#[derive(Debug, Default)]
pub struct RoomService {
    registry: SessionRegistry,
    hub: ClientHub,
}

impl RoomService {
    pub fn new(registry: SessionRegistry) -> Self {
        Self {
            registry,
            hub: ClientHub::new(),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    /// Register a new client and return its id with its outbound queue.
    pub fn connect(&self) -> (ClientId, mpsc::UnboundedReceiver<ServerMessage>) {
        let client = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.hub.register(client, tx);
        info!(client = %client, "Client connected");
        (client, rx)
    }

    pub fn handle(&self, client: ClientId, message: ClientMessage) {
        match message {
            ClientMessage::CreateRoom => {
                let room_id = self.registry.create_room(client);
                self.hub.send(client, ServerMessage::RoomCreated { room_id });
            }
            ClientMessage::JoinRoom { room_id } => self.join_room(client, room_id),
            ClientMessage::MakeMove {
                room_id,
                board_index,
                cell_index,
            } => self.make_move(client, room_id, board_index, cell_index),
        }
    }

    fn join_room(&self, client: ClientId, room_id: RoomId) {
        match self.registry.join_room(client, &room_id) {
            Ok(outbound) => self.hub.deliver(outbound),
            Err(err) => {
                warn!(client = %client, room_id = %room_id, error = %err, "Join rejected");
                self.hub.send(
                    client,
                    ServerMessage::JoinResult {
                        room_id,
                        success: false,
                        message: Some(err.to_string()),
                        player_count: None,
                    },
                );
            }
        }
    }

    fn make_move(&self, client: ClientId, room_id: RoomId, board: usize, cell: usize) {
        let result = Move::new(board, cell)
            .map_err(SessionError::from)
            .and_then(|mv| self.registry.make_move(client, &room_id, mv));
        match result {
            Ok(outbound) => self.hub.deliver(outbound),
            Err(err) => {
                warn!(
                    client = %client,
                    room_id = %room_id,
                    board,
                    cell,
                    error = %err,
                    "Move rejected"
                );
                self.hub.send(
                    client,
                    ServerMessage::MoveRejected {
                        room_id,
                        code: err.code().to_string(),
                        message: err.to_string(),
                    },
                );
            }
        }
    }

    /// Report a line that could not be decoded.
    pub fn reject_input(&self, client: ClientId, reason: impl Into<String>) {
        self.hub.send(
            client,
            ServerMessage::Error {
                message: reason.into(),
            },
        );
    }

    /// Drop the client from all rooms and notify whoever remains.
    pub fn disconnect(&self, client: ClientId) {
        self.hub.unregister(client);
        let outbound = self.registry.disconnect(client);
        self.hub.deliver(outbound);
        info!(client = %client, "Client disconnected");
    }
}
