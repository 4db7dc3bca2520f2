//! Wire messages: one JSON object per line, tagged by `type`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use games_ultimate::{GameState, Mark, Outcome};

/// Identifies one connected client for its whole connection.
pub type ClientId = Uuid;

/// Opaque short room identifier.
pub type RoomId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    CreateRoom,
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: RoomId },
    #[serde(rename_all = "camelCase")]
    MakeMove {
        room_id: RoomId,
        board_index: usize,
        cell_index: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    RoomCreated { room_id: RoomId },

    #[serde(rename_all = "camelCase")]
    JoinResult {
        room_id: RoomId,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_count: Option<usize>,
    },

    /// Sent to each entrant separately; the first entrant moves first.
    #[serde(rename_all = "camelCase")]
    GameStarted {
        room_id: RoomId,
        players: Vec<ClientId>,
        your_turn: bool,
        mark: Mark,
    },

    #[serde(rename_all = "camelCase")]
    GameUpdate { room_id: RoomId, state: GameState },

    #[serde(rename_all = "camelCase")]
    GameOver { room_id: RoomId, winner: Outcome },

    #[serde(rename_all = "camelCase")]
    PlayerDisconnected { room_id: RoomId },

    #[serde(rename_all = "camelCase")]
    MoveRejected {
        room_id: RoomId,
        code: String,
        message: String,
    },

    Error { message: String },
}
