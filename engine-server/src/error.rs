use games_ultimate::MoveError;

/// Failures of room-level requests. None of them mutate a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Room is full")]
    RoomFull,
    #[error("Room {0} not found")]
    RoomNotFound(String),
    #[error("You are not a player in this room")]
    NotInRoom,
    #[error("No game is in progress in this room")]
    GameNotInProgress,
    #[error(transparent)]
    Move(#[from] MoveError),
}

impl SessionError {
    /// Short machine-readable code, used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::RoomFull => "room_full",
            SessionError::RoomNotFound(_) => "room_not_found",
            SessionError::NotInRoom => "not_in_room",
            SessionError::GameNotInProgress => "game_not_in_progress",
            SessionError::Move(err) => err.code(),
        }
    }
}
