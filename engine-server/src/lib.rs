//! Ultimate Tic-Tac-Toe room server
//!
//! Hosts two-player rooms over newline-delimited JSON on TCP. All rule
//! checks are delegated to `games-ultimate`; this crate adds the session
//! lifecycle, the room registry and the transport.

pub mod config;
pub mod error;
pub mod hub;
pub mod protocol;
pub mod registry;
pub mod service;
pub mod session;
pub mod transport;

// Re-export main types
pub use config::Config;
pub use error::SessionError;
pub use hub::ClientHub;
pub use protocol::{ClientId, ClientMessage, RoomId, ServerMessage};
pub use registry::{RegistryStats, SessionRegistry};
pub use service::RoomService;
pub use session::{Outbound, Session, SessionStatus};
pub use transport::serve;
