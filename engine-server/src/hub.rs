use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use crate::protocol::{ClientId, ServerMessage};
use crate::session::Outbound;

/// Outbound queues of connected clients, keyed by client id.
#[derive(Debug, Default)]
pub struct ClientHub {
    clients: DashMap<ClientId, mpsc::UnboundedSender<ServerMessage>>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
        }
    }

    pub fn register(&self, client: ClientId, sender: mpsc::UnboundedSender<ServerMessage>) {
        self.clients.insert(client, sender);
    }

    pub fn unregister(&self, client: ClientId) {
        self.clients.remove(&client);
    }

    /// Queue `message` for `client`. Returns false if the client is gone.
    pub fn send(&self, client: ClientId, message: ServerMessage) -> bool {
        match self.clients.get(&client) {
            Some(sender) => sender.send(message).is_ok(),
            None => {
                debug!(client = %client, "Dropping message for unknown client");
                false
            }
        }
    }

    pub fn deliver(&self, outbound: impl IntoIterator<Item = Outbound>) {
        for Outbound { to, message } in outbound {
            self.send(to, message);
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
