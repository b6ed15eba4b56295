use dashmap::DashMap;
use serde::Serialize;
use std::time::Instant;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::ServerMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    /// Passive overlay or widget; receives broadcasts only
    Display,
    /// Logged-in admin console
    Admin,
}

/// A connected socket
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub id: Uuid,
    pub role: ClientRole,
    pub tx: mpsc::Sender<ServerMessage>,
    pub connected_at: Instant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    pub id: Uuid,
    pub role: ClientRole,
    pub connected_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HubStats {
    pub total: usize,
    pub admins: usize,
    pub displays: usize,
    pub connections: Vec<ConnectionInfo>,
}

/// Every connected socket, keyed by connection id
#[derive(Default)]
pub struct Hub {
    subscribers: DashMap<Uuid, Subscriber>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tx: mpsc::Sender<ServerMessage>, role: ClientRole) -> Uuid {
        let id = Uuid::new_v4();
        self.subscribers.insert(
            id,
            Subscriber {
                id,
                role,
                tx,
                connected_at: Instant::now(),
            },
        );
        id
    }

    pub fn unregister(&self, id: &Uuid) -> Option<Subscriber> {
        self.subscribers.remove(id).map(|(_, subscriber)| subscriber)
    }

    /// Returns false if the connection is gone
    pub fn promote(&self, id: &Uuid) -> bool {
        match self.subscribers.get_mut(id) {
            Some(mut subscriber) => {
                subscriber.role = ClientRole::Admin;
                true
            }
            None => false,
        }
    }

    pub fn role(&self, id: &Uuid) -> Option<ClientRole> {
        self.subscribers.get(id).map(|s| s.role)
    }

    pub fn is_admin(&self, id: &Uuid) -> bool {
        self.role(id) == Some(ClientRole::Admin)
    }

    /// Send to a single connection. Returns false if it could not be delivered.
    pub async fn send_to(&self, id: &Uuid, message: ServerMessage) -> bool {
        // Clone the sender so no map guard is held across the await
        let tx = match self.subscribers.get(id) {
            Some(subscriber) => subscriber.tx.clone(),
            None => return false,
        };
        tx.send(message).await.is_ok()
    }

    /// Send to every connection, returning how many accepted the message
    pub fn broadcast(&self, message: ServerMessage) -> usize {
        self.deliver(|_| true, message)
    }

    /// Send to connections with the given role
    pub fn broadcast_to(&self, role: ClientRole, message: ServerMessage) -> usize {
        self.deliver(|s| s.role == role, message)
    }

    /// Never waits on a subscriber: one whose queue is full misses this
    /// message, and closed ones are left for `prune_closed`.
    fn deliver(&self, filter: impl Fn(&Subscriber) -> bool, message: ServerMessage) -> usize {
        let mut delivered = 0;
        for entry in self.subscribers.iter().filter(|entry| filter(entry.value())) {
            match entry.tx.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!("Subscriber {} is not keeping up, dropping message", entry.id);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
        delivered
    }

    /// Drop connections whose writer task has gone away
    pub fn prune_closed(&self) -> usize {
        let before = self.subscribers.len();
        self.subscribers.retain(|_, subscriber| !subscriber.tx.is_closed());
        before - self.subscribers.len()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn stats(&self) -> HubStats {
        let now = Instant::now();
        let mut connections: Vec<ConnectionInfo> = self
            .subscribers
            .iter()
            .map(|entry| ConnectionInfo {
                id: entry.id,
                role: entry.role,
                connected_secs: now.duration_since(entry.connected_at).as_secs(),
            })
            .collect();
        connections.sort_by(|a, b| b.connected_secs.cmp(&a.connected_secs));

        let admins = connections
            .iter()
            .filter(|c| c.role == ClientRole::Admin)
            .count();

        HubStats {
            total: connections.len(),
            admins,
            displays: connections.len() - admins,
            connections,
        }
    }
}
