//! Fan-out of poll lifecycle events to connected subscribers.
//!
//! Fire-and-forget over a tokio broadcast channel: no replay, no backlog.
//! Subscribers that connect late resync through the snapshot endpoint
//! instead.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::{PollCreated, VoteResults};

/// Events sent past this many behind a slow subscriber are dropped for it.
const EVENT_BUFFER: usize = 64;

/// Wire frames are `{"event": "pollStarted" | "voteUpdate", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum PollEvent {
    PollStarted(PollCreated),
    VoteUpdate(VoteResults),
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PollEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.tx.subscribe()
    }

    /// Publishing to nobody is not an error; the store write that preceded
    /// the event is the source of truth either way.
    pub fn publish(&self, event: PollEvent) {
        match self.tx.send(event) {
            Ok(receivers) => debug!(receivers, "event published"),
            Err(_) => debug!("no subscribers connected, event dropped"),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
