//! User lifecycle event notifications.
//!
//! Registration and deletion publish `user.created` / `user.removed` events
//! on a broadcast channel. Interested subsystems subscribe; the default
//! consumer is a logging task. Send never blocks the request path, and a
//! send with no subscribers is not an error.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Buffered events per subscriber before lagging kicks in.
const EVENT_CAPACITY: usize = 256;

/// A user lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEvent {
    Created(i64),
    Removed(i64),
}

impl UserEvent {
    /// Routing key for the event, matching the `user.*` naming scheme.
    pub fn routing_key(&self) -> &'static str {
        match self {
            Self::Created(_) => "user.created",
            Self::Removed(_) => "user.removed",
        }
    }

    /// Id of the affected user.
    pub fn user_id(&self) -> i64 {
        match self {
            Self::Created(id) | Self::Removed(id) => *id,
        }
    }
}

/// Publisher handle for user lifecycle events.
#[derive(Clone)]
pub struct UserEvents {
    tx: broadcast::Sender<UserEvent>,
}

impl UserEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Announce that a new user was created.
    pub fn notify_created(&self, id: i64) {
        let _ = self.tx.send(UserEvent::Created(id));
    }

    /// Announce that a user was removed.
    pub fn notify_removed(&self, id: i64) {
        let _ = self.tx.send(UserEvent::Removed(id));
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<UserEvent> {
        self.tx.subscribe()
    }
}

impl Default for UserEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the logging subscriber for user events.
pub fn spawn_event_logger(events: &UserEvents) -> JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    info!(key = event.routing_key(), user_id = event.user_id(), "user event");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "user event logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
