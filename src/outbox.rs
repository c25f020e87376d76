//! Connection-state notifications
//!
//! Observers registered with `add_observer` run synchronously on the thread
//! that drove the transition. Consumers on other threads can `subscribe` to a
//! broadcast channel carrying the same events.

use tokio::sync::broadcast;
use tracing::trace;

use crate::session::SessionState;

/// Broadcast channel capacity for session events
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Event emitted by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Connect completed or Disconnect completed
    StateChanged { state: SessionState },
}

/// Synchronous observer callback
pub type Observer = Box<dyn Fn(&SessionEvent) + Send>;

/// Fan-out of session events
pub struct Outbox {
    observers: Vec<Observer>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Default for Outbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Outbox {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            observers: Vec::new(),
            event_tx,
        }
    }

    /// Register a callback; callbacks run in registration order
    pub fn add_observer<F>(&mut self, observer: F)
    where
        F: Fn(&SessionEvent) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Receive events on another thread
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        for observer in &self.observers {
            observer(&event);
        }
        // No subscribers is fine
        if self.event_tx.send(event).is_err() {
            trace!("No subscribers for {:?}", event);
        }
    }
}
