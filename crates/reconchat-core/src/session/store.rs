//! SessionStore -- ordered conversation log with change notifications.
//!
//! Three transitions only: replace-all (`load`), `append`, and `clear`.
//! Each one swaps or extends the log and publishes its [`ClientEvent`]
//! under a single lock acquisition, so subscribers never observe a
//! half-applied change and events arrive in the order changes were applied.

use std::sync::Mutex;

use reconchat_types::event::ClientEvent;
use reconchat_types::message::Message;
use tokio::sync::broadcast;

use crate::event::EventBus;

/// In-memory mirror of the conversation held by the backend.
///
/// Order is insertion order. The store never sorts, deduplicates or
/// validates content.
#[derive(Debug)]
pub struct SessionStore {
    messages: Mutex<Vec<Message>>,
    events: EventBus,
}

impl SessionStore {
    /// Create an empty store publishing onto `events`.
    pub fn new(events: EventBus) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Replace the whole log. The resulting order equals the input order.
    pub fn load(&self, messages: Vec<Message>) {
        let count = messages.len();
        let mut log = self.messages.lock().expect("session lock poisoned");
        *log = messages;
        self.events.publish(ClientEvent::HistoryLoaded { count });
        drop(log);
        tracing::debug!(count, "session loaded");
    }

    /// Add a message to the end of the log.
    pub fn append(&self, message: Message) {
        let mut log = self.messages.lock().expect("session lock poisoned");
        log.push(message.clone());
        self.events.publish(ClientEvent::MessageAppended { message });
    }

    /// Reset to an empty log. Idempotent.
    pub fn clear(&self) {
        let mut log = self.messages.lock().expect("session lock poisoned");
        log.clear();
        self.events.publish(ClientEvent::HistoryCleared);
    }

    /// Snapshot of the current log.
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().expect("session lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().expect("session lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(EventBus::default())
    }
}
