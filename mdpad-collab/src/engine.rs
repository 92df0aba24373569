//! The synchronization engine capability.
//!
//! An engine turns a remote endpoint address into a live connection and
//! reports what happens to it as [`EngineEvent`]s. The session layer
//! never sees document operations; convergence is the engine's job.
//!
//! ```text
//!   SessionConnection ── connect(address, sink) ──► SyncEngine
//!          ▲                                            │
//!          └──── (generation, EngineEvent) ◄── EventSink┘
//! ```

use mdpad_core::{PresenceRoster, UserInfo};
use tokio::sync::mpsc;

/// Identifies one connection attempt. Incremented on every (re)connect.
pub type Generation = u64;

/// What an engine reports about its connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The channel to the service is open.
    Connected,
    /// The channel closed or could not be opened. Recoverable.
    Disconnected,
    /// Local and remote document state diverged beyond repair.
    Desynchronized,
    /// Full snapshot of the remote participants.
    Users(PresenceRoster),
}

pub(crate) type TaggedEvent = (Generation, EngineEvent);

/// Sending half given to an engine for one connection attempt.
///
/// Every event is tagged with the attempt's generation so the receiver
/// can drop events from superseded attempts.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: Generation,
    tx: mpsc::UnboundedSender<TaggedEvent>,
}

impl EventSink {
    pub(crate) fn new(generation: Generation, tx: mpsc::UnboundedSender<TaggedEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Deliver an event. Returns `false` once the receiving session is gone.
    pub fn send(&self, event: EngineEvent) -> bool {
        self.tx.send((self.generation, event)).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A live connection returned by [`SyncEngine::connect`].
pub trait SyncHandle {
    /// Announce the local participant's display attributes.
    fn set_info(&mut self, info: &UserInfo);

    /// Close the connection. Must be idempotent. No events are sent after.
    fn dispose(&mut self);
}

/// A factory for connections to the synchronization service.
pub trait SyncEngine {
    type Handle: SyncHandle;

    /// Begin connecting to `address`. Outcome arrives on `events`.
    fn connect(&self, address: &str, events: EventSink) -> Self::Handle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_tags_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(7, tx);
        assert_eq!(sink.generation(), 7);
        assert!(sink.send(EngineEvent::Connected));
        assert_eq!(rx.try_recv().unwrap(), (7, EngineEvent::Connected));
    }

    #[test]
    fn test_sink_reports_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(1, tx);
        drop(rx);
        assert!(sink.is_closed());
        assert!(!sink.send(EngineEvent::Disconnected));
    }
}
