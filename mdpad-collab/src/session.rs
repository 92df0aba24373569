//! Session Connection Manager.
//!
//! Owns the connection to the synchronization service for one session
//! id, from construction until [`SessionConnection::dispose`].
//!
//! ```text
//!                 Connected                 Desynchronized
//!  Disconnected ────────────► Connected ─────────────────────► Desynchronized
//!       ▲  │                     │                                (terminal)
//!       │  └── retry timer ◄─────┘ Disconnected
//!       │          │
//!       └──────────┘ poll_reconnect()
//! ```
//!
//! The manager is a plain state machine. It owns no timer and spawns
//! nothing: the caller waits on [`SessionConnection::recv`] and
//! [`SessionConnection::reconnect_deadline`] and feeds results back
//! through [`SessionConnection::dispatch`] and
//! [`SessionConnection::poll_reconnect`].

use std::time::Instant;

use mdpad_core::{PresenceRegistry, PresenceRoster, SessionId, UserInfo};
use tokio::sync::mpsc;

use crate::backoff::ReconnectPolicy;
use crate::engine::{EngineEvent, EventSink, Generation, SyncEngine, SyncHandle, TaggedEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    /// Terminal. Edits are no longer guaranteed to converge.
    Desynchronized,
}

impl ConnectionState {
    pub fn is_terminal(self) -> bool {
        self == Self::Desynchronized
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Desynchronized => "desynchronized",
        }
    }
}

/// Reactions to session changes. Every method defaults to a no-op.
///
/// No method is called after the connection is disposed.
pub trait SessionObserver {
    fn on_connected(&mut self) {}
    fn on_disconnected(&mut self) {}
    /// Called at most once per connection.
    fn on_desynchronized(&mut self) {}
    fn on_change_users(&mut self, _roster: &PresenceRoster) {}
}

impl SessionObserver for () {}

pub struct SessionConnection<E: SyncEngine, O: SessionObserver = ()> {
    id: SessionId,
    address: String,
    engine: E,
    policy: ReconnectPolicy,
    observer: O,

    handle: Option<E::Handle>,
    generation: Generation,
    events_tx: mpsc::UnboundedSender<TaggedEvent>,
    events_rx: mpsc::UnboundedReceiver<TaggedEvent>,

    state: ConnectionState,
    /// Consecutive failed attempts since the last `Connected`.
    failures: u32,
    reconnect_at: Option<Instant>,
    disposed: bool,
}

impl<E: SyncEngine, O: SessionObserver> SessionConnection<E, O> {
    /// Bind to `id` and start connecting to `address` immediately.
    ///
    /// The editor buffer must already be reset (empty, LF line endings).
    pub fn open(
        id: SessionId,
        address: impl Into<String>,
        engine: E,
        policy: ReconnectPolicy,
        observer: O,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut connection = Self {
            id,
            address: address.into(),
            engine,
            policy,
            observer,
            handle: None,
            generation: 0,
            events_tx,
            events_rx,
            state: ConnectionState::Disconnected,
            failures: 0,
            reconnect_at: None,
            disposed: false,
        };
        log::info!("Opening session {} at {}", connection.id, connection.address);
        connection.connect();
        connection
    }

    // ─── Accessors ───────────────────────────────────────────────────

    pub fn session_id(&self) -> &SessionId {
        &self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// When the next reconnection attempt is due, if one is scheduled.
    pub fn reconnect_deadline(&self) -> Option<Instant> {
        self.reconnect_at
    }

    // ─── Events ──────────────────────────────────────────────────────

    /// Next event from the current connection attempt.
    ///
    /// Events from superseded attempts are skipped. Never completes once
    /// the connection is disposed. Cancel-safe.
    pub async fn recv(&mut self) -> EngineEvent {
        loop {
            if self.disposed {
                std::future::pending::<()>().await;
            }
            // `events_tx` lives in `self`, so the channel never closes.
            let Some((generation, event)) = self.events_rx.recv().await else {
                std::future::pending::<()>().await;
                continue;
            };
            if generation == self.generation {
                return event;
            }
            log::trace!("Dropping {event:?} from stale attempt {generation}");
        }
    }

    /// Next ready event without waiting.
    pub fn try_recv(&mut self) -> Option<EngineEvent> {
        if self.disposed {
            return None;
        }
        while let Ok((generation, event)) = self.events_rx.try_recv() {
            if generation == self.generation {
                return Some(event);
            }
            log::trace!("Dropping {event:?} from stale attempt {generation}");
        }
        None
    }

    /// Apply every ready event. Returns how many were applied.
    pub fn drain(&mut self, presence: &mut PresenceRegistry, now: Instant) -> usize {
        let mut applied = 0;
        while let Some(event) = self.try_recv() {
            self.dispatch(event, presence, now);
            applied += 1;
        }
        applied
    }

    /// Apply one engine event to the state machine.
    pub fn dispatch(&mut self, event: EngineEvent, presence: &mut PresenceRegistry, now: Instant) {
        if self.disposed {
            return;
        }

        if let EngineEvent::Users(snapshot) = event {
            presence.replace_roster(snapshot);
            self.observer.on_change_users(presence.roster());
            return;
        }

        if self.state.is_terminal() {
            log::debug!("Session {} desynchronized, ignoring {event:?}", self.id);
            return;
        }

        match event {
            EngineEvent::Connected => self.on_connected(presence),
            EngineEvent::Disconnected => self.on_disconnected(now),
            EngineEvent::Desynchronized => self.on_desynchronized(),
            EngineEvent::Users(_) => {}
        }
    }

    fn on_connected(&mut self, presence: &PresenceRegistry) {
        if self.state == ConnectionState::Connected {
            return;
        }
        self.state = ConnectionState::Connected;
        self.failures = 0;
        self.reconnect_at = None;
        log::info!("Session {} connected", self.id);

        if let Some(handle) = self.handle.as_mut() {
            handle.set_info(presence.local());
        }
        self.observer.on_connected();
    }

    fn on_disconnected(&mut self, now: Instant) {
        let was_connected = self.state == ConnectionState::Connected;
        if !was_connected && self.reconnect_at.is_some() {
            return;
        }
        self.state = ConnectionState::Disconnected;

        if self.policy.allows(self.failures) {
            let delay = self.policy.delay_for_attempt(self.failures);
            self.reconnect_at = Some(now + delay);
            log::info!(
                "Session {} disconnected, reconnecting in {}ms (attempt {})",
                self.id,
                delay.as_millis(),
                self.failures + 1
            );
        } else {
            self.reconnect_at = None;
            log::warn!(
                "Session {} disconnected, giving up after {} attempts",
                self.id,
                self.failures
            );
        }
        self.failures += 1;

        if was_connected {
            self.observer.on_disconnected();
        }
    }

    fn on_desynchronized(&mut self) {
        self.state = ConnectionState::Desynchronized;
        self.reconnect_at = None;
        log::error!(
            "Session {} desynchronized from the server; save your work and reload",
            self.id
        );
        self.observer.on_desynchronized();
    }

    // ─── Commands ────────────────────────────────────────────────────

    /// Perform the scheduled reconnection if it is due.
    /// Returns `true` if a new attempt was started.
    pub fn poll_reconnect(&mut self, now: Instant) -> bool {
        match self.reconnect_at {
            Some(due) if now >= due && !self.disposed && self.state == ConnectionState::Disconnected => {
                self.reconnect_at = None;
                self.connect();
                true
            }
            _ => false,
        }
    }

    /// Send the local participant's info if connected.
    /// Returns `true` if it was sent.
    pub fn publish_info(&mut self, info: &UserInfo) -> bool {
        if self.disposed || self.state != ConnectionState::Connected {
            return false;
        }
        match self.handle.as_mut() {
            Some(handle) => {
                handle.set_info(info);
                true
            }
            None => false,
        }
    }

    /// Close the transport and cancel any pending reconnection.
    ///
    /// Idempotent. No observer method is called afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.reconnect_at = None;
        if let Some(mut handle) = self.handle.take() {
            handle.dispose();
        }
        self.events_rx.close();
        log::info!("Session {} closed", self.id);
    }

    fn connect(&mut self) {
        if let Some(mut old) = self.handle.take() {
            old.dispose();
        }
        self.generation += 1;
        let sink = EventSink::new(self.generation, self.events_tx.clone());
        log::debug!(
            "Connecting session {} (attempt generation {})",
            self.id,
            self.generation
        );
        self.handle = Some(self.engine.connect(&self.address, sink));
    }
}

impl<E: SyncEngine, O: SessionObserver> Drop for SessionConnection<E, O> {
    fn drop(&mut self) {
        self.dispose();
    }
}
