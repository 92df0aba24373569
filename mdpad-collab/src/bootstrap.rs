//! Document Bootstrap: one session view, one buffer, one connection.
//!
//! [`SessionView`] owns the editor model, the presence registry and the
//! active [`SessionConnection`]. Because the view owns the model and
//! holds at most one connection, two managers can never be attached to
//! the same buffer.
//!
//! Opening a session always runs in this order:
//!
//! ```text
//!  1. reset     model.set_value("") + set_eol(Lf)
//!  2. dispose   previous SessionConnection (if any)
//!  3. construct SessionConnection for the new id
//! ```

use std::time::Instant;

use mdpad_core::examples::{random_example, ExampleDocument, EXAMPLES};
use mdpad_core::{
    EditOperation, EditorModel, EndOfLine, Location, Position, PresenceRegistry, SessionId,
};

use crate::backoff::ReconnectPolicy;
use crate::engine::{EngineEvent, SyncEngine};
use crate::session::{ConnectionState, SessionConnection, SessionObserver};

pub struct SessionView<M, E, O = ()>
where
    M: EditorModel,
    E: SyncEngine + Clone,
    O: SessionObserver + Clone,
{
    location: Location,
    model: M,
    presence: PresenceRegistry,
    engine: E,
    policy: ReconnectPolicy,
    observer: O,
    connection: Option<SessionConnection<E, O>>,
}

impl<M, E, O> SessionView<M, E, O>
where
    M: EditorModel,
    E: SyncEngine + Clone,
    O: SessionObserver + Clone,
{
    /// A view with no session open yet.
    ///
    /// `location` is the page origin used to derive endpoints and links.
    pub fn new(
        location: Location,
        model: M,
        presence: PresenceRegistry,
        engine: E,
        policy: ReconnectPolicy,
        observer: O,
    ) -> Self {
        Self {
            location,
            model,
            presence,
            engine,
            policy,
            observer,
            connection: None,
        }
    }

    /// Reset the buffer, drop the current connection, connect to `id`.
    pub fn open(&mut self, id: SessionId) {
        self.model.set_value("");
        self.model.set_eol(EndOfLine::Lf);

        if let Some(mut previous) = self.connection.take() {
            previous.dispose();
        }

        let address = self.location.remote_endpoint(&id);
        self.connection = Some(SessionConnection::open(
            id,
            address,
            self.engine.clone(),
            self.policy.clone(),
            self.observer.clone(),
        ));
    }

    /// Open `id` unless it is already the current session.
    /// Returns `true` if the session changed.
    pub fn switch_to(&mut self, id: SessionId) -> bool {
        if self.session_id() == Some(&id) {
            return false;
        }
        self.open(id);
        true
    }

    /// Dispose the current connection, if any.
    pub fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.dispose();
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.connection.as_ref().map(|c| c.session_id())
    }

    /// Address to share with collaborators for the current session.
    pub fn shareable_link(&self) -> Option<String> {
        self.session_id().map(|id| self.location.shareable_link(id))
    }

    pub fn state(&self) -> ConnectionState {
        self.connection
            .as_ref()
            .map_or(ConnectionState::Disconnected, |c| c.state())
    }

    pub fn connection(&self) -> Option<&SessionConnection<E, O>> {
        self.connection.as_ref()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    // ─── Presence ────────────────────────────────────────────────────

    /// Rename the local user. Empty or unchanged names do nothing.
    pub fn set_name(&mut self, name: &str) -> bool {
        let changed = self.presence.set_local_name(name);
        if changed {
            self.publish_local();
        }
        changed
    }

    pub fn set_color(&mut self, hue: u32) -> bool {
        let changed = self.presence.set_local_color(hue);
        if changed {
            self.publish_local();
        }
        changed
    }

    /// Pick a new random color for the local user.
    pub fn reroll_color(&mut self) -> bool {
        let changed = self.presence.reroll_color();
        if changed {
            self.publish_local();
        }
        changed
    }

    fn publish_local(&mut self) {
        if let Some(connection) = self.connection.as_mut() {
            connection.publish_info(self.presence.local());
        }
    }

    // ─── Events ──────────────────────────────────────────────────────

    /// Next event of the current connection. Pending while none is open.
    pub async fn recv(&mut self) -> EngineEvent {
        match self.connection.as_mut() {
            Some(connection) => connection.recv().await,
            None => std::future::pending().await,
        }
    }

    pub fn dispatch(&mut self, event: EngineEvent, now: Instant) {
        if let Some(connection) = self.connection.as_mut() {
            connection.dispatch(event, &mut self.presence, now);
        }
    }

    pub fn drain(&mut self, now: Instant) -> usize {
        match self.connection.as_mut() {
            Some(connection) => connection.drain(&mut self.presence, now),
            None => 0,
        }
    }

    pub fn reconnect_deadline(&self) -> Option<Instant> {
        self.connection.as_ref().and_then(|c| c.reconnect_deadline())
    }

    pub fn poll_reconnect(&mut self, now: Instant) -> bool {
        self.connection
            .as_mut()
            .is_some_and(|c| c.poll_reconnect(now))
    }

    // ─── Examples ────────────────────────────────────────────────────

    /// Replace the buffer with `EXAMPLES[index]` as one undoable edit and
    /// move the cursor to the start. `None` if `index` is out of range.
    pub fn load_example_with(&mut self, index: usize) -> Option<&'static ExampleDocument> {
        let example = EXAMPLES.get(index)?;
        self.replace_with(example);
        Some(example)
    }

    /// Replace the buffer with a randomly chosen example.
    pub fn load_example(&mut self) -> &'static ExampleDocument {
        let example = random_example();
        self.replace_with(example);
        example
    }

    fn replace_with(&mut self, example: &ExampleDocument) {
        let range = self.model.full_range();
        self.model
            .push_edit_operations(&[EditOperation::replace(range, example.content)]);
        self.model.set_position(Position::new(0, 0));
    }
}
