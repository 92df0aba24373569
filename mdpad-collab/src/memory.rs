//! In-process engine.
//!
//! [`MemoryEngine`] never touches the network. Its [`MemoryRemote`]
//! plays the service side: it emits events into any connection and
//! records every `connect`, `set_info` and `dispose` call in order.
//! Used by the tests and by the terminal's offline mode.

use std::cell::RefCell;
use std::rc::Rc;

use mdpad_core::UserInfo;

use crate::engine::{EngineEvent, EventSink, SyncEngine, SyncHandle};

/// A call observed by the remote, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Connect { connection: usize, address: String },
    SetInfo { connection: usize, info: UserInfo },
    Dispose { connection: usize },
}

#[derive(Debug)]
struct Connection {
    address: String,
    sink: EventSink,
    infos: Vec<UserInfo>,
    disposed: bool,
}

#[derive(Debug, Default)]
struct RemoteState {
    connections: Vec<Connection>,
    calls: Vec<RemoteCall>,
    /// Events sent to every new connection as soon as it is made.
    on_connect: Vec<EngineEvent>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    state: Rc<RefCell<RemoteState>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller for the service side of every connection this engine makes.
    pub fn remote(&self) -> MemoryRemote {
        MemoryRemote {
            state: Rc::clone(&self.state),
        }
    }
}

impl SyncEngine for MemoryEngine {
    type Handle = MemoryHandle;

    fn connect(&self, address: &str, events: EventSink) -> MemoryHandle {
        let mut state = self.state.borrow_mut();
        let connection = state.connections.len();
        for event in &state.on_connect {
            events.send(event.clone());
        }
        state.connections.push(Connection {
            address: address.to_string(),
            sink: events,
            infos: Vec::new(),
            disposed: false,
        });
        state.calls.push(RemoteCall::Connect {
            connection,
            address: address.to_string(),
        });
        MemoryHandle {
            state: Rc::clone(&self.state),
            connection,
        }
    }
}

#[derive(Debug)]
pub struct MemoryHandle {
    state: Rc<RefCell<RemoteState>>,
    connection: usize,
}

impl MemoryHandle {
    pub fn connection(&self) -> usize {
        self.connection
    }
}

impl SyncHandle for MemoryHandle {
    fn set_info(&mut self, info: &UserInfo) {
        let mut state = self.state.borrow_mut();
        state.connections[self.connection].infos.push(info.clone());
        state.calls.push(RemoteCall::SetInfo {
            connection: self.connection,
            info: info.clone(),
        });
    }

    fn dispose(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.connections[self.connection].disposed {
            return;
        }
        state.connections[self.connection].disposed = true;
        state.calls.push(RemoteCall::Dispose {
            connection: self.connection,
        });
    }
}

/// Service-side controller for a [`MemoryEngine`].
#[derive(Debug, Clone)]
pub struct MemoryRemote {
    state: Rc<RefCell<RemoteState>>,
}

impl MemoryRemote {
    /// Send `events` to every future connection right after it is made.
    pub fn auto_reply(&self, events: Vec<EngineEvent>) {
        self.state.borrow_mut().on_connect = events;
    }

    pub fn connection_count(&self) -> usize {
        self.state.borrow().connections.len()
    }

    /// Index of the most recent connection.
    pub fn latest(&self) -> Option<usize> {
        self.connection_count().checked_sub(1)
    }

    pub fn address(&self, connection: usize) -> Option<String> {
        self.state
            .borrow()
            .connections
            .get(connection)
            .map(|c| c.address.clone())
    }

    /// Emit `event` on the most recent connection.
    ///
    /// Returns `false` if there is none or its session has gone away.
    pub fn emit(&self, event: EngineEvent) -> bool {
        match self.latest() {
            Some(connection) => self.emit_to(connection, event),
            None => false,
        }
    }

    /// Emit `event` on a specific connection, disposed or not.
    pub fn emit_to(&self, connection: usize, event: EngineEvent) -> bool {
        self.state
            .borrow()
            .connections
            .get(connection)
            .is_some_and(|c| c.sink.send(event))
    }

    /// Every `set_info` received on `connection`, oldest first.
    pub fn infos(&self, connection: usize) -> Vec<UserInfo> {
        self.state
            .borrow()
            .connections
            .get(connection)
            .map(|c| c.infos.clone())
            .unwrap_or_default()
    }

    pub fn is_disposed(&self, connection: usize) -> bool {
        self.state
            .borrow()
            .connections
            .get(connection)
            .is_some_and(|c| c.disposed)
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.borrow().calls.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TaggedEvent;
    use tokio::sync::mpsc;

    fn sink(generation: u64) -> (EventSink, mpsc::UnboundedReceiver<TaggedEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSink::new(generation, tx), rx)
    }

    #[test]
    fn test_connect_and_emit() {
        let engine = MemoryEngine::new();
        let remote = engine.remote();
        assert!(!remote.emit(EngineEvent::Connected));

        let (events, mut rx) = sink(1);
        let handle = engine.connect("ws://host/api/socket/a", events);
        assert_eq!(handle.connection(), 0);
        assert_eq!(remote.address(0).as_deref(), Some("ws://host/api/socket/a"));

        assert!(remote.emit(EngineEvent::Connected));
        assert_eq!(rx.try_recv().unwrap(), (1, EngineEvent::Connected));
    }

    #[test]
    fn test_records_calls_in_order() {
        let engine = MemoryEngine::new();
        let remote = engine.remote();
        let (events, _rx) = sink(1);
        let mut handle = engine.connect("a", events);
        handle.set_info(&UserInfo::new("Ada", 1));
        handle.dispose();
        handle.dispose();

        assert_eq!(
            remote.calls(),
            vec![
                RemoteCall::Connect {
                    connection: 0,
                    address: "a".into()
                },
                RemoteCall::SetInfo {
                    connection: 0,
                    info: UserInfo::new("Ada", 1)
                },
                RemoteCall::Dispose { connection: 0 },
            ]
        );
        assert!(remote.is_disposed(0));
        assert_eq!(remote.infos(0).len(), 1);
    }

    #[test]
    fn test_auto_reply() {
        let engine = MemoryEngine::new();
        engine.remote().auto_reply(vec![EngineEvent::Connected]);
        let (events, mut rx) = sink(3);
        let _handle = engine.connect("a", events);
        assert_eq!(rx.try_recv().unwrap(), (3, EngineEvent::Connected));
    }

    #[test]
    fn test_emit_after_receiver_dropped() {
        let engine = MemoryEngine::new();
        let (events, rx) = sink(1);
        let _handle = engine.connect("a", events);
        drop(rx);
        assert!(!engine.remote().emit(EngineEvent::Disconnected));
    }
}
