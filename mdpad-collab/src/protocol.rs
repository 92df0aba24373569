//! JSON text protocol spoken with the collaboration service.
//!
//! Each WebSocket text frame carries one externally tagged message:
//!
//! ```text
//! server → client   {"Identity": 3}
//!                   {"History": {"start": 0, "operations": [...]}}
//!                   {"UserInfo": {"id": 5, "info": {"name": "...", "hue": 120}}}
//!                   {"UserInfo": {"id": 5, "info": null}}        (left)
//!                   {"UserCursor": {"id": 5, "data": {...}}}
//! client → server   {"ClientInfo": {"name": "...", "hue": 120}}
//! ```
//!
//! Operations and cursor payloads are carried opaquely.

use mdpad_core::{ParticipantId, PresenceRoster, UserInfo};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::EngineEvent;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("connection closed")]
    ConnectionClosed,
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Message from the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMsg {
    /// Our participant id for this connection.
    Identity(ParticipantId),
    /// A batch of operations starting at revision `start`.
    History {
        start: u64,
        operations: Vec<serde_json::Value>,
    },
    /// A participant joined or changed (`Some`) or left (`None`).
    UserInfo {
        id: ParticipantId,
        info: Option<UserInfo>,
    },
    UserCursor {
        id: ParticipantId,
        data: serde_json::Value,
    },
}

impl ServerMsg {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}

/// Message to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMsg {
    ClientInfo(UserInfo),
}

impl ClientMsg {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

// ─── Connection tracking ─────────────────────────────────────────────

/// Per-connection view of the service's stream.
///
/// Folds incremental join/leave messages into a full roster so the
/// session layer always receives complete snapshots, and watches the
/// history revision for gaps.
#[derive(Debug, Default)]
pub struct RemoteTracker {
    me: Option<ParticipantId>,
    revision: u64,
    roster: PresenceRoster,
    desynchronized: bool,
}

impl RemoteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn me(&self) -> Option<ParticipantId> {
        self.me
    }

    /// Number of operations seen so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn roster(&self) -> &PresenceRoster {
        &self.roster
    }

    /// Apply one message. Returns the event it produces, if any.
    pub fn apply(&mut self, msg: ServerMsg) -> Option<EngineEvent> {
        match msg {
            ServerMsg::Identity(id) => {
                self.me = Some(id);
                // Our own entry may have arrived before we knew who we are.
                self.roster.remove(&id).map(|_| EngineEvent::Users(self.roster.clone()))
            }
            ServerMsg::History { start, operations } => {
                if self.desynchronized {
                    return None;
                }
                if start > self.revision {
                    log::error!(
                        "History gap: expected revision {}, service sent {start}",
                        self.revision
                    );
                    self.desynchronized = true;
                    return Some(EngineEvent::Desynchronized);
                }
                let end = start + operations.len() as u64;
                self.revision = self.revision.max(end);
                None
            }
            ServerMsg::UserInfo { id, info } => {
                if Some(id) == self.me {
                    return None;
                }
                let changed = match info {
                    Some(info) => self.roster.insert(id, info.clone()) != Some(info),
                    None => self.roster.remove(&id).is_some(),
                };
                changed.then(|| EngineEvent::Users(self.roster.clone()))
            }
            ServerMsg::UserCursor { .. } => None,
        }
    }
}
