//! # mdpad-collab: session connection layer
//!
//! Binds one editing session to the synchronization service and keeps
//! the presence roster current.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐  owns   ┌────────────────────┐
//! │ SessionView          │───────► │ EditorModel        │
//! │ (bootstrap)          │         │ PresenceRegistry   │
//! └──────────┬───────────┘         └────────────────────┘
//!            │ one at a time
//!            ▼
//! ┌──────────────────────┐ connect ┌────────────────────┐
//! │ SessionConnection    │───────► │ SyncEngine         │
//! │ state machine        │ ◄────── │  WsEngine (socket) │
//! │ + ReconnectPolicy    │ events  │  MemoryEngine      │
//! └──────────────────────┘         └────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`engine`]: the engine capability and its events
//! - [`session`]: Session Connection Manager
//! - [`backoff`]: reconnection delays
//! - [`bootstrap`]: session view: reset, dispose, construct
//! - [`protocol`]: JSON wire messages and roster folding
//! - [`ws`]: WebSocket engine
//! - [`memory`]: in-process engine for tests and offline use

pub mod backoff;
pub mod bootstrap;
pub mod engine;
pub mod memory;
pub mod protocol;
pub mod session;
pub mod ws;

pub use backoff::ReconnectPolicy;
pub use bootstrap::SessionView;
pub use engine::{EngineEvent, EventSink, Generation, SyncEngine, SyncHandle};
pub use memory::{MemoryEngine, MemoryHandle, MemoryRemote, RemoteCall};
pub use protocol::{ClientMsg, ProtocolError, RemoteTracker, ServerMsg};
pub use session::{ConnectionState, SessionConnection, SessionObserver};
pub use ws::{WsEngine, WsHandle};
