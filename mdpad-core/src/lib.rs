//! # mdpad-core: session identity, presence and editor model
//!
//! The state that every other mdpad crate agrees on:
//!
//! ```text
//!   page address ──► Location ──► SessionId ──┬──► shareable link
//!                                             └──► socket endpoint
//!
//!   PresenceRegistry { local UserInfo, roster: id → UserInfo }
//!
//!   EditorModel (trait) ◄── TextModel (in-memory, undo stack)
//! ```
//!
//! ## Modules
//!
//! - [`identity`]: session ids, page locations, link derivation
//! - [`presence`]: local/remote participant info and the roster
//! - [`model`]: the editor model interface used by session bootstrap
//! - [`examples`]: built-in example documents

pub mod examples;
pub mod identity;
pub mod model;
pub mod presence;

pub use examples::{ExampleDocument, EXAMPLES};
pub use identity::{IdentityError, Location, SessionId};
pub use model::{EditOperation, EditorModel, EndOfLine, Position, Range, TextModel};
pub use presence::{Participant, ParticipantId, PresenceRegistry, PresenceRoster, UserInfo};
