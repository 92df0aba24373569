//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use mdpad_core::{IdentityError, Location, SessionId};

#[derive(Parser, Debug)]
#[command(name = "mdpad", version, about = "Collaborative markdown pad for the terminal")]
pub struct Cli {
    /// Document to open: a bare id (`brave-otter-4821`) or a full page
    /// address. A new document is created when omitted.
    pub session: Option<String>,

    /// Origin of the sync service.
    #[arg(long, default_value = "http://localhost:3030")]
    pub origin: String,

    /// Where the rendered preview page is written.
    #[arg(long, default_value = "preview.html")]
    pub preview: PathBuf,

    /// Preferences file. Defaults to the user config directory.
    #[arg(long)]
    pub prefs: Option<PathBuf>,

    /// Work without a server; nothing is shared.
    #[arg(long)]
    pub offline: bool,
}

/// Where the editor starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Page origin used for endpoints and links.
    pub origin: Location,
    pub id: SessionId,
    /// The id was generated because none was given.
    pub created: bool,
}

impl Cli {
    pub fn target(&self) -> Result<Target, IdentityError> {
        resolve(&self.origin, self.session.as_deref())
    }
}

/// Resolve `session` against `origin`.
///
/// A full address carries its own origin. An address without a document
/// path, or no argument at all, takes the landing flow and gets a fresh id.
pub fn resolve(origin: &str, session: Option<&str>) -> Result<Target, IdentityError> {
    let (origin, id) = match session {
        Some(arg) if arg.contains("://") => {
            let location = Location::parse(arg)?;
            let id = location.session_id();
            (location, id)
        }
        Some(arg) => (Location::parse(origin)?, Some(SessionId::parse(arg)?)),
        None => (Location::parse(origin)?, None),
    };
    let created = id.is_none();
    Ok(Target {
        id: id.unwrap_or_else(SessionId::generate),
        origin,
        created,
    })
}

/// Resolve an `:open` argument. Addresses must name a document.
pub fn resolve_open(arg: &str) -> Result<SessionId, IdentityError> {
    if arg.contains("://") {
        return Location::parse(arg)?
            .session_id()
            .ok_or(IdentityError::Empty);
    }
    SessionId::parse(arg)
}
