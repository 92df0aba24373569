//! Session identity and link derivation.
//!
//! A page address has the shape `<scheme>://<host>[:port]/<session-id>`.
//! The single path segment names the document; no segment means the
//! landing flow, where a fresh id is generated. The id is the decoded
//! segment, taken as is; it is encoded again whenever it is put back
//! into an address.
//!
//! ```text
//! https://letsmarkdown.com/brave-otter-4821
//!   origin   = https://letsmarkdown.com
//!   id       = brave-otter-4821
//!   link     = https://letsmarkdown.com/brave-otter-4821
//!   endpoint = wss://letsmarkdown.com/api/socket/brave-otter-4821
//! ```

use std::fmt;
use std::str::FromStr;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{Position, Url};

/// Path prefix of the sync service's socket route.
pub const SOCKET_PATH: &str = "/api/socket";

/// Characters escaped when an id becomes one path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Session id is empty")]
    Empty,
    #[error("Invalid location: {0}")]
    Location(#[from] url::ParseError),
    #[error("Location has no host: {0}")]
    NoHost(String),
}

/// Opaque identifier of one collaborative document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Take a raw identifier verbatim. Only the empty string is rejected.
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        if raw.is_empty() {
            return Err(IdentityError::Empty);
        }
        Ok(Self(raw.to_string()))
    }

    /// Generate a fresh, human-memorable id such as `brave-otter-4821`.
    ///
    /// Collision resistance only needs to cover casual sharing; this is
    /// not a secret.
    pub fn generate() -> Self {
        let mut generator = names::Generator::with_naming(names::Name::Numbered);
        match generator.next() {
            Some(name) => Self(name),
            None => Self(format!("session-{}", rand::random::<u32>())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id escaped for use as a single path segment.
    pub fn path_segment(&self) -> String {
        utf8_percent_encode(&self.0, SEGMENT).to_string()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The current page address (navigation context).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    /// Parse an absolute page address.
    pub fn parse(address: &str) -> Result<Self, IdentityError> {
        let url = Url::parse(address)?;
        if url.host_str().is_none() {
            return Err(IdentityError::NoHost(address.to_string()));
        }
        Ok(Self { url })
    }

    /// The location of the editor page for `id` on this origin.
    pub fn with_session(&self, id: &SessionId) -> Self {
        let mut url = self.url.clone();
        url.set_path(&format!("/{}", id.path_segment()));
        url.set_query(None);
        url.set_fragment(None);
        Self { url }
    }

    /// `scheme://host[:port]`, without a trailing slash.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// Host plus explicit port, as it appears in the address.
    pub fn host(&self) -> &str {
        &self.url[Position::BeforeHost..Position::AfterPort]
    }

    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "https"
    }

    /// The document id named by the address, if it has exactly one
    /// path segment.
    pub fn session_id(&self) -> Option<SessionId> {
        let segments: Vec<&str> = self
            .url
            .path_segments()?
            .filter(|s| !s.is_empty())
            .collect();
        match segments.as_slice() {
            [single] => {
                let decoded = percent_decode_str(single).decode_utf8_lossy();
                SessionId::parse(&decoded).ok()
            }
            [_, _, ..] => {
                log::debug!("Path {} names no single document", self.url.path());
                None
            }
            [] => None,
        }
    }

    /// Canonical address to share with collaborators: `<origin>/<id>`.
    pub fn shareable_link(&self, id: &SessionId) -> String {
        format!("{}/{}", self.origin(), id.path_segment())
    }

    /// Socket address of the sync service for `id`.
    ///
    /// `https` pages use `wss://`, everything else `ws://`.
    pub fn remote_endpoint(&self, id: &SessionId) -> String {
        let scheme = if self.is_secure() { "wss" } else { "ws" };
        format!(
            "{scheme}://{}{SOCKET_PATH}/{}",
            self.host(),
            id.path_segment()
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
