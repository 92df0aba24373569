//! Presence: who is in the session and how they are displayed.
//!
//! ```text
//!   set_local_name / set_local_color ──► local UserInfo ──► (connected) set_info
//!
//!   remote snapshot ──► replace_roster ──► roster (id → UserInfo)
//! ```
//!
//! The roster is never patched. Every snapshot from the remote side is
//! authoritative and replaces the previous mapping wholesale.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Identifier the sync service assigns to one remote connection.
pub type ParticipantId = u64;

/// Remote participants keyed by their connection id.
pub type PresenceRoster = HashMap<ParticipantId, UserInfo>;

const ANIMALS: &[&str] = &[
    "Aardvark", "Albatross", "Alligator", "Alpaca", "Ant", "Armadillo", "Badger", "Bat",
    "Bear", "Beaver", "Bison", "Buffalo", "Camel", "Capybara", "Caribou", "Cat", "Cheetah",
    "Chinchilla", "Cobra", "Cormorant", "Coyote", "Crab", "Crane", "Crow", "Deer", "Dingo",
    "Dolphin", "Dove", "Dragonfly", "Duck", "Eagle", "Echidna", "Eel", "Elephant", "Elk",
    "Emu", "Falcon", "Ferret", "Finch", "Flamingo", "Fox", "Frog", "Gazelle", "Gecko",
    "Giraffe", "Gnu", "Goose", "Gorilla", "Grasshopper", "Hamster", "Hare", "Hawk",
    "Hedgehog", "Heron", "Hippo", "Hummingbird", "Hyena", "Ibis", "Iguana", "Impala",
    "Jackal", "Jaguar", "Jellyfish", "Kangaroo", "Kingfisher", "Koala", "Kookaburra",
    "Lemur", "Leopard", "Lion", "Llama", "Lobster", "Lynx", "Magpie", "Manatee", "Meerkat",
    "Mole", "Mongoose", "Moose", "Narwhal", "Newt", "Octopus", "Okapi", "Opossum", "Orca",
    "Ostrich", "Otter", "Owl", "Panda", "Panther", "Parrot", "Pelican", "Penguin",
    "Platypus", "Porcupine", "Quail", "Quokka", "Rabbit", "Raccoon", "Raven", "Reindeer",
    "Rhino", "Salamander", "Seahorse", "Seal", "Shark", "Sloth", "Snail", "Sparrow",
    "Squid", "Squirrel", "Starling", "Swan", "Tapir", "Tiger", "Toucan", "Turtle",
    "Walrus", "Weasel", "Whale", "Wolf", "Wombat", "Yak", "Zebra",
];

/// Shown for participants whose name is blank.
pub const FALLBACK_NAME: &str = "Anonymous";

/// Display attributes of one participant, local or remote.
///
/// Serializes as `{"name": ..., "hue": ...}`. The name is never blank and
/// the hue is always in `0..360`, including for decoded values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireUserInfo")]
pub struct UserInfo {
    pub name: String,
    /// Hue in degrees, `0..360`.
    pub hue: u32,
}

/// `UserInfo` as another client may send it.
#[derive(Deserialize)]
struct WireUserInfo {
    name: String,
    hue: i64,
}

impl From<WireUserInfo> for UserInfo {
    fn from(wire: WireUserInfo) -> Self {
        // rem_euclid keeps the result in 0..360.
        Self::new(wire.name, wire.hue.rem_euclid(360) as u32)
    }
}

impl UserInfo {
    pub fn new(name: impl Into<String>, hue: u32) -> Self {
        let name = name.into();
        Self {
            name: if name.trim().is_empty() {
                FALLBACK_NAME.to_string()
            } else {
                name
            },
            hue: hue % 360,
        }
    }

    /// A fresh anonymous identity: `"Anonymous <Animal>"` with a random hue.
    pub fn random() -> Self {
        Self::new(random_name(), random_hue())
    }

    /// sRGB color for this participant's hue at the saturation and
    /// lightness the roster uses.
    pub fn rgb(&self) -> [u8; 3] {
        let (r, g, b) = hsl_to_rgb(self.hue as f32 / 360.0, 0.9, 0.45);
        [to_byte(r), to_byte(g), to_byte(b)]
    }

    /// CSS color string, `hsl(h, 90%, 45%)`.
    pub fn css_color(&self) -> String {
        format!("hsl({}, 90%, 45%)", self.hue)
    }
}

pub fn random_name() -> String {
    let mut rng = rand::rng();
    let animal = ANIMALS[rng.random_range(0..ANIMALS.len())];
    format!("Anonymous {animal}")
}

pub fn random_hue() -> u32 {
    rand::rng().random_range(0..360)
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (l, l, l);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// One row of the "Active Users" list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant<'a> {
    /// `None` for the local user.
    pub id: Option<ParticipantId>,
    pub info: &'a UserInfo,
    pub is_me: bool,
}

/// Local identity plus the latest roster snapshot for one session view.
#[derive(Debug, Clone)]
pub struct PresenceRegistry {
    local: UserInfo,
    roster: PresenceRoster,
}

impl PresenceRegistry {
    pub fn new(local: UserInfo) -> Self {
        Self {
            local,
            roster: PresenceRoster::new(),
        }
    }

    pub fn local(&self) -> &UserInfo {
        &self.local
    }

    pub fn roster(&self) -> &PresenceRoster {
        &self.roster
    }

    /// Rename the local user.
    ///
    /// Blank names are ignored. Returns `true` when the local info
    /// changed and must be propagated.
    pub fn set_local_name(&mut self, name: &str) -> bool {
        if name.trim().is_empty() || name == self.local.name {
            return false;
        }
        self.local.name = name.to_string();
        true
    }

    /// Set the local hue. Returns `true` when it changed.
    pub fn set_local_color(&mut self, hue: u32) -> bool {
        let hue = hue % 360;
        if hue == self.local.hue {
            return false;
        }
        self.local.hue = hue;
        true
    }

    /// Draw a new random hue, always different from the current one.
    pub fn reroll_color(&mut self) -> bool {
        let offset = rand::rng().random_range(1..360);
        self.set_local_color(self.local.hue + offset)
    }

    /// Replace the roster with an authoritative snapshot.
    pub fn replace_roster(&mut self, snapshot: PresenceRoster) {
        self.roster = snapshot;
    }

    /// Local user first, then remote participants in map order.
    pub fn participants(&self) -> impl Iterator<Item = Participant<'_>> {
        std::iter::once(Participant {
            id: None,
            info: &self.local,
            is_me: true,
        })
        .chain(self.roster.iter().map(|(id, info)| Participant {
            id: Some(*id),
            info,
            is_me: false,
        }))
    }

    /// Number of remote participants.
    pub fn remote_count(&self) -> usize {
        self.roster.len()
    }
}
