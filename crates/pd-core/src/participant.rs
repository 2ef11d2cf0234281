use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

const AVATAR_BASE: &str = "https://www.habbo.com.br/habbo-imaging/avatarimage";

/// Unique identifier for every participant in a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub Uuid);

impl ParticipantId {
    /// Generate a new random participant ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Where a participant stands in the season.
///
/// `Active` moves to `Eliminated` on a round commit or an expulsion and never
/// comes back. `Winner` is only ever set by the host at the end of a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    /// Still in the game.
    Active,
    /// Voted out, replaced, or expelled.
    Eliminated,
    /// Declared winner by the host.
    Winner,
}

impl ParticipantStatus {
    /// Sort priority for leaderboards: winners first, eliminated last.
    pub fn priority(self) -> u8 {
        match self {
            Self::Winner => 0,
            Self::Active => 1,
            Self::Eliminated => 2,
        }
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Eliminated => write!(f, "eliminated"),
            Self::Winner => write!(f, "winner"),
        }
    }
}

/// A person playing in the season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Stable identifier, generated on creation.
    pub id: ParticipantId,
    /// Display name; unique case-insensitively within a roster.
    pub name: String,
    /// Current standing.
    pub status: ParticipantStatus,
}

impl Participant {
    /// Create an active participant with a fresh ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(),
            name: name.into(),
            status: ParticipantStatus::Active,
        }
    }

    /// Whether the participant is still in the game.
    pub fn is_active(&self) -> bool {
        self.status == ParticipantStatus::Active
    }

    /// Head-only avatar image link derived from the name.
    ///
    /// Display data only; it is recomputed on demand and never stored.
    pub fn avatar_ref(&self) -> Option<String> {
        avatar_ref(&self.name)
    }
}

/// Build the avatar image link for a participant name.
pub fn avatar_ref(name: &str) -> Option<String> {
    Url::parse_with_params(
        AVATAR_BASE,
        &[
            ("user", name),
            ("action", "std"),
            ("direction", "3"),
            ("head_direction", "3"),
            ("img_format", "png"),
            ("gesture", "sml"),
            ("headonly", "1"),
            ("size", "l"),
        ],
    )
    .ok()
    .map(String::from)
}
