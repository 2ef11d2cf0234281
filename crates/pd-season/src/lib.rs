//! Season engine for a live elimination game.
//!
//! Tracks the in-progress round the host is building (leaders, vetoes,
//! immunity, the nomination ceremony, vote tallies, eliminations), commits it
//! into an append-only history, moves the season through its phases, suggests
//! challenges, derives statistics, and archives finished seasons. Calls to the
//! narrator and the room automation are modelled as injected collaborators
//! with local fallbacks.

pub mod announce;
pub mod archive;
pub mod collab;
pub mod config;
pub mod draft;
pub mod error;
pub mod host;
pub mod season;
pub mod stats;
pub mod suggest;
pub mod workflow;

pub use config::{ScreenPoint, SeasonConfig};
pub use draft::RoundDraft;
pub use error::{SeasonError, SeasonResult};
pub use host::HostSession;
pub use season::{SeasonPhase, SeasonState};
