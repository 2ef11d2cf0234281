//! Core types for Paredao: participants, nominations, rounds, and the
//! challenge catalog.
//!
//! This crate defines the data model that the season engine mutates. It has
//! no notion of phases or workflow; you can construct a [`Roster`] and
//! [`RoundLog`]s programmatically or deserialize them from JSON.

/// The static challenge catalog and duration parsing.
pub mod catalog;
/// Error types used throughout the crate.
pub mod error;
/// Nominees, nomination reasons, and other-vote tallies.
pub mod nomination;
/// Participant identity, status, and avatar references.
pub mod participant;
/// The season roster with case-insensitive name lookup.
pub mod roster;
/// Immutable round records.
pub mod round;

/// Re-export catalog types.
pub use catalog::{Challenge, ChallengeCategory};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export nomination types.
pub use nomination::{NominationReason, Nominee, OtherVote};
/// Re-export participant types.
pub use participant::{Participant, ParticipantId, ParticipantStatus};
/// Re-export the roster.
pub use roster::Roster;
/// Re-export the round record.
pub use round::RoundLog;
