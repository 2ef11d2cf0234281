//! Error types for the season engine.

use pd_core::ParticipantId;
use thiserror::Error;

use crate::season::SeasonPhase;

/// Result type for season operations.
pub type SeasonResult<T> = Result<T, SeasonError>;

/// Errors that can occur while running a season.
///
/// Every variant describes a rejected operation; none of them leaves the
/// season half-updated.
#[derive(Debug, Error)]
pub enum SeasonError {
    /// The operation is not allowed in the current phase.
    #[error("not allowed during {0}")]
    WrongPhase(SeasonPhase),

    /// A season needs at least two participants to start.
    #[error("need at least 2 participants to start, have {0}")]
    NotEnoughParticipants(usize),

    /// The participant is already on the wall this round.
    #[error("{0} is already nominated")]
    AlreadyNominated(String),

    /// Leaders cannot be nominated or receive house votes.
    #[error("{0} leads this round")]
    IsLeader(String),

    /// The participant is not on the wall this round.
    #[error("{0} is not nominated")]
    NotNominated(String),

    /// No vote tally exists for the participant.
    #[error("no votes tallied for {0}")]
    NoTally(String),

    /// The nomination form has nobody selected.
    #[error("no nominee selected")]
    NoNomineeSelected,

    /// The round cannot be committed yet.
    #[error("round incomplete: {0}")]
    IncompleteRound(&'static str),

    /// A winner was already declared.
    #[error("winner already declared: {0}")]
    WinnerAlreadyDeclared(String),

    /// Announcement requested with nothing to announce.
    #[error("no votes recorded to announce")]
    NothingToAnnounce,

    /// The selected challenge has no briefing text.
    #[error("no briefing available for {0}")]
    NoBriefing(String),

    /// No participant with this ID is part of the season.
    #[error("unknown participant {0}")]
    UnknownParticipant(ParticipantId),

    /// Invalid choice or input.
    #[error("invalid choice: {0}")]
    InvalidChoice(String),

    /// Unknown command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Reading or writing the archive failed.
    #[error("archive I/O: {0}")]
    Io(#[from] std::io::Error),

    /// The archive contents are not valid JSON.
    #[error("archive format: {0}")]
    Json(#[from] serde_json::Error),

    /// Core model error.
    #[error("{0}")]
    Core(#[from] pd_core::CoreError),
}
