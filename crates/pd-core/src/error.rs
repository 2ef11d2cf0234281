use crate::participant::ParticipantId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when manipulating the roster or round records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The requested participant ID does not exist in the roster.
    #[error("participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    /// No participant answers to the given name.
    #[error("no participant named \"{0}\"")]
    UnknownName(String),

    /// A participant with the same name (case-insensitive) already exists.
    #[error("participant already exists: \"{0}\"")]
    DuplicateName(String),

    /// The participant exists but is no longer in the game.
    #[error("participant is not active: \"{0}\"")]
    NotActive(String),

    /// A participant name was empty after trimming.
    #[error("participant name must not be empty")]
    EmptyName,

    /// A round record violates one of its structural rules.
    #[error("invalid round: {0}")]
    InvalidRound(String),
}
