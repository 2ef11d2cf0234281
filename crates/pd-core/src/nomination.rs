use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::participant::ParticipantId;

/// Why a nominee was put on the wall.
///
/// The named variants are the steps the nomination ceremony knows how to
/// route; `Custom` keeps whatever free-form reason the host typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NominationReason {
    /// Picked by the round's leader.
    LeadersChoice,
    /// Pulled in by a nominee in retaliation.
    CounterNomination,
    /// Most voted by the house.
    HouseVote,
    /// Second house vote to break a tie.
    HouseVoteTiebreak,
    /// Drawn at random.
    RandomDraw,
    /// Lost the round's challenge.
    ChallengeLoss,
    /// Sent by whoever answered the direct line.
    DirectLine,
    /// Any other reason the host records.
    Custom(String),
}

impl NominationReason {
    /// Parse a reason from host input. Unrecognized text becomes `Custom`.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().replace(['-', '_', '\''], " ").as_str() {
            "leader" | "leaders choice" | "leader s choice" | "leader choice" => Self::LeadersChoice,
            "counter" | "counter nomination" | "counternomination" => Self::CounterNomination,
            "house" | "house vote" => Self::HouseVote,
            "tiebreak" | "house vote tiebreak" | "house vote (tiebreak)" => Self::HouseVoteTiebreak,
            "draw" | "random" | "random draw" => Self::RandomDraw,
            "loss" | "challenge loss" => Self::ChallengeLoss,
            "direct" | "direct line" | "phone" | "big phone" => Self::DirectLine,
            _ => Self::Custom(trimmed.to_string()),
        }
    }

    /// Whether the nominee's count comes from a house vote.
    pub fn is_house_vote(&self) -> bool {
        matches!(self, Self::HouseVote | Self::HouseVoteTiebreak)
    }

    /// Whether this reason must name who pulled the nominee in.
    pub fn requires_nominator(&self) -> bool {
        matches!(self, Self::CounterNomination)
    }
}

impl fmt::Display for NominationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeadersChoice => write!(f, "Leader's Choice"),
            Self::CounterNomination => write!(f, "Counter-nomination"),
            Self::HouseVote => write!(f, "House Vote"),
            Self::HouseVoteTiebreak => write!(f, "House Vote (Tiebreak)"),
            Self::RandomDraw => write!(f, "Random Draw"),
            Self::ChallengeLoss => write!(f, "Challenge Loss"),
            Self::DirectLine => write!(f, "Direct Line"),
            Self::Custom(s) => write!(f, "{s}"),
        }
    }
}

/// A participant placed at risk in a round.
///
/// Valid combinations: a `CounterNomination` always carries `nominated_by`,
/// every other reason leaves it empty, and nobody nominates themself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nominee {
    /// Who is on the wall.
    pub participant_id: ParticipantId,
    /// How they got there.
    pub reason: NominationReason,
    /// Tallied votes, when a count was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u32>,
    /// The recorded votes were votes to save, not to eliminate.
    #[serde(default)]
    pub is_reverse_vote: bool,
    /// The votes were cast in the open.
    #[serde(default)]
    pub is_open_vote: bool,
    /// Who pulled this nominee in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominated_by: Option<ParticipantId>,
}

impl Nominee {
    /// Create a nominee with no votes, flags, or nominator.
    pub fn new(participant_id: ParticipantId, reason: NominationReason) -> Self {
        Self {
            participant_id,
            reason,
            vote_count: None,
            is_reverse_vote: false,
            is_open_vote: false,
            nominated_by: None,
        }
    }

    /// Record a vote count.
    pub fn with_votes(mut self, count: u32) -> Self {
        self.vote_count = Some(count);
        self
    }

    /// Record who pulled the nominee in.
    pub fn nominated_by(mut self, by: ParticipantId) -> Self {
        self.nominated_by = Some(by);
        self
    }

    /// Mark the votes as open.
    pub fn open_vote(mut self) -> Self {
        self.is_open_vote = true;
        self
    }

    /// Mark the votes as votes to save.
    pub fn reverse_vote(mut self) -> Self {
        self.is_reverse_vote = true;
        self
    }

    /// Check the reason/nominator combination.
    pub fn validate(&self) -> CoreResult<()> {
        match (self.reason.requires_nominator(), self.nominated_by) {
            (true, None) => Err(CoreError::InvalidRound(format!(
                "{} needs a nominator",
                self.reason
            ))),
            (false, Some(_)) => Err(CoreError::InvalidRound(format!(
                "{} does not take a nominator",
                self.reason
            ))),
            (_, Some(by)) if by == self.participant_id => Err(CoreError::InvalidRound(
                "a participant cannot nominate themself".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Votes received by a participant who did not end up on the wall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherVote {
    /// Who received the votes.
    pub participant_id: ParticipantId,
    /// How many; always positive.
    pub count: u32,
}
