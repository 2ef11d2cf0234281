use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::nomination::{Nominee, OtherVote};
use crate::participant::ParticipantId;

/// The record of a finished round. Immutable once appended to a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLog {
    /// Sequential round number, starting at 1.
    pub round_number: u32,
    /// The challenge that was played.
    pub challenge_name: String,
    /// The round's leaders (zero or more).
    pub leader_ids: BTreeSet<ParticipantId>,
    /// Participants kept out of the challenge.
    pub vetoed_ids: BTreeSet<ParticipantId>,
    /// Participants protected from nomination.
    pub immune_ids: BTreeSet<ParticipantId>,
    /// The wall, in the order nominees were added.
    pub nominees: Vec<Nominee>,
    /// Vote tallies for participants who stayed off the wall.
    #[serde(default)]
    pub other_votes: Vec<OtherVote>,
    /// Who left the game this round; a non-empty subset of the nominees.
    pub eliminated_ids: BTreeSet<ParticipantId>,
}

impl RoundLog {
    /// Check every structural rule of a committed round.
    pub fn validate(&self) -> CoreResult<()> {
        if self.round_number == 0 {
            return Err(invalid("round numbers start at 1"));
        }
        if self.challenge_name.trim().is_empty() {
            return Err(invalid("no challenge recorded"));
        }
        if self.nominees.is_empty() {
            return Err(invalid("no nominees"));
        }
        if self.eliminated_ids.is_empty() {
            return Err(invalid("nobody was eliminated"));
        }

        let mut seen = HashSet::new();
        for n in &self.nominees {
            if !seen.insert(n.participant_id) {
                return Err(invalid(&format!("{} nominated twice", n.participant_id)));
            }
            n.validate()?;
        }
        if let Some(id) = self.eliminated_ids.iter().find(|id| !seen.contains(id)) {
            return Err(invalid(&format!("{id} eliminated without being nominated")));
        }
        for ov in &self.other_votes {
            if ov.count == 0 {
                return Err(invalid("zero-count vote tally"));
            }
            if seen.contains(&ov.participant_id) {
                return Err(invalid(&format!(
                    "{} is both nominated and tallied",
                    ov.participant_id
                )));
            }
        }
        if let Some(id) = self.leader_ids.intersection(&self.immune_ids).next() {
            return Err(invalid(&format!("{id} is both leader and immune")));
        }
        Ok(())
    }

    /// The nominee entry for a participant, if nominated.
    pub fn nominee(&self, id: ParticipantId) -> Option<&Nominee> {
        self.nominees.iter().find(|n| n.participant_id == id)
    }

    /// Whether the participant was on the wall.
    pub fn is_nominated(&self, id: ParticipantId) -> bool {
        self.nominee(id).is_some()
    }

    /// Votes a participant received this round, on or off the wall.
    pub fn votes_for(&self, id: ParticipantId) -> u32 {
        let on_wall = self.nominee(id).and_then(|n| n.vote_count).unwrap_or(0);
        let off_wall = self
            .other_votes
            .iter()
            .find(|ov| ov.participant_id == id)
            .map(|ov| ov.count)
            .unwrap_or(0);
        on_wall + off_wall
    }
}

fn invalid(msg: &str) -> CoreError {
    CoreError::InvalidRound(msg.to_string())
}
