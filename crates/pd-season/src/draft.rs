//! The round the host is building before it is committed.
//!
//! A `RoundDraft` accumulates the challenge, leaders, vetoes, immunity, the
//! wall, and off-wall vote tallies. Every mutator checks participants against
//! the roster and leaves the draft untouched when it rejects a call.

use std::collections::BTreeSet;

use tracing::debug;

use pd_core::{CoreError, NominationReason, Nominee, OtherVote, ParticipantId, Roster, RoundLog};

use crate::error::{SeasonError, SeasonResult};
use crate::workflow::{WorkflowStep, next_step};

/// The nomination form, pre-filled by the ceremony workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NomineeForm {
    /// Who is about to be nominated.
    pub selected: Option<ParticipantId>,
    /// Reason for the nomination.
    pub reason: NominationReason,
    /// Who pulled the nominee in (counter-nominations only).
    pub nominated_by: Option<ParticipantId>,
    /// Tallied votes, if any.
    pub vote_count: Option<u32>,
    /// Votes were to save rather than to eliminate.
    pub is_reverse_vote: bool,
    /// Votes were cast in the open.
    pub is_open_vote: bool,
}

impl NomineeForm {
    fn from_step(step: WorkflowStep) -> Self {
        Self {
            selected: None,
            reason: step.reason,
            nominated_by: step.nominator,
            vote_count: None,
            is_reverse_vote: false,
            is_open_vote: false,
        }
    }

    /// Build a nominee from the form.
    ///
    /// The nominator is only carried for counter-nominations.
    pub fn build(&self) -> SeasonResult<Nominee> {
        let id = self.selected.ok_or(SeasonError::NoNomineeSelected)?;
        let mut nominee = Nominee::new(id, self.reason.clone());
        nominee.vote_count = self.vote_count;
        nominee.is_reverse_vote = self.is_reverse_vote;
        nominee.is_open_vote = self.is_open_vote;
        if self.reason.requires_nominator() {
            nominee.nominated_by = self.nominated_by;
        }
        Ok(nominee)
    }
}

impl Default for NomineeForm {
    fn default() -> Self {
        Self::from_step(WorkflowStep::opening())
    }
}

/// Working state of the round in progress.
#[derive(Debug, Clone, Default)]
pub struct RoundDraft {
    challenge_name: String,
    leader_ids: BTreeSet<ParticipantId>,
    vetoed_ids: BTreeSet<ParticipantId>,
    immune_ids: BTreeSet<ParticipantId>,
    nominees: Vec<Nominee>,
    other_votes: Vec<OtherVote>,
    eliminated_ids: BTreeSet<ParticipantId>,
    form: NomineeForm,
}

impl RoundDraft {
    /// Create an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The selected challenge, empty when none.
    pub fn challenge_name(&self) -> &str {
        &self.challenge_name
    }

    /// The round's leaders.
    pub fn leader_ids(&self) -> &BTreeSet<ParticipantId> {
        &self.leader_ids
    }

    /// Participants vetoed from the challenge.
    pub fn vetoed_ids(&self) -> &BTreeSet<ParticipantId> {
        &self.vetoed_ids
    }

    /// Participants holding immunity.
    pub fn immune_ids(&self) -> &BTreeSet<ParticipantId> {
        &self.immune_ids
    }

    /// The wall so far, in nomination order.
    pub fn nominees(&self) -> &[Nominee] {
        &self.nominees
    }

    /// Tallies for participants off the wall.
    pub fn other_votes(&self) -> &[OtherVote] {
        &self.other_votes
    }

    /// Nominees marked for elimination.
    pub fn eliminated_ids(&self) -> &BTreeSet<ParticipantId> {
        &self.eliminated_ids
    }

    /// The nomination form.
    pub fn form(&self) -> &NomineeForm {
        &self.form
    }

    /// The nomination form, for host edits.
    pub fn form_mut(&mut self) -> &mut NomineeForm {
        &mut self.form
    }

    /// Whether the participant leads this round.
    pub fn is_leader(&self, id: ParticipantId) -> bool {
        self.leader_ids.contains(&id)
    }

    /// Whether the participant is immune this round.
    pub fn is_immune(&self, id: ParticipantId) -> bool {
        self.immune_ids.contains(&id)
    }

    /// Whether the participant is on the wall.
    pub fn is_nominated(&self, id: ParticipantId) -> bool {
        self.nominees.iter().any(|n| n.participant_id == id)
    }

    /// Current off-wall tally for a participant.
    pub fn tally(&self, id: ParticipantId) -> u32 {
        self.other_votes
            .iter()
            .find(|ov| ov.participant_id == id)
            .map(|ov| ov.count)
            .unwrap_or(0)
    }

    /// Whether nothing has been entered yet.
    pub fn is_empty(&self) -> bool {
        self.challenge_name.is_empty()
            && self.leader_ids.is_empty()
            && self.vetoed_ids.is_empty()
            && self.immune_ids.is_empty()
            && self.nominees.is_empty()
            && self.other_votes.is_empty()
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    /// Select the challenge played this round.
    pub fn set_challenge(&mut self, name: &str) {
        self.challenge_name = name.trim().to_string();
        debug!(challenge = %self.challenge_name, "challenge selected");
    }

    /// Add or remove a leader. Returns whether the participant now leads.
    ///
    /// Becoming leader strips immunity and any off-wall tally: leadership
    /// already protects. Someone on the wall cannot become leader.
    pub fn toggle_leader(&mut self, roster: &Roster, id: ParticipantId) -> SeasonResult<bool> {
        let name = require_active(roster, id)?;
        if self.leader_ids.remove(&id) {
            return Ok(false);
        }
        if self.is_nominated(id) {
            return Err(SeasonError::AlreadyNominated(name.to_string()));
        }
        self.leader_ids.insert(id);
        self.immune_ids.remove(&id);
        self.other_votes.retain(|ov| ov.participant_id != id);
        Ok(true)
    }

    /// Add or remove a veto. Returns whether the participant is now vetoed.
    pub fn toggle_vetoed(&mut self, roster: &Roster, id: ParticipantId) -> SeasonResult<bool> {
        require_active(roster, id)?;
        Ok(toggle(&mut self.vetoed_ids, id))
    }

    /// Add or remove immunity. Returns whether the participant is now immune.
    ///
    /// A no-op for leaders, who stay non-immune.
    pub fn toggle_immune(&mut self, roster: &Roster, id: ParticipantId) -> SeasonResult<bool> {
        require_active(roster, id)?;
        if self.is_leader(id) {
            return Ok(false);
        }
        Ok(toggle(&mut self.immune_ids, id))
    }

    /// Put a nominee on the wall and advance the ceremony.
    ///
    /// Any off-wall tally for the participant is dropped in the same step.
    pub fn add_nominee(&mut self, roster: &Roster, nominee: Nominee) -> SeasonResult<()> {
        let name = require_active(roster, nominee.participant_id)?;
        if self.is_leader(nominee.participant_id) {
            return Err(SeasonError::IsLeader(name.to_string()));
        }
        if self.is_nominated(nominee.participant_id) {
            return Err(SeasonError::AlreadyNominated(name.to_string()));
        }
        nominee.validate()?;
        if let Some(by) = nominee.nominated_by {
            if !roster.contains(by) {
                return Err(SeasonError::UnknownParticipant(by));
            }
        }

        let id = nominee.participant_id;
        debug!(nominee = %name, reason = %nominee.reason, "nominated");
        self.other_votes.retain(|ov| ov.participant_id != id);
        self.form = NomineeForm::from_step(next_step(&nominee.reason, id));
        self.nominees.push(nominee);
        Ok(())
    }

    /// Nominate whoever is selected on the form. Returns their ID.
    pub fn nominate_selected(&mut self, roster: &Roster) -> SeasonResult<ParticipantId> {
        let nominee = self.form.build()?;
        let id = nominee.participant_id;
        self.add_nominee(roster, nominee)?;
        Ok(id)
    }

    /// Take a nominee off the wall, clearing any elimination mark.
    pub fn remove_nominee(&mut self, roster: &Roster, id: ParticipantId) -> SeasonResult<()> {
        if !self.is_nominated(id) {
            return Err(SeasonError::NotNominated(roster.name_of(id).to_string()));
        }
        self.nominees.retain(|n| n.participant_id != id);
        self.eliminated_ids.remove(&id);
        Ok(())
    }

    /// Adjust an off-wall tally. Returns the new count.
    ///
    /// Counts clamp at zero and a zero count drops the entry.
    pub fn update_other_vote(
        &mut self,
        roster: &Roster,
        id: ParticipantId,
        delta: i64,
    ) -> SeasonResult<u32> {
        let name = require_active(roster, id)?;
        if self.is_leader(id) {
            return Err(SeasonError::IsLeader(name.to_string()));
        }
        if self.is_nominated(id) {
            return Err(SeasonError::AlreadyNominated(name.to_string()));
        }

        let current = i64::from(self.tally(id));
        let count = u32::try_from((current + delta).max(0)).unwrap_or(u32::MAX);
        if count == 0 {
            self.other_votes.retain(|ov| ov.participant_id != id);
        } else if let Some(entry) = self.other_votes.iter_mut().find(|ov| ov.participant_id == id) {
            entry.count = count;
        } else {
            self.other_votes.push(OtherVote {
                participant_id: id,
                count,
            });
        }
        Ok(count)
    }

    /// Move an off-wall tally onto the wall as a house vote.
    pub fn promote_vote(
        &mut self,
        roster: &Roster,
        id: ParticipantId,
        tiebreak: bool,
    ) -> SeasonResult<()> {
        let count = self.tally(id);
        if count == 0 {
            return Err(SeasonError::NoTally(roster.name_of(id).to_string()));
        }
        let reason = if tiebreak {
            NominationReason::HouseVoteTiebreak
        } else {
            NominationReason::HouseVote
        };
        self.add_nominee(roster, Nominee::new(id, reason).with_votes(count))
    }

    /// Mark or unmark a nominee for elimination. Returns the new mark.
    pub fn toggle_eliminated(&mut self, roster: &Roster, id: ParticipantId) -> SeasonResult<bool> {
        if !self.is_nominated(id) {
            return Err(SeasonError::NotNominated(roster.name_of(id).to_string()));
        }
        Ok(toggle(&mut self.eliminated_ids, id))
    }

    /// Drop every trace of a participant who left the game mid-round.
    pub fn forget(&mut self, id: ParticipantId) {
        self.leader_ids.remove(&id);
        self.vetoed_ids.remove(&id);
        self.immune_ids.remove(&id);
        self.nominees.retain(|n| n.participant_id != id);
        self.other_votes.retain(|ov| ov.participant_id != id);
        self.eliminated_ids.remove(&id);
        if self.form.selected == Some(id) {
            self.form.selected = None;
        }
        if self.form.nominated_by == Some(id) {
            self.form.nominated_by = None;
        }
    }

    // -----------------------------------------------------------------------
    // Commit
    // -----------------------------------------------------------------------

    /// Snapshot the draft as the record of round `round_number`.
    pub fn build_log(&self, round_number: u32) -> SeasonResult<RoundLog> {
        if self.challenge_name.is_empty() {
            return Err(SeasonError::IncompleteRound("no challenge selected"));
        }
        if self.nominees.is_empty() {
            return Err(SeasonError::IncompleteRound("nobody on the wall"));
        }
        if self.eliminated_ids.is_empty() {
            return Err(SeasonError::IncompleteRound("nobody marked for elimination"));
        }

        let log = RoundLog {
            round_number,
            challenge_name: self.challenge_name.clone(),
            leader_ids: self.leader_ids.clone(),
            vetoed_ids: self.vetoed_ids.clone(),
            immune_ids: self.immune_ids.clone(),
            nominees: self.nominees.clone(),
            other_votes: self.other_votes.clone(),
            eliminated_ids: self.eliminated_ids.clone(),
        };
        log.validate()?;
        Ok(log)
    }

    /// Produce the round record and clear the draft for the next round.
    pub fn commit(&mut self, round_number: u32) -> SeasonResult<RoundLog> {
        let log = self.build_log(round_number)?;
        self.reset();
        Ok(log)
    }

    /// Clear everything, including the form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn toggle(set: &mut BTreeSet<ParticipantId>, id: ParticipantId) -> bool {
    if set.remove(&id) {
        false
    } else {
        set.insert(id);
        true
    }
}

fn require_active(roster: &Roster, id: ParticipantId) -> SeasonResult<&str> {
    let p = roster.get(id).ok_or(SeasonError::UnknownParticipant(id))?;
    if !p.is_active() {
        return Err(CoreError::NotActive(p.name.clone()).into());
    }
    Ok(&p.name)
}
