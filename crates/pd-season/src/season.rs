//! The season state machine.
//!
//! A season moves `Setup -> Playing -> Final` and can be restarted from any
//! phase. Every guarded operation returns an error instead of mutating when
//! its precondition does not hold.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pd_core::roster::BulkAdd;
use pd_core::{Nominee, Participant, ParticipantId, Roster, RoundLog};

use crate::draft::{NomineeForm, RoundDraft};
use crate::error::{SeasonError, SeasonResult};

/// Which stage of the season the host is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeasonPhase {
    /// Building the roster.
    Setup,
    /// Running rounds.
    Playing,
    /// The final stretch; a winner may be declared.
    Final,
}

impl fmt::Display for SeasonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Playing => write!(f, "playing"),
            Self::Final => write!(f, "final"),
        }
    }
}

/// Everything the host panel knows about the season in progress.
#[derive(Debug, Clone)]
pub struct SeasonState {
    phase: SeasonPhase,
    roster: Roster,
    rounds: Vec<RoundLog>,
    draft: RoundDraft,
    started_at: Option<DateTime<Utc>>,
    target_duration_minutes: u32,
}

impl Default for SeasonState {
    fn default() -> Self {
        Self {
            phase: SeasonPhase::Setup,
            roster: Roster::new(),
            rounds: Vec::new(),
            draft: RoundDraft::new(),
            started_at: None,
            target_duration_minutes: 60,
        }
    }
}

impl SeasonState {
    /// A fresh season in setup with an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// The current phase.
    pub fn phase(&self) -> SeasonPhase {
        self.phase
    }

    /// Everyone who has been part of the season.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Committed rounds, oldest first.
    pub fn rounds(&self) -> &[RoundLog] {
        &self.rounds
    }

    /// The round being built.
    pub fn draft(&self) -> &RoundDraft {
        &self.draft
    }

    /// When the season started, if it has.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Planned season length in minutes.
    pub fn target_duration_minutes(&self) -> u32 {
        self.target_duration_minutes
    }

    /// The number the next committed round will carry.
    pub fn current_round_number(&self) -> u32 {
        u32::try_from(self.rounds.len()).unwrap_or(u32::MAX).saturating_add(1)
    }

    /// Participants still in the game.
    pub fn finalists(&self) -> Vec<&Participant> {
        self.roster.active()
    }

    /// Whether the active count has dropped to the final-stretch threshold.
    ///
    /// Advisory only; `advance_to_final` never checks it.
    pub fn should_advance_to_final(&self, threshold: usize) -> bool {
        self.phase == SeasonPhase::Playing && self.roster.active_count() <= threshold
    }

    /// How many committed rounds played the named challenge.
    pub fn challenge_usage(&self, name: &str) -> usize {
        self.rounds
            .iter()
            .filter(|r| r.challenge_name.eq_ignore_ascii_case(name))
            .count()
    }

    /// Minutes since the season started; zero before it starts.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> f64 {
        self.started_at
            .map(|start| (now - start).num_seconds().max(0) as f64 / 60.0)
            .unwrap_or(0.0)
    }

    /// Elapsed time as `HH:MM:SS`.
    pub fn format_elapsed(&self, now: DateTime<Utc>) -> String {
        let secs = self
            .started_at
            .map(|start| (now - start).num_seconds().max(0))
            .unwrap_or(0);
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }

    // -----------------------------------------------------------------------
    // Roster
    // -----------------------------------------------------------------------

    /// Add a participant during setup or mid-game.
    pub fn add_participant(&mut self, name: &str) -> SeasonResult<ParticipantId> {
        self.require_any(&[SeasonPhase::Setup, SeasonPhase::Playing])?;
        let id = self.roster.add(name)?;
        info!(name = %self.roster.name_of(id), phase = %self.phase, "participant added");
        Ok(id)
    }

    /// Add several comma- or newline-separated names, skipping duplicates.
    pub fn add_participants(&mut self, input: &str) -> SeasonResult<BulkAdd> {
        self.require_any(&[SeasonPhase::Setup, SeasonPhase::Playing])?;
        let result = self.roster.add_many(input);
        info!(
            added = result.added.len(),
            skipped = result.skipped.len(),
            "bulk add"
        );
        Ok(result)
    }

    /// Take a participant off the roster before the season starts.
    pub fn remove_participant(&mut self, id: ParticipantId) -> SeasonResult<Participant> {
        self.require(SeasonPhase::Setup)?;
        let removed = self.roster.remove(id)?;
        info!(name = %removed.name, "participant removed");
        Ok(removed)
    }

    /// Swap an active participant for a newcomer outside of any round.
    ///
    /// The newcomer is added first so a name clash leaves the outgoing
    /// participant untouched.
    pub fn replace_participant(
        &mut self,
        outgoing: ParticipantId,
        incoming: &str,
    ) -> SeasonResult<ParticipantId> {
        self.require(SeasonPhase::Playing)?;
        self.require_active(outgoing)?;
        let id = self.roster.add(incoming)?;
        self.roster.eliminate(outgoing)?;
        self.draft.forget(outgoing);
        info!(
            outgoing = %self.roster.name_of(outgoing),
            incoming = %self.roster.name_of(id),
            "participant replaced"
        );
        Ok(id)
    }

    /// Remove an active participant immediately, outside of any round.
    pub fn expel(&mut self, id: ParticipantId) -> SeasonResult<()> {
        self.require(SeasonPhase::Playing)?;
        self.require_active(id)?;
        self.roster.eliminate(id)?;
        self.draft.forget(id);
        info!(name = %self.roster.name_of(id), "participant expelled");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Phase transitions
    // -----------------------------------------------------------------------

    /// Start playing with the current roster.
    pub fn start(&mut self, target_minutes: u32, now: DateTime<Utc>) -> SeasonResult<()> {
        self.require(SeasonPhase::Setup)?;
        let count = self.roster.len();
        if count < 2 {
            return Err(SeasonError::NotEnoughParticipants(count));
        }
        self.phase = SeasonPhase::Playing;
        self.rounds.clear();
        self.draft.reset();
        self.started_at = Some(now);
        self.target_duration_minutes = target_minutes.max(1);
        info!(participants = count, target_minutes, "season started");
        Ok(())
    }

    /// Commit the draft as the next round and eliminate its marked nominees.
    pub fn finish_round(&mut self) -> SeasonResult<&RoundLog> {
        self.require(SeasonPhase::Playing)?;
        let log = self.draft.build_log(self.current_round_number())?;
        self.apply_round(log)
    }

    /// Append an externally built round log.
    pub fn record_round(&mut self, log: RoundLog) -> SeasonResult<&RoundLog> {
        self.require(SeasonPhase::Playing)?;
        if log.round_number != self.current_round_number() {
            return Err(SeasonError::InvalidChoice(format!(
                "expected round {}, got {}",
                self.current_round_number(),
                log.round_number
            )));
        }
        log.validate()?;
        for id in log.nominees.iter().map(|n| n.participant_id) {
            if !self.roster.contains(id) {
                return Err(SeasonError::UnknownParticipant(id));
            }
        }
        self.apply_round(log)
    }

    fn apply_round(&mut self, log: RoundLog) -> SeasonResult<&RoundLog> {
        for &id in &log.eliminated_ids {
            self.roster.eliminate(id)?;
        }
        info!(
            round = log.round_number,
            challenge = %log.challenge_name,
            eliminated = log.eliminated_ids.len(),
            active = self.roster.active_count(),
            "round committed"
        );
        self.draft.reset();
        self.rounds.push(log);
        let last = self.rounds.len() - 1;
        Ok(&self.rounds[last])
    }

    /// Move to the final stretch. Allowed at any time while playing.
    pub fn advance_to_final(&mut self) -> SeasonResult<()> {
        self.require(SeasonPhase::Playing)?;
        self.phase = SeasonPhase::Final;
        self.draft.reset();
        info!(finalists = self.roster.active_count(), "final stretch");
        Ok(())
    }

    /// Crown one of the finalists.
    pub fn declare_winner(&mut self, id: ParticipantId) -> SeasonResult<()> {
        self.require(SeasonPhase::Final)?;
        if let Some(winner) = self.roster.winner() {
            return Err(SeasonError::WinnerAlreadyDeclared(winner.name.clone()));
        }
        self.roster.crown(id)?;
        info!(winner = %self.roster.name_of(id), "winner declared");
        Ok(())
    }

    /// Throw everything away and go back to an empty setup.
    pub fn restart(&mut self) {
        *self = Self::default();
        info!("season restarted");
    }

    // -----------------------------------------------------------------------
    // Draft editing
    // -----------------------------------------------------------------------

    /// Select the challenge for the current round.
    pub fn set_challenge(&mut self, name: &str) -> SeasonResult<()> {
        self.require(SeasonPhase::Playing)?;
        self.draft.set_challenge(name);
        Ok(())
    }

    /// Toggle a leader of the current round.
    pub fn toggle_leader(&mut self, id: ParticipantId) -> SeasonResult<bool> {
        self.require(SeasonPhase::Playing)?;
        self.draft.toggle_leader(&self.roster, id)
    }

    /// Toggle a veto for the current round.
    pub fn toggle_vetoed(&mut self, id: ParticipantId) -> SeasonResult<bool> {
        self.require(SeasonPhase::Playing)?;
        self.draft.toggle_vetoed(&self.roster, id)
    }

    /// Toggle immunity for the current round.
    pub fn toggle_immune(&mut self, id: ParticipantId) -> SeasonResult<bool> {
        self.require(SeasonPhase::Playing)?;
        self.draft.toggle_immune(&self.roster, id)
    }

    /// Put a nominee on the wall.
    pub fn add_nominee(&mut self, nominee: Nominee) -> SeasonResult<()> {
        self.require(SeasonPhase::Playing)?;
        self.draft.add_nominee(&self.roster, nominee)
    }

    /// Nominate whoever the form has selected.
    pub fn nominate_selected(&mut self) -> SeasonResult<ParticipantId> {
        self.require(SeasonPhase::Playing)?;
        self.draft.nominate_selected(&self.roster)
    }

    /// Take a nominee off the wall.
    pub fn remove_nominee(&mut self, id: ParticipantId) -> SeasonResult<()> {
        self.require(SeasonPhase::Playing)?;
        self.draft.remove_nominee(&self.roster, id)
    }

    /// Adjust an off-wall vote tally.
    pub fn update_other_vote(&mut self, id: ParticipantId, delta: i64) -> SeasonResult<u32> {
        self.require(SeasonPhase::Playing)?;
        self.draft.update_other_vote(&self.roster, id, delta)
    }

    /// Move an off-wall tally onto the wall.
    pub fn promote_vote(&mut self, id: ParticipantId, tiebreak: bool) -> SeasonResult<()> {
        self.require(SeasonPhase::Playing)?;
        self.draft.promote_vote(&self.roster, id, tiebreak)
    }

    /// Toggle the elimination mark on a nominee.
    pub fn toggle_eliminated(&mut self, id: ParticipantId) -> SeasonResult<bool> {
        self.require(SeasonPhase::Playing)?;
        self.draft.toggle_eliminated(&self.roster, id)
    }

    /// Edit the nomination form.
    pub fn form_mut(&mut self) -> SeasonResult<&mut NomineeForm> {
        self.require(SeasonPhase::Playing)?;
        Ok(self.draft.form_mut())
    }

    // -----------------------------------------------------------------------
    // Guards
    // -----------------------------------------------------------------------

    fn require(&self, phase: SeasonPhase) -> SeasonResult<()> {
        self.require_any(&[phase])
    }

    fn require_any(&self, phases: &[SeasonPhase]) -> SeasonResult<()> {
        if phases.contains(&self.phase) {
            Ok(())
        } else {
            debug!(phase = %self.phase, "rejected in this phase");
            Err(SeasonError::WrongPhase(self.phase))
        }
    }

    fn require_active(&self, id: ParticipantId) -> SeasonResult<()> {
        let p = self
            .roster
            .get(id)
            .ok_or(SeasonError::UnknownParticipant(id))?;
        if !p.is_active() {
            return Err(pd_core::CoreError::NotActive(p.name.clone()).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pd_core::{NominationReason, ParticipantStatus};
    use proptest::prelude::*;

    use super::*;
    use crate::stats;

    fn started(names: &[&str]) -> (SeasonState, Vec<ParticipantId>) {
        let mut s = SeasonState::new();
        let ids = names.iter().map(|n| s.add_participant(n).unwrap()).collect();
        s.start(60, Utc::now()).unwrap();
        (s, ids)
    }

    #[test]
    fn start_needs_two() {
        let mut s = SeasonState::new();
        s.add_participant("Ana").unwrap();
        assert!(matches!(
            s.start(60, Utc::now()),
            Err(SeasonError::NotEnoughParticipants(1))
        ));
        assert_eq!(s.phase(), SeasonPhase::Setup);
        s.add_participant("Bia").unwrap();
        s.start(60, Utc::now()).unwrap();
        assert_eq!(s.phase(), SeasonPhase::Playing);
        assert_eq!(s.current_round_number(), 1);
    }

    #[test]
    fn two_players_can_go_straight_to_final() {
        let (mut s, _) = started(&["Ana", "Bia"]);
        assert!(s.should_advance_to_final(3));
        s.advance_to_final().unwrap();
        assert_eq!(s.phase(), SeasonPhase::Final);
    }

    #[test]
    fn draft_edits_rejected_in_setup() {
        let mut s = SeasonState::new();
        let a = s.add_participant("Ana").unwrap();
        assert!(matches!(
            s.toggle_leader(a),
            Err(SeasonError::WrongPhase(SeasonPhase::Setup))
        ));
    }

    #[test]
    fn remove_only_in_setup() {
        let mut s = SeasonState::new();
        let a = s.add_participant("Ana").unwrap();
        s.add_participant("Bia").unwrap();
        s.add_participant("Caio").unwrap();
        s.remove_participant(a).unwrap();
        assert_eq!(s.roster().len(), 2);
        s.start(60, Utc::now()).unwrap();
        let b = s.roster().find_id_by_name("bia").unwrap();
        assert!(s.remove_participant(b).is_err());
    }

    #[test]
    fn round_one_then_two() {
        let (mut s, ids) = started(&["A", "B", "C", "D"]);
        let (a, b) = (ids[0], ids[1]);
        s.set_challenge("Banzai").unwrap();
        s.add_nominee(Nominee::new(a, NominationReason::HouseVote).with_votes(5))
            .unwrap();
        s.add_nominee(Nominee::new(b, NominationReason::LeadersChoice))
            .unwrap();
        s.toggle_eliminated(b).unwrap();
        s.finish_round().unwrap();

        assert_eq!(s.current_round_number(), 2);
        assert_eq!(s.roster().get(b).unwrap().status, ParticipantStatus::Eliminated);
        assert_eq!(stats::wall_count(s.rounds(), a), 1);
        assert_eq!(stats::leader_count(s.rounds(), b), 0);
        assert_eq!(stats::votes_received(s.rounds(), a), 5);
    }

    #[test]
    fn incomplete_round_is_noop() {
        let (mut s, ids) = started(&["A", "B", "C"]);
        s.add_nominee(Nominee::new(ids[0], NominationReason::RandomDraw))
            .unwrap();
        assert!(s.finish_round().is_err());
        assert!(s.rounds().is_empty());
        assert_eq!(s.draft().nominees().len(), 1);
        assert_eq!(s.roster().active_count(), 3);
    }

    #[test]
    fn replace_keeps_history_clean() {
        let (mut s, ids) = started(&["A", "B", "C"]);
        s.add_nominee(Nominee::new(ids[0], NominationReason::RandomDraw))
            .unwrap();
        let d = s.replace_participant(ids[0], "D").unwrap();
        assert!(s.rounds().is_empty());
        assert!(s.draft().nominees().is_empty());
        assert_eq!(s.roster().get(ids[0]).unwrap().status, ParticipantStatus::Eliminated);
        assert!(s.roster().get(d).unwrap().is_active());
    }

    #[test]
    fn replace_with_taken_name_is_noop() {
        let (mut s, ids) = started(&["A", "B", "C"]);
        assert!(s.replace_participant(ids[0], "b").is_err());
        assert!(s.roster().get(ids[0]).unwrap().is_active());
        assert_eq!(s.roster().len(), 3);
    }

    #[test]
    fn mid_game_add_checks_names() {
        let (mut s, ids) = started(&["A", "B"]);
        s.expel(ids[0]).unwrap();
        assert!(s.add_participant("a").is_err());
        s.add_participant("C").unwrap();
        assert_eq!(s.roster().active_count(), 2);
    }

    #[test]
    fn expel_twice_rejected() {
        let (mut s, ids) = started(&["A", "B"]);
        s.expel(ids[0]).unwrap();
        assert!(s.expel(ids[0]).is_err());
    }

    #[test]
    fn winner_only_once_in_final() {
        let (mut s, ids) = started(&["A", "B"]);
        assert!(s.declare_winner(ids[0]).is_err());
        s.advance_to_final().unwrap();
        s.declare_winner(ids[0]).unwrap();
        assert!(matches!(
            s.declare_winner(ids[1]),
            Err(SeasonError::WinnerAlreadyDeclared(_))
        ));
        assert_eq!(s.roster().winner().unwrap().id, ids[0]);
    }

    #[test]
    fn restart_clears_everything() {
        let (mut s, _) = started(&["A", "B"]);
        s.restart();
        assert_eq!(s.phase(), SeasonPhase::Setup);
        assert!(s.roster().is_empty());
        assert!(s.started_at().is_none());
    }

    #[test]
    fn elapsed_formatting() {
        let mut s = SeasonState::new();
        s.add_participant("A").unwrap();
        s.add_participant("B").unwrap();
        let start = Utc::now();
        s.start(60, start).unwrap();
        let later = start + Duration::seconds(3725);
        assert_eq!(s.format_elapsed(later), "01:02:05");
        assert!((s.elapsed_minutes(later) - 62.083).abs() < 0.01);
    }

    #[test]
    fn record_round_checks_number() {
        let (mut s, ids) = started(&["A", "B", "C"]);
        let mut log = RoundLog {
            round_number: 2,
            challenge_name: "Banzai".into(),
            leader_ids: Default::default(),
            vetoed_ids: Default::default(),
            immune_ids: Default::default(),
            nominees: vec![Nominee::new(ids[0], NominationReason::RandomDraw)],
            other_votes: vec![],
            eliminated_ids: [ids[0]].into_iter().collect(),
        };
        assert!(s.record_round(log.clone()).is_err());
        log.round_number = 1;
        s.record_round(log).unwrap();
        assert_eq!(s.current_round_number(), 2);
    }

    #[test]
    fn usage_is_case_insensitive() {
        let (mut s, ids) = started(&["A", "B", "C"]);
        s.set_challenge("banzai").unwrap();
        s.add_nominee(Nominee::new(ids[0], NominationReason::RandomDraw))
            .unwrap();
        s.toggle_eliminated(ids[0]).unwrap();
        s.finish_round().unwrap();
        assert_eq!(s.challenge_usage("Banzai"), 1);
    }

    proptest! {
        #[test]
        fn round_number_tracks_history(eliminations in proptest::collection::vec(0usize..8, 0..7)) {
            let names: Vec<String> = (0..8).map(|i| format!("P{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let (mut s, ids) = started(&refs);
            for pick in eliminations {
                let id = ids[pick];
                s.set_challenge("Banzai").unwrap();
                // Already-eliminated picks are rejected and leave no trace.
                let _ = s
                    .add_nominee(Nominee::new(id, NominationReason::RandomDraw))
                    .and_then(|_| s.toggle_eliminated(id))
                    .and_then(|_| s.finish_round().map(|_| ()));
                prop_assert_eq!(s.current_round_number() as usize, s.rounds().len() + 1);
                for r in s.rounds() {
                    prop_assert!(!r.eliminated_ids.is_empty());
                    prop_assert!(r.eliminated_ids.iter().all(|e| r.is_nominated(*e)));
                }
            }
        }

        #[test]
        fn leader_never_immune(ops in proptest::collection::vec((0usize..4, any::<bool>()), 0..20)) {
            let (mut s, ids) = started(&["A", "B", "C", "D"]);
            for (pick, leader) in ops {
                let id = ids[pick];
                if leader {
                    s.toggle_leader(id).unwrap();
                } else {
                    s.toggle_immune(id).unwrap();
                }
                for l in s.draft().leader_ids() {
                    prop_assert!(!s.draft().is_immune(*l));
                }
            }
        }
    }
}
