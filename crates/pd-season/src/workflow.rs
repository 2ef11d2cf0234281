//! Nomination ceremony routing.
//!
//! After each nominee goes to the wall, the host's form is pre-filled with the
//! reason that usually comes next. The table is advisory: the host can always
//! override the reason before nominating.

use pd_core::{NominationReason, ParticipantId};

/// The reason and nominator the next nomination slot starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowStep {
    /// Reason pre-selected for the next nominee.
    pub reason: NominationReason,
    /// Nominator pre-selected for the next nominee.
    pub nominator: Option<ParticipantId>,
}

impl WorkflowStep {
    /// The first slot of every round: the leader's choice.
    pub fn opening() -> Self {
        Self {
            reason: NominationReason::LeadersChoice,
            nominator: None,
        }
    }
}

impl Default for WorkflowStep {
    fn default() -> Self {
        Self::opening()
    }
}

/// Route the ceremony after `just_added` went to the wall for `current`.
///
/// | current               | next               | nominator        |
/// |-----------------------|--------------------|------------------|
/// | Leader's Choice       | Counter-nomination | the one just added |
/// | Counter-nomination    | House Vote         | none             |
/// | House Vote            | Random Draw        | none             |
/// | House Vote (Tiebreak) | Random Draw        | none             |
/// | Challenge Loss        | Random Draw        | none             |
/// | anything else         | unchanged          | none             |
pub fn next_step(current: &NominationReason, just_added: ParticipantId) -> WorkflowStep {
    use NominationReason::*;

    let (reason, nominator) = match current {
        LeadersChoice => (CounterNomination, Some(just_added)),
        CounterNomination => (HouseVote, None),
        HouseVote | HouseVoteTiebreak | ChallengeLoss => (RandomDraw, None),
        other => (other.clone(), None),
    };
    WorkflowStep { reason, nominator }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_is_leaders_choice() {
        assert_eq!(WorkflowStep::opening().reason, NominationReason::LeadersChoice);
        assert!(WorkflowStep::opening().nominator.is_none());
    }

    #[test]
    fn leaders_choice_prefills_counter_nominator() {
        let id = ParticipantId::new();
        let step = next_step(&NominationReason::LeadersChoice, id);
        assert_eq!(step.reason, NominationReason::CounterNomination);
        assert_eq!(step.nominator, Some(id));
    }

    #[test]
    fn counter_goes_to_house_vote() {
        let step = next_step(&NominationReason::CounterNomination, ParticipantId::new());
        assert_eq!(step.reason, NominationReason::HouseVote);
        assert!(step.nominator.is_none());
    }

    #[test]
    fn votes_and_losses_go_to_draw() {
        for reason in [
            NominationReason::HouseVote,
            NominationReason::HouseVoteTiebreak,
            NominationReason::ChallengeLoss,
        ] {
            let step = next_step(&reason, ParticipantId::new());
            assert_eq!(step.reason, NominationReason::RandomDraw);
            assert!(step.nominator.is_none());
        }
    }

    #[test]
    fn other_reasons_stay() {
        for reason in [
            NominationReason::RandomDraw,
            NominationReason::DirectLine,
            NominationReason::Custom("Punishment".to_string()),
        ] {
            let step = next_step(&reason, ParticipantId::new());
            assert_eq!(step.reason, reason);
            assert!(step.nominator.is_none());
        }
    }

    #[test]
    fn full_ceremony_sequence() {
        let mut step = WorkflowStep::opening();
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(step.reason.clone());
            step = next_step(&step.reason, ParticipantId::new());
        }
        assert_eq!(
            seen,
            vec![
                NominationReason::LeadersChoice,
                NominationReason::CounterNomination,
                NominationReason::HouseVote,
                NominationReason::RandomDraw,
            ]
        );
    }
}
