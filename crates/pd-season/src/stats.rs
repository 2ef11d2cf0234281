//! Per-participant statistics, derived from the round history on demand.

use serde::{Deserialize, Serialize};

use pd_core::{ParticipantId, ParticipantStatus, Roster, RoundLog};

/// Aggregated numbers for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStats {
    /// Who these numbers belong to.
    pub participant_id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Current status.
    pub status: ParticipantStatus,
    /// Rounds led.
    pub leader_count: usize,
    /// Rounds spent on the wall.
    pub wall_count: usize,
    /// Rounds vetoed from the challenge.
    pub veto_count: usize,
    /// Votes received across all rounds, on and off the wall.
    pub votes_received: u32,
    /// Walls survived.
    pub survived: usize,
}

/// Rounds in which the participant was a leader.
pub fn leader_count(rounds: &[RoundLog], id: ParticipantId) -> usize {
    rounds.iter().filter(|r| r.leader_ids.contains(&id)).count()
}

/// Rounds in which the participant was nominated.
pub fn wall_count(rounds: &[RoundLog], id: ParticipantId) -> usize {
    rounds.iter().filter(|r| r.is_nominated(id)).count()
}

/// Rounds in which the participant was vetoed.
pub fn veto_count(rounds: &[RoundLog], id: ParticipantId) -> usize {
    rounds.iter().filter(|r| r.vetoed_ids.contains(&id)).count()
}

/// Total votes received.
pub fn votes_received(rounds: &[RoundLog], id: ParticipantId) -> u32 {
    rounds.iter().map(|r| r.votes_for(id)).sum()
}

/// Walls survived: every wall except the one that eliminated them.
pub fn survived(rounds: &[RoundLog], id: ParticipantId) -> usize {
    let walls = wall_count(rounds, id);
    let lost = rounds.iter().any(|r| r.eliminated_ids.contains(&id));
    walls.saturating_sub(usize::from(lost))
}

/// Compute the stats for one participant.
pub fn for_participant(rounds: &[RoundLog], roster: &Roster, id: ParticipantId) -> Option<ParticipantStats> {
    let p = roster.get(id)?;
    Some(ParticipantStats {
        participant_id: id,
        name: p.name.clone(),
        status: p.status,
        leader_count: leader_count(rounds, id),
        wall_count: wall_count(rounds, id),
        veto_count: veto_count(rounds, id),
        votes_received: votes_received(rounds, id),
        survived: survived(rounds, id),
    })
}

/// Everyone's stats, winner first, then active, then eliminated; leaders
/// rank higher within each group.
pub fn leaderboard(rounds: &[RoundLog], roster: &Roster) -> Vec<ParticipantStats> {
    let mut board: Vec<ParticipantStats> = roster
        .participants()
        .iter()
        .filter_map(|p| for_participant(rounds, roster, p.id))
        .collect();
    board.sort_by(|a, b| {
        a.status
            .priority()
            .cmp(&b.status.priority())
            .then(b.leader_count.cmp(&a.leader_count))
    });
    board
}
