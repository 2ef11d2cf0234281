//! Lines typed into the game room by the automation collaborator.

use pd_core::{Challenge, Roster};

use crate::draft::RoundDraft;
use crate::error::{SeasonError, SeasonResult};

/// First line of every vote announcement.
pub const TALLY_HEADER: &str = "Contagem de votos:";

/// Build the vote tally announcement for the round in progress.
///
/// Counts come from off-wall tallies and from house-vote nominees with a
/// recorded count. Lines are sorted ascending so the most-voted comes last.
pub fn tally_lines(draft: &RoundDraft, roster: &Roster) -> SeasonResult<Vec<String>> {
    let mut tallies: Vec<(&str, u32)> = draft
        .other_votes()
        .iter()
        .map(|ov| (roster.name_of(ov.participant_id), ov.count))
        .collect();
    tallies.extend(
        draft
            .nominees()
            .iter()
            .filter(|n| n.reason.is_house_vote())
            .filter_map(|n| match n.vote_count {
                Some(count) if count > 0 => Some((roster.name_of(n.participant_id), count)),
                _ => None,
            }),
    );
    if tallies.is_empty() {
        return Err(SeasonError::NothingToAnnounce);
    }
    tallies.sort_by_key(|&(_, count)| count);

    let mut lines = Vec::with_capacity(tallies.len() + 1);
    lines.push(TALLY_HEADER.to_string());
    lines.extend(tallies.into_iter().map(|(name, count)| {
        let noun = if count == 1 { "voto" } else { "votos" };
        format!("{name}: {count} {noun}")
    }));
    Ok(lines)
}

/// The briefing the room automation types when explaining a challenge.
pub fn briefing_lines(challenge: &Challenge) -> SeasonResult<Vec<String>> {
    let text = challenge
        .briefing
        .ok_or_else(|| SeasonError::NoBriefing(challenge.name.to_string()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use pd_core::catalog;
    use pd_core::{NominationReason, Nominee};

    use super::*;

    #[test]
    fn tally_sorted_ascending_with_plural() {
        let mut roster = Roster::new();
        let a = roster.add("Ana").unwrap();
        let b = roster.add("Bia").unwrap();
        let c = roster.add("Caio").unwrap();
        let mut draft = RoundDraft::new();
        draft.update_other_vote(&roster, a, 3).unwrap();
        draft.update_other_vote(&roster, b, 1).unwrap();
        draft
            .add_nominee(&roster, Nominee::new(c, NominationReason::HouseVote).with_votes(7))
            .unwrap();

        let lines = tally_lines(&draft, &roster).unwrap();
        insta::assert_snapshot!(
            lines.join(" | "),
            @"Contagem de votos: | Bia: 1 voto | Ana: 3 votos | Caio: 7 votos"
        );
    }

    #[test]
    fn non_house_votes_not_announced() {
        let mut roster = Roster::new();
        let a = roster.add("Ana").unwrap();
        let mut draft = RoundDraft::new();
        draft
            .add_nominee(&roster, Nominee::new(a, NominationReason::RandomDraw).with_votes(2))
            .unwrap();
        assert!(matches!(
            tally_lines(&draft, &roster),
            Err(SeasonError::NothingToAnnounce)
        ));
    }

    #[test]
    fn briefing_for_known_challenge() {
        let banzai = catalog::find("Banzai").unwrap();
        let lines = briefing_lines(banzai).unwrap();
        assert!(!lines.is_empty());
    }

    #[test]
    fn briefing_missing() {
        let queimada = catalog::find("Queimada").unwrap();
        assert!(matches!(
            briefing_lines(queimada),
            Err(SeasonError::NoBriefing(_))
        ));
    }
}
