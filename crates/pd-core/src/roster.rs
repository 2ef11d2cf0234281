use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::participant::{Participant, ParticipantId, ParticipantStatus};

/// Outcome of a bulk roster entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkAdd {
    /// IDs of the participants that were created, in input order.
    pub added: Vec<ParticipantId>,
    /// Names that were rejected as duplicates.
    pub skipped: Vec<String>,
}

/// Every participant of a season, active or not, ordered by name.
///
/// Names are unique case-insensitively across the whole roster, eliminated
/// participants included.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    participants: Vec<Participant>,
    by_name_lower: HashMap<String, ParticipantId>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a roster from stored participants, keeping their IDs and status.
    pub fn from_participants(participants: Vec<Participant>) -> CoreResult<Self> {
        let mut roster = Self::new();
        for p in participants {
            roster.insert(p)?;
        }
        Ok(roster)
    }

    /// Add a new active participant. Returns its fresh ID.
    pub fn add(&mut self, name: &str) -> CoreResult<ParticipantId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::EmptyName);
        }
        self.insert(Participant::new(name))
    }

    /// Add every name in a comma- or newline-separated list.
    ///
    /// Blank entries are ignored and duplicates are skipped rather than
    /// failing the whole batch.
    pub fn add_many(&mut self, input: &str) -> BulkAdd {
        let mut result = BulkAdd::default();
        for name in input.split([',', '\n']).map(str::trim) {
            if name.is_empty() {
                continue;
            }
            match self.add(name) {
                Ok(id) => result.added.push(id),
                Err(_) => result.skipped.push(name.to_string()),
            }
        }
        result
    }

    fn insert(&mut self, participant: Participant) -> CoreResult<ParticipantId> {
        let name_lower = participant.name.to_lowercase();
        if self.by_name_lower.contains_key(&name_lower) {
            return Err(CoreError::DuplicateName(participant.name));
        }
        let id = participant.id;
        self.by_name_lower.insert(name_lower, id);
        self.participants.push(participant);
        self.participants.sort_by_key(|p| p.name.to_lowercase());
        Ok(id)
    }

    /// Remove a participant entirely. Only meaningful before a season starts.
    pub fn remove(&mut self, id: ParticipantId) -> CoreResult<Participant> {
        let pos = self
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or(CoreError::ParticipantNotFound(id))?;
        let removed = self.participants.remove(pos);
        self.by_name_lower.remove(&removed.name.to_lowercase());
        Ok(removed)
    }

    /// Get a participant by ID.
    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Whether the ID belongs to this roster.
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.get(id).is_some()
    }

    /// Find a participant by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Participant> {
        self.find_id_by_name(name).and_then(|id| self.get(id))
    }

    /// Find a participant ID by name (case-insensitive).
    pub fn find_id_by_name(&self, name: &str) -> Option<ParticipantId> {
        self.by_name_lower.get(&name.trim().to_lowercase()).copied()
    }

    /// Resolve a name to an active participant's ID.
    pub fn resolve_active(&self, name: &str) -> CoreResult<ParticipantId> {
        self.find_by_name(name)
            .filter(|p| p.is_active())
            .map(|p| p.id)
            .ok_or_else(|| CoreError::UnknownName(name.trim().to_string()))
    }

    /// Display name for an ID, or `"?"` when unknown.
    pub fn name_of(&self, id: ParticipantId) -> &str {
        self.get(id).map(|p| p.name.as_str()).unwrap_or("?")
    }

    /// Move an active participant to `Eliminated`.
    ///
    /// Returns `false` when the participant was not active; the transition is
    /// never reversed.
    pub fn eliminate(&mut self, id: ParticipantId) -> CoreResult<bool> {
        let p = self
            .participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CoreError::ParticipantNotFound(id))?;
        if p.status != ParticipantStatus::Active {
            return Ok(false);
        }
        p.status = ParticipantStatus::Eliminated;
        Ok(true)
    }

    /// Mark an active participant as the winner.
    pub fn crown(&mut self, id: ParticipantId) -> CoreResult<()> {
        let p = self
            .participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CoreError::ParticipantNotFound(id))?;
        if p.status != ParticipantStatus::Active {
            return Err(CoreError::NotActive(p.name.clone()));
        }
        p.status = ParticipantStatus::Winner;
        Ok(())
    }

    /// All participants, ordered by name.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Active participants, ordered by name.
    pub fn active(&self) -> Vec<&Participant> {
        self.participants.iter().filter(|p| p.is_active()).collect()
    }

    /// Number of active participants.
    pub fn active_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_active()).count()
    }

    /// The declared winner, if any.
    pub fn winner(&self) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.status == ParticipantStatus::Winner)
    }

    /// Total number of participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn add_and_lookup_case_insensitive() {
        let mut r = Roster::new();
        let id = r.add("Bruna").unwrap();
        assert_eq!(r.find_id_by_name("bRUNA"), Some(id));
        assert_eq!(r.name_of(id), "Bruna");
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut r = Roster::new();
        r.add("Bruna").unwrap();
        assert_eq!(
            r.add("  BRUNA "),
            Err(CoreError::DuplicateName("BRUNA".to_string()))
        );
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn duplicate_of_eliminated_rejected() {
        let mut r = Roster::new();
        let id = r.add("Caio").unwrap();
        r.eliminate(id).unwrap();
        assert!(r.add("caio").is_err());
    }

    #[test]
    fn empty_name_rejected() {
        let mut r = Roster::new();
        assert_eq!(r.add("   "), Err(CoreError::EmptyName));
    }

    #[test]
    fn ordered_by_name() {
        let mut r = Roster::new();
        r.add("zeca").unwrap();
        r.add("Ana").unwrap();
        r.add("bia").unwrap();
        let names: Vec<&str> = r.participants().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "bia", "zeca"]);
    }

    #[test]
    fn bulk_add_skips_duplicates_and_blanks() {
        let mut r = Roster::new();
        r.add("Ana").unwrap();
        let result = r.add_many("Bia, ana,\n\nCaio ,Bia");
        assert_eq!(result.added.len(), 2);
        assert_eq!(result.skipped, vec!["ana".to_string(), "Bia".to_string()]);
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn eliminate_is_one_way() {
        let mut r = Roster::new();
        let id = r.add("Ana").unwrap();
        assert!(r.eliminate(id).unwrap());
        assert!(!r.eliminate(id).unwrap());
        assert_eq!(r.active_count(), 0);
        assert!(r.crown(id).is_err());
    }

    #[test]
    fn remove_frees_name() {
        let mut r = Roster::new();
        let id = r.add("Ana").unwrap();
        r.remove(id).unwrap();
        assert!(r.is_empty());
        assert!(r.add("ana").is_ok());
    }

    #[test]
    fn resolve_active_ignores_eliminated() {
        let mut r = Roster::new();
        let id = r.add("Ana").unwrap();
        assert_eq!(r.resolve_active("ana"), Ok(id));
        r.eliminate(id).unwrap();
        assert!(r.resolve_active("ana").is_err());
    }

    #[test]
    fn rebuild_from_participants_keeps_ids() {
        let mut r = Roster::new();
        let id = r.add("Ana").unwrap();
        r.eliminate(id).unwrap();
        let rebuilt = Roster::from_participants(r.participants().to_vec()).unwrap();
        assert_eq!(rebuilt.get(id).unwrap().status, ParticipantStatus::Eliminated);
    }

    proptest! {
        #[test]
        fn names_stay_unique_ignoring_case(names in proptest::collection::vec("[a-cA-C]{1,2}", 0..30)) {
            let mut r = Roster::new();
            for name in &names {
                let _ = r.add(name);
            }
            let lowered: HashSet<String> =
                r.participants().iter().map(|p| p.name.to_lowercase()).collect();
            prop_assert_eq!(lowered.len(), r.len());
        }
    }
}
