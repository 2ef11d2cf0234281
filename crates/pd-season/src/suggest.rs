//! Challenge suggestions for the next round.
//!
//! Eligible entries are scored, split into skill, luck, and other buckets,
//! and the best of each bucket is offered. Reuse is penalised far more than
//! anything else can reward, so a played challenge only comes back once its
//! bucket has nothing fresh left.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::debug;

use pd_core::catalog::{self, Challenge, ChallengeCategory};
use pd_core::RoundLog;

use crate::config::SeasonConfig;
use crate::season::SeasonState;

/// Penalty per previous use this season.
const REUSE_PENALTY: f64 = 1000.0;
/// Penalty for long challenges when time is short.
const LONG_PENALTY: f64 = 500.0;
/// Bonus for short challenges when time is short.
const SHORT_BONUS: f64 = 50.0;
/// Upper bound of the random jitter.
const JITTER: f64 = 10.0;

/// What the engine needs to know to rank challenges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestionContext {
    /// Participants still in the game.
    pub active_count: u32,
    /// Minutes since the season started.
    pub elapsed_minutes: f64,
    /// Planned season length in minutes.
    pub target_minutes: f64,
    /// Remaining minutes under which short challenges are preferred.
    pub time_pressure_minutes: f64,
}

impl SuggestionContext {
    /// Build the context for a running season.
    pub fn from_season(season: &SeasonState, config: &SeasonConfig, now: DateTime<Utc>) -> Self {
        Self {
            active_count: u32::try_from(season.roster().active_count()).unwrap_or(u32::MAX),
            elapsed_minutes: season.elapsed_minutes(now),
            target_minutes: f64::from(season.target_duration_minutes()),
            time_pressure_minutes: config.time_pressure_minutes,
        }
    }

    /// Whether the remaining time is inside the pressure window.
    pub fn under_pressure(&self) -> bool {
        self.target_minutes - self.elapsed_minutes < self.time_pressure_minutes
    }
}

/// A ranked catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Suggestion {
    /// The suggested challenge.
    pub challenge: &'static Challenge,
    /// Its score; higher is better.
    pub score: f64,
    /// Times it was already played this season.
    pub usage: usize,
}

/// Which diversity bucket an entry falls in.
///
/// Any skill component wins; otherwise any luck component does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// Skill challenges.
    Skill,
    /// Luck challenges.
    Luck,
    /// Everything else.
    Other,
}

impl From<&Challenge> for Bucket {
    fn from(challenge: &Challenge) -> Self {
        if challenge.is(ChallengeCategory::Skill) {
            Self::Skill
        } else if challenge.is(ChallengeCategory::Luck) {
            Self::Luck
        } else {
            Self::Other
        }
    }
}

/// How many rounds played the named challenge.
pub fn usage_count(rounds: &[RoundLog], name: &str) -> usize {
    rounds
        .iter()
        .filter(|r| r.challenge_name.eq_ignore_ascii_case(name))
        .count()
}

/// Deterministic part of an entry's score.
pub fn score(challenge: &Challenge, usage: usize, ctx: &SuggestionContext) -> f64 {
    let mut score = -REUSE_PENALTY * usage as f64;
    if ctx.under_pressure() {
        let minutes = challenge.typical_duration_minutes();
        if minutes > 5.0 {
            score -= LONG_PENALTY;
        }
        if minutes <= 3.0 {
            score += SHORT_BONUS;
        }
    }
    score
}

/// Up to three suggestions: best skill, best luck, best other.
///
/// `usage` reports how often a challenge was already played. With no
/// other-bucket entry, the runner-up of the skill bucket, then of the luck
/// bucket, takes the third slot.
pub fn suggest<R, U>(ctx: &SuggestionContext, usage: U, rng: &mut R) -> Vec<Suggestion>
where
    R: Rng + ?Sized,
    U: Fn(&str) -> usize,
{
    let mut skill = Vec::new();
    let mut luck = Vec::new();
    let mut other = Vec::new();

    for challenge in catalog::catalog() {
        if challenge.is_placeholder() || !challenge.fits(ctx.active_count) {
            continue;
        }
        let used = usage(challenge.name);
        let score = score(challenge, used, ctx) + rng.random_range(0.0..JITTER);
        let suggestion = Suggestion {
            challenge,
            score,
            usage: used,
        };
        match Bucket::from(challenge) {
            Bucket::Skill => skill.push(suggestion),
            Bucket::Luck => luck.push(suggestion),
            Bucket::Other => other.push(suggestion),
        }
    }
    for bucket in [&mut skill, &mut luck, &mut other] {
        bucket.sort_by(|a, b| b.score.total_cmp(&a.score));
    }

    let mut picks: Vec<Suggestion> = [skill.first(), luck.first(), other.first()]
        .into_iter()
        .flatten()
        .copied()
        .collect();
    if other.is_empty() {
        if let Some(backfill) = skill.get(1).or_else(|| luck.get(1)) {
            picks.push(*backfill);
        }
    }
    debug!(
        players = ctx.active_count,
        picks = ?picks.iter().map(|s| s.challenge.name).collect::<Vec<_>>(),
        "suggestions"
    );
    picks
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pd_core::{NominationReason, Nominee, ParticipantId};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn ctx(players: u32) -> SuggestionContext {
        SuggestionContext {
            active_count: players,
            elapsed_minutes: 0.0,
            target_minutes: 60.0,
            time_pressure_minutes: 15.0,
        }
    }

    fn played(name: &str, n: u32) -> RoundLog {
        let id = ParticipantId::new();
        RoundLog {
            round_number: n,
            challenge_name: name.to_string(),
            leader_ids: BTreeSet::new(),
            vetoed_ids: BTreeSet::new(),
            immune_ids: BTreeSet::new(),
            nominees: vec![Nominee::new(id, NominationReason::RandomDraw)],
            other_votes: vec![],
            eliminated_ids: [id].into_iter().collect(),
        }
    }

    #[test]
    fn one_per_bucket() {
        let mut rng = StdRng::seed_from_u64(42);
        let picks = suggest(&ctx(8), |_| 0, &mut rng);
        assert_eq!(picks.len(), 3);
        assert_eq!(Bucket::from(picks[0].challenge), Bucket::Skill);
        assert_eq!(Bucket::from(picks[1].challenge), Bucket::Luck);
        assert_eq!(Bucket::from(picks[2].challenge), Bucket::Other);
    }

    #[test]
    fn blended_entries_bucket_by_skill_then_luck() {
        let bucket = |name: &str| Bucket::from(catalog::find(name).unwrap());
        assert_eq!(bucket("Leilão"), Bucket::Skill);
        assert_eq!(bucket("A Escolha"), Bucket::Luck);
        assert_eq!(bucket("Descubra a Senha"), Bucket::Luck);
        assert_eq!(bucket("Verdadeiro ou Falso"), Bucket::Other);
        assert_eq!(bucket("Pacman"), Bucket::Other);
    }

    #[test]
    fn usage_lookup_penalises_played_entries() {
        let mut rng = StdRng::seed_from_u64(3);
        let fresh = suggest(&ctx(8), |_| 0, &mut rng);
        let played_name = fresh[0].challenge.name;
        let picks = suggest(
            &ctx(8),
            |name| usize::from(name == played_name),
            &mut StdRng::seed_from_u64(3),
        );
        assert!(picks.iter().all(|p| p.challenge.name != played_name));
    }

    #[test]
    fn never_suggests_placeholder() {
        let mut rng = StdRng::seed_from_u64(7);
        for players in 1..20 {
            for s in suggest(&ctx(players), |_| 0, &mut rng) {
                assert!(!s.challenge.is_placeholder());
            }
        }
    }

    #[test]
    fn pressure_prefers_short() {
        let mut c = ctx(8);
        c.elapsed_minutes = 50.0;
        assert!(c.under_pressure());
        let short = catalog::find("Banzai").unwrap();
        assert_eq!(score(short, 0, &c), SHORT_BONUS);
        assert_eq!(score(short, 0, &ctx(8)), 0.0);
    }

    #[test]
    fn usage_penalty_applies() {
        let rounds = vec![played("Banzai", 1), played("banzai", 2)];
        assert_eq!(usage_count(&rounds, "Banzai"), 2);
        let banzai = catalog::find("Banzai").unwrap();
        assert_eq!(score(banzai, 2, &ctx(8)), -2000.0);
    }

    #[test]
    fn same_seed_same_picks() {
        let a = suggest(&ctx(6), |_| 0, &mut StdRng::seed_from_u64(1));
        let b = suggest(&ctx(6), |_| 0, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn picks_fit_and_prefer_unused(
            players in 2u32..20,
            used in proptest::collection::vec(0usize..38, 0..10),
            seed in any::<u64>(),
        ) {
            let all = catalog::catalog();
            let rounds: Vec<RoundLog> = used
                .iter()
                .enumerate()
                .map(|(i, &idx)| played(all[idx % all.len()].name, i as u32 + 1))
                .collect();
            let c = ctx(players);
            let picks = suggest(&c, |name| usage_count(&rounds, name), &mut StdRng::seed_from_u64(seed));
            for pick in &picks {
                prop_assert!(pick.challenge.fits(players));
                if pick.usage > 0 {
                    let bucket = Bucket::from(pick.challenge);
                    let fresh_exists = all.iter().any(|e| {
                        !e.is_placeholder()
                            && e.fits(players)
                            && Bucket::from(e) == bucket
                            && usage_count(&rounds, e.name) == 0
                            && !picks.iter().any(|p| p.challenge.name == e.name)
                    });
                    prop_assert!(!fresh_exists, "{} reused over a fresh entry", pick.challenge.name);
                }
            }
        }
    }
}
