//! Season summaries, the known-names list, and where they are kept.
//!
//! The archive is append-only: finishing a season adds its summary and merges
//! its participant names into the known-names list used to speed up roster
//! entry next time.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use pd_core::{Participant, Roster, RoundLog};

use crate::config::ScreenPoint;
use crate::error::{SeasonError, SeasonResult};
use crate::season::{SeasonPhase, SeasonState};
use crate::stats::{self, ParticipantStats};

/// Everything worth keeping about a finished season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSummary {
    /// Milliseconds since the epoch when the season was archived.
    pub season_id: i64,
    /// When the season was archived.
    pub date: DateTime<Utc>,
    /// The declared winner, if any.
    pub winner: Option<String>,
    /// Names of the participants still in the game at the end.
    pub finalists: Vec<String>,
    /// Rounds played.
    pub total_rounds: usize,
    /// Everyone's final numbers.
    pub players: Vec<ParticipantStats>,
    /// The complete round history.
    pub round_history: Vec<RoundLog>,
}

impl SeasonSummary {
    /// Summarise a season in its final stretch.
    pub fn from_season(season: &SeasonState, now: DateTime<Utc>) -> SeasonResult<Self> {
        if season.phase() != SeasonPhase::Final {
            return Err(SeasonError::WrongPhase(season.phase()));
        }
        let roster = season.roster();
        let finalists = roster
            .participants()
            .iter()
            .filter(|p| p.status != pd_core::ParticipantStatus::Eliminated)
            .map(|p| p.name.clone())
            .collect();
        Ok(Self {
            season_id: now.timestamp_millis(),
            date: now,
            winner: roster.winner().map(|p| p.name.clone()),
            finalists,
            total_rounds: season.rounds().len(),
            players: stats::leaderboard(season.rounds(), roster),
            round_history: season.rounds().to_vec(),
        })
    }

    /// The participants as they stood at the end.
    pub fn participants(&self) -> Vec<Participant> {
        self.players
            .iter()
            .map(|s| Participant {
                id: s.participant_id,
                name: s.name.clone(),
                status: s.status,
            })
            .collect()
    }

    /// Derive the statistics again from the stored history.
    pub fn recompute_stats(&self) -> SeasonResult<Vec<ParticipantStats>> {
        let roster = Roster::from_participants(self.participants())?;
        Ok(stats::leaderboard(&self.round_history, &roster))
    }
}

/// Union of the known names and the new ones, sorted and deduplicated.
pub fn merge_known_names<'a>(
    known: &'a [String],
    new: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    known
        .iter()
        .map(String::as_str)
        .chain(new)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Serialise summaries as pretty JSON.
pub fn export_json(seasons: &[SeasonSummary]) -> SeasonResult<String> {
    Ok(serde_json::to_string_pretty(seasons)?)
}

/// Load summaries from JSON.
pub fn import_json(json: &str) -> SeasonResult<Vec<SeasonSummary>> {
    Ok(serde_json::from_str(json)?)
}

/// Persistent storage for the archive.
pub trait ArchiveStore {
    /// Every archived season, oldest first.
    fn load_seasons(&self) -> SeasonResult<Vec<SeasonSummary>>;
    /// Replace the stored seasons.
    fn save_seasons(&mut self, seasons: &[SeasonSummary]) -> SeasonResult<()>;
    /// The known participant names, sorted.
    fn load_known_names(&self) -> SeasonResult<Vec<String>>;
    /// Replace the known names.
    fn save_known_names(&mut self, names: &[String]) -> SeasonResult<()>;
    /// The saved automation click point, if any.
    fn load_click_point(&self) -> SeasonResult<Option<ScreenPoint>>;
    /// Remember the automation click point.
    fn save_click_point(&mut self, point: ScreenPoint) -> SeasonResult<()>;
}

/// Append a summary and merge its names into the known list.
///
/// Known names are written first. The merge is idempotent, so a failed call
/// can be retried without archiving the season twice. Returns the full
/// archive after the append.
pub fn archive_season(
    store: &mut dyn ArchiveStore,
    summary: SeasonSummary,
) -> SeasonResult<Vec<SeasonSummary>> {
    let known = store.load_known_names()?;
    let merged = merge_known_names(&known, summary.players.iter().map(|p| p.name.as_str()));
    let mut seasons = store.load_seasons()?;
    info!(
        season_id = summary.season_id,
        rounds = summary.total_rounds,
        winner = summary.winner.as_deref().unwrap_or("-"),
        "season archived"
    );
    seasons.push(summary);
    store.save_known_names(&merged)?;
    store.save_seasons(&seasons)?;
    Ok(seasons)
}

/// Archive kept as JSON files in one directory.
#[derive(Debug, Clone)]
pub struct JsonArchive {
    dir: PathBuf,
}

impl JsonArchive {
    const SEASONS: &'static str = "seasons.json";
    const KNOWN_NAMES: &'static str = "known_players.json";
    const CLICK_POINT: &'static str = "click_point.json";

    /// Use `dir`, creating it on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The archive directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> SeasonResult<Option<T>> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn write<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> SeasonResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(file), serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}

impl ArchiveStore for JsonArchive {
    fn load_seasons(&self) -> SeasonResult<Vec<SeasonSummary>> {
        Ok(self.read(Self::SEASONS)?.unwrap_or_default())
    }

    fn save_seasons(&mut self, seasons: &[SeasonSummary]) -> SeasonResult<()> {
        self.write(Self::SEASONS, seasons)
    }

    fn load_known_names(&self) -> SeasonResult<Vec<String>> {
        Ok(self.read(Self::KNOWN_NAMES)?.unwrap_or_default())
    }

    fn save_known_names(&mut self, names: &[String]) -> SeasonResult<()> {
        self.write(Self::KNOWN_NAMES, names)
    }

    fn load_click_point(&self) -> SeasonResult<Option<ScreenPoint>> {
        self.read(Self::CLICK_POINT)
    }

    fn save_click_point(&mut self, point: ScreenPoint) -> SeasonResult<()> {
        self.write(Self::CLICK_POINT, &point)
    }
}

/// In-memory archive, for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    seasons: Vec<SeasonSummary>,
    known_names: Vec<String>,
    click_point: Option<ScreenPoint>,
}

impl MemoryArchive {
    /// An empty archive.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArchiveStore for MemoryArchive {
    fn load_seasons(&self) -> SeasonResult<Vec<SeasonSummary>> {
        Ok(self.seasons.clone())
    }

    fn save_seasons(&mut self, seasons: &[SeasonSummary]) -> SeasonResult<()> {
        self.seasons = seasons.to_vec();
        Ok(())
    }

    fn load_known_names(&self) -> SeasonResult<Vec<String>> {
        Ok(self.known_names.clone())
    }

    fn save_known_names(&mut self, names: &[String]) -> SeasonResult<()> {
        self.known_names = names.to_vec();
        Ok(())
    }

    fn load_click_point(&self) -> SeasonResult<Option<ScreenPoint>> {
        Ok(self.click_point)
    }

    fn save_click_point(&mut self, point: ScreenPoint) -> SeasonResult<()> {
        self.click_point = Some(point);
        Ok(())
    }
}
