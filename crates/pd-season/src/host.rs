//! Interactive host session.
//!
//! `HostSession` wraps a [`SeasonState`] with a line-based command language so
//! a front end only has to pass text in and print text out. Collaborator calls
//! are never made here: they are queued as [`Outbound`] items that the front
//! end drains with [`HostSession::take_outbound`] and runs on its own time.

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use pd_core::catalog;
use pd_core::{NominationReason, ParticipantId};

use crate::announce;
use crate::archive::{self, ArchiveStore, SeasonSummary};
use crate::collab::{
    AutomationAction, AutomationRequest, Completion, Delivery, NarrativeRequest, Outbound,
};
use crate::config::{ScreenPoint, SeasonConfig};
use crate::error::{SeasonError, SeasonResult};
use crate::season::{SeasonPhase, SeasonState};
use crate::stats;
use crate::suggest::{self, Suggestion, SuggestionContext};

/// A host's control panel session.
pub struct HostSession {
    season: SeasonState,
    config: SeasonConfig,
    rng: StdRng,
    suggestions: Vec<Suggestion>,
    outbox: Vec<Outbound>,
    archive: Option<Box<dyn ArchiveStore>>,
    muted: bool,
}

impl HostSession {
    /// Create a session with an empty season.
    pub fn new(config: SeasonConfig) -> Self {
        Self {
            season: SeasonState::new(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            suggestions: Vec::new(),
            outbox: Vec::new(),
            archive: None,
            muted: false,
        }
    }

    /// Attach an archive. A saved click point overrides the configured one.
    pub fn with_archive(mut self, store: Box<dyn ArchiveStore>) -> SeasonResult<Self> {
        if let Some(point) = store.load_click_point()? {
            self.config.click_point = point;
        }
        self.archive = Some(store);
        Ok(self)
    }

    /// The season being hosted.
    pub fn season(&self) -> &SeasonState {
        &self.season
    }

    /// The session configuration.
    pub fn config(&self) -> &SeasonConfig {
        &self.config
    }

    /// The last suggestions offered.
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Whether the room is muted, as far as the automation has confirmed.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Hand queued collaborator requests to the caller.
    pub fn take_outbound(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    /// Apply a finished collaborator call and return the delivery to show.
    ///
    /// The mute flag only flips when the automation confirmed the toggle,
    /// and a captured point is persisted like one set with `point`.
    pub fn complete(&mut self, completion: Completion) -> SeasonResult<Delivery> {
        match completion {
            Completion::Narrated(delivery) | Completion::Automated(delivery) => Ok(delivery),
            Completion::MuteToggled(delivery) => {
                if delivery.is_delivered() {
                    self.muted = !self.muted;
                    let state = if self.muted { "muted" } else { "unmuted" };
                    return Ok(Delivery::Delivered(format!("Room {state}.")));
                }
                Ok(delivery)
            }
            Completion::PointCaptured(Ok(point)) => {
                self.set_click_point(point)?;
                Ok(Delivery::Delivered(format!(
                    "Click point set to {}, {}.",
                    point.x, point.y
                )))
            }
            Completion::PointCaptured(Err(fallback)) => Ok(fallback),
        }
    }

    /// Process a line of host input and return a response.
    pub fn process(&mut self, input: &str) -> SeasonResult<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(String::new());
        }

        let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
        let cmd = parts[0].to_lowercase();
        let rest = parts.get(1).map(|s| s.trim()).unwrap_or("");
        debug!(%cmd, "host command");

        match cmd.as_str() {
            "add" => self.do_add(rest),
            "drop" => self.do_drop(rest),
            "known" => self.do_known(),
            "start" => self.do_start(rest),
            "suggest" => self.do_suggest(),
            "challenge" => self.do_challenge(rest),
            "leader" => self.do_toggle(rest, Toggle::Leader),
            "veto" => self.do_toggle(rest, Toggle::Veto),
            "immune" => self.do_toggle(rest, Toggle::Immune),
            "eliminate" => self.do_toggle(rest, Toggle::Eliminated),
            "reason" => self.do_reason(rest),
            "by" => self.do_by(rest),
            "votes" => self.do_votes(rest),
            "open" => self.do_flag(Flag::Open),
            "reverse" => self.do_flag(Flag::Reverse),
            "nominate" => self.do_nominate(rest),
            "unnominate" => self.do_unnominate(rest),
            "vote" => self.do_vote(rest),
            "promote" => self.do_promote(rest, false),
            "tiebreak" => self.do_promote(rest, true),
            "round" => Ok(self.render_draft()),
            "commit" => self.do_commit(),
            "join" => self.do_join(rest),
            "replace" => self.do_replace(rest),
            "expel" => self.do_expel(rest),
            "final" => self.do_final(),
            "winner" => self.do_winner(rest),
            "announce" => self.do_announce(),
            "brief" => self.do_brief(),
            "finale" => self.do_finale(),
            "point" => self.do_point(rest),
            "capture" => Ok(self.queue(
                Outbound::CapturePoint,
                "Capturing the click point: hover over the chat box.",
            )),
            "mute" => Ok(self.queue(Outbound::ToggleMute, "Toggling the room mute...")),
            "end" => self.do_end(),
            "history" => Ok(self.render_history()),
            "stats" => Ok(self.render_stats()),
            "time" => Ok(self.render_time()),
            "status" => Ok(self.render_status()),
            "roster" => Ok(self.render_roster()),
            "avatar" => self.do_avatar(rest),
            "restart" => {
                self.reset();
                Ok("Season restarted.".to_string())
            }
            "help" => Ok(HELP.to_string()),
            "quit" | "q" => Ok("Goodbye!".to_string()),
            other => Err(SeasonError::UnknownCommand(other.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Roster
    // -----------------------------------------------------------------------

    fn do_add(&mut self, rest: &str) -> SeasonResult<String> {
        if rest.is_empty() {
            return Err(usage("add <name>[, <name>...]"));
        }
        if !rest.contains([',', '\n']) {
            let id = self.season.add_participant(rest)?;
            return Ok(format!("Added {}.", self.name(id)));
        }

        let result = self.season.add_participants(rest)?;
        let mut out = format!("Added {} participant(s).", result.added.len());
        if !result.skipped.is_empty() {
            out.push_str(&format!(" Skipped: {}.", result.skipped.join(", ")));
        }
        Ok(out)
    }

    fn do_drop(&mut self, rest: &str) -> SeasonResult<String> {
        let id = self
            .season
            .roster()
            .find_id_by_name(rest)
            .ok_or_else(|| pd_core::CoreError::UnknownName(rest.to_string()))?;
        let removed = self.season.remove_participant(id)?;
        Ok(format!("Removed {}.", removed.name))
    }

    fn do_known(&self) -> SeasonResult<String> {
        let Some(store) = &self.archive else {
            return Ok("No archive attached.".to_string());
        };
        let available: Vec<String> = store
            .load_known_names()?
            .into_iter()
            .filter(|n| self.season.roster().find_by_name(n).is_none())
            .collect();
        if available.is_empty() {
            return Ok("No known names to add.".to_string());
        }
        Ok(format!("Known names: {}", available.join(", ")))
    }

    fn do_join(&mut self, rest: &str) -> SeasonResult<String> {
        if self.season.phase() != SeasonPhase::Playing {
            return Err(SeasonError::WrongPhase(self.season.phase()));
        }
        if rest.is_empty() {
            return Err(usage("join <name>"));
        }
        let id = self.season.add_participant(rest)?;
        Ok(format!("{} joined the game.", self.name(id)))
    }

    fn do_replace(&mut self, rest: &str) -> SeasonResult<String> {
        let Some((old, new)) = rest.split_once(" with ") else {
            return Err(usage("replace <name> with <new name>"));
        };
        let outgoing = self.resolve(old.trim())?;
        let incoming = self.season.replace_participant(outgoing, new.trim())?;
        Ok(format!(
            "{} replaced by {}.",
            self.name(outgoing),
            self.name(incoming)
        ))
    }

    fn do_expel(&mut self, rest: &str) -> SeasonResult<String> {
        let id = self.resolve(rest)?;
        self.season.expel(id)?;
        Ok(format!("{} was expelled.", self.name(id)))
    }

    fn do_avatar(&self, rest: &str) -> SeasonResult<String> {
        let p = self
            .season
            .roster()
            .find_by_name(rest)
            .ok_or_else(|| pd_core::CoreError::UnknownName(rest.to_string()))?;
        p.avatar_ref()
            .ok_or_else(|| SeasonError::InvalidChoice(format!("no avatar for {}", p.name)))
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    fn do_start(&mut self, rest: &str) -> SeasonResult<String> {
        let minutes = if rest.is_empty() {
            self.config.target_duration_minutes
        } else {
            rest.parse()
                .map_err(|_| usage("start [target minutes]"))?
        };
        self.season.start(minutes, Utc::now())?;
        self.refresh_suggestions();
        Ok(format!(
            "Season started with {} participants, target {} min.\n{}",
            self.season.roster().len(),
            self.season.target_duration_minutes(),
            self.render_suggestions()
        ))
    }

    fn do_commit(&mut self) -> SeasonResult<String> {
        let log = self.season.finish_round()?;
        let eliminated: Vec<ParticipantId> = log.eliminated_ids.iter().copied().collect();
        let number = log.round_number;
        let mut out = format!(
            "Round {number} committed. Eliminated: {}.",
            self.names(&eliminated)
        );
        if self.season.should_advance_to_final(self.config.final_threshold) {
            out.push_str(&format!(
                "\nOnly {} left. Type 'final' to go to the final.",
                self.season.roster().active_count()
            ));
        } else {
            self.refresh_suggestions();
            out.push('\n');
            out.push_str(&self.render_suggestions());
        }
        Ok(out)
    }

    fn do_final(&mut self) -> SeasonResult<String> {
        self.season.advance_to_final()?;
        let names: Vec<ParticipantId> = self.season.finalists().iter().map(|p| p.id).collect();
        Ok(format!("Final! Finalists: {}.", self.names(&names)))
    }

    fn do_winner(&mut self, rest: &str) -> SeasonResult<String> {
        let id = self.resolve(rest)?;
        self.season.declare_winner(id)?;
        Ok(format!("{} wins the season!", self.name(id)))
    }

    fn do_end(&mut self) -> SeasonResult<String> {
        let summary = SeasonSummary::from_season(&self.season, Utc::now())?;
        let Some(store) = self.archive.as_mut() else {
            return Err(SeasonError::InvalidChoice("no archive attached".to_string()));
        };
        let total = archive::archive_season(&mut **store, summary)?.len();
        self.reset();
        Ok(format!("Season archived ({total} in archive). Ready for a new season."))
    }

    // -----------------------------------------------------------------------
    // Round draft
    // -----------------------------------------------------------------------

    fn do_suggest(&mut self) -> SeasonResult<String> {
        if self.season.phase() != SeasonPhase::Playing {
            return Err(SeasonError::WrongPhase(self.season.phase()));
        }
        self.refresh_suggestions();
        Ok(self.render_suggestions())
    }

    fn do_challenge(&mut self, rest: &str) -> SeasonResult<String> {
        if rest.is_empty() {
            return Err(usage("challenge <name or suggestion number>"));
        }
        let name = match rest.parse::<usize>() {
            Ok(n) => self
                .suggestions
                .get(n.wrapping_sub(1))
                .map(|s| s.challenge.name.to_string())
                .ok_or_else(|| SeasonError::InvalidChoice(format!("no suggestion {n}")))?,
            Err(_) => catalog::find(rest)
                .map(|c| c.name.to_string())
                .unwrap_or_else(|| rest.to_string()),
        };
        self.season.set_challenge(&name)?;

        let used = self.season.challenge_usage(&name);
        let mut out = format!("Challenge: {name}");
        if used > 0 {
            out.push_str(&format!(" (warning: already played {used}x this season)"));
        }
        Ok(out)
    }

    fn do_toggle(&mut self, rest: &str, kind: Toggle) -> SeasonResult<String> {
        let id = self.resolve(rest)?;
        let on = match kind {
            Toggle::Leader => self.season.toggle_leader(id)?,
            Toggle::Veto => self.season.toggle_vetoed(id)?,
            Toggle::Immune => self.season.toggle_immune(id)?,
            Toggle::Eliminated => self.season.toggle_eliminated(id)?,
        };
        let label = kind.label();
        let name = self.name(id);
        Ok(if on {
            format!("{name}: {label}")
        } else {
            format!("{name}: no longer {label}")
        })
    }

    fn do_reason(&mut self, rest: &str) -> SeasonResult<String> {
        if rest.is_empty() {
            return Err(usage("reason <reason>"));
        }
        let reason = NominationReason::parse(rest);
        let form = self.season.form_mut()?;
        if !reason.requires_nominator() {
            form.nominated_by = None;
        }
        form.reason = reason;
        Ok(format!("Reason: {}", form.reason))
    }

    fn do_by(&mut self, rest: &str) -> SeasonResult<String> {
        let by = match rest {
            "" | "none" => None,
            name => Some(self.season.roster().find_id_by_name(name).ok_or_else(|| {
                pd_core::CoreError::UnknownName(name.to_string())
            })?),
        };
        self.season.form_mut()?.nominated_by = by;
        Ok(match by {
            Some(id) => format!("Nominated by: {}", self.name(id)),
            None => "Nominator cleared.".to_string(),
        })
    }

    fn do_votes(&mut self, rest: &str) -> SeasonResult<String> {
        let count = match rest {
            "" | "none" => None,
            n => Some(n.parse::<u32>().map_err(|_| usage("votes <count>|none"))?),
        };
        self.season.form_mut()?.vote_count = count;
        Ok(match count {
            Some(n) => format!("Votes: {n}"),
            None => "Votes cleared.".to_string(),
        })
    }

    fn do_flag(&mut self, flag: Flag) -> SeasonResult<String> {
        let form = self.season.form_mut()?;
        let (value, label) = match flag {
            Flag::Open => {
                form.is_open_vote = !form.is_open_vote;
                (form.is_open_vote, "open vote")
            }
            Flag::Reverse => {
                form.is_reverse_vote = !form.is_reverse_vote;
                (form.is_reverse_vote, "reverse vote")
            }
        };
        Ok(format!("{label}: {}", if value { "on" } else { "off" }))
    }

    fn do_nominate(&mut self, rest: &str) -> SeasonResult<String> {
        let id = self.resolve(rest)?;
        let previous = self.season.draft().form().selected;
        self.season.form_mut()?.selected = Some(id);
        if let Err(e) = self.season.nominate_selected() {
            self.season.form_mut()?.selected = previous;
            return Err(e);
        }
        let nominee = self
            .season
            .draft()
            .nominees()
            .last()
            .map(|n| n.reason.to_string())
            .unwrap_or_default();
        Ok(format!(
            "{} nominated ({nominee}). Next: {}",
            self.name(id),
            self.render_form()
        ))
    }

    fn do_unnominate(&mut self, rest: &str) -> SeasonResult<String> {
        let id = self.resolve(rest)?;
        self.season.remove_nominee(id)?;
        Ok(format!("{} is off the wall.", self.name(id)))
    }

    fn do_vote(&mut self, rest: &str) -> SeasonResult<String> {
        let (name, delta) = match rest.rsplit_once(' ') {
            Some((name, d)) if d.parse::<i64>().is_ok() => {
                (name.trim(), d.parse::<i64>().unwrap_or(1))
            }
            _ => (rest, 1),
        };
        let id = self.resolve(name)?;
        let count = self.season.update_other_vote(id, delta)?;
        Ok(format!("{}: {count} vote(s)", self.name(id)))
    }

    fn do_promote(&mut self, rest: &str, tiebreak: bool) -> SeasonResult<String> {
        let id = self.resolve(rest)?;
        self.season.promote_vote(id, tiebreak)?;
        Ok(format!(
            "{} goes to the wall by {}. Next: {}",
            self.name(id),
            if tiebreak { "tiebreak" } else { "house vote" },
            self.render_form()
        ))
    }

    // -----------------------------------------------------------------------
    // Collaborators
    // -----------------------------------------------------------------------

    fn do_announce(&mut self) -> SeasonResult<String> {
        let lines = announce::tally_lines(self.season.draft(), self.season.roster())?;
        let text = lines.join("\n");
        self.outbox.push(Outbound::Automate(AutomationRequest {
            action: AutomationAction::AnnounceVotes,
            lines,
            point: self.config.click_point,
        }));
        Ok(format!("Announcing:\n{text}"))
    }

    fn do_brief(&mut self) -> SeasonResult<String> {
        let name = self.season.draft().challenge_name();
        if name.is_empty() {
            return Err(SeasonError::InvalidChoice("no challenge selected".to_string()));
        }
        let challenge =
            catalog::find(name).ok_or_else(|| SeasonError::NoBriefing(name.to_string()))?;
        let lines = announce::briefing_lines(challenge)?;
        self.outbox.push(Outbound::Automate(AutomationRequest {
            action: AutomationAction::ExplainChallenge,
            lines,
            point: self.config.click_point,
        }));
        Ok(format!("Explaining {}.", challenge.name))
    }

    fn do_finale(&mut self) -> SeasonResult<String> {
        if self.season.phase() != SeasonPhase::Final {
            return Err(SeasonError::WrongPhase(self.season.phase()));
        }
        self.outbox
            .push(Outbound::Narrate(NarrativeRequest::from_season(&self.season)));
        Ok("Requesting the finale speech...".to_string())
    }

    fn do_point(&mut self, rest: &str) -> SeasonResult<String> {
        if rest.is_empty() {
            let p = self.config.click_point;
            return Ok(format!("Click point: {}, {}", p.x, p.y));
        }
        let coords: Vec<i32> = rest
            .split([' ', ','])
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|_| usage("point <x> <y>"))?;
        let [x, y] = coords[..] else {
            return Err(usage("point <x> <y>"));
        };
        self.set_click_point(ScreenPoint { x, y })?;
        Ok(format!("Click point set to {x}, {y}."))
    }

    fn set_click_point(&mut self, point: ScreenPoint) -> SeasonResult<()> {
        if let Some(store) = self.archive.as_mut() {
            store.save_click_point(point)?;
        }
        self.config.click_point = point;
        Ok(())
    }

    fn queue(&mut self, item: Outbound, message: &str) -> String {
        self.outbox.push(item);
        message.to_string()
    }

    fn reset(&mut self) {
        self.season.restart();
        self.suggestions.clear();
        self.muted = false;
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    fn refresh_suggestions(&mut self) {
        let ctx = SuggestionContext::from_season(&self.season, &self.config, Utc::now());
        let season = &self.season;
        self.suggestions = suggest::suggest(&ctx, |name| season.challenge_usage(name), &mut self.rng);
    }

    fn render_suggestions(&self) -> String {
        if self.suggestions.is_empty() {
            return "No challenge fits the current player count.".to_string();
        }
        let mut out = format!(
            "Suggestions for round {}:",
            self.season.current_round_number()
        );
        for (i, s) in self.suggestions.iter().enumerate() {
            out.push_str(&format!(
                "\n  {}. {} ({}, {}, {})",
                i + 1,
                s.challenge.name,
                s.challenge.kind_label(),
                s.challenge.player_range(),
                s.challenge.duration
            ));
            if s.usage > 0 {
                out.push_str(&format!(" [played {}x]", s.usage));
            }
        }
        out
    }

    fn render_form(&self) -> String {
        let form = self.season.draft().form();
        match form.nominated_by {
            Some(by) => format!("{} (by {})", form.reason, self.name(by)),
            None => form.reason.to_string(),
        }
    }

    fn render_draft(&self) -> String {
        let draft = self.season.draft();
        let challenge = match draft.challenge_name() {
            "" => "no challenge",
            name => name,
        };
        let mut out = format!(
            "Round {} ({challenge})",
            self.season.current_round_number()
        );
        let ids = |set: &std::collections::BTreeSet<ParticipantId>| {
            self.names(&set.iter().copied().collect::<Vec<_>>())
        };
        out.push_str(&format!("\nLeaders: {}", ids(draft.leader_ids())));
        out.push_str(&format!("\nVetoed: {}", ids(draft.vetoed_ids())));
        out.push_str(&format!("\nImmune: {}", ids(draft.immune_ids())));
        out.push_str("\nWall:");
        if draft.nominees().is_empty() {
            out.push_str(" -");
        }
        for n in draft.nominees() {
            out.push_str(&format!("\n  {} - {}", self.name(n.participant_id), n.reason));
            if let Some(by) = n.nominated_by {
                out.push_str(&format!(" by {}", self.name(by)));
            }
            if let Some(votes) = n.vote_count {
                out.push_str(&format!(", {votes} votes"));
            }
            if n.is_open_vote {
                out.push_str(", open");
            }
            if n.is_reverse_vote {
                out.push_str(", reverse");
            }
            if draft.eliminated_ids().contains(&n.participant_id) {
                out.push_str(" [OUT]");
            }
        }
        let others: Vec<String> = draft
            .other_votes()
            .iter()
            .map(|ov| format!("{} {}", self.name(ov.participant_id), ov.count))
            .collect();
        out.push_str(&format!(
            "\nOther votes: {}",
            if others.is_empty() { "-".to_string() } else { others.join(", ") }
        ));
        out.push_str(&format!("\nNext: {}", self.render_form()));
        out
    }

    fn render_history(&self) -> String {
        let rounds = self.season.rounds();
        if rounds.is_empty() {
            return "No rounds played yet.".to_string();
        }
        let mut out = String::new();
        for r in rounds.iter().rev() {
            let leaders: Vec<ParticipantId> = r.leader_ids.iter().copied().collect();
            let wall: Vec<ParticipantId> = r.nominees.iter().map(|n| n.participant_id).collect();
            let out_ids: Vec<ParticipantId> = r.eliminated_ids.iter().copied().collect();
            out.push_str(&format!(
                "Round {} - {}: leaders {}; wall {}; out {}\n",
                r.round_number,
                r.challenge_name,
                self.names(&leaders),
                self.names(&wall),
                self.names(&out_ids)
            ));
        }
        out.trim_end().to_string()
    }

    fn render_stats(&self) -> String {
        let board = stats::leaderboard(self.season.rounds(), self.season.roster());
        if board.is_empty() {
            return "No participants.".to_string();
        }
        let mut out = String::from("Name | Status | Leader | Wall | Veto | Votes | Survived");
        for s in board {
            out.push_str(&format!(
                "\n{} | {} | {} | {} | {} | {} | {}",
                s.name,
                s.status,
                s.leader_count,
                s.wall_count,
                s.veto_count,
                s.votes_received,
                s.survived
            ));
        }
        out
    }

    fn render_time(&self) -> String {
        let now = Utc::now();
        format!(
            "Elapsed: {} of {} min",
            self.season.format_elapsed(now),
            self.season.target_duration_minutes()
        )
    }

    fn render_status(&self) -> String {
        let s = &self.season;
        let mut out = format!("Phase: {}\n", s.phase());
        out.push_str(&format!(
            "Participants: {} active of {}\n",
            s.roster().active_count(),
            s.roster().len()
        ));
        out.push_str(&format!("Rounds played: {}", s.rounds().len()));
        if s.phase() == SeasonPhase::Playing {
            out.push_str(&format!("\nCurrent round: {}", s.current_round_number()));
        }
        if let Some(w) = s.roster().winner() {
            out.push_str(&format!("\nWinner: {}", w.name));
        }
        if self.muted {
            out.push_str("\nRoom: muted");
        }
        out
    }

    fn render_roster(&self) -> String {
        let roster = self.season.roster();
        if roster.is_empty() {
            return "Roster is empty.".to_string();
        }
        let mut out = format!("Roster ({}):", roster.len());
        for p in roster.participants() {
            out.push_str(&format!("\n  {} ({})", p.name, p.status));
        }
        out
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn resolve(&self, name: &str) -> SeasonResult<ParticipantId> {
        if name.is_empty() {
            return Err(SeasonError::InvalidChoice("name required".to_string()));
        }
        Ok(self.season.roster().resolve_active(name)?)
    }

    fn name(&self, id: ParticipantId) -> &str {
        self.season.roster().name_of(id)
    }

    fn names(&self, ids: &[ParticipantId]) -> String {
        if ids.is_empty() {
            return "-".to_string();
        }
        ids.iter()
            .map(|&id| self.name(id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Clone, Copy)]
enum Toggle {
    Leader,
    Veto,
    Immune,
    Eliminated,
}

impl Toggle {
    fn label(self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::Veto => "vetoed",
            Self::Immune => "immune",
            Self::Eliminated => "marked for elimination",
        }
    }
}

#[derive(Clone, Copy)]
enum Flag {
    Open,
    Reverse,
}

fn usage(text: &str) -> SeasonError {
    SeasonError::InvalidChoice(format!("usage: {text}"))
}

const HELP: &str = "\
Setup:
  add <name>[, <name>...]       Add participants
  drop <name>                   Remove a participant before the start
  known                         List archived names not on the roster
  start [minutes]               Start the season
Round:
  suggest                       Suggest challenges
  challenge <name|number>       Select the challenge
  leader|veto|immune <name>     Toggle a role
  reason <reason>               Set the nomination reason
  by <name>|none                Set who pulled the nominee
  votes <count>|none            Set the nominee's vote count
  open | reverse                Toggle vote flags
  nominate <name>               Put a participant on the wall
  unnominate <name>             Take a participant off the wall
  vote <name> [delta]           Tally an off-wall vote
  promote|tiebreak <name>       Move a tally to the wall
  eliminate <name>              Toggle elimination of a nominee
  round                         Show the round in progress
  commit                        Commit the round
Roster changes:
  join <name>                   Add a participant mid-game
  replace <name> with <new>     Swap a participant
  expel <name>                  Expel a participant
Room:
  announce                      Type the vote tally in the room
  brief                         Explain the selected challenge
  point [<x> <y>]               Show or set the click point
  capture                       Capture the click point from the mouse
  mute                          Toggle the room mute
Final:
  final                         Go to the final
  winner <name>                 Declare the winner
  finale                        Request the finale speech
  end                           Archive the season and start over
Info:
  history | stats | time | status | roster | avatar <name>
  restart | help | quit";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{JsonArchive, MemoryArchive};
    use crate::collab::{self, CollaboratorError};

    fn session() -> HostSession {
        HostSession::new(SeasonConfig::default())
    }

    fn playing(names: &str) -> HostSession {
        let mut s = session();
        s.process(&format!("add {names}")).unwrap();
        s.process("start").unwrap();
        s
    }

    #[test]
    fn empty_input_is_ignored() {
        assert_eq!(session().process("   ").unwrap(), "");
    }

    #[test]
    fn unknown_command() {
        assert!(matches!(
            session().process("dance"),
            Err(SeasonError::UnknownCommand(_))
        ));
    }

    #[test]
    fn bulk_add_reports_skipped() {
        let mut s = session();
        let out = s.process("add Ana, Bia, ana").unwrap();
        assert!(out.contains("Added 2"));
        assert!(out.contains("Skipped: ana"));
    }

    #[test]
    fn single_duplicate_rejected() {
        let mut s = session();
        s.process("add Ana").unwrap();
        assert!(s.process("add ANA").is_err());
    }

    #[test]
    fn start_needs_two() {
        let mut s = session();
        s.process("add Ana").unwrap();
        assert!(s.process("start").is_err());
        s.process("add Bia").unwrap();
        let out = s.process("start 90").unwrap();
        assert!(out.contains("target 90 min"));
    }

    #[test]
    fn ceremony_flow() {
        let mut s = playing("Ana, Bia, Caio, Duda, Enzo");
        s.process("challenge banzai").unwrap();
        s.process("leader Ana").unwrap();
        let out = s.process("nominate Bia").unwrap();
        assert!(out.contains("Next: Counter-nomination (by Bia)"));
        let out = s.process("nominate Caio").unwrap();
        assert!(out.contains("Next: House Vote"));
        s.process("vote Duda 3").unwrap();
        s.process("vote Enzo").unwrap();
        let out = s.process("promote Duda").unwrap();
        assert!(out.contains("Next: Random Draw"));

        let nominees = s.season().draft().nominees();
        assert_eq!(nominees.len(), 3);
        assert_eq!(nominees[1].nominated_by, s.season().roster().find_id_by_name("Bia"));
        assert_eq!(nominees[2].vote_count, Some(3));

        s.process("eliminate Duda").unwrap();
        let out = s.process("commit").unwrap();
        assert!(out.contains("Round 1 committed. Eliminated: Duda."));
        assert_eq!(s.season().current_round_number(), 2);
    }

    #[test]
    fn failed_nomination_keeps_state() {
        let mut s = playing("Ana, Bia, Caio");
        s.process("nominate Ana").unwrap();
        let form = s.season().draft().form().clone();
        assert!(s.process("nominate Ana").is_err());
        assert_eq!(s.season().draft().form(), &form);
        assert_eq!(s.season().draft().nominees().len(), 1);
    }

    #[test]
    fn reason_override_clears_nominator() {
        let mut s = playing("Ana, Bia, Caio");
        s.process("nominate Ana").unwrap();
        s.process("reason big phone").unwrap();
        let form = s.season().draft().form();
        assert_eq!(form.reason, NominationReason::DirectLine);
        assert!(form.nominated_by.is_none());
    }

    #[test]
    fn challenge_reuse_warns() {
        let mut s = playing("Ana, Bia, Caio");
        s.process("challenge Banzai").unwrap();
        s.process("nominate Ana").unwrap();
        s.process("eliminate Ana").unwrap();
        s.process("commit").unwrap();
        let out = s.process("challenge banzai").unwrap();
        assert!(out.contains("already played 1x"));
    }

    #[test]
    fn commit_hints_final_stretch() {
        let mut s = playing("Ana, Bia, Caio, Duda");
        s.process("challenge Banzai").unwrap();
        s.process("nominate Ana").unwrap();
        s.process("eliminate Ana").unwrap();
        let out = s.process("commit").unwrap();
        assert!(out.contains("Only 3 left"));
    }

    #[test]
    fn announce_queues_automation() {
        let mut s = playing("Ana, Bia, Caio");
        assert!(s.process("announce").is_err());
        s.process("vote Ana 2").unwrap();
        s.process("vote Bia").unwrap();
        let out = s.process("announce").unwrap();
        assert!(out.contains("Bia: 1 voto\nAna: 2 votos"));
        let queued = s.take_outbound();
        assert_eq!(queued.len(), 1);
        assert!(matches!(
            &queued[0],
            Outbound::Automate(r) if r.action == AutomationAction::AnnounceVotes
        ));
        assert!(s.take_outbound().is_empty());
    }

    #[test]
    fn mute_flips_only_when_confirmed() {
        let mut s = playing("Ana, Bia");
        s.process("mute").unwrap();
        assert_eq!(s.take_outbound(), [Outbound::ToggleMute]);

        let failed = Delivery::Fallback {
            reason: CollaboratorError::Unavailable("server down".into()),
            text: collab::MANUAL_MUTE.to_string(),
        };
        let shown = s.complete(Completion::MuteToggled(failed)).unwrap();
        assert!(!shown.is_delivered());
        assert!(!s.is_muted());

        let ok = Delivery::Delivered("Room mute toggled.".into());
        let shown = s.complete(Completion::MuteToggled(ok)).unwrap();
        assert_eq!(shown.text(), "Room muted.");
        assert!(s.is_muted());
        assert!(s.process("status").unwrap().contains("Room: muted"));

        s.process("restart").unwrap();
        assert!(!s.is_muted());
    }

    #[test]
    fn captured_point_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session()
            .with_archive(Box::new(JsonArchive::new(dir.path())))
            .unwrap();
        s.process("capture").unwrap();
        assert_eq!(s.take_outbound(), [Outbound::CapturePoint]);

        let point = ScreenPoint { x: 812, y: 604 };
        let shown = s.complete(Completion::PointCaptured(Ok(point))).unwrap();
        assert_eq!(shown.text(), "Click point set to 812, 604.");
        assert_eq!(s.config().click_point, point);

        let reopened = session()
            .with_archive(Box::new(JsonArchive::new(dir.path())))
            .unwrap();
        assert_eq!(reopened.config().click_point, point);
    }

    #[test]
    fn failed_capture_keeps_point() {
        let mut s = session();
        let before = s.config().click_point;
        let fallback = Delivery::Fallback {
            reason: CollaboratorError::Failed("no mouse".into()),
            text: collab::MANUAL_POINT.to_string(),
        };
        let shown = s.complete(Completion::PointCaptured(Err(fallback))).unwrap();
        assert_eq!(shown.text(), collab::MANUAL_POINT);
        assert_eq!(s.config().click_point, before);
    }

    #[test]
    fn brief_needs_text() {
        let mut s = playing("Ana, Bia, Caio");
        assert!(s.process("brief").is_err());
        s.process("challenge Queimada").unwrap();
        assert!(matches!(s.process("brief"), Err(SeasonError::NoBriefing(_))));
        s.process("challenge Banzai").unwrap();
        s.process("brief").unwrap();
        assert_eq!(s.take_outbound().len(), 1);
    }

    #[test]
    fn replace_and_expel() {
        let mut s = playing("Ana, Bia, Caio");
        let out = s.process("replace Ana with Zeca").unwrap();
        assert_eq!(out, "Ana replaced by Zeca.");
        assert!(s.process("replace Bia with zeca").is_err());
        s.process("expel Bia").unwrap();
        assert_eq!(s.season().roster().active_count(), 2);
        assert!(s.season().rounds().is_empty());
    }

    #[test]
    fn final_winner_and_archive() {
        let store = MemoryArchive::new();
        let mut s = session().with_archive(Box::new(store)).unwrap();
        s.process("add Ana, Bia").unwrap();
        s.process("start").unwrap();
        assert!(s.process("winner Ana").is_err());
        s.process("final").unwrap();
        s.process("finale").unwrap();
        assert!(matches!(&s.take_outbound()[..], [Outbound::Narrate(_)]));
        s.process("winner Ana").unwrap();
        assert!(s.process("winner Bia").is_err());
        let out = s.process("end").unwrap();
        assert!(out.contains("1 in archive"));
        assert_eq!(s.season().phase(), SeasonPhase::Setup);
        assert_eq!(s.process("known").unwrap(), "Known names: Ana, Bia");
    }

    #[test]
    fn click_point_persists_in_archive() {
        let mut s = session().with_archive(Box::new(MemoryArchive::new())).unwrap();
        s.process("point 120 340").unwrap();
        assert_eq!(s.config().click_point, ScreenPoint { x: 120, y: 340 });
        assert!(s.process("point 1").is_err());
        assert_eq!(s.process("point").unwrap(), "Click point: 120, 340");
    }

    #[test]
    fn draft_rendering() {
        let mut s = playing("Ana, Bia, Caio");
        s.process("challenge Banzai").unwrap();
        s.process("leader Caio").unwrap();
        s.process("nominate Ana").unwrap();
        s.process("eliminate Ana").unwrap();
        let out = s.process("round").unwrap();
        assert!(out.starts_with("Round 1 (Banzai)"));
        assert!(out.contains("Leaders: Caio"));
        assert!(out.contains("Ana - Leader's Choice [OUT]"));
        assert!(out.contains("Next: Counter-nomination (by Ana)"));
    }

    #[test]
    fn stats_table() {
        let mut s = playing("Ana, Bia, Caio");
        s.process("challenge Banzai").unwrap();
        s.process("leader Caio").unwrap();
        s.process("nominate Ana").unwrap();
        s.process("eliminate Ana").unwrap();
        s.process("commit").unwrap();
        let out = s.process("stats").unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "Caio | active | 1 | 0 | 0 | 0 | 0");
        assert_eq!(lines[3], "Ana | eliminated | 0 | 1 | 0 | 0 | 0");
    }

    #[test]
    fn time_before_start() {
        assert!(session().process("time").unwrap().starts_with("Elapsed: 00:00:00"));
    }
}
