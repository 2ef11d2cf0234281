//! External collaborators: the narrator that writes the finale speech and the
//! room automation that types announcements, mutes the room, and captures
//! the chat click point.
//!
//! Both are injected behind traits. Calls are bounded by a timeout and any
//! failure degrades to a [`Delivery::Fallback`] carrying text the host can
//! act on by hand. Nothing here touches season state: results come back as a
//! [`Completion`] for the host session to apply.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use pd_core::{Participant, RoundLog};

use crate::config::ScreenPoint;
use crate::season::SeasonState;

/// What the automation is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationAction {
    /// Type the vote tally.
    AnnounceVotes,
    /// Type the rules of the selected challenge.
    ExplainChallenge,
    /// Flip the room's mute.
    ToggleMute,
    /// Read the current mouse position as the new click point.
    CapturePoint,
}

impl AutomationAction {
    /// Command name handed to automation backends.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnnounceVotes => "announce-votes",
            Self::ExplainChallenge => "explain-challenge",
            Self::ToggleMute => "toggle-mute",
            Self::CapturePoint => "capture-position",
        }
    }
}

/// Lines to type and where to click first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationRequest {
    /// Kind of announcement.
    pub action: AutomationAction,
    /// Lines typed in order.
    pub lines: Vec<String>,
    /// Screen point clicked before typing.
    pub point: ScreenPoint,
}

impl AutomationRequest {
    /// The lines as one block for manual copy.
    pub fn manual_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Input for the finale speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeRequest {
    /// Participants still in the game.
    pub finalists: Vec<Participant>,
    /// Every committed round.
    pub history: Vec<RoundLog>,
    /// Everyone who took part, for name lookups.
    pub participants: Vec<Participant>,
}

impl NarrativeRequest {
    /// Snapshot a season for the narrator.
    pub fn from_season(season: &SeasonState) -> Self {
        Self {
            finalists: season.finalists().into_iter().cloned().collect(),
            history: season.rounds().to_vec(),
            participants: season.roster().participants().to_vec(),
        }
    }

    fn name(&self, id: pd_core::ParticipantId) -> &str {
        self.participants
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
            .unwrap_or("?")
    }

    fn names<'a>(&self, ids: impl IntoIterator<Item = &'a pd_core::ParticipantId>) -> String {
        let names: Vec<&str> = ids.into_iter().map(|id| self.name(*id)).collect();
        if names.is_empty() {
            "Ninguém".to_string()
        } else {
            names.join(", ")
        }
    }

    /// Round-by-round account of the season.
    pub fn context(&self) -> String {
        self.history
            .iter()
            .map(|round| {
                let nominees: Vec<String> = round
                    .nominees
                    .iter()
                    .map(|n| {
                        let mut details = format!("Motivo: {}", n.reason);
                        if let Some(by) = n.nominated_by {
                            details.push_str(&format!(" (puxado por {})", self.name(by)));
                        }
                        if let Some(votes) = n.vote_count {
                            details.push_str(&format!(", {votes} votos"));
                        }
                        if n.is_open_vote {
                            details.push_str(" (voto aberto)");
                        }
                        if n.is_reverse_vote {
                            details.push_str(" (voto reverso, para salvar)");
                        }
                        format!("{} [{details}]", self.name(n.participant_id))
                    })
                    .collect();
                let others = if round.other_votes.is_empty() {
                    "Nenhum".to_string()
                } else {
                    round
                        .other_votes
                        .iter()
                        .map(|ov| format!("{} ({} votos)", self.name(ov.participant_id), ov.count))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                format!(
                    "Semana {}:\n- Prova: {}\n- Líderes: {}\n- Vetados: {}\n- Paredão: {}\n- Outros votos: {}\n- Eliminados: {}",
                    round.round_number,
                    round.challenge_name,
                    self.names(&round.leader_ids),
                    self.names(&round.vetoed_ids),
                    nominees.join(", "),
                    others,
                    self.names(&round.eliminated_ids),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The full instruction handed to the narrator.
    pub fn prompt(&self) -> String {
        let finalists: Vec<&str> = self.finalists.iter().map(|p| p.name.as_str()).collect();
        format!(
            "Você é o apresentador de um reality show no estilo Big Brother. \
             Chegamos à final e os finalistas são: {}.\n\n\
             Histórico da temporada:\n{}\n\n\
             Escreva um discurso dramático para anunciar o vencedor. Cite quem \
             escapou do paredão por poucos votos, quem puxou quem no contragolpe \
             e quem foi muitas vezes líder ou emparedado. Guarde o nome do \
             vencedor para a última linha.",
            finalists.join(" e "),
            self.context()
        )
    }
}

/// Why a collaborator could not deliver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// The collaborator is not configured or not reachable.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    /// No answer within the timeout.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    /// The collaborator answered with a failure.
    #[error("collaborator failed: {0}")]
    Failed(String),
}

/// Writes the finale speech.
pub trait Narrator {
    /// Produce narrative text. The text is opaque to the engine.
    fn narrate(
        &self,
        request: &NarrativeRequest,
    ) -> impl Future<Output = Result<String, CollaboratorError>> + Send;
}

/// Drives the game room.
pub trait Automation {
    /// Type the request's lines.
    fn perform(
        &self,
        request: &AutomationRequest,
    ) -> impl Future<Output = Result<(), CollaboratorError>> + Send;

    /// Flip the room's mute.
    fn toggle_mute(&self) -> impl Future<Output = Result<(), CollaboratorError>> + Send;

    /// Report where the mouse is now, to be used as the click point.
    fn capture_point(&self) -> impl Future<Output = Result<ScreenPoint, CollaboratorError>> + Send;
}

/// Outcome of a collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The collaborator did its job; carries text worth showing.
    Delivered(String),
    /// The collaborator failed; the host gets the text to handle manually.
    Fallback {
        /// What went wrong.
        reason: CollaboratorError,
        /// Text for manual copy.
        text: String,
    },
}

impl Delivery {
    /// Whether the collaborator succeeded.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }

    /// The text to show the host either way.
    pub fn text(&self) -> &str {
        match self {
            Self::Delivered(text) | Self::Fallback { text, .. } => text,
        }
    }
}

/// Ask the narrator for a speech, falling back to the prompt on failure.
pub async fn narrate_with_fallback<N: Narrator + ?Sized>(
    narrator: &N,
    request: &NarrativeRequest,
    timeout: Duration,
) -> Delivery {
    match bounded(timeout, narrator.narrate(request)).await {
        Ok(speech) => {
            info!(chars = speech.len(), "narrative delivered");
            Delivery::Delivered(speech)
        }
        Err(reason) => {
            warn!(%reason, "narrator failed, falling back to prompt");
            Delivery::Fallback {
                reason,
                text: request.prompt(),
            }
        }
    }
}

/// Run an automation request, falling back to the lines for manual typing.
pub async fn automate_with_fallback<A: Automation + ?Sized>(
    automation: &A,
    request: &AutomationRequest,
    timeout: Duration,
) -> Delivery {
    match bounded(timeout, automation.perform(request)).await {
        Ok(()) => {
            info!(action = ?request.action, lines = request.lines.len(), "automation delivered");
            Delivery::Delivered(request.manual_text())
        }
        Err(reason) => {
            warn!(%reason, action = ?request.action, "automation failed, falling back to manual copy");
            Delivery::Fallback {
                reason,
                text: request.manual_text(),
            }
        }
    }
}

/// Text shown when the room has to be muted by hand.
pub const MANUAL_MUTE: &str = "Toggle the room mute by hand.";
/// Text shown when the click point has to be set by hand.
pub const MANUAL_POINT: &str = "Set the click point by hand with: point <x> <y>";

async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, CollaboratorError>>,
) -> Result<T, CollaboratorError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::TimedOut(timeout)),
    }
}

/// Flip the room mute, falling back to a manual instruction on failure.
pub async fn toggle_mute_with_fallback<A: Automation + ?Sized>(
    automation: &A,
    timeout: Duration,
) -> Delivery {
    match bounded(timeout, automation.toggle_mute()).await {
        Ok(()) => {
            info!("room mute toggled");
            Delivery::Delivered("Room mute toggled.".to_string())
        }
        Err(reason) => {
            warn!(%reason, "mute toggle failed");
            Delivery::Fallback {
                reason,
                text: MANUAL_MUTE.to_string(),
            }
        }
    }
}

/// Capture the click point. A failure yields the fallback to show instead.
pub async fn capture_with_fallback<A: Automation + ?Sized>(
    automation: &A,
    timeout: Duration,
) -> Result<ScreenPoint, Delivery> {
    match bounded(timeout, automation.capture_point()).await {
        Ok(point) => {
            info!(x = point.x, y = point.y, "click point captured");
            Ok(point)
        }
        Err(reason) => {
            warn!(%reason, "click point capture failed");
            Err(Delivery::Fallback {
                reason,
                text: MANUAL_POINT.to_string(),
            })
        }
    }
}

/// A collaborator call queued by the host session for the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Ask for the finale speech.
    Narrate(NarrativeRequest),
    /// Type lines into the room.
    Automate(AutomationRequest),
    /// Flip the room mute.
    ToggleMute,
    /// Capture the click point.
    CapturePoint,
}

impl Outbound {
    /// Short label for progress output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Narrate(_) => "finale speech",
            Self::Automate(_) => "room automation",
            Self::ToggleMute => "room mute",
            Self::CapturePoint => "click point capture",
        }
    }
}

/// Result of a finished [`Outbound`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The finale speech, or the prompt to paste by hand.
    Narrated(Delivery),
    /// Lines typed, or the lines to type by hand.
    Automated(Delivery),
    /// Mute flipped, or the instruction to do it by hand.
    MuteToggled(Delivery),
    /// The captured point, or the instruction to set it by hand.
    PointCaptured(Result<ScreenPoint, Delivery>),
}

/// Run a queued call against the collaborators.
pub async fn run_outbound<N, A>(
    item: Outbound,
    narrator: &N,
    automation: &A,
    timeout: Duration,
) -> Completion
where
    N: Narrator + ?Sized,
    A: Automation + ?Sized,
{
    match item {
        Outbound::Narrate(request) => {
            Completion::Narrated(narrate_with_fallback(narrator, &request, timeout).await)
        }
        Outbound::Automate(request) => {
            Completion::Automated(automate_with_fallback(automation, &request, timeout).await)
        }
        Outbound::ToggleMute => {
            Completion::MuteToggled(toggle_mute_with_fallback(automation, timeout).await)
        }
        Outbound::CapturePoint => {
            Completion::PointCaptured(capture_with_fallback(automation, timeout).await)
        }
    }
}
