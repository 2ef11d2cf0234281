use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::debug;

use pd_season::archive::JsonArchive;
use pd_season::collab::{self, Completion, Delivery};
use pd_season::{HostSession, SeasonConfig};

use super::collaborators::{ProgramAutomation, ProgramNarrator};

pub struct PlayOptions {
    pub target: u32,
    pub seed: u64,
    pub final_threshold: usize,
    pub timeout: u64,
    pub narrator: Option<String>,
    pub automation: Option<String>,
    pub archive: PathBuf,
}

/// A collaborator call running in the background.
struct Pending {
    label: &'static str,
    handle: JoinHandle<Completion>,
}

pub fn run(opts: PlayOptions) -> Result<(), String> {
    let config = SeasonConfig::default()
        .with_seed(opts.seed)
        .with_target_minutes(opts.target)
        .with_final_threshold(opts.final_threshold)
        .with_timeout(Duration::from_secs(opts.timeout));
    let timeout = config.collaborator_timeout;

    let mut session = HostSession::new(config)
        .with_archive(Box::new(JsonArchive::new(&opts.archive)))
        .map_err(|e| format!("failed to open archive: {e}"))?;
    let runtime = Runtime::new().map_err(|e| e.to_string())?;
    let narrator = Arc::new(ProgramNarrator::new(opts.narrator));
    let automation = Arc::new(ProgramAutomation::new(opts.automation));
    let mut pending: Vec<Pending> = Vec::new();

    println!("  {} Paredao host panel", "Starting".bold());
    println!(
        "  Target: {} min | Seed: {} | Archive: {}",
        session.config().target_duration_minutes,
        opts.seed,
        opts.archive.display()
    );
    println!("  Type 'help' for commands, 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        report_finished(&runtime, &mut session, &mut pending);

        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match session.process(input) {
            Ok(output) => {
                if !output.is_empty() {
                    println!("{output}\n");
                }
                if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
                    break;
                }
            }
            Err(e) => {
                println!("{}\n", e.to_string().yellow());
            }
        }

        for item in session.take_outbound() {
            let narrator = Arc::clone(&narrator);
            let automation = Arc::clone(&automation);
            let label = item.label();
            let handle = runtime.spawn(async move {
                collab::run_outbound(item, &*narrator, &*automation, timeout).await
            });
            debug!(label, pending = pending.len() + 1, "collaborator call queued");
            pending.push(Pending { label, handle });
        }
    }

    // Let outstanding calls finish so their text is not lost.
    for p in pending.drain(..) {
        let result = runtime.block_on(p.handle);
        print_delivery(p.label, apply(&mut session, result));
    }
    Ok(())
}

fn report_finished(runtime: &Runtime, session: &mut HostSession, pending: &mut Vec<Pending>) {
    let (done, still_running): (Vec<_>, Vec<_>) =
        pending.drain(..).partition(|p| p.handle.is_finished());
    *pending = still_running;
    for p in done {
        let result = runtime.block_on(p.handle);
        print_delivery(p.label, apply(session, result));
    }
}

/// Hand a finished call back to the session so mute and click point stick.
fn apply(
    session: &mut HostSession,
    result: Result<Completion, tokio::task::JoinError>,
) -> Result<Delivery, String> {
    let completion = result.map_err(|e| format!("task failed: {e}"))?;
    session.complete(completion).map_err(|e| e.to_string())
}

fn print_delivery(label: &str, result: Result<Delivery, String>) {
    match result {
        Ok(Delivery::Delivered(text)) => {
            println!("{} {label}\n{text}\n", "Done:".green().bold());
        }
        Ok(Delivery::Fallback { reason, text }) => {
            println!(
                "{} {label} unavailable ({reason}). Copy manually:\n{text}\n",
                "Fallback:".yellow().bold()
            );
        }
        Err(e) => {
            println!("{} {label}: {e}\n", "Error:".red().bold());
        }
    }
}
