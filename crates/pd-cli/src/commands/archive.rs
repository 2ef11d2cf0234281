use std::fs;
use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use pd_season::archive::{self, ArchiveStore, JsonArchive, SeasonSummary};

fn load(dir: &Path) -> Result<Vec<SeasonSummary>, String> {
    JsonArchive::new(dir)
        .load_seasons()
        .map_err(|e| format!("failed to read archive: {e}"))
}

pub fn seasons(dir: &Path) -> Result<(), String> {
    let seasons = load(dir)?;
    if seasons.is_empty() {
        println!("  No archived seasons.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Date", "Winner", "Finalists", "Rounds", "Players"]);

    for s in &seasons {
        table.add_row(vec![
            s.season_id.to_string(),
            s.date.format("%Y-%m-%d %H:%M").to_string(),
            s.winner.clone().unwrap_or_else(|| super::EMPTY.to_string()),
            s.finalists.join(", "),
            s.total_rounds.to_string(),
            s.players.len().to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} seasons", seasons.len());
    Ok(())
}

pub fn stats(dir: &Path, season: Option<i64>) -> Result<(), String> {
    let seasons = load(dir)?;
    let summary = match season {
        Some(id) => seasons
            .iter()
            .find(|s| s.season_id == id)
            .ok_or_else(|| format!("no archived season with ID {id}"))?,
        None => seasons.last().ok_or("no archived seasons")?,
    };
    let board = summary.recompute_stats().map_err(|e| e.to_string())?;

    println!(
        "  {} season {} ({} rounds)",
        "Stats for".bold(),
        summary.season_id,
        summary.total_rounds
    );

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Name", "Status", "Leader", "Wall", "Veto", "Votes", "Survived",
    ]);
    for s in &board {
        table.add_row(vec![
            s.name.clone(),
            s.status.to_string(),
            s.leader_count.to_string(),
            s.wall_count.to_string(),
            s.veto_count.to_string(),
            s.votes_received.to_string(),
            s.survived.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn export(dir: &Path, output: Option<&Path>) -> Result<(), String> {
    let seasons = load(dir)?;
    let json = archive::export_json(&seasons).map_err(|e| e.to_string())?;

    match output {
        Some(path) => {
            fs::write(path, &json).map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            println!("  Exported {} seasons to {}", seasons.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn known(dir: &Path) -> Result<(), String> {
    let names = JsonArchive::new(dir)
        .load_known_names()
        .map_err(|e| format!("failed to read archive: {e}"))?;
    if names.is_empty() {
        println!("  No known names.");
    } else {
        for name in &names {
            println!("{name}");
        }
    }
    Ok(())
}
