use std::collections::HashMap;

use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;

use pd_season::suggest::{self, SuggestionContext};

pub fn run(players: u32, elapsed: f64, target: u32, used: &[String], seed: u64) -> Result<(), String> {
    let ctx = SuggestionContext {
        active_count: players,
        elapsed_minutes: elapsed,
        target_minutes: f64::from(target),
        time_pressure_minutes: pd_season::SeasonConfig::default().time_pressure_minutes,
    };
    let mut played: HashMap<String, usize> = HashMap::new();
    for name in used {
        *played.entry(name.trim().to_lowercase()).or_default() += 1;
    }
    let usage = |name: &str| played.get(&name.to_lowercase()).copied().unwrap_or(0);
    let picks = suggest::suggest(&ctx, usage, &mut StdRng::seed_from_u64(seed));

    if picks.is_empty() {
        return Err(format!("no challenge fits {players} players"));
    }

    println!("  {} for {players} players", "Suggestions".bold());
    if ctx.under_pressure() {
        println!("  {}", "Short on time: favouring quick challenges.".yellow());
    }
    for (i, s) in picks.iter().enumerate() {
        let mut line = format!(
            "  {}. {} ({}, {}, {})",
            i + 1,
            s.challenge.name,
            s.challenge.kind_label(),
            s.challenge.player_range(),
            super::or_empty(s.challenge.duration)
        );
        if s.usage > 0 {
            line.push_str(&format!(" [played {}x]", s.usage));
        }
        println!("{line}");
    }
    Ok(())
}
