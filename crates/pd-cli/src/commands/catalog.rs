use comfy_table::{ContentArrangement, Table};

use pd_core::catalog;

pub fn run(players: Option<u32>) -> Result<(), String> {
    let entries: Vec<_> = catalog::catalog()
        .iter()
        .filter(|c| players.is_none_or(|n| c.fits(n)))
        .collect();

    if entries.is_empty() {
        println!("  No challenges fit.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Category", "Players", "Duration", "Notes"]);

    for c in &entries {
        table.add_row(vec![
            c.name.to_string(),
            c.kind_label(),
            c.player_range(),
            super::or_empty(c.duration).to_string(),
            super::or_empty(c.notes).to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} challenges", entries.len());

    Ok(())
}
