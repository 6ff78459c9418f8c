use std::fs;
use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use montage_core::{ActorId, Characteristic, Hero, MontageError};
use montage_engine::Roster;

use super::{load_roster, roster_path};

pub fn add(data: &Path, world: &str, id: &str, name: &str, stats: &[String]) -> Result<(), String> {
    let mut roster = load_roster(data, world)?;
    roster.upsert_hero(Hero::new(id, name));
    for raw in stats {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
        let characteristic: Characteristic =
            key.parse().map_err(|e: MontageError| e.to_string())?;
        let value: i32 = value
            .trim()
            .parse()
            .map_err(|_| format!("invalid score in '{raw}'"))?;
        roster.set_characteristic(ActorId::from(id), characteristic, value);
    }

    fs::create_dir_all(data).map_err(|e| format!("cannot create {}: {e}", data.display()))?;
    let json = serde_json::to_string_pretty(&roster).map_err(|e| e.to_string())?;
    fs::write(roster_path(data, world), json).map_err(|e| format!("cannot save roster: {e}"))?;
    println!("  {} {name} ({id})", "Saved".green().bold());
    Ok(())
}

pub fn list(data: &Path, world: &str) -> Result<(), String> {
    let roster = load_roster(data, world)?;
    let heroes = roster.heroes();
    if heroes.is_empty() {
        println!("  No heroes.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec!["ID".to_string(), "Name".to_string()];
    header.extend(Characteristic::all().iter().map(|c| c.to_string()));
    table.set_header(header);
    for hero in &heroes {
        let mut row = vec![hero.actor_id.to_string(), hero.name.clone()];
        row.extend(
            Characteristic::all()
                .iter()
                .map(|&c| format!("{:+}", roster.characteristic(&hero.actor_id, c))),
        );
        table.add_row(row);
    }
    println!("{table}");
    Ok(())
}
