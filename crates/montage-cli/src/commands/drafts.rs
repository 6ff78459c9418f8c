use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use montage_engine::Ack;

use super::{Session, TestArgs, match_prefix};

pub fn list(session: &Session) -> Result<(), String> {
    let drafts = session.engine().drafts().map_err(|e| e.to_string())?;
    if drafts.is_empty() {
        println!("  No drafts.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "Difficulty", "Heroes", "Limits", "Rounds"]);
    for draft in &drafts {
        table.add_row(vec![
            draft.id.to_string(),
            draft.name.clone(),
            draft.difficulty.to_string(),
            draft.heroes.len().to_string(),
            format!("{}/{}", draft.success_limit, draft.failure_limit),
            draft.max_rounds.to_string(),
        ]);
    }
    println!("{table}");
    println!();
    println!("  {} drafts", drafts.len());
    Ok(())
}

pub fn save(session: &mut Session, args: &TestArgs) -> Result<(), String> {
    if !session.caller().is_director() {
        return Err("only the Director can save drafts".into());
    }
    let options = args.to_options()?;
    let id = session
        .engine_mut()
        .save_draft(options)
        .map_err(|e| e.to_string())?;
    println!("  {} draft {id}", "Saved".green().bold());
    Ok(())
}

pub fn delete(session: &mut Session, prefix: &str) -> Result<(), String> {
    if !session.caller().is_director() {
        return Err("only the Director can delete drafts".into());
    }
    let drafts = session.engine().drafts().map_err(|e| e.to_string())?;
    let id = match_prefix(
        prefix,
        drafts.iter().map(|d| (d.id, d.id.0.to_string())),
        "draft",
    )?;
    match session
        .engine_mut()
        .delete_draft(id)
        .map_err(|e| e.to_string())?
    {
        Ack::Applied => println!("  {} draft {id}", "Deleted".green().bold()),
        _ => println!("  {}", "Nothing changed.".dimmed()),
    }
    Ok(())
}
