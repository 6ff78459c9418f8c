use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use montage_core::{MontageTest, TestStatus};
use montage_engine::ActionResult;

use super::Session;

pub fn run(session: &Session) -> Result<(), String> {
    let Some(test) = session.engine().snapshot().map_err(|e| e.to_string())? else {
        println!("  No montage test. Create one with `montage new`.");
        return Ok(());
    };

    print_header(&test);
    print_round(&test);

    if !test.pending_actions.is_empty() {
        println!();
        println!("  {}", "Awaiting approval".bold());
        for pending in &test.pending_actions {
            let by = pending
                .submitted_by
                .as_deref()
                .map(|u| format!(" (by {u})"))
                .unwrap_or_default();
            let what = match pending.description.as_str() {
                "" => "-",
                text => text,
            };
            println!(
                "    {} {}: {what}{by}",
                test.hero_name(&pending.actor_id),
                pending.action_type
            );
        }
    }

    if !test.complications.is_empty() {
        println!();
        println!("  {}", "Complications".bold());
        for c in &test.complications {
            let state = if c.resolved {
                "resolved".dimmed()
            } else if c.is_active_in(test.current_round) {
                "in play".red()
            } else {
                format!("from round {}", c.trigger_round).normal()
            };
            println!("    [{}] {} ({state})", c.id, c.description);
        }
    }
    Ok(())
}

fn print_header(test: &MontageTest) {
    let status = match test.status {
        TestStatus::Setup => "setup".yellow(),
        TestStatus::Active => "active".green(),
        TestStatus::Resolved => "resolved".blue(),
    };
    println!("  {} [{status}] {}", test.name.bold(), test.difficulty);
    let round = if test.current_round > test.max_rounds {
        "time is up".to_string()
    } else {
        format!("{} of {}", test.current_round, test.max_rounds)
    };
    println!("  Round: {round}");
    println!(
        "  Successes: {}/{}  Failures: {}/{}",
        test.current_successes, test.success_limit, test.current_failures, test.failure_limit
    );
    if let Some(outcome) = test.outcome {
        println!(
            "  Outcome: {} ({} victories)",
            outcome.to_string().bold(),
            test.victories
        );
    }
}

fn print_round(test: &MontageTest) {
    if test.heroes.is_empty() {
        return;
    }
    let round = test.current_round();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Hero", "ID", "Action", "Roll", "Result"]);
    for hero in &test.heroes {
        let action = round.and_then(|r| r.action_for(&hero.actor_id));
        let (kind, roll, result) = match action {
            Some(a) => (
                a.action_type.to_string(),
                a.roll_total.map_or_else(|| "-".to_string(), |t| t.to_string()),
                ActionResult::of(a).to_string(),
            ),
            None if test.pending_for(&hero.actor_id).is_some() => {
                ("-".into(), "-".into(), "awaiting approval".into())
            }
            None => ("-".into(), "-".into(), "waiting".into()),
        };
        table.add_row(vec![
            hero.name.clone(),
            hero.actor_id.to_string(),
            kind,
            roll,
            result,
        ]);
    }
    println!();
    println!("{table}");
}
