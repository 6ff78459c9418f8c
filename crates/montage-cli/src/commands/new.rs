use colored::Colorize;
use montage_core::limits_summary;
use montage_engine::{Ack, Request};

use super::{Session, TestArgs};

pub fn run(session: &mut Session, args: &TestArgs) -> Result<(), String> {
    let options = args.to_options()?;
    if session.send(Request::Create(options))? != Ack::Applied {
        return Ok(());
    }
    if let Some(test) = session.engine().snapshot().map_err(|e| e.to_string())? {
        println!(
            "  {} {} ({})",
            "Created".green().bold(),
            test.name.bold(),
            test.id
        );
        println!("  {}", limits_summary(test.difficulty, test.hero_count));
        if test.heroes.is_empty() {
            println!(
                "  {}",
                "No heroes yet: add them with --hero id:Name or `montage hero add`.".yellow()
            );
        }
    }
    Ok(())
}
