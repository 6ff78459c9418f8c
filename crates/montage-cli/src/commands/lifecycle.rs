use colored::Colorize;
use montage_engine::{Ack, Request};

use super::Session;

pub fn archive(session: &mut Session) -> Result<(), String> {
    if session.send(Request::Archive)? == Ack::Applied {
        println!("  {} the finished test", "Archived".green().bold());
    }
    Ok(())
}

pub fn abandon(session: &mut Session) -> Result<(), String> {
    if session.send(Request::Abandon)? == Ack::Applied {
        println!("  {} the current test", "Abandoned".yellow().bold());
    }
    Ok(())
}
