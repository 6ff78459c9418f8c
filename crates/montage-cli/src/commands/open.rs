use montage_engine::{View, parse_slash_command, view_for};

use super::Session;

pub fn run(session: &Session, message: &str) -> Result<(), String> {
    let Some(command) = parse_slash_command(message) else {
        println!("  Not a montage command.");
        return Ok(());
    };
    let test = session.engine().snapshot().map_err(|e| e.to_string())?;
    match view_for(session.caller(), command, test.as_ref()) {
        Some(View::Configure) => println!("  Opening: configure a new montage test"),
        Some(View::DirectorTracker) => println!("  Opening: director tracker"),
        Some(View::PlayerTracker) => println!("  Opening: player tracker"),
        None => println!("  Only the Director can create montage tests."),
    }
    Ok(())
}
