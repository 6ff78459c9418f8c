use montage_engine::Request;

use super::{Session, match_prefix};

pub fn run(session: &mut Session, prefix: &str) -> Result<(), String> {
    let test = session
        .engine()
        .snapshot()
        .map_err(|e| e.to_string())?
        .ok_or("no montage test")?;
    let id = match_prefix(
        prefix,
        test.complications
            .iter()
            .map(|c| (c.id, c.id.0.to_string())),
        "complication",
    )?;
    session.send(Request::ResolveComplication(id))?;
    Ok(())
}
