use montage_engine::{Request, TallyAdjustment};

use super::Session;

pub fn tally(
    session: &mut Session,
    successes: Option<u32>,
    failures: Option<u32>,
) -> Result<(), String> {
    if successes.is_none() && failures.is_none() {
        return Err("give --successes and/or --failures".into());
    }
    session.send(Request::AdjustTally(TallyAdjustment {
        successes,
        failures,
    }))?;
    Ok(())
}

pub fn advance(session: &mut Session) -> Result<(), String> {
    session.send(Request::AdvanceRound)?;
    Ok(())
}

pub fn end(session: &mut Session) -> Result<(), String> {
    session.send(Request::EndEarly)?;
    Ok(())
}
