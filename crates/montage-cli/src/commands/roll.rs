use montage_core::{ActorId, PowerRoll};
use montage_engine::Request;

use super::Session;

/// Highest natural value on 2d10.
const MAX_NATURAL: u32 = 20;

pub fn entered(
    session: &mut Session,
    actor: &str,
    total: i32,
    natural: Option<u32>,
) -> Result<(), String> {
    let roll = match natural {
        Some(n) if !(2..=MAX_NATURAL).contains(&n) => {
            return Err(format!("natural roll {n} is not possible on 2d10"));
        }
        Some(n) => PowerRoll::entered(total, n),
        None => PowerRoll::total_only(total),
    };
    session.send(Request::RollResult {
        actor_id: ActorId::from(actor),
        roll,
    })?;
    Ok(())
}

pub fn auto(session: &mut Session, actor: &str, modifier: i32) -> Result<(), String> {
    session.send(Request::AutoRoll {
        actor_id: ActorId::from(actor),
        modifier,
    })?;
    Ok(())
}
