use montage_core::{ActorId, ApprovalData, MontageError, TestDifficulty};
use montage_engine::Request;

use super::Session;

pub fn approve(
    session: &mut Session,
    actor: &str,
    difficulty: Option<&str>,
    successes: u32,
    notes: Option<String>,
) -> Result<(), String> {
    let difficulty = difficulty
        .map(|d| d.parse::<TestDifficulty>())
        .transpose()
        .map_err(|e: MontageError| e.to_string())?;
    let approval = ApprovalData {
        difficulty,
        auto_successes: successes,
        gm_notes: notes.unwrap_or_default(),
    };
    session.send(Request::Approve {
        actor_id: ActorId::from(actor),
        approval,
    })?;
    Ok(())
}

pub fn reject(session: &mut Session, actor: &str, reason: String) -> Result<(), String> {
    session.send(Request::Reject {
        actor_id: ActorId::from(actor),
        reason,
    })?;
    Ok(())
}

pub fn remove(session: &mut Session, actor: &str) -> Result<(), String> {
    session.send(Request::RemoveAction {
        actor_id: ActorId::from(actor),
    })?;
    Ok(())
}
