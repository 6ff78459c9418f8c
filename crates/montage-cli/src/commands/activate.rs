use montage_engine::Request;

use super::{Session, match_prefix};

pub fn run(session: &mut Session, draft: Option<&str>) -> Result<(), String> {
    let request = match draft {
        Some(prefix) => {
            let drafts = session.engine().drafts().map_err(|e| e.to_string())?;
            let id = match_prefix(
                prefix,
                drafts.iter().map(|d| (d.id, d.id.0.to_string())),
                "draft",
            )?;
            Request::ActivateDraft(id)
        }
        None => Request::Activate,
    };
    session.send(request)?;
    Ok(())
}
