use super::Session;

pub fn run(session: &Session, format: &str) -> Result<(), String> {
    let transcript = session.transcript();
    match format.to_lowercase().as_str() {
        "markdown" | "md" => print!("{}", transcript.export_markdown()),
        "text" | "txt" => print!("{}", transcript.export_text()),
        other => return Err(format!("unsupported format '{other}' (use markdown or text)")),
    }
    Ok(())
}
