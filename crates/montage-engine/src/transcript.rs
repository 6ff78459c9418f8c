//! A timestamped record of every notice, exportable as markdown or text.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::notify::{Audience, Notice, Notifier};

/// One delivered notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// The notice.
    pub notice: Notice,
    /// When it was delivered.
    pub timestamp: DateTime<Utc>,
}

/// A chronological log of notices. Shareable: the engine notifies through
/// `&self`, so one transcript can be held by the engine and the caller.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Mutex<Vec<TranscriptEntry>>,
}

impl Transcript {
    /// An empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue a saved transcript.
    pub fn from_entries(entries: Vec<TranscriptEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// A copy of all entries.
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.entries.lock().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Export as markdown.
    pub fn export_markdown(&self) -> String {
        let mut out = String::from("# Montage Transcript\n\n");
        for entry in self.entries.lock().iter() {
            match &entry.notice {
                Notice::TestCreated { .. } | Notice::TestActivated { .. } => {
                    out.push_str(&format!("## {}\n\n", entry.notice));
                }
                Notice::RoundSummary { lines, .. } => {
                    out.push_str(&format!("**{}**\n\n", entry.notice));
                    for line in lines {
                        out.push_str(&format!(
                            "- {} ({}): {}\n",
                            line.hero, line.action_type, line.result
                        ));
                    }
                    out.push('\n');
                }
                Notice::RoundAdvanced { .. } => {
                    out.push_str(&format!("### {}\n\n", entry.notice));
                }
                Notice::TestComplete { narration, .. } => {
                    out.push_str(&format!("## {}\n\n", entry.notice));
                    if !narration.is_empty() {
                        out.push_str(&format!("> {narration}\n\n"));
                    }
                }
                Notice::Warning(msg) => {
                    out.push_str(&format!("*Warning*: {msg}\n\n"));
                }
                other if other.audience() == Audience::Director => {
                    out.push_str(&format!("*(Director)* {other}\n\n"));
                }
                other => {
                    out.push_str(&format!("{other}\n\n"));
                }
            }
        }
        out
    }

    /// Export as plain text, one line per entry.
    pub fn export_text(&self) -> String {
        let mut out = String::new();
        for entry in self.entries.lock().iter() {
            out.push_str(&format!(
                "[{}] {}\n",
                entry.timestamp.format("%H:%M:%S"),
                entry.notice
            ));
        }
        out
    }
}

impl Notifier for Transcript {
    fn notify(&self, notice: &Notice) {
        self.entries.lock().push(TranscriptEntry {
            notice: notice.clone(),
            timestamp: Utc::now(),
        });
    }
}
