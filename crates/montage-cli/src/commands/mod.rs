pub mod activate;
pub mod complication;
pub mod drafts;
pub mod hero;
pub mod lifecycle;
pub mod limits;
pub mod new;
pub mod open;
pub mod review;
pub mod roll;
pub mod round;
pub mod status;
pub mod submit;
pub mod transcript;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use montage_core::{Complication, GmNotes, Hero, MontageDifficulty, MontageError, NewTest};
use montage_engine::{
    Ack, Audience, Caller, Command, EngineConfig, JsonFileStore, MontageEngine, Notice, Request,
    StaticRoster, Transcript, TranscriptEntry, WorldId, apply,
};
use tracing::debug;

/// Engine settings file inside the data directory.
const CONFIG_FILE: &str = "montage.toml";

/// Parse `director` or `player:<user>`.
pub fn parse_caller(s: &str) -> Result<Caller, String> {
    match s.trim() {
        "director" | "gm" => Ok(Caller::Director),
        other => match other.split_once(':') {
            Some(("player", user)) if !user.trim().is_empty() => {
                Ok(Caller::Player(user.trim().to_string()))
            }
            _ => Err(format!(
                "unknown role '{s}' (expected 'director' or 'player:<user>')"
            )),
        },
    }
}

/// Options shared by `new` and `drafts save`.
#[derive(Args)]
pub struct TestArgs {
    /// Montage difficulty: easy, moderate, hard
    #[arg(short, long, default_value = "moderate")]
    pub difficulty: String,

    /// Test name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Participating hero as `id:Name` (repeatable; default: the roster)
    #[arg(long = "hero")]
    pub heroes: Vec<String>,

    /// Number of rounds
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Override the success limit
    #[arg(long)]
    pub success_limit: Option<u32>,

    /// Override the failure limit
    #[arg(long)]
    pub failure_limit: Option<u32>,

    /// Complication as `text` or `text@round` (repeatable)
    #[arg(long = "complication")]
    pub complications: Vec<String>,

    /// Narration for a total success
    #[arg(long)]
    pub on_success: Option<String>,

    /// Narration for a partial success
    #[arg(long)]
    pub on_partial: Option<String>,

    /// Narration for a total failure
    #[arg(long)]
    pub on_failure: Option<String>,
}

impl TestArgs {
    pub fn to_options(&self) -> Result<NewTest, String> {
        let difficulty: MontageDifficulty = self
            .difficulty
            .parse()
            .map_err(|e: MontageError| e.to_string())?;
        let mut options = NewTest::new(difficulty);
        options.name = self.name.clone();
        options.max_rounds = self.rounds;
        options.success_limit = self.success_limit;
        options.failure_limit = self.failure_limit;
        options.heroes = self.heroes.iter().map(|h| parse_hero(h.as_str())).collect();
        for raw in &self.complications {
            options.complications.push(parse_complication(raw)?);
        }
        options.gm_notes = GmNotes {
            total_success: self.on_success.clone().unwrap_or_default(),
            partial_success: self.on_partial.clone().unwrap_or_default(),
            total_failure: self.on_failure.clone().unwrap_or_default(),
            general: String::new(),
        };
        Ok(options)
    }
}

fn parse_hero(raw: &str) -> Hero {
    match raw.split_once(':') {
        Some((id, name)) => Hero::new(id.trim(), name.trim()),
        None => Hero::new(raw.trim(), raw.trim()),
    }
}

fn parse_complication(raw: &str) -> Result<Complication, String> {
    match raw.rsplit_once('@') {
        Some((text, round)) => {
            let round: u32 = round
                .trim()
                .parse()
                .map_err(|_| format!("invalid complication round in '{raw}'"))?;
            Ok(Complication::new(text.trim()).on_round(round))
        }
        None => Ok(Complication::new(raw.trim())),
    }
}

/// Path of a world's roster file.
pub fn roster_path(data: &Path, world: &str) -> PathBuf {
    JsonFileStore::new(data)
        .path_for(&WorldId::from(world))
        .with_extension("roster.json")
}

/// Load a world's roster, empty if none is saved.
pub fn load_roster(data: &Path, world: &str) -> Result<StaticRoster, String> {
    let path = roster_path(data, world);
    if !path.exists() {
        return Ok(StaticRoster::new());
    }
    let raw = fs::read_to_string(&path).map_err(|e| format!("cannot read roster: {e}"))?;
    serde_json::from_str(&raw).map_err(|e| format!("invalid roster {}: {e}", path.display()))
}

/// One CLI invocation's view of a world.
pub struct Session {
    engine: MontageEngine,
    caller: Caller,
    transcript: Arc<Transcript>,
    transcript_path: PathBuf,
}

impl Session {
    pub fn open(data: &Path, world: &str, caller: Caller) -> Result<Self, String> {
        let config = EngineConfig::load(&data.join(CONFIG_FILE)).map_err(|e| e.to_string())?;
        let store = JsonFileStore::new(data);
        let world = WorldId::from(world);
        let transcript_path = store.path_for(&world).with_extension("transcript.json");

        let entries: Vec<TranscriptEntry> = if transcript_path.exists() {
            let raw = fs::read_to_string(&transcript_path)
                .map_err(|e| format!("cannot read transcript: {e}"))?;
            serde_json::from_str(&raw).map_err(|e| format!("invalid transcript: {e}"))?
        } else {
            Vec::new()
        };
        let transcript = Arc::new(Transcript::from_entries(entries));
        let roster = load_roster(data, &world.0)?;
        debug!(
            data = %data.display(),
            %world,
            %caller,
            entries = transcript.len(),
            "session opened"
        );

        let engine = MontageEngine::new(world, Arc::new(store), config)
            .with_roster(Arc::new(roster))
            .with_notifier(transcript.clone());

        Ok(Self {
            engine,
            caller,
            transcript,
            transcript_path,
        })
    }

    pub fn engine(&self) -> &MontageEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MontageEngine {
        &mut self.engine
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Run a request as the session's caller and print what came of it.
    pub fn send(&mut self, request: Request) -> Result<Ack, String> {
        let before = self.transcript.len();
        let command = Command {
            caller: self.caller.clone(),
            request,
        };
        let ack = apply(&mut self.engine, command).map_err(|e| e.to_string())?;

        let entries = self.transcript.entries();
        for entry in entries.iter().skip(before) {
            print_notice(&entry.notice);
        }
        if entries.len() > before {
            self.save_transcript(&entries)?;
        }
        if ack == Ack::Ignored {
            println!("  {}", "Nothing changed.".dimmed());
        }
        Ok(ack)
    }

    fn save_transcript(&self, entries: &[TranscriptEntry]) -> Result<(), String> {
        if let Some(dir) = self.transcript_path.parent() {
            fs::create_dir_all(dir).map_err(|e| format!("cannot create {}: {e}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(entries).map_err(|e| e.to_string())?;
        fs::write(&self.transcript_path, json).map_err(|e| format!("cannot save transcript: {e}"))
    }
}

fn print_notice(notice: &Notice) {
    if let Notice::Warning(msg) = notice {
        println!("  {} {msg}", "warning:".yellow().bold());
        return;
    }
    match notice.audience() {
        Audience::Everyone => println!("  {notice}"),
        Audience::Director => println!("  {} {notice}", "(to director)".dimmed()),
        Audience::User(user) => println!("  {} {notice}", format!("(to {user})").dimmed()),
    }
    match notice {
        Notice::RoundSummary { lines, .. } => {
            for line in lines {
                println!("    {} ({}): {}", line.hero, line.action_type, line.result);
            }
        }
        Notice::TestComplete { narration, .. } if !narration.is_empty() => {
            println!("  {}", narration.italic());
        }
        _ => {}
    }
}

/// Find the single ID whose full form starts with `prefix`.
pub fn match_prefix<T: Copy>(
    prefix: &str,
    candidates: impl IntoIterator<Item = (T, String)>,
    what: &str,
) -> Result<T, String> {
    let prefix = prefix.trim().to_lowercase();
    let matches: Vec<T> = candidates
        .into_iter()
        .filter(|(_, full)| full.starts_with(&prefix))
        .map(|(id, _)| id)
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(format!("no {what} matches '{prefix}'")),
        _ => Err(format!("'{prefix}' matches more than one {what}")),
    }
}
