//! Console for running montage tests from the terminal.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use montage_engine::Caller;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use commands::{Session, TestArgs};

#[derive(Parser)]
#[command(
    name = "montage",
    about = "Montage tests: multi-round skill challenges for the whole party",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding montage state
    #[arg(long, global = true, default_value = ".montage")]
    data: PathBuf,

    /// World (campaign) the test belongs to
    #[arg(long, global = true, default_value = "default")]
    world: String,

    /// Who is acting: `director` or `player:<user>`
    #[arg(long = "as", global = true, default_value = "director", value_parser = commands::parse_caller)]
    caller: Caller,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a montage test in setup
    New {
        #[command(flatten)]
        test: TestArgs,
    },

    /// Manage saved drafts
    Drafts {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Start the test in setup, or a draft
    Activate {
        /// Draft ID (or a unique prefix of it)
        #[arg(long)]
        draft: Option<String>,
    },

    /// Show the current test
    Status,

    /// Submit a hero's action for approval
    Submit {
        #[command(flatten)]
        action: commands::submit::SubmitArgs,
    },

    /// Approve a pending action
    Approve {
        /// Acting hero's actor ID
        actor: String,

        /// Test difficulty for roll and aid: easy, medium, hard
        #[arg(short, long)]
        difficulty: Option<String>,

        /// Successes granted for an ability
        #[arg(long, default_value = "0")]
        successes: u32,

        /// Private notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Reject a pending action
    Reject {
        /// Acting hero's actor ID
        actor: String,

        /// Reason shown to the player
        #[arg(short, long, default_value = "")]
        reason: String,
    },

    /// Enter a roll made at the table
    Roll {
        /// Rolling hero's actor ID
        actor: String,

        /// Roll total including modifiers
        #[arg(allow_hyphen_values = true)]
        total: i32,

        /// Natural 2d10 value; without it the roll cannot be a critical
        #[arg(short, long)]
        natural: Option<u32>,
    },

    /// Let the engine roll for an approved action
    AutoRoll {
        /// Rolling hero's actor ID
        actor: String,

        /// Extra modifier
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        modifier: i32,
    },

    /// Remove a hero's action from the current round
    Remove {
        /// Hero's actor ID
        actor: String,
    },

    /// Overwrite the success and failure tallies
    Tally {
        /// New success tally
        #[arg(short, long)]
        successes: Option<u32>,

        /// New failure tally
        #[arg(short, long)]
        failures: Option<u32>,
    },

    /// Close the current round
    Advance,

    /// End the test now
    End,

    /// Mark a complication as dealt with
    Complication {
        /// Complication ID (or a unique prefix of it)
        id: String,
    },

    /// Move the resolved test to the archive
    Archive,

    /// Discard the current test
    Abandon,

    /// Print the notice transcript
    Transcript {
        /// Output format: markdown, text
        #[arg(short, long, default_value = "markdown")]
        format: String,
    },

    /// Show which view a chat command opens
    Open {
        /// Chat message, e.g. "/montage new"
        #[arg(default_value = "/montage")]
        message: String,
    },

    /// Manage the hero roster
    Hero {
        #[command(subcommand)]
        action: HeroAction,
    },

    /// Show the limits for a difficulty and party size
    Limits {
        /// Montage difficulty: easy, moderate, hard
        difficulty: String,

        /// Number of heroes
        heroes: u32,
    },
}

#[derive(Subcommand)]
enum DraftAction {
    /// List drafts
    List,

    /// Save a test for later
    Save {
        #[command(flatten)]
        test: TestArgs,
    },

    /// Delete a draft
    Delete {
        /// Draft ID (or a unique prefix of it)
        id: String,
    },
}

#[derive(Subcommand)]
enum HeroAction {
    /// Add or replace a hero
    Add {
        /// Actor ID
        id: String,

        /// Display name
        name: String,

        /// Characteristic score as `name=value` (repeatable)
        #[arg(long = "stat", allow_hyphen_values = true)]
        stats: Vec<String>,
    },

    /// List heroes
    List,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = run(cli);

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let Cli {
        data,
        world,
        caller,
        command,
        ..
    } = cli;
    let open = || Session::open(&data, &world, caller.clone());

    match command {
        Commands::New { test } => commands::new::run(&mut open()?, &test),
        Commands::Drafts { action } => match action {
            DraftAction::List => commands::drafts::list(&open()?),
            DraftAction::Save { test } => commands::drafts::save(&mut open()?, &test),
            DraftAction::Delete { id } => commands::drafts::delete(&mut open()?, &id),
        },
        Commands::Activate { draft } => commands::activate::run(&mut open()?, draft.as_deref()),
        Commands::Status => commands::status::run(&open()?),
        Commands::Submit { action } => commands::submit::run(&mut open()?, action),
        Commands::Approve {
            actor,
            difficulty,
            successes,
            notes,
        } => commands::review::approve(
            &mut open()?,
            &actor,
            difficulty.as_deref(),
            successes,
            notes,
        ),
        Commands::Reject { actor, reason } => commands::review::reject(&mut open()?, &actor, reason),
        Commands::Remove { actor } => commands::review::remove(&mut open()?, &actor),
        Commands::Roll {
            actor,
            total,
            natural,
        } => commands::roll::entered(&mut open()?, &actor, total, natural),
        Commands::AutoRoll { actor, modifier } => {
            commands::roll::auto(&mut open()?, &actor, modifier)
        }
        Commands::Tally {
            successes,
            failures,
        } => commands::round::tally(&mut open()?, successes, failures),
        Commands::Advance => commands::round::advance(&mut open()?),
        Commands::End => commands::round::end(&mut open()?),
        Commands::Complication { id } => commands::complication::run(&mut open()?, &id),
        Commands::Archive => commands::lifecycle::archive(&mut open()?),
        Commands::Abandon => commands::lifecycle::abandon(&mut open()?),
        Commands::Transcript { format } => commands::transcript::run(&open()?, &format),
        Commands::Open { message } => commands::open::run(&open()?, &message),
        Commands::Hero { action } => match action {
            HeroAction::Add { id, name, stats } => {
                commands::hero::add(&data, &world, &id, &name, &stats)
            }
            HeroAction::List => commands::hero::list(&data, &world),
        },
        Commands::Limits {
            difficulty,
            heroes,
        } => commands::limits::run(&difficulty, heroes),
    }
}
