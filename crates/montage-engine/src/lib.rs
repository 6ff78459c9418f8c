//! Montage test workflow engine.
//!
//! Drives a [`montage_core::MontageTest`] through submission, approval,
//! rolls, rounds, and resolution. The engine persists through a
//! [`MontageStore`], pushes snapshots through a [`Broadcaster`], and reports
//! to the table through a [`Notifier`]. [`Authority`] runs an engine on its
//! own thread so commands from many clients are applied one at a time.

pub mod authority;
pub mod broadcast;
pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod roll;
pub mod roster;
pub mod store;
pub mod surface;
pub mod transcript;

pub use authority::{Authority, AuthorityHandle, Caller, Command, Request, apply};
pub use broadcast::{Broadcaster, PeerLink, Subscription};
pub use config::EngineConfig;
pub use engine::{Ack, MontageEngine, TallyAdjustment};
pub use error::{EngineError, EngineResult};
pub use notify::{ActionResult, Audience, Notice, Notifier, NullNotifier, SummaryLine};
pub use roll::{
    GenericRoll, NativeRoll, NativeRollSystem, RollProvider, RollRequest, select_roll_provider,
};
pub use roster::{Roster, StaticRoster};
pub use store::{ArchivedTest, JsonFileStore, MemoryStore, MontageStore, SlotStore, WorldId, WorldSlot};
pub use surface::{SlashCommand, View, parse_slash_command, view_for};
pub use transcript::{Transcript, TranscriptEntry};
