//! Montage test domain.
//!
//! A montage test is a multi-round skill challenge: every hero acts once per
//! round, rolls are banded into tiers and looked up in per-difficulty
//! outcome tables, and the success/failure tallies decide when the test ends
//! and what it awards. This crate holds the record, the tables, and the
//! resolution rules. It has no I/O; the workflow lives in `montage-engine`.

pub mod dice;
pub mod difficulty;
pub mod error;
pub mod outcome;
pub mod record;
pub mod resolution;

pub use dice::{PowerRoll, roll_power};
pub use difficulty::{
    Limits, MontageDifficulty, TestDifficulty, calculate_limits, limits_summary,
};
pub use error::{MontageError, MontageResult};
pub use outcome::{
    AssistOutcome, MontageOutcome, TestOutcome, Tier, assist_outcome, get_tier, test_outcome,
};
pub use record::{
    Action, ActionSubmission, ActionType, ActorId, ApprovalData, Characteristic, Complication,
    ComplicationId, GmNotes, Hero, MontageTest, NewTest, RoundRecord, TestId, TestStatus,
};
pub use resolution::{Resolution, evaluate_resolution, is_round_complete};
