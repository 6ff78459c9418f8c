//! Chat-style notices emitted by the engine.
//!
//! Notices go out only after the record they describe has been saved and
//! broadcast. Each notice names its audience so a host can whisper the
//! Director-only ones.

use montage_core::{
    Action, ActionType, ActorId, AssistOutcome, MontageOutcome, TestDifficulty, TestOutcome,
};
use serde::{Deserialize, Serialize};

/// Who should see a notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    /// Everyone at the table.
    Everyone,
    /// Only the Director.
    Director,
    /// The Director and one user.
    User(String),
}

/// How a resolved action turned out, for summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionResult {
    /// A roll with its outcome.
    Test(TestOutcome),
    /// An aid roll with the quality it grants.
    Assist(AssistOutcome),
    /// Successes granted by an ability.
    Granted(u32),
    /// Nothing happened.
    Idle,
    /// Still waiting for a roll.
    Pending,
}

impl ActionResult {
    /// The result of a recorded action.
    pub fn of(action: &Action) -> Self {
        if !action.resolved {
            return Self::Pending;
        }
        match action.action_type {
            ActionType::Roll => action.outcome.map_or(Self::Pending, Self::Test),
            ActionType::Aid => action.aid_result.map_or(Self::Pending, Self::Assist),
            ActionType::Ability => Self::Granted(action.auto_successes),
            ActionType::Nothing => Self::Idle,
        }
    }
}

impl std::fmt::Display for ActionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Test(outcome) => write!(f, "{outcome}"),
            Self::Assist(assist) => write!(f, "{assist}"),
            Self::Granted(n) => write!(f, "+{n} successes"),
            Self::Idle => write!(f, "no action"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// One hero's line in a round summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLine {
    /// Hero name.
    pub hero: String,
    /// Kind of action.
    pub action_type: ActionType,
    /// Result.
    pub result: ActionResult,
}

/// Something the table should be told.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// A hero submitted an action for approval.
    ActionSubmitted {
        /// Hero name.
        hero: String,
        /// Kind of action.
        action_type: ActionType,
        /// Narration.
        description: String,
    },
    /// The Director approved an action.
    ActionApproved {
        /// The acting hero.
        actor_id: ActorId,
        /// Hero name.
        hero: String,
        /// Who submitted it.
        submitted_by: Option<String>,
        /// Kind of action.
        action_type: ActionType,
        /// Difficulty of the test to roll, if any.
        difficulty: Option<TestDifficulty>,
    },
    /// The Director rejected an action.
    ActionRejected {
        /// Hero name.
        hero: String,
        /// Who submitted it.
        submitted_by: Option<String>,
        /// Why.
        reason: String,
    },
    /// A roll was resolved.
    RollResolved {
        /// Hero name.
        hero: String,
        /// Kind of action.
        action_type: ActionType,
        /// The roll, formatted.
        roll: String,
        /// What it achieved.
        result: ActionResult,
    },
    /// A round ended.
    RoundSummary {
        /// Test name.
        test_name: String,
        /// Round that ended.
        round: u32,
        /// Per-hero results.
        lines: Vec<SummaryLine>,
        /// Successes so far.
        successes: u32,
        /// Failures so far.
        failures: u32,
        /// Success limit.
        success_limit: u32,
        /// Failure limit.
        failure_limit: u32,
    },
    /// A new round began.
    RoundAdvanced {
        /// The new round.
        round: u32,
        /// Round budget.
        max_rounds: u32,
    },
    /// A test was created in the active slot.
    TestCreated {
        /// Test name.
        name: String,
    },
    /// A test started accepting actions.
    TestActivated {
        /// Test name.
        name: String,
    },
    /// A test was resolved.
    TestComplete {
        /// Test name.
        test_name: String,
        /// Verdict.
        outcome: MontageOutcome,
        /// Victories awarded.
        victories: u32,
        /// Final successes.
        successes: u32,
        /// Final failures.
        failures: u32,
        /// Director's narration for the verdict.
        narration: String,
    },
    /// A request was refused.
    Warning(String),
}

impl Notice {
    /// Who should see this notice.
    pub fn audience(&self) -> Audience {
        match self {
            Self::ActionSubmitted { .. } | Self::Warning(_) => Audience::Director,
            Self::ActionApproved {
                submitted_by: Some(user),
                ..
            }
            | Self::ActionRejected {
                submitted_by: Some(user),
                ..
            } => Audience::User(user.clone()),
            _ => Audience::Everyone,
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ActionSubmitted {
                hero,
                action_type,
                description,
            } => {
                write!(f, "{hero} submitted {action_type}")?;
                if !description.is_empty() {
                    write!(f, ": {description}")?;
                }
                Ok(())
            }
            Self::ActionApproved {
                hero,
                action_type,
                difficulty,
                ..
            } => match difficulty {
                Some(d) if action_type.needs_roll() => {
                    write!(f, "{hero}'s {action_type} approved ({d} test), roll now")
                }
                _ => write!(f, "{hero}'s {action_type} approved"),
            },
            Self::ActionRejected { hero, reason, .. } => {
                write!(f, "{hero}'s action rejected")?;
                if !reason.is_empty() {
                    write!(f, ": {reason}")?;
                }
                Ok(())
            }
            Self::RollResolved {
                hero, roll, result, ..
            } => write!(f, "{hero} rolled {roll}: {result}"),
            Self::RoundSummary {
                test_name,
                round,
                successes,
                failures,
                success_limit,
                failure_limit,
                ..
            } => write!(
                f,
                "{test_name} round {round} complete: {successes}/{success_limit} successes, {failures}/{failure_limit} failures"
            ),
            Self::RoundAdvanced { round, max_rounds } => {
                write!(f, "Round {round} of {max_rounds} begins")
            }
            Self::TestCreated { name } => write!(f, "{name} created"),
            Self::TestActivated { name } => write!(f, "{name} is now active"),
            Self::TestComplete {
                test_name,
                outcome,
                victories,
                ..
            } => write!(f, "{test_name}: {outcome} ({victories} victories)"),
            Self::Warning(msg) => write!(f, "warning: {msg}"),
        }
    }
}

/// Receives notices.
pub trait Notifier: Send + Sync {
    /// Deliver one notice.
    fn notify(&self, notice: &Notice);
}

/// Drops every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notice: &Notice) {}
}
