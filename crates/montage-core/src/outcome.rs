//! Power-roll tiers and the outcome tables.
//!
//! - **Tier**: a roll total is banded into tier 1 (≤ 11), 2 (12–16), or 3 (≥ 17).
//! - **Test outcome**: individual test difficulty × tier, with a natural 19+
//!   forcing success with reward.
//! - **Assist outcome**: the roll quality an aid grants the helped hero.
//! - **Montage outcome**: the verdict for the whole test, and its victories.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::difficulty::{MontageDifficulty, TestDifficulty};

/// Highest total that still lands in tier 1.
pub const TIER_1_MAX: i32 = 11;

/// Highest total that still lands in tier 2.
pub const TIER_2_MAX: i32 = 16;

/// Natural 2d10 value at or above which a roll is critical.
pub const CRITICAL_NATURAL: u32 = 19;

/// A power-roll tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Tier {
    /// Total of 11 or less.
    One,
    /// Total of 12 to 16.
    Two,
    /// Total of 17 or more.
    Three,
}

impl Tier {
    /// Band a roll total into a tier.
    pub fn from_total(total: i32) -> Self {
        if total <= TIER_1_MAX {
            Self::One
        } else if total <= TIER_2_MAX {
            Self::Two
        } else {
            Self::Three
        }
    }

    /// The tier as a number from 1 to 3.
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.number()
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(format!("tier out of range: {other}")),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tier {}", self.number())
    }
}

/// Shorthand for [`Tier::from_total`].
pub fn get_tier(total: i32) -> Tier {
    Tier::from_total(total)
}

/// Whether a natural 2d10 value is a critical.
pub fn is_critical(natural: u32) -> bool {
    natural >= CRITICAL_NATURAL
}

/// Outcome of one hero's test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestOutcome {
    /// Success, and the hero gains something extra.
    SuccessReward,
    /// Plain success.
    Success,
    /// Success that costs the hero something.
    SuccessConsequence,
    /// Plain failure.
    Failure,
    /// Failure with an additional cost.
    FailureConsequence,
}

impl TestOutcome {
    /// Whether this outcome counts toward the success tally.
    pub fn is_success(self) -> bool {
        matches!(
            self,
            Self::SuccessReward | Self::Success | Self::SuccessConsequence
        )
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuccessReward => write!(f, "Success with Reward"),
            Self::Success => write!(f, "Success"),
            Self::SuccessConsequence => write!(f, "Success with Consequence"),
            Self::Failure => write!(f, "Failure"),
            Self::FailureConsequence => write!(f, "Failure with Consequence"),
        }
    }
}

/// Look up the outcome of an individual test.
///
/// A critical roll overrides the table with [`TestOutcome::SuccessReward`].
pub fn test_outcome(difficulty: TestDifficulty, tier: Tier, critical: bool) -> TestOutcome {
    if critical {
        return TestOutcome::SuccessReward;
    }
    match (difficulty, tier) {
        (TestDifficulty::Easy, Tier::One) => TestOutcome::SuccessConsequence,
        (TestDifficulty::Easy, Tier::Two) => TestOutcome::Success,
        (TestDifficulty::Easy, Tier::Three) => TestOutcome::SuccessReward,
        (TestDifficulty::Medium, Tier::One) => TestOutcome::Failure,
        (TestDifficulty::Medium, Tier::Two) => TestOutcome::SuccessConsequence,
        (TestDifficulty::Medium, Tier::Three) => TestOutcome::Success,
        (TestDifficulty::Hard, Tier::One) => TestOutcome::FailureConsequence,
        (TestDifficulty::Hard, Tier::Two) => TestOutcome::Failure,
        (TestDifficulty::Hard, Tier::Three) => TestOutcome::Success,
    }
}

/// Roll quality an aid grants to the helped hero's own test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssistOutcome {
    /// The aid backfired: a bane on the helped test.
    Bane,
    /// An edge on the helped test.
    Edge,
    /// A double edge on the helped test.
    DoubleEdge,
}

impl fmt::Display for AssistOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bane => write!(f, "Bane"),
            Self::Edge => write!(f, "Edge"),
            Self::DoubleEdge => write!(f, "Double Edge"),
        }
    }
}

/// Look up the assist outcome for an aid roll.
pub fn assist_outcome(tier: Tier) -> AssistOutcome {
    match tier {
        Tier::One => AssistOutcome::Bane,
        Tier::Two => AssistOutcome::Edge,
        Tier::Three => AssistOutcome::DoubleEdge,
    }
}

/// Final verdict of a montage test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MontageOutcome {
    /// The success limit was reached.
    TotalSuccess,
    /// Time or failures ran out with successes ahead by two or more.
    PartialSuccess,
    /// Time or failures ran out otherwise.
    TotalFailure,
}

impl MontageOutcome {
    /// Victories awarded for this outcome at the given montage difficulty.
    pub fn victories(self, difficulty: MontageDifficulty) -> u32 {
        match (self, difficulty) {
            (Self::TotalSuccess, MontageDifficulty::Easy) => 1,
            (Self::TotalSuccess, MontageDifficulty::Moderate) => 1,
            (Self::TotalSuccess, MontageDifficulty::Hard) => 2,
            (Self::PartialSuccess, MontageDifficulty::Easy) => 0,
            (Self::PartialSuccess, MontageDifficulty::Moderate) => 1,
            (Self::PartialSuccess, MontageDifficulty::Hard) => 1,
            (Self::TotalFailure, _) => 0,
        }
    }
}

impl fmt::Display for MontageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TotalSuccess => write!(f, "Total Success"),
            Self::PartialSuccess => write!(f, "Partial Success"),
            Self::TotalFailure => write!(f, "Total Failure"),
        }
    }
}
