//! Montage and individual-test difficulty, and the limit table.
//!
//! A montage's difficulty fixes how many successes the party needs and how
//! many failures it can absorb. The base table is written for five heroes;
//! each hero above or below that shifts both limits by one, never below
//! [`MIN_LIMIT`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MontageError;

/// Hero count the base limit table is written for.
pub const BASE_HERO_COUNT: u32 = 5;

/// Floor for both the success and the failure limit.
pub const MIN_LIMIT: u32 = 2;

/// Overall difficulty of a montage test, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MontageDifficulty {
    /// Five successes needed, five failures allowed (at five heroes).
    Easy,
    /// Six successes needed, four failures allowed (at five heroes).
    #[default]
    Moderate,
    /// Seven successes needed, three failures allowed (at five heroes).
    Hard,
}

impl MontageDifficulty {
    /// All montage difficulties, easiest first.
    pub fn all() -> &'static [Self] {
        &[Self::Easy, Self::Moderate, Self::Hard]
    }

    /// The base limits for [`BASE_HERO_COUNT`] heroes.
    pub fn base_limits(self) -> Limits {
        match self {
            Self::Easy => Limits::new(5, 5),
            Self::Moderate => Limits::new(6, 4),
            Self::Hard => Limits::new(7, 3),
        }
    }
}

impl fmt::Display for MontageDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "Easy"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for MontageDifficulty {
    type Err = MontageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "moderate" => Ok(Self::Moderate),
            "hard" => Ok(Self::Hard),
            _ => Err(MontageError::UnknownMontageDifficulty(s.to_string())),
        }
    }
}

/// Difficulty of a single hero's test, set per action by the Director.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestDifficulty {
    /// Every tier succeeds; tier 1 with a consequence.
    Easy,
    /// Tier 1 fails; tier 2 succeeds with a consequence.
    #[default]
    Medium,
    /// Only tier 3 succeeds.
    Hard,
}

impl TestDifficulty {
    /// All test difficulties, easiest first.
    pub fn all() -> &'static [Self] {
        &[Self::Easy, Self::Medium, Self::Hard]
    }
}

impl fmt::Display for TestDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "Easy"),
            Self::Medium => write!(f, "Medium"),
            Self::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for TestDifficulty {
    type Err = MontageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(MontageError::UnknownTestDifficulty(s.to_string())),
        }
    }
}

/// Success and failure limits for a montage test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Successes needed for a total success.
    pub success_limit: u32,
    /// Failures that end the test.
    pub failure_limit: u32,
}

impl Limits {
    /// Build limits, applying the [`MIN_LIMIT`] floor to both values.
    pub fn new(success_limit: u32, failure_limit: u32) -> Self {
        Self {
            success_limit: success_limit.max(MIN_LIMIT),
            failure_limit: failure_limit.max(MIN_LIMIT),
        }
    }
}

/// Calculate the limits for a montage of the given difficulty and party size.
pub fn calculate_limits(difficulty: MontageDifficulty, hero_count: u32) -> Limits {
    let base = difficulty.base_limits();
    let delta = i64::from(hero_count) - i64::from(BASE_HERO_COUNT);
    let shift = |value: u32| -> u32 {
        let shifted = (i64::from(value) + delta).max(i64::from(MIN_LIMIT));
        u32::try_from(shifted).unwrap_or(u32::MAX)
    };
    Limits {
        success_limit: shift(base.success_limit),
        failure_limit: shift(base.failure_limit),
    }
}

/// One-line description of the limits, e.g. `Moderate: 6 successes needed, 4 failures allowed`.
pub fn limits_summary(difficulty: MontageDifficulty, hero_count: u32) -> String {
    let limits = calculate_limits(difficulty, hero_count);
    format!(
        "{difficulty}: {} successes needed, {} failures allowed",
        limits.success_limit, limits.failure_limit
    )
}
