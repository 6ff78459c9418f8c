//! Deciding when a montage test ends and how.
//!
//! The checks run in strict order: reaching the success limit always wins,
//! even if the failure limit was reached by the same change. Otherwise the
//! test ends once the failure limit is hit or the rounds run out, and the
//! margin of successes over failures picks partial success or total failure.

use serde::{Deserialize, Serialize};

use crate::outcome::MontageOutcome;
use crate::record::MontageTest;

/// Margin of successes over failures needed for a partial success.
pub const PARTIAL_SUCCESS_MARGIN: i64 = 2;

/// A verdict that ends the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The verdict.
    pub outcome: MontageOutcome,
    /// Victories awarded.
    pub victories: u32,
}

impl Resolution {
    fn of(outcome: MontageOutcome, test: &MontageTest) -> Self {
        Self {
            outcome,
            victories: outcome.victories(test.difficulty),
        }
    }
}

/// Decide whether the test is finished. `None` means play continues.
pub fn evaluate_resolution(test: &MontageTest) -> Option<Resolution> {
    if test.current_successes >= test.success_limit {
        return Some(Resolution::of(MontageOutcome::TotalSuccess, test));
    }

    let failure_limit_hit = test.current_failures >= test.failure_limit;
    let rounds_exhausted = test.current_round > test.max_rounds;
    if !failure_limit_hit && !rounds_exhausted {
        return None;
    }

    let margin = i64::from(test.current_successes) - i64::from(test.current_failures);
    if margin >= PARTIAL_SUCCESS_MARGIN {
        Some(Resolution::of(MontageOutcome::PartialSuccess, test))
    } else {
        Some(Resolution::of(MontageOutcome::TotalFailure, test))
    }
}

/// Whether every hero has a resolved action in the current round.
pub fn is_round_complete(test: &MontageTest) -> bool {
    let Some(round) = test.current_round() else {
        return false;
    };
    round.actions.len() >= test.heroes.len() && round.actions.iter().all(|a| a.resolved)
}
