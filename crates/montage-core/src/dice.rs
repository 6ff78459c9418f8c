//! Power rolls: 2d10 plus a modifier.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::outcome::{Tier, is_critical};

/// Number of sides on a power-roll die.
pub const POWER_DIE_SIDES: u32 = 10;

/// Number of dice in a power roll.
pub const POWER_DICE: usize = 2;

/// The result of a power roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerRoll {
    /// Individual die values. Empty when the result was entered by hand.
    pub dice: Vec<u32>,
    /// Sum of the dice before modifiers.
    pub natural: u32,
    /// Natural value plus characteristic and other modifiers.
    pub total: i32,
}

impl PowerRoll {
    /// Build a roll from die values and a flat modifier.
    pub fn from_dice(dice: Vec<u32>, modifier: i32) -> Self {
        let natural: u32 = dice.iter().sum();
        let total = i32::try_from(natural).unwrap_or(i32::MAX).saturating_add(modifier);
        Self {
            dice,
            natural,
            total,
        }
    }

    /// A result reported from outside (a player's own dice, a host roller).
    pub fn entered(total: i32, natural: u32) -> Self {
        Self {
            dice: Vec::new(),
            natural,
            total,
        }
    }

    /// A reported total whose dice are unknown. Never a critical.
    pub fn total_only(total: i32) -> Self {
        Self::entered(total, 0)
    }

    /// The tier this roll lands in.
    pub fn tier(&self) -> Tier {
        Tier::from_total(self.total)
    }

    /// Whether the natural value is a critical.
    pub fn is_critical(&self) -> bool {
        is_critical(self.natural)
    }
}

impl std::fmt::Display for PowerRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.dice.is_empty() && self.natural == 0 {
            return write!(f, "{}", self.total);
        }
        if self.dice.is_empty() {
            return write!(f, "{} (natural {})", self.total, self.natural);
        }
        let values: Vec<String> = self.dice.iter().map(|d| d.to_string()).collect();
        let modifier = self.total - i32::try_from(self.natural).unwrap_or(i32::MAX);
        match modifier {
            0 => write!(f, "[{}] = {}", values.join(", "), self.total),
            m if m > 0 => write!(f, "[{}] + {m} = {}", values.join(", "), self.total),
            m => write!(f, "[{}] - {} = {}", values.join(", "), -m, self.total),
        }
    }
}

/// Roll 2d10 and add `modifier`.
pub fn roll_power(rng: &mut StdRng, modifier: i32) -> PowerRoll {
    let dice = (0..POWER_DICE)
        .map(|_| rng.random_range(1..=POWER_DIE_SIDES))
        .collect();
    PowerRoll::from_dice(dice, modifier)
}
