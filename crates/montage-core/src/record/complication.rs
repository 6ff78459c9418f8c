//! Narrative complications the Director can spring during a montage.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a complication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComplicationId(pub Uuid);

impl ComplicationId {
    /// Generate a new random complication ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ComplicationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A complication that becomes relevant from a given round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complication {
    /// Unique ID.
    pub id: ComplicationId,
    /// What happens.
    pub description: String,
    /// Round from which the complication is in play (1 or 2).
    pub trigger_round: u32,
    /// Whether the Director has dealt with it.
    pub resolved: bool,
    /// Mechanical or narrative effect while it is in play.
    pub effect: String,
    /// What happens if the heroes fail to deal with it.
    pub failure_outcome: String,
}

impl Complication {
    /// A complication that triggers in round 1.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: ComplicationId::new(),
            description: description.into(),
            trigger_round: 1,
            resolved: false,
            effect: String::new(),
            failure_outcome: String::new(),
        }
    }

    /// Set the trigger round, clamped to 1-2.
    pub fn on_round(mut self, round: u32) -> Self {
        self.trigger_round = round.clamp(1, 2);
        self
    }

    /// Set the effect text.
    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = effect.into();
        self
    }

    /// Set the failure-outcome text.
    pub fn with_failure_outcome(mut self, text: impl Into<String>) -> Self {
        self.failure_outcome = text.into();
        self
    }

    /// Whether the complication is in play during `round`.
    pub fn is_active_in(&self, round: u32) -> bool {
        !self.resolved && self.trigger_round <= round
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_round_is_clamped() {
        assert_eq!(Complication::new("Rockslide").on_round(0).trigger_round, 1);
        assert_eq!(Complication::new("Rockslide").on_round(5).trigger_round, 2);
    }

    #[test]
    fn activity_by_round() {
        let mut c = Complication::new("Storm").on_round(2);
        assert!(!c.is_active_in(1));
        assert!(c.is_active_in(2));
        c.resolved = true;
        assert!(!c.is_active_in(2));
    }
}
