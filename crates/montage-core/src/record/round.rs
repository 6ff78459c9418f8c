//! Per-round action lists.

use serde::{Deserialize, Serialize};

use super::ActorId;
use super::action::Action;

/// The actions taken in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number, starting at 1.
    pub round_number: u32,
    /// At most one action per hero.
    pub actions: Vec<Action>,
}

impl RoundRecord {
    /// An empty round.
    pub fn new(round_number: u32) -> Self {
        Self {
            round_number,
            actions: Vec::new(),
        }
    }

    /// The hero's action this round, if any.
    pub fn action_for(&self, actor: &ActorId) -> Option<&Action> {
        self.actions.iter().find(|a| &a.actor_id == actor)
    }

    /// Mutable access to the hero's action this round.
    pub fn action_for_mut(&mut self, actor: &ActorId) -> Option<&mut Action> {
        self.actions.iter_mut().find(|a| &a.actor_id == actor)
    }

    /// Remove and return the hero's action.
    pub fn take_action(&mut self, actor: &ActorId) -> Option<Action> {
        let idx = self.actions.iter().position(|a| &a.actor_id == actor)?;
        Some(self.actions.remove(idx))
    }

    /// Number of resolved actions.
    pub fn resolved_count(&self) -> usize {
        self.actions.iter().filter(|a| a.resolved).count()
    }
}
