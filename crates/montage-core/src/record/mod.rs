//! The montage test record and its factories.
//!
//! A [`MontageTest`] is the single unit of consistency: every operation
//! loads the whole record, changes it, and writes the whole record back.

pub mod action;
pub mod complication;
pub mod round;

pub use action::{
    Action, ActionSubmission, ActionType, ApprovalData, Characteristic, TallyDelta,
};
pub use complication::{Complication, ComplicationId};
pub use round::RoundRecord;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::difficulty::{Limits, MIN_LIMIT, MontageDifficulty, calculate_limits};
use crate::error::{MontageError, MontageResult};
use crate::outcome::MontageOutcome;

/// Number of rounds a montage runs when none is configured.
pub const DEFAULT_MAX_ROUNDS: u32 = 2;

/// Largest round budget a montage accepts.
pub const MAX_ROUNDS: u32 = 100;

/// Name given to a montage created without one.
pub const DEFAULT_TEST_NAME: &str = "Montage Test";

/// Unique identifier of a montage test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestId(pub Uuid);

impl TestId {
    /// Generate a new random test ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Identifier of a hero, as assigned by the host's actor model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl From<&str> for ActorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ActorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A participating hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    /// Actor ID, unique within the test.
    pub actor_id: ActorId,
    /// Display name.
    pub name: String,
    /// Portrait image path.
    #[serde(default)]
    pub img: String,
}

impl Hero {
    /// A hero with no portrait.
    pub fn new(actor_id: impl Into<ActorId>, name: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            name: name.into(),
            img: String::new(),
        }
    }
}

/// Lifecycle state of a montage test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestStatus {
    /// Configured, not yet accepting actions.
    #[default]
    Setup,
    /// Accepting actions.
    Active,
    /// Finished; outcome and victories are set.
    Resolved,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Active => write!(f, "active"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

/// Director's narration prepared for each outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GmNotes {
    /// Read on a total success.
    #[serde(default)]
    pub total_success: String,
    /// Read on a partial success.
    #[serde(default)]
    pub partial_success: String,
    /// Read on a total failure.
    #[serde(default)]
    pub total_failure: String,
    /// General notes.
    #[serde(default)]
    pub general: String,
}

impl GmNotes {
    /// The narration for an outcome.
    pub fn for_outcome(&self, outcome: MontageOutcome) -> &str {
        match outcome {
            MontageOutcome::TotalSuccess => &self.total_success,
            MontageOutcome::PartialSuccess => &self.partial_success,
            MontageOutcome::TotalFailure => &self.total_failure,
        }
    }
}

/// Options for creating a montage test.
#[derive(Debug, Clone, Default)]
pub struct NewTest {
    /// Display name; defaults to [`DEFAULT_TEST_NAME`].
    pub name: Option<String>,
    /// Montage difficulty.
    pub difficulty: MontageDifficulty,
    /// Participating heroes.
    pub heroes: Vec<Hero>,
    /// Hero count used for the limits; defaults to the number of heroes.
    pub hero_count: Option<u32>,
    /// Round budget; defaults to [`DEFAULT_MAX_ROUNDS`].
    pub max_rounds: Option<u32>,
    /// Director override for the success limit.
    pub success_limit: Option<u32>,
    /// Director override for the failure limit.
    pub failure_limit: Option<u32>,
    /// Complications.
    pub complications: Vec<Complication>,
    /// Outcome narration.
    pub gm_notes: GmNotes,
}

impl NewTest {
    /// Options for a montage of the given difficulty.
    pub fn new(difficulty: MontageDifficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Set the name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a participating hero.
    pub fn with_hero(mut self, hero: Hero) -> Self {
        self.heroes.push(hero);
        self
    }

    /// Replace the hero list.
    pub fn with_heroes(mut self, heroes: Vec<Hero>) -> Self {
        self.heroes = heroes;
        self
    }

    /// Use a hero count other than the number of heroes for the limits.
    pub fn with_hero_count(mut self, count: u32) -> Self {
        self.hero_count = Some(count);
        self
    }

    /// Set the round budget.
    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Override the calculated limits.
    pub fn with_limits(mut self, success_limit: u32, failure_limit: u32) -> Self {
        self.success_limit = Some(success_limit);
        self.failure_limit = Some(failure_limit);
        self
    }

    /// Add a complication.
    pub fn with_complication(mut self, complication: Complication) -> Self {
        self.complications.push(complication);
        self
    }

    /// Set the outcome narration.
    pub fn with_gm_notes(mut self, notes: GmNotes) -> Self {
        self.gm_notes = notes;
        self
    }
}

/// The full state of one montage test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MontageTest {
    /// Unique ID.
    pub id: TestId,
    /// Display name.
    pub name: String,
    /// Montage difficulty.
    pub difficulty: MontageDifficulty,
    /// Heroes participating at creation.
    pub hero_count: u32,
    /// Successes needed for a total success.
    pub success_limit: u32,
    /// Failures that end the test.
    pub failure_limit: u32,
    /// Successes so far.
    pub current_successes: u32,
    /// Failures so far.
    pub current_failures: u32,
    /// The round accepting actions; `max_rounds + 1` once time has run out.
    pub current_round: u32,
    /// Round budget.
    pub max_rounds: u32,
    /// Lifecycle state.
    pub status: TestStatus,
    /// Verdict, set on resolution.
    pub outcome: Option<MontageOutcome>,
    /// Victories awarded, set on resolution.
    pub victories: u32,
    /// Participating heroes, in order.
    pub heroes: Vec<Hero>,
    /// Complications.
    pub complications: Vec<Complication>,
    /// One record per round entered.
    pub rounds: Vec<RoundRecord>,
    /// Submissions awaiting the Director.
    pub pending_actions: Vec<ActionSubmission>,
    /// Outcome narration.
    pub gm_notes: GmNotes,
}

impl MontageTest {
    /// Create a test in [`TestStatus::Setup`] with no rounds.
    pub fn create(options: NewTest) -> Self {
        let hero_count = options
            .hero_count
            .unwrap_or_else(|| u32::try_from(options.heroes.len()).unwrap_or(u32::MAX));
        let calculated = calculate_limits(options.difficulty, hero_count);
        let limits = Limits::new(
            options.success_limit.unwrap_or(calculated.success_limit),
            options.failure_limit.unwrap_or(calculated.failure_limit),
        );
        let name = options
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TEST_NAME.to_string());

        Self {
            id: TestId::new(),
            name,
            difficulty: options.difficulty,
            hero_count,
            success_limit: limits.success_limit,
            failure_limit: limits.failure_limit,
            current_successes: 0,
            current_failures: 0,
            current_round: 1,
            max_rounds: options
                .max_rounds
                .unwrap_or(DEFAULT_MAX_ROUNDS)
                .clamp(1, MAX_ROUNDS),
            status: TestStatus::Setup,
            outcome: None,
            victories: 0,
            heroes: options.heroes,
            complications: options.complications,
            rounds: Vec::new(),
            pending_actions: Vec::new(),
            gm_notes: options.gm_notes,
        }
    }

    /// Whether the test is accepting actions.
    pub fn is_active(&self) -> bool {
        self.status == TestStatus::Active
    }

    /// Whether the test has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.status == TestStatus::Resolved
    }

    /// Look up a participating hero.
    pub fn hero(&self, actor: &ActorId) -> Option<&Hero> {
        self.heroes.iter().find(|h| &h.actor_id == actor)
    }

    /// The hero's display name, or `Unknown Hero`.
    pub fn hero_name(&self, actor: &ActorId) -> &str {
        self.hero(actor).map_or("Unknown Hero", |h| h.name.as_str())
    }

    /// The record of the round currently accepting actions.
    pub fn current_round(&self) -> Option<&RoundRecord> {
        self.rounds
            .iter()
            .find(|r| r.round_number == self.current_round)
    }

    /// Mutable access to the current round record.
    pub fn current_round_mut(&mut self) -> Option<&mut RoundRecord> {
        let number = self.current_round;
        self.rounds.iter_mut().find(|r| r.round_number == number)
    }

    /// The current round record, appending it first if missing.
    pub fn ensure_current_round(&mut self) -> &mut RoundRecord {
        let number = self.current_round;
        let idx = match self.rounds.iter().position(|r| r.round_number == number) {
            Some(idx) => idx,
            None => {
                self.rounds.push(RoundRecord::new(number));
                self.rounds.len() - 1
            }
        };
        &mut self.rounds[idx]
    }

    /// Move to the next round and open its record.
    pub fn open_next_round(&mut self) {
        self.current_round = self.current_round.saturating_add(1);
        self.rounds.push(RoundRecord::new(self.current_round));
    }

    /// Whether the hero has an action in the current round.
    pub fn has_hero_acted(&self, actor: &ActorId) -> bool {
        self.current_round()
            .is_some_and(|r| r.action_for(actor).is_some())
    }

    /// Heroes with no action in the current round.
    pub fn heroes_waiting(&self) -> Vec<&Hero> {
        self.heroes
            .iter()
            .filter(|h| !self.has_hero_acted(&h.actor_id))
            .collect()
    }

    /// Heroes whose action this round is resolved.
    pub fn heroes_acted(&self) -> Vec<&Hero> {
        let Some(round) = self.current_round() else {
            return Vec::new();
        };
        self.heroes
            .iter()
            .filter(|h| round.action_for(&h.actor_id).is_some_and(|a| a.resolved))
            .collect()
    }

    /// The hero's pending submission, if any.
    pub fn pending_for(&self, actor: &ActorId) -> Option<&ActionSubmission> {
        self.pending_actions.iter().find(|p| &p.actor_id == actor)
    }

    /// Remove and return the hero's pending submission.
    pub fn take_pending(&mut self, actor: &ActorId) -> Option<ActionSubmission> {
        let idx = self
            .pending_actions
            .iter()
            .position(|p| &p.actor_id == actor)?;
        Some(self.pending_actions.remove(idx))
    }

    /// Complications in play this round.
    pub fn active_complications(&self) -> impl Iterator<Item = &Complication> {
        let round = self.current_round;
        self.complications
            .iter()
            .filter(move |c| c.is_active_in(round))
    }

    /// Check the structural invariants of the record.
    pub fn check_invariants(&self) -> MontageResult<()> {
        if self.success_limit < MIN_LIMIT || self.failure_limit < MIN_LIMIT {
            return Err(MontageError::Invariant(format!(
                "limits {}/{} below floor {MIN_LIMIT}",
                self.success_limit, self.failure_limit
            )));
        }
        if self.max_rounds == 0 || self.max_rounds > MAX_ROUNDS {
            return Err(MontageError::Invariant(format!(
                "round budget {} outside 1..={MAX_ROUNDS}",
                self.max_rounds
            )));
        }
        let last = self.max_rounds.saturating_add(1);
        if self.current_round == 0 || self.current_round > last {
            return Err(MontageError::Invariant(format!(
                "round {} outside 1..={last}",
                self.current_round
            )));
        }
        for round in &self.rounds {
            let mut seen = HashSet::new();
            if let Some(dup) = round.actions.iter().find(|a| !seen.insert(&a.actor_id)) {
                return Err(MontageError::Invariant(format!(
                    "{} has two actions in round {}",
                    dup.actor_id, round.round_number
                )));
            }
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self
            .pending_actions
            .iter()
            .find(|p| !seen.insert(&p.actor_id))
        {
            return Err(MontageError::Invariant(format!(
                "{} has two pending actions",
                dup.actor_id
            )));
        }
        if self.is_resolved() && (self.outcome.is_none() || !self.pending_actions.is_empty()) {
            return Err(MontageError::Invariant(
                "resolved test without outcome or with pending actions".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(n: usize) -> Vec<Hero> {
        (1..=n)
            .map(|i| Hero::new(format!("hero-{i}"), format!("Hero {i}")))
            .collect()
    }

    #[test]
    fn create_uses_calculated_limits() {
        let test = MontageTest::create(NewTest::new(MontageDifficulty::Moderate).with_heroes(party(5)));
        assert_eq!(test.name, DEFAULT_TEST_NAME);
        assert_eq!(test.hero_count, 5);
        assert_eq!(test.success_limit, 6);
        assert_eq!(test.failure_limit, 4);
        assert_eq!(test.current_round, 1);
        assert_eq!(test.max_rounds, DEFAULT_MAX_ROUNDS);
        assert_eq!(test.status, TestStatus::Setup);
        assert!(test.rounds.is_empty());
    }

    #[test]
    fn overrides_are_floored() {
        let test = MontageTest::create(
            NewTest::new(MontageDifficulty::Hard)
                .named("Crossing the Wastes")
                .with_heroes(party(4))
                .with_limits(1, 9)
                .with_max_rounds(0),
        );
        assert_eq!(test.name, "Crossing the Wastes");
        assert_eq!(test.success_limit, 2);
        assert_eq!(test.failure_limit, 9);
        assert_eq!(test.max_rounds, 1);
    }

    #[test]
    fn hero_count_override() {
        let test = MontageTest::create(
            NewTest::new(MontageDifficulty::Easy)
                .with_heroes(party(2))
                .with_hero_count(6),
        );
        assert_eq!(test.success_limit, 6);
        assert_eq!(test.failure_limit, 6);
    }

    #[test]
    fn round_queries() {
        let mut test = MontageTest::create(NewTest::new(MontageDifficulty::Easy).with_heroes(party(3)));
        assert!(test.current_round().is_none());
        assert_eq!(test.heroes_waiting().len(), 3);
        assert!(test.heroes_acted().is_empty());

        let mut action = Action::approved(
            ActionSubmission::new("hero-2", ActionType::Nothing),
            &ApprovalData::default(),
        );
        action.resolved = true;
        test.ensure_current_round().actions.push(action);

        assert!(test.has_hero_acted(&"hero-2".into()));
        assert_eq!(test.heroes_waiting().len(), 2);
        assert_eq!(test.heroes_acted()[0].name, "Hero 2");
        assert_eq!(test.hero_name(&"nobody".into()), "Unknown Hero");
    }

    #[test]
    fn pending_queue() {
        let mut test = MontageTest::create(NewTest::new(MontageDifficulty::Easy).with_heroes(party(2)));
        test.pending_actions
            .push(ActionSubmission::new("hero-1", ActionType::Roll));
        assert!(test.pending_for(&"hero-1".into()).is_some());
        assert!(test.take_pending(&"hero-1".into()).is_some());
        assert!(test.take_pending(&"hero-1".into()).is_none());
    }

    #[test]
    fn invariants_catch_duplicates() {
        let mut test = MontageTest::create(NewTest::new(MontageDifficulty::Easy).with_heroes(party(2)));
        assert!(test.check_invariants().is_ok());
        test.pending_actions
            .push(ActionSubmission::new("hero-1", ActionType::Roll));
        test.pending_actions
            .push(ActionSubmission::new("hero-1", ActionType::Aid));
        assert!(test.check_invariants().is_err());
    }

    #[test]
    fn invariants_catch_round_overflow() {
        let mut test = MontageTest::create(NewTest::new(MontageDifficulty::Easy));
        test.current_round = test.max_rounds + 1;
        assert!(test.check_invariants().is_ok());
        test.current_round += 1;
        assert!(test.check_invariants().is_err());
    }

    #[test]
    fn round_budget_is_capped() {
        let test = MontageTest::create(
            NewTest::new(MontageDifficulty::Easy).with_max_rounds(u32::MAX),
        );
        assert_eq!(test.max_rounds, MAX_ROUNDS);
        assert!(test.check_invariants().is_ok());
    }

    #[test]
    fn stored_budget_beyond_cap_is_rejected() {
        let mut test = MontageTest::create(NewTest::new(MontageDifficulty::Easy));
        test.max_rounds = u32::MAX;
        test.current_round = u32::MAX;
        assert!(test.check_invariants().is_err());
    }

    #[test]
    fn complications_by_round() {
        let test = MontageTest::create(
            NewTest::new(MontageDifficulty::Easy)
                .with_complication(Complication::new("Flood"))
                .with_complication(Complication::new("Ambush").on_round(2)),
        );
        let active: Vec<_> = test.active_complications().collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].description, "Flood");
    }

    #[test]
    fn gm_notes_by_outcome() {
        let notes = GmNotes {
            partial_success: "You arrive, bloodied.".into(),
            ..GmNotes::default()
        };
        assert_eq!(
            notes.for_outcome(MontageOutcome::PartialSuccess),
            "You arrive, bloodied."
        );
        assert!(notes.for_outcome(MontageOutcome::TotalSuccess).is_empty());
    }

    #[test]
    fn record_round_trips_through_json() {
        let test = MontageTest::create(NewTest::new(MontageDifficulty::Hard).with_heroes(party(1)));
        let json = serde_json::to_string(&test).unwrap();
        assert!(json.contains("\"difficulty\":\"hard\""));
        let back: MontageTest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, test);
    }
}
