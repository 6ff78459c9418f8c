//! The montage action workflow.
//!
//! Every operation has the same shape: load the active test, change an owned
//! copy, check invariants, save it, broadcast the snapshot, and only then
//! send notices. An operation that is ignored, refused, or fails leaves the
//! stored record untouched and sends nothing.
//!
//! Round completion and resolution run inside the operation that triggered
//! them, so observers never see a completed round that has not advanced or a
//! tally past its limit on a test that has not resolved.

use std::sync::Arc;

use montage_core::{
    Action, ActionSubmission, ActionType, ActorId, ApprovalData, ComplicationId, MontageError,
    MontageTest, NewTest, PowerRoll, Resolution, RoundRecord, TestId, TestStatus, assist_outcome,
    evaluate_resolution, is_round_complete, test_outcome,
};
use tracing::{debug, info, warn};

use crate::broadcast::Broadcaster;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::notify::{ActionResult, Notice, Notifier, NullNotifier, SummaryLine};
use crate::roll::{NativeRollSystem, RollProvider, RollRequest, select_roll_provider};
use crate::roster::{Roster, StaticRoster};
use crate::store::{ArchivedTest, MontageStore, WorldId};

/// What became of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    /// The change was saved.
    Applied,
    /// Stale or duplicate request; nothing changed.
    Ignored,
    /// Not allowed; nothing changed and a warning was sent.
    Refused(String),
}

impl Ack {
    /// Whether the change was saved.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Director overrides for the tallies. `None` leaves a tally unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallyAdjustment {
    /// New success tally.
    pub successes: Option<u32>,
    /// New failure tally.
    pub failures: Option<u32>,
}

/// Runs montage tests for one world.
pub struct MontageEngine {
    world: WorldId,
    store: Arc<dyn MontageStore>,
    roster: Arc<dyn Roster>,
    rolls: Box<dyn RollProvider>,
    notifier: Arc<dyn Notifier>,
    broadcaster: Broadcaster,
    config: EngineConfig,
    outbox: Vec<Notice>,
}

impl MontageEngine {
    /// An engine with an empty roster, the generic roller, and no notifier.
    pub fn new(world: WorldId, store: Arc<dyn MontageStore>, config: EngineConfig) -> Self {
        let rolls = select_roll_provider(None, &config);
        Self {
            world,
            store,
            roster: Arc::new(StaticRoster::new()),
            rolls,
            notifier: Arc::new(NullNotifier),
            broadcaster: Broadcaster::new(),
            config,
            outbox: Vec::new(),
        }
    }

    /// Use a roster for default heroes and characteristic scores.
    pub fn with_roster(mut self, roster: Arc<dyn Roster>) -> Self {
        self.roster = roster;
        self
    }

    /// Roll through the host's own dice system.
    pub fn with_native_rolls(mut self, system: Box<dyn NativeRollSystem>) -> Self {
        self.rolls = select_roll_provider(Some(system), &self.config);
        self
    }

    /// Deliver notices to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Share a broadcaster with other components.
    pub fn with_broadcaster(mut self, broadcaster: Broadcaster) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    /// The world this engine serves.
    pub fn world(&self) -> &WorldId {
        &self.world
    }

    /// The configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The snapshot broadcaster.
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// The active test as stored.
    pub fn snapshot(&self) -> EngineResult<Option<MontageTest>> {
        self.store.load(&self.world)
    }

    /// Saved drafts.
    pub fn drafts(&self) -> EngineResult<Vec<MontageTest>> {
        self.store.drafts(&self.world)
    }

    /// Archived tests.
    pub fn completed(&self) -> EngineResult<Vec<ArchivedTest>> {
        self.store.completed(&self.world)
    }

    // -- Setup --

    /// Create a test in the active slot, in setup.
    ///
    /// Refused while another test is active. Without heroes the roster's
    /// heroes are used.
    pub fn create_test(&mut self, options: NewTest) -> EngineResult<Ack> {
        if let Some(reason) = self.active_conflict()? {
            return Ok(self.refuse(reason));
        }
        let test = MontageTest::create(self.with_defaults(options));
        info!(world = %self.world, test = %test.id, name = %test.name, "montage test created");
        self.outbox.clear();
        self.outbox.push(Notice::TestCreated {
            name: test.name.clone(),
        });
        self.commit(test)
    }

    /// Start the test in the active slot.
    pub fn activate(&mut self) -> EngineResult<Ack> {
        self.with_test("activate", |engine, test| {
            if test.status != TestStatus::Setup {
                return Ok(Ack::Ignored);
            }
            engine.start(test);
            Ok(Ack::Applied)
        })
    }

    /// Move a draft into the active slot and start it.
    pub fn activate_draft(&mut self, id: TestId) -> EngineResult<Ack> {
        if let Some(reason) = self.active_conflict()? {
            return Ok(self.refuse(reason));
        }
        let Some(mut test) = self.store.draft(&self.world, id)? else {
            debug!(world = %self.world, draft = %id, "no such draft");
            return Ok(Ack::Ignored);
        };
        self.outbox.clear();
        self.start(&mut test);
        let ack = self.commit(test)?;
        self.store.delete_draft(&self.world, id)?;
        Ok(ack)
    }

    /// Save a test for later.
    pub fn save_draft(&mut self, options: NewTest) -> EngineResult<TestId> {
        let test = MontageTest::create(self.with_defaults(options));
        test.check_invariants()?;
        self.store.add_draft(&self.world, &test)?;
        info!(world = %self.world, draft = %test.id, name = %test.name, "draft saved");
        Ok(test.id)
    }

    /// Replace a draft with an edited copy.
    pub fn update_draft(&mut self, test: MontageTest) -> EngineResult<Ack> {
        if test.status != TestStatus::Setup {
            return Ok(Ack::Ignored);
        }
        test.check_invariants()?;
        if self.store.update_draft(&self.world, &test)? {
            info!(world = %self.world, draft = %test.id, "draft updated");
            Ok(Ack::Applied)
        } else {
            Ok(Ack::Ignored)
        }
    }

    /// Delete a draft.
    pub fn delete_draft(&mut self, id: TestId) -> EngineResult<Ack> {
        if self.store.delete_draft(&self.world, id)? {
            info!(world = %self.world, draft = %id, "draft deleted");
            Ok(Ack::Applied)
        } else {
            Ok(Ack::Ignored)
        }
    }

    /// Move a resolved test to the archive and empty the slot.
    pub fn archive(&mut self) -> EngineResult<Ack> {
        match self.store.load(&self.world)? {
            Some(test) if test.is_resolved() => {
                self.store.archive(&self.world, &test)?;
                self.store.clear(&self.world)?;
                info!(world = %self.world, test = %test.id, "montage test archived");
                Ok(Ack::Applied)
            }
            _ => Ok(Ack::Ignored),
        }
    }

    /// Discard the test in the active slot, whatever its state.
    pub fn abandon(&mut self) -> EngineResult<Ack> {
        match self.store.load(&self.world)? {
            Some(test) => {
                self.store.clear(&self.world)?;
                warn!(world = %self.world, test = %test.id, status = %test.status, "montage test abandoned");
                Ok(Ack::Applied)
            }
            None => Ok(Ack::Ignored),
        }
    }

    // -- Player operations --

    /// Queue a hero's action for the Director.
    ///
    /// Ignored unless the test is active and the hero is participating, has
    /// nothing pending, and has not acted this round.
    pub fn submit_action(&mut self, submission: ActionSubmission) -> EngineResult<Ack> {
        self.with_test("submit_action", move |engine, test| {
            let actor = submission.actor_id.clone();
            if !test.is_active()
                || test.hero(&actor).is_none()
                || test.pending_for(&actor).is_some()
                || test.has_hero_acted(&actor)
            {
                return Ok(Ack::Ignored);
            }
            info!(world = %engine.world, %actor, action = %submission.action_type, "action submitted");
            engine.outbox.push(Notice::ActionSubmitted {
                hero: test.hero_name(&actor).to_string(),
                action_type: submission.action_type,
                description: submission.description.clone(),
            });
            test.pending_actions.push(submission);
            Ok(Ack::Applied)
        })
    }

    /// Apply a roll made outside the engine to the hero's approved action.
    pub fn handle_roll_result(&mut self, actor: &ActorId, roll: PowerRoll) -> EngineResult<Ack> {
        let actor = actor.clone();
        self.with_test("roll_result", move |engine, test| {
            if !test.is_active() {
                return Ok(Ack::Ignored);
            }
            engine.apply_roll(test, &actor, roll)
        })
    }

    /// Roll for the hero's approved action with the configured provider.
    pub fn auto_roll(&mut self, actor: &ActorId, modifier: i32) -> EngineResult<Ack> {
        let actor = actor.clone();
        self.with_test("auto_roll", move |engine, test| {
            if !test.is_active() {
                return Ok(Ack::Ignored);
            }
            let Some(action) = test
                .current_round()
                .and_then(|r| r.action_for(&actor))
                .filter(|a| a.awaiting_roll())
            else {
                return Ok(Ack::Ignored);
            };
            let request = RollRequest {
                actor_id: actor.clone(),
                characteristic: action.characteristic,
                characteristic_value: action
                    .characteristic
                    .map_or(0, |c| engine.roster.characteristic(&actor, c)),
                skill: action.skill.clone(),
                modifier,
            };
            let roll = engine.rolls.power_roll(&request);
            debug!(provider = engine.rolls.name(), %actor, %roll, "auto-rolled");
            engine.apply_roll(test, &actor, roll)
        })
    }

    /// Re-broadcast the stored test without changing it.
    pub fn refresh(&mut self) -> EngineResult<Ack> {
        match self.store.load(&self.world)? {
            Some(test) => {
                self.broadcaster.broadcast(&self.world, &test);
                Ok(Ack::Applied)
            }
            None => Ok(Ack::Ignored),
        }
    }

    // -- Director operations --

    /// Approve a hero's pending action.
    ///
    /// Roll and aid actions wait for a roll. Ability and nothing actions
    /// resolve at once, which may complete the round or the test.
    pub fn approve_action(&mut self, actor: &ActorId, approval: ApprovalData) -> EngineResult<Ack> {
        let actor = actor.clone();
        self.with_test("approve_action", move |engine, test| {
            if !test.is_active() || test.has_hero_acted(&actor) {
                return Ok(Ack::Ignored);
            }
            let Some(submission) = test.take_pending(&actor) else {
                return Ok(Ack::Ignored);
            };
            let submitted_by = submission.submitted_by.clone();
            let mut action = Action::approved(submission, &approval);
            match action.action_type {
                ActionType::Roll => {
                    action
                        .difficulty
                        .get_or_insert(engine.config.default_test_difficulty);
                }
                ActionType::Aid => {}
                ActionType::Ability => {
                    action.auto_successes = approval.auto_successes;
                    action.is_success = Some(approval.auto_successes > 0);
                    action.resolved = true;
                    test.current_successes = test
                        .current_successes
                        .saturating_add(approval.auto_successes);
                }
                ActionType::Nothing => action.resolved = true,
            }
            info!(world = %engine.world, %actor, action = %action.action_type, "action approved");
            engine.outbox.push(Notice::ActionApproved {
                actor_id: actor.clone(),
                hero: test.hero_name(&actor).to_string(),
                submitted_by,
                action_type: action.action_type,
                difficulty: action.difficulty,
            });
            let resolved = action.resolved;
            test.ensure_current_round().actions.push(action);
            if resolved {
                engine.settle(test)?;
            }
            Ok(Ack::Applied)
        })
    }

    /// Drop a hero's pending action.
    pub fn reject_action(&mut self, actor: &ActorId, reason: &str) -> EngineResult<Ack> {
        let actor = actor.clone();
        let reason = reason.to_string();
        self.with_test("reject_action", move |engine, test| {
            let Some(submission) = test.take_pending(&actor) else {
                return Ok(Ack::Ignored);
            };
            info!(world = %engine.world, %actor, %reason, "action rejected");
            engine.outbox.push(Notice::ActionRejected {
                hero: test.hero_name(&actor).to_string(),
                submitted_by: submission.submitted_by,
                reason,
            });
            Ok(Ack::Applied)
        })
    }

    /// Remove a hero's action from the current round, taking back what it
    /// added to the tallies. Tallies never drop below zero.
    pub fn remove_action(&mut self, actor: &ActorId) -> EngineResult<Ack> {
        let actor = actor.clone();
        self.with_test("remove_action", move |engine, test| {
            if !test.is_active() {
                return Ok(Ack::Ignored);
            }
            let Some(action) = test.current_round_mut().and_then(|r| r.take_action(&actor)) else {
                return Ok(Ack::Ignored);
            };
            let delta = action.tally_contribution();
            test.current_successes = test.current_successes.saturating_sub(delta.successes);
            test.current_failures = test.current_failures.saturating_sub(delta.failures);
            info!(
                world = %engine.world,
                %actor,
                successes = delta.successes,
                failures = delta.failures,
                "action removed"
            );
            Ok(Ack::Applied)
        })
    }

    /// Overwrite the tallies. Reaching a limit resolves the test.
    pub fn adjust_tally(&mut self, adjustment: TallyAdjustment) -> EngineResult<Ack> {
        self.with_test("adjust_tally", move |engine, test| {
            if !test.is_active() {
                return Ok(Ack::Ignored);
            }
            if let Some(successes) = adjustment.successes {
                test.current_successes = successes;
            }
            if let Some(failures) = adjustment.failures {
                test.current_failures = failures;
            }
            info!(
                world = %engine.world,
                successes = test.current_successes,
                failures = test.current_failures,
                "tally adjusted"
            );
            if let Some(resolution) = evaluate_resolution(test) {
                engine.resolve(test, resolution);
            }
            Ok(Ack::Applied)
        })
    }

    /// Close the current round whether or not every hero has acted.
    ///
    /// Pending submissions are discarded. Closing the last round resolves
    /// the test.
    pub fn advance_round(&mut self) -> EngineResult<Ack> {
        self.with_test("advance_round", |engine, test| {
            if !test.is_active() {
                return Ok(Ack::Ignored);
            }
            engine.summarize_round(test);
            if let Some(resolution) = evaluate_resolution(test) {
                engine.resolve(test, resolution);
            } else if test.current_round >= test.max_rounds {
                engine.exhaust(test)?;
            } else {
                engine.start_next_round(test);
            }
            Ok(Ack::Applied)
        })
    }

    /// Resolve the test now, as if time had run out.
    pub fn end_test_early(&mut self) -> EngineResult<Ack> {
        self.with_test("end_test_early", |engine, test| {
            if !test.is_active() {
                return Ok(Ack::Ignored);
            }
            engine.exhaust(test)?;
            Ok(Ack::Applied)
        })
    }

    /// Mark a complication as dealt with.
    pub fn resolve_complication(&mut self, id: ComplicationId) -> EngineResult<Ack> {
        self.with_test("resolve_complication", move |engine, test| {
            if test.is_resolved() {
                return Ok(Ack::Ignored);
            }
            let Some(complication) = test
                .complications
                .iter_mut()
                .find(|c| c.id == id && !c.resolved)
            else {
                return Ok(Ack::Ignored);
            };
            complication.resolved = true;
            info!(world = %engine.world, complication = %id, "complication resolved");
            Ok(Ack::Applied)
        })
    }

    /// Log a refusal and warn the Director.
    pub(crate) fn refuse(&self, reason: String) -> Ack {
        warn!(world = %self.world, %reason, "request refused");
        self.notifier.notify(&Notice::Warning(reason.clone()));
        Ack::Refused(reason)
    }

    // -- Internals --

    fn with_defaults(&self, mut options: NewTest) -> NewTest {
        options
            .max_rounds
            .get_or_insert(self.config.default_max_rounds);
        if options.heroes.is_empty() {
            options.heroes = self.roster.heroes();
        }
        options
    }

    fn active_conflict(&self) -> EngineResult<Option<String>> {
        Ok(self
            .store
            .load(&self.world)?
            .filter(MontageTest::is_active)
            .map(|t| format!("{} is already active; end it first", t.name)))
    }

    fn with_test<F>(&mut self, op: &'static str, change: F) -> EngineResult<Ack>
    where
        F: FnOnce(&mut Self, &mut MontageTest) -> EngineResult<Ack>,
    {
        let Some(mut test) = self.store.load(&self.world)? else {
            debug!(world = %self.world, op, "no montage test");
            return Ok(Ack::Ignored);
        };
        self.outbox.clear();
        match change(self, &mut test) {
            Ok(Ack::Applied) => self.commit(test),
            Ok(ack) => {
                self.outbox.clear();
                debug!(world = %self.world, op, ?ack, "nothing applied");
                Ok(ack)
            }
            Err(e) => {
                self.outbox.clear();
                Err(e)
            }
        }
    }

    fn commit(&mut self, test: MontageTest) -> EngineResult<Ack> {
        let saved = test
            .check_invariants()
            .map_err(EngineError::from)
            .and_then(|()| self.store.save(&self.world, &test));
        if let Err(e) = saved {
            self.outbox.clear();
            warn!(world = %self.world, test = %test.id, error = %e, "save failed");
            return Err(e);
        }
        self.broadcaster.broadcast(&self.world, &test);
        for notice in std::mem::take(&mut self.outbox) {
            self.notifier.notify(&notice);
        }
        Ok(Ack::Applied)
    }

    fn start(&mut self, test: &mut MontageTest) {
        test.status = TestStatus::Active;
        test.current_round = 1;
        test.rounds = vec![RoundRecord::new(1)];
        test.pending_actions.clear();
        info!(world = %self.world, test = %test.id, name = %test.name, "montage test activated");
        self.outbox.push(Notice::TestActivated {
            name: test.name.clone(),
        });
    }

    fn apply_roll(
        &mut self,
        test: &mut MontageTest,
        actor: &ActorId,
        roll: PowerRoll,
    ) -> EngineResult<Ack> {
        let fallback = self.config.default_test_difficulty;
        let Some(action) = test
            .current_round_mut()
            .and_then(|r| r.action_for_mut(actor))
            .filter(|a| a.awaiting_roll() && a.action_type.needs_roll())
        else {
            return Ok(Ack::Ignored);
        };

        let tier = roll.tier();
        action.roll_total = Some(roll.total);
        action.natural_roll = Some(roll.natural);
        action.tier = Some(tier);
        action.resolved = true;
        if action.action_type == ActionType::Aid {
            action.aid_result = Some(assist_outcome(tier));
        } else {
            let outcome = test_outcome(
                action.difficulty.unwrap_or(fallback),
                tier,
                roll.is_critical(),
            );
            action.outcome = Some(outcome);
            action.is_success = Some(outcome.is_success());
        }
        let action_type = action.action_type;
        let result = ActionResult::of(action);

        match result {
            ActionResult::Test(outcome) if outcome.is_success() => {
                test.current_successes = test.current_successes.saturating_add(1);
            }
            ActionResult::Test(_) => {
                test.current_failures = test.current_failures.saturating_add(1);
            }
            _ => {}
        }
        info!(world = %self.world, %actor, %roll, %result, "roll resolved");
        self.outbox.push(Notice::RollResolved {
            hero: test.hero_name(actor).to_string(),
            action_type,
            roll: roll.to_string(),
            result,
        });
        self.settle(test)?;
        Ok(Ack::Applied)
    }

    /// Resolve or advance after an action resolves.
    fn settle(&mut self, test: &mut MontageTest) -> EngineResult<()> {
        let round_complete = is_round_complete(test);
        if round_complete {
            self.summarize_round(test);
        }
        if let Some(resolution) = evaluate_resolution(test) {
            self.resolve(test, resolution);
            return Ok(());
        }
        if !round_complete {
            return Ok(());
        }
        if test.current_round < test.max_rounds {
            self.start_next_round(test);
            Ok(())
        } else {
            self.exhaust(test)
        }
    }

    fn summarize_round(&mut self, test: &MontageTest) {
        let Some(round) = test.current_round() else {
            return;
        };
        let lines = round
            .actions
            .iter()
            .map(|a| SummaryLine {
                hero: test.hero_name(&a.actor_id).to_string(),
                action_type: a.action_type,
                result: ActionResult::of(a),
            })
            .collect();
        self.outbox.push(Notice::RoundSummary {
            test_name: test.name.clone(),
            round: round.round_number,
            lines,
            successes: test.current_successes,
            failures: test.current_failures,
            success_limit: test.success_limit,
            failure_limit: test.failure_limit,
        });
    }

    fn start_next_round(&mut self, test: &mut MontageTest) {
        test.open_next_round();
        test.pending_actions.clear();
        info!(world = %self.world, round = test.current_round, "round advanced");
        self.outbox.push(Notice::RoundAdvanced {
            round: test.current_round,
            max_rounds: test.max_rounds,
        });
    }

    /// Run out the clock and resolve.
    fn exhaust(&mut self, test: &mut MontageTest) -> EngineResult<()> {
        test.current_round = test.max_rounds.saturating_add(1);
        let resolution = evaluate_resolution(test).ok_or_else(|| {
            MontageError::Invariant("rounds exhausted without a verdict".into())
        })?;
        self.resolve(test, resolution);
        Ok(())
    }

    /// The only place a test becomes resolved.
    fn resolve(&mut self, test: &mut MontageTest, resolution: Resolution) {
        test.status = TestStatus::Resolved;
        test.outcome = Some(resolution.outcome);
        test.victories = resolution.victories;
        test.pending_actions.clear();
        info!(
            world = %self.world,
            test = %test.id,
            outcome = %resolution.outcome,
            victories = resolution.victories,
            "montage test resolved"
        );
        self.outbox.push(Notice::TestComplete {
            test_name: test.name.clone(),
            outcome: resolution.outcome,
            victories: resolution.victories,
            successes: test.current_successes,
            failures: test.current_failures,
            narration: test.gm_notes.for_outcome(resolution.outcome).to_string(),
        });
    }
}
