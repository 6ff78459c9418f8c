//! Routing requests to the single writer.
//!
//! Players may only submit actions, report rolls, auto-roll, and ask for a
//! refresh; everything else belongs to the Director. [`Authority::spawn`]
//! moves an engine onto its own thread and serializes every command
//! through one channel, so at most one operation runs per world at a time.

use std::fmt;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use montage_core::{
    ActionSubmission, ActorId, ApprovalData, ComplicationId, NewTest, PowerRoll, TestId,
};
use tracing::{debug, info};

use crate::engine::{Ack, MontageEngine, TallyAdjustment};
use crate::error::{EngineError, EngineResult};

/// Who is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// The game master.
    Director,
    /// A player, by user name.
    Player(String),
}

impl Caller {
    /// Whether this is the Director.
    pub fn is_director(&self) -> bool {
        matches!(self, Self::Director)
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Director => write!(f, "director"),
            Self::Player(user) => write!(f, "player:{user}"),
        }
    }
}

/// An engine operation with its arguments.
#[derive(Debug, Clone)]
pub enum Request {
    /// Queue an action.
    Submit(ActionSubmission),
    /// Report a roll made at the table.
    RollResult {
        /// The rolling hero.
        actor_id: ActorId,
        /// The roll.
        roll: PowerRoll,
    },
    /// Roll with the engine's provider.
    AutoRoll {
        /// The rolling hero.
        actor_id: ActorId,
        /// Extra modifier.
        modifier: i32,
    },
    /// Re-broadcast the current state.
    Refresh,
    /// Approve a pending action.
    Approve {
        /// The acting hero.
        actor_id: ActorId,
        /// The Director's decisions.
        approval: ApprovalData,
    },
    /// Reject a pending action.
    Reject {
        /// The acting hero.
        actor_id: ActorId,
        /// Why.
        reason: String,
    },
    /// Remove a recorded action.
    RemoveAction {
        /// The acting hero.
        actor_id: ActorId,
    },
    /// Overwrite the tallies.
    AdjustTally(TallyAdjustment),
    /// Close the current round.
    AdvanceRound,
    /// Create a test.
    Create(NewTest),
    /// Start the test in the slot.
    Activate,
    /// Start a draft.
    ActivateDraft(TestId),
    /// Resolve now.
    EndEarly,
    /// Mark a complication as dealt with.
    ResolveComplication(ComplicationId),
    /// Archive the resolved test.
    Archive,
    /// Discard the test in the slot.
    Abandon,
}

impl Request {
    /// Short operation name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submit(_) => "submit",
            Self::RollResult { .. } => "roll result",
            Self::AutoRoll { .. } => "auto-roll",
            Self::Refresh => "refresh",
            Self::Approve { .. } => "approve",
            Self::Reject { .. } => "reject",
            Self::RemoveAction { .. } => "remove action",
            Self::AdjustTally(_) => "adjust tally",
            Self::AdvanceRound => "advance round",
            Self::Create(_) => "create",
            Self::Activate => "activate",
            Self::ActivateDraft(_) => "activate draft",
            Self::EndEarly => "end early",
            Self::ResolveComplication(_) => "resolve complication",
            Self::Archive => "archive",
            Self::Abandon => "abandon",
        }
    }

    /// Whether only the Director may make this request.
    pub fn director_only(&self) -> bool {
        !matches!(
            self,
            Self::Submit(_) | Self::RollResult { .. } | Self::AutoRoll { .. } | Self::Refresh
        )
    }
}

/// A request tagged with its caller.
#[derive(Debug, Clone)]
pub struct Command {
    /// Who is asking.
    pub caller: Caller,
    /// What they want.
    pub request: Request,
}

impl Command {
    /// A Director command.
    pub fn director(request: Request) -> Self {
        Self {
            caller: Caller::Director,
            request,
        }
    }

    /// A player command.
    pub fn player(user: impl Into<String>, request: Request) -> Self {
        Self {
            caller: Caller::Player(user.into()),
            request,
        }
    }
}

/// Check the caller's role and run the request.
pub fn apply(engine: &mut MontageEngine, command: Command) -> EngineResult<Ack> {
    let Command { caller, request } = command;
    if request.director_only() && !caller.is_director() {
        return Ok(engine.refuse(format!(
            "{caller} may not {}; that is for the Director",
            request.name()
        )));
    }
    debug!(%caller, request = request.name(), "applying request");

    match request {
        Request::Submit(mut submission) => {
            if let Caller::Player(user) = &caller {
                submission.submitted_by.get_or_insert_with(|| user.clone());
            }
            engine.submit_action(submission)
        }
        Request::RollResult { actor_id, roll } => engine.handle_roll_result(&actor_id, roll),
        Request::AutoRoll { actor_id, modifier } => engine.auto_roll(&actor_id, modifier),
        Request::Refresh => engine.refresh(),
        Request::Approve { actor_id, approval } => engine.approve_action(&actor_id, approval),
        Request::Reject { actor_id, reason } => engine.reject_action(&actor_id, &reason),
        Request::RemoveAction { actor_id } => engine.remove_action(&actor_id),
        Request::AdjustTally(adjustment) => engine.adjust_tally(adjustment),
        Request::AdvanceRound => engine.advance_round(),
        Request::Create(options) => engine.create_test(options),
        Request::Activate => engine.activate(),
        Request::ActivateDraft(id) => engine.activate_draft(id),
        Request::EndEarly => engine.end_test_early(),
        Request::ResolveComplication(id) => engine.resolve_complication(id),
        Request::Archive => engine.archive(),
        Request::Abandon => engine.abandon(),
    }
}

type Envelope = (Command, Sender<EngineResult<Ack>>);

/// Runs an engine on a dedicated thread.
pub struct Authority;

impl Authority {
    /// Move `engine` onto a new thread.
    ///
    /// The thread stops once every [`AuthorityHandle`] is dropped, and the
    /// join handle gives the engine back.
    pub fn spawn(engine: MontageEngine) -> EngineResult<(AuthorityHandle, JoinHandle<MontageEngine>)> {
        let (tx, rx): (Sender<Envelope>, Receiver<Envelope>) = unbounded();
        let world = engine.world().clone();
        let join = thread::Builder::new()
            .name(format!("montage-{world}"))
            .spawn(move || {
                let mut engine = engine;
                info!(world = %engine.world(), "montage authority started");
                for (command, reply) in rx {
                    let _ = reply.send(apply(&mut engine, command));
                }
                info!(world = %engine.world(), "montage authority stopped");
                engine
            })?;
        Ok((AuthorityHandle { tx }, join))
    }
}

/// Sends commands to an [`Authority`] thread. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AuthorityHandle {
    tx: Sender<Envelope>,
}

impl AuthorityHandle {
    /// Send a command and wait for its result.
    pub fn send(&self, command: Command) -> EngineResult<Ack> {
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send((command, reply_tx))
            .map_err(|_| EngineError::AuthorityClosed)?;
        reply_rx.recv().map_err(|_| EngineError::AuthorityClosed)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::notify::Notice;
    use crate::store::{MemoryStore, WorldId};
    use crate::transcript::Transcript;
    use montage_core::{ActionType, Hero, MontageDifficulty, TestDifficulty};
    use std::sync::Arc;

    fn engine() -> (MontageEngine, Arc<Transcript>) {
        let transcript = Arc::new(Transcript::new());
        let engine = MontageEngine::new(
            WorldId::from("authority"),
            Arc::new(MemoryStore::new()),
            EngineConfig::default().with_seed(1),
        )
        .with_notifier(transcript.clone());
        (engine, transcript)
    }

    fn create() -> Request {
        Request::Create(
            NewTest::new(MontageDifficulty::Moderate)
                .with_hero(Hero::new("hero-1", "Aria"))
                .with_hero(Hero::new("hero-2", "Bram")),
        )
    }

    #[test]
    fn players_cannot_run_director_requests() {
        let (mut engine, transcript) = engine();
        let ack = apply(&mut engine, Command::player("alice", create())).unwrap();
        assert!(matches!(ack, Ack::Refused(_)));
        assert!(engine.snapshot().unwrap().is_none());
        let warning = transcript.entries().pop().unwrap().notice;
        assert!(matches!(warning, Notice::Warning(msg) if msg.contains("player:alice may not create")));
    }

    #[test]
    fn player_submissions_are_tagged() {
        let (mut engine, _) = engine();
        apply(&mut engine, Command::director(create())).unwrap();
        apply(&mut engine, Command::director(Request::Activate)).unwrap();
        let submit = Request::Submit(ActionSubmission::new("hero-1", ActionType::Roll));
        let ack = apply(&mut engine, Command::player("alice", submit)).unwrap();
        assert_eq!(ack, Ack::Applied);
        let test = engine.snapshot().unwrap().unwrap();
        assert_eq!(
            test.pending_actions[0].submitted_by.as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn request_roles() {
        assert!(!Request::Refresh.director_only());
        assert!(Request::AdvanceRound.director_only());
        assert!(
            Request::Approve {
                actor_id: "x".into(),
                approval: ApprovalData::default()
            }
            .director_only()
        );
    }

    #[test]
    fn authority_thread_serializes_commands() {
        let (engine, _) = engine();
        let (handle, join) = Authority::spawn(engine).unwrap();
        assert_eq!(handle.send(Command::director(create())).unwrap(), Ack::Applied);
        assert_eq!(
            handle.send(Command::director(Request::Activate)).unwrap(),
            Ack::Applied
        );

        let workers: Vec<_> = ["hero-1", "hero-2"]
            .into_iter()
            .map(|id| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    handle
                        .send(Command::player(
                            id,
                            Request::Submit(ActionSubmission::new(id, ActionType::Roll)),
                        ))
                        .unwrap()
                })
            })
            .collect();
        for worker in workers {
            assert_eq!(worker.join().unwrap(), Ack::Applied);
        }

        let approve = Request::Approve {
            actor_id: "hero-1".into(),
            approval: ApprovalData::at(TestDifficulty::Easy),
        };
        assert_eq!(handle.send(Command::director(approve)).unwrap(), Ack::Applied);

        drop(handle);
        let engine = join.join().unwrap();
        let test = engine.snapshot().unwrap().unwrap();
        assert_eq!(test.pending_actions.len(), 1);
        assert_eq!(test.current_round().unwrap().actions.len(), 1);
    }

    #[test]
    fn thread_runs_until_last_handle_drops() {
        let (engine, _) = engine();
        let (handle, join) = Authority::spawn(engine).unwrap();
        let other = handle.clone();
        drop(handle);
        assert_eq!(
            other.send(Command::director(Request::Refresh)).unwrap(),
            Ack::Ignored
        );
        drop(other);
        let engine = join.join().unwrap();
        assert_eq!(engine.world(), &WorldId::from("authority"));
    }
}
