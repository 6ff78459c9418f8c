//! Hero actions: submissions awaiting approval and recorded round actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ActorId;
use crate::difficulty::TestDifficulty;
use crate::error::MontageError;
use crate::outcome::{AssistOutcome, TestOutcome, Tier};

/// What a hero does with their turn in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    /// Make a test; the result moves the tally by one.
    Roll,
    /// Help another hero's test; never moves the tally.
    Aid,
    /// Use an ability; the Director grants successes directly.
    Ability,
    /// Sit the round out.
    Nothing,
}

impl ActionType {
    /// Whether approving this action leaves it waiting for a roll.
    pub fn needs_roll(self) -> bool {
        matches!(self, Self::Roll | Self::Aid)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Roll => write!(f, "Roll"),
            Self::Aid => write!(f, "Aid"),
            Self::Ability => write!(f, "Ability"),
            Self::Nothing => write!(f, "Nothing"),
        }
    }
}

impl FromStr for ActionType {
    type Err = MontageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "roll" => Ok(Self::Roll),
            "aid" => Ok(Self::Aid),
            "ability" => Ok(Self::Ability),
            "nothing" => Ok(Self::Nothing),
            _ => Err(MontageError::UnknownActionType(s.to_string())),
        }
    }
}

/// A hero characteristic a test can be rolled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Characteristic {
    /// Raw strength.
    Might,
    /// Speed and coordination.
    Agility,
    /// Logic and learning.
    Reason,
    /// Awareness and instinct.
    Intuition,
    /// Force of personality.
    Presence,
}

impl Characteristic {
    /// All characteristics in sheet order.
    pub fn all() -> &'static [Self] {
        &[
            Self::Might,
            Self::Agility,
            Self::Reason,
            Self::Intuition,
            Self::Presence,
        ]
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Might => write!(f, "Might"),
            Self::Agility => write!(f, "Agility"),
            Self::Reason => write!(f, "Reason"),
            Self::Intuition => write!(f, "Intuition"),
            Self::Presence => write!(f, "Presence"),
        }
    }
}

impl FromStr for Characteristic {
    type Err = MontageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "might" => Ok(Self::Might),
            "agility" => Ok(Self::Agility),
            "reason" => Ok(Self::Reason),
            "intuition" => Ok(Self::Intuition),
            "presence" => Ok(Self::Presence),
            _ => Err(MontageError::UnknownCharacteristic(s.to_string())),
        }
    }
}

/// An action a hero has proposed, waiting for the Director.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSubmission {
    /// The acting hero.
    pub actor_id: ActorId,
    /// What the hero wants to do.
    pub action_type: ActionType,
    /// The player's narration of the attempt.
    #[serde(default)]
    pub description: String,
    /// For aid: the hero being helped.
    #[serde(default)]
    pub aid_target: Option<ActorId>,
    /// For roll and aid: the characteristic to roll.
    #[serde(default)]
    pub characteristic: Option<Characteristic>,
    /// For roll and aid: the skill that applies, if any.
    #[serde(default)]
    pub skill: Option<String>,
    /// For ability: the ability's name.
    #[serde(default)]
    pub ability_name: Option<String>,
    /// The user who submitted, so approvals and rejections can be addressed.
    #[serde(default)]
    pub submitted_by: Option<String>,
}

impl ActionSubmission {
    /// A submission with only the actor and type set.
    pub fn new(actor_id: impl Into<ActorId>, action_type: ActionType) -> Self {
        Self {
            actor_id: actor_id.into(),
            action_type,
            description: String::new(),
            aid_target: None,
            characteristic: None,
            skill: None,
            ability_name: None,
            submitted_by: None,
        }
    }

    /// Set the narration.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the aided hero.
    pub fn aiding(mut self, target: impl Into<ActorId>) -> Self {
        self.aid_target = Some(target.into());
        self
    }

    /// Set the characteristic and optional skill to roll.
    pub fn rolling(mut self, characteristic: Characteristic, skill: Option<String>) -> Self {
        self.characteristic = Some(characteristic);
        self.skill = skill;
        self
    }

    /// Set the ability name.
    pub fn using(mut self, ability: impl Into<String>) -> Self {
        self.ability_name = Some(ability.into());
        self
    }

    /// Record who submitted the action.
    pub fn by(mut self, user: impl Into<String>) -> Self {
        self.submitted_by = Some(user.into());
        self
    }
}

/// The Director's decisions when approving a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalData {
    /// Individual test difficulty for roll and aid actions.
    #[serde(default)]
    pub difficulty: Option<TestDifficulty>,
    /// Successes granted outright for an ability.
    #[serde(default)]
    pub auto_successes: u32,
    /// Director's private notes on the action.
    #[serde(default)]
    pub gm_notes: String,
}

impl ApprovalData {
    /// Approval at the given test difficulty.
    pub fn at(difficulty: TestDifficulty) -> Self {
        Self {
            difficulty: Some(difficulty),
            ..Self::default()
        }
    }

    /// Approval granting `count` successes.
    pub fn granting(count: u32) -> Self {
        Self {
            auto_successes: count,
            ..Self::default()
        }
    }
}

/// Change to the success and failure tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallyDelta {
    /// Successes added.
    pub successes: u32,
    /// Failures added.
    pub failures: u32,
}

/// One hero's action in a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The acting hero.
    pub actor_id: ActorId,
    /// The kind of action.
    pub action_type: ActionType,
    /// Narration.
    pub description: String,
    /// Characteristic rolled, for roll and aid.
    pub characteristic: Option<Characteristic>,
    /// Skill applied, for roll and aid.
    pub skill: Option<String>,
    /// Individual test difficulty set by the Director.
    pub difficulty: Option<TestDifficulty>,
    /// Roll total including modifiers.
    pub roll_total: Option<i32>,
    /// Natural 2d10 value.
    pub natural_roll: Option<u32>,
    /// Tier of the roll.
    pub tier: Option<Tier>,
    /// Outcome of a roll action.
    pub outcome: Option<TestOutcome>,
    /// Whether the action counted as a success.
    pub is_success: Option<bool>,
    /// Ability used, for ability actions.
    pub ability_name: Option<String>,
    /// Hero being helped, for aid actions.
    pub aid_target: Option<ActorId>,
    /// Roll quality granted to the helped hero.
    pub aid_result: Option<AssistOutcome>,
    /// Successes granted outright by the Director.
    pub auto_successes: u32,
    /// Whether the Director approved the action.
    pub approved: bool,
    /// Whether the action is finished.
    pub resolved: bool,
    /// Director's notes.
    pub gm_notes: String,
}

impl Action {
    /// An approved, unresolved action built from a submission.
    pub fn approved(submission: ActionSubmission, approval: &ApprovalData) -> Self {
        Self {
            actor_id: submission.actor_id,
            action_type: submission.action_type,
            description: submission.description,
            characteristic: submission.characteristic,
            skill: submission.skill,
            difficulty: approval.difficulty,
            roll_total: None,
            natural_roll: None,
            tier: None,
            outcome: None,
            is_success: None,
            ability_name: submission.ability_name,
            aid_target: submission.aid_target,
            aid_result: None,
            auto_successes: 0,
            approved: true,
            resolved: false,
            gm_notes: approval.gm_notes.clone(),
        }
    }

    /// Whether the action is approved and waiting for its roll.
    pub fn awaiting_roll(&self) -> bool {
        self.approved && !self.resolved
    }

    /// What this action added to the tallies.
    ///
    /// Unresolved actions and aid or nothing actions contribute nothing.
    pub fn tally_contribution(&self) -> TallyDelta {
        if !self.resolved {
            return TallyDelta::default();
        }
        match self.action_type {
            ActionType::Ability => TallyDelta {
                successes: self.auto_successes,
                failures: 0,
            },
            ActionType::Roll => match self.is_success {
                Some(true) => TallyDelta {
                    successes: 1,
                    failures: 0,
                },
                Some(false) => TallyDelta {
                    successes: 0,
                    failures: 1,
                },
                None => TallyDelta::default(),
            },
            ActionType::Aid | ActionType::Nothing => TallyDelta::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved_roll(success: bool) -> Action {
        let mut action = Action::approved(
            ActionSubmission::new("hero-1", ActionType::Roll),
            &ApprovalData::at(TestDifficulty::Medium),
        );
        action.is_success = Some(success);
        action.resolved = true;
        action
    }

    #[test]
    fn parse_action_types() {
        assert_eq!("AID".parse::<ActionType>().unwrap(), ActionType::Aid);
        assert!("dance".parse::<ActionType>().is_err());
        assert!(ActionType::Roll.needs_roll());
        assert!(!ActionType::Ability.needs_roll());
    }

    #[test]
    fn parse_characteristics() {
        assert_eq!(
            "presence".parse::<Characteristic>().unwrap(),
            Characteristic::Presence
        );
        assert!("luck".parse::<Characteristic>().is_err());
        assert_eq!(Characteristic::all().len(), 5);
    }

    #[test]
    fn approved_action_copies_submission() {
        let submission = ActionSubmission::new("hero-1", ActionType::Aid)
            .describe("Holds the rope")
            .aiding("hero-2")
            .rolling(Characteristic::Might, Some("Climb".into()));
        let action = Action::approved(submission, &ApprovalData::at(TestDifficulty::Hard));
        assert!(action.awaiting_roll());
        assert_eq!(action.aid_target, Some(ActorId::from("hero-2")));
        assert_eq!(action.difficulty, Some(TestDifficulty::Hard));
        assert_eq!(action.skill.as_deref(), Some("Climb"));
    }

    #[test]
    fn contribution_of_rolls() {
        assert_eq!(
            resolved_roll(true).tally_contribution(),
            TallyDelta {
                successes: 1,
                failures: 0
            }
        );
        assert_eq!(
            resolved_roll(false).tally_contribution(),
            TallyDelta {
                successes: 0,
                failures: 1
            }
        );
    }

    #[test]
    fn contribution_of_ability_and_unresolved() {
        let mut ability = Action::approved(
            ActionSubmission::new("hero-1", ActionType::Ability),
            &ApprovalData::granting(2),
        );
        assert_eq!(ability.tally_contribution(), TallyDelta::default());
        ability.auto_successes = 2;
        ability.resolved = true;
        assert_eq!(ability.tally_contribution().successes, 2);
    }
}
