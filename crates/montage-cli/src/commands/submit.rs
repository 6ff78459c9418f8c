use clap::Args;
use montage_core::{ActionSubmission, ActionType, Characteristic, MontageError};
use montage_engine::Request;

use super::Session;

#[derive(Args)]
pub struct SubmitArgs {
    /// Acting hero's actor ID
    pub actor: String,

    /// Action type: roll, aid, ability, nothing
    pub action_type: String,

    /// What the hero attempts
    #[arg(short = 'm', long)]
    pub describe: Option<String>,

    /// For aid: the hero being helped
    #[arg(long)]
    pub aid: Option<String>,

    /// For roll and aid: characteristic to roll
    #[arg(short, long)]
    pub characteristic: Option<String>,

    /// For roll and aid: skill that applies
    #[arg(short, long)]
    pub skill: Option<String>,

    /// For ability: the ability's name
    #[arg(long)]
    pub ability: Option<String>,
}

pub fn run(session: &mut Session, args: SubmitArgs) -> Result<(), String> {
    let action_type: ActionType = args
        .action_type
        .parse()
        .map_err(|e: MontageError| e.to_string())?;
    let mut submission = ActionSubmission::new(args.actor.as_str(), action_type)
        .describe(args.describe.unwrap_or_default());

    match action_type {
        ActionType::Aid => {
            let target = args
                .aid
                .ok_or("an aid action needs --aid <hero> naming who is helped")?;
            submission = submission.aiding(target);
        }
        ActionType::Ability => {
            if let Some(ability) = args.ability {
                submission = submission.using(ability);
            }
        }
        ActionType::Roll | ActionType::Nothing => {}
    }
    if let Some(raw) = args.characteristic.filter(|_| action_type.needs_roll()) {
        let characteristic: Characteristic =
            raw.parse().map_err(|e: MontageError| e.to_string())?;
        submission = submission.rolling(characteristic, args.skill);
    }

    session.send(Request::Submit(submission))?;
    Ok(())
}
