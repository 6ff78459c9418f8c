//! Chat command surface: `/montage` and `/montage new`.

use montage_core::MontageTest;

use crate::authority::Caller;

/// A recognized chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashCommand {
    /// `/montage`: open the tracker for the current test.
    Open,
    /// `/montage new`: open the configuration view.
    New,
}

/// Which view a caller should see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Test configuration.
    Configure,
    /// The Director's tracker with approvals and tally controls.
    DirectorTracker,
    /// The player's tracker with the action form.
    PlayerTracker,
}

/// Parse a chat message. Anything else is not ours and yields `None`.
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let mut words = input.split_whitespace();
    if !words.next()?.eq_ignore_ascii_case("/montage") {
        return None;
    }
    match (words.next(), words.next()) {
        (None, _) => Some(SlashCommand::Open),
        (Some(word), None) if word.eq_ignore_ascii_case("new") => Some(SlashCommand::New),
        _ => None,
    }
}

/// The view a command opens for a caller.
///
/// The Director gets the configuration view when there is no test; players
/// always get their tracker. `/montage new` is for the Director only.
pub fn view_for(caller: &Caller, command: SlashCommand, test: Option<&MontageTest>) -> Option<View> {
    match (caller, command) {
        (Caller::Director, SlashCommand::New) => Some(View::Configure),
        (Caller::Director, SlashCommand::Open) => Some(match test {
            Some(_) => View::DirectorTracker,
            None => View::Configure,
        }),
        (Caller::Player(_), SlashCommand::Open) => Some(View::PlayerTracker),
        (Caller::Player(_), SlashCommand::New) => None,
    }
}
