//! Integration tests for the montage CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `montage` command pointed at `dir`.
fn montage(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("montage").unwrap();
    cmd.args(["--data", dir.path().to_str().unwrap()]);
    cmd
}

/// Create an easy test for Aria and Bram (2 successes needed, 2 failures allowed).
fn bridge(dir: &TempDir) {
    montage(dir)
        .args([
            "new", "-d", "easy", "-n", "Bridge", "--hero", "a:Aria", "--hero", "b:Bram",
        ])
        .assert()
        .success();
}

fn bridge_active(dir: &TempDir) {
    bridge(dir);
    montage(dir).arg("activate").assert().success();
}

// ---------------------------------------------------------------------------
// limits
// ---------------------------------------------------------------------------

#[test]
fn limits_scale_with_party_size() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .args(["limits", "easy", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Easy: 2 successes needed, 2 failures allowed",
        ));
    montage(&dir)
        .args(["limits", "hard", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Hard: 9 successes needed, 5 failures allowed",
        ));
}

#[test]
fn limits_rejects_unknown_difficulty() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .args(["limits", "brutal", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// ---------------------------------------------------------------------------
// new / status
// ---------------------------------------------------------------------------

#[test]
fn new_creates_test_in_setup() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .args(["new", "-d", "easy", "-n", "Bridge", "--hero", "a:Aria"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bridge created").and(predicate::str::contains("Created")));

    montage(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Bridge")
                .and(predicate::str::contains("setup"))
                .and(predicate::str::contains("Aria")),
        );
}

#[test]
fn status_without_test() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No montage test"));
}

#[test]
fn activate_without_test_changes_nothing() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .arg("activate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing changed."));
}

#[test]
fn second_test_refused_while_one_is_active() {
    let dir = TempDir::new().unwrap();
    bridge_active(&dir);
    montage(&dir)
        .args(["new", "-n", "Another"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warning:"));
}

// ---------------------------------------------------------------------------
// a full montage
// ---------------------------------------------------------------------------

#[test]
fn montage_runs_to_total_success() {
    let dir = TempDir::new().unwrap();
    bridge(&dir);
    montage(&dir)
        .arg("activate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bridge is now active"));

    for (actor, user) in [("a", "player:alice"), ("b", "player:bob")] {
        montage(&dir)
            .args(["--as", user, "submit", actor, "roll", "-m", "climb the ropes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("(to director)"));
        montage(&dir)
            .args(["approve", actor])
            .assert()
            .success()
            .stdout(predicate::str::contains("approved"));
    }

    montage(&dir)
        .args(["roll", "a", "18"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aria rolled 18: Success"));
    montage(&dir)
        .args(["roll", "b", "15"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("round 1 complete")
                .and(predicate::str::contains("Bridge: Total Success (1 victories)")),
        );

    montage(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Success"));
    montage(&dir)
        .arg("transcript")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("# Montage Transcript")
                .and(predicate::str::contains("Bram submitted Roll")),
        );
    montage(&dir)
        .arg("archive")
        .assert()
        .success()
        .stdout(predicate::str::contains("Archived"));
    montage(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No montage test"));
}

#[test]
fn ending_early_without_successes_fails() {
    let dir = TempDir::new().unwrap();
    bridge_active(&dir);
    montage(&dir)
        .arg("end")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bridge: Total Failure (0 victories)"));
}

#[test]
fn tally_adjustment_can_finish_test() {
    let dir = TempDir::new().unwrap();
    bridge_active(&dir);
    montage(&dir)
        .args(["tally", "-s", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Success"));
}

#[test]
fn tally_needs_a_value() {
    let dir = TempDir::new().unwrap();
    bridge_active(&dir);
    montage(&dir)
        .arg("tally")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--successes"));
}

#[test]
fn abandon_clears_the_slot() {
    let dir = TempDir::new().unwrap();
    bridge_active(&dir);
    montage(&dir)
        .arg("abandon")
        .assert()
        .success()
        .stdout(predicate::str::contains("Abandoned"));
    montage(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No montage test"));
}

// ---------------------------------------------------------------------------
// roles
// ---------------------------------------------------------------------------

#[test]
fn players_cannot_approve() {
    let dir = TempDir::new().unwrap();
    bridge_active(&dir);
    montage(&dir)
        .args(["--as", "player:alice", "submit", "a", "roll"])
        .assert()
        .success();
    montage(&dir)
        .args(["--as", "player:alice", "approve", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("player:alice may not approve"));
}

#[test]
fn unknown_role_is_rejected() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .args(["--as", "nobody", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown role"));
}

#[test]
fn reject_reaches_submitting_player() {
    let dir = TempDir::new().unwrap();
    bridge_active(&dir);
    montage(&dir)
        .args(["--as", "player:alice", "submit", "a", "roll"])
        .assert()
        .success();
    montage(&dir)
        .args(["reject", "a", "-r", "not plausible"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("(to alice)")
                .and(predicate::str::contains("Aria's action rejected: not plausible")),
        );
}

// ---------------------------------------------------------------------------
// rolls
// ---------------------------------------------------------------------------

#[test]
fn impossible_natural_roll_fails() {
    let dir = TempDir::new().unwrap();
    bridge_active(&dir);
    montage(&dir)
        .args(["roll", "a", "10", "-n", "25"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not possible"));
}

#[test]
fn high_total_without_natural_is_not_critical() {
    let dir = TempDir::new().unwrap();
    bridge_active(&dir);
    montage(&dir).args(["submit", "a", "roll"]).assert().success();
    montage(&dir)
        .args(["approve", "a", "-d", "medium"])
        .assert()
        .success();
    montage(&dir)
        .args(["roll", "a", "19"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Aria rolled 19: Success")
                .and(predicate::str::contains("Reward").not()),
        );
}

#[test]
fn natural_nineteen_is_critical() {
    let dir = TempDir::new().unwrap();
    bridge_active(&dir);
    montage(&dir).args(["submit", "a", "roll"]).assert().success();
    montage(&dir)
        .args(["approve", "a", "-d", "hard"])
        .assert()
        .success();
    montage(&dir)
        .args(["roll", "a", "19", "-n", "19"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Aria rolled 19 (natural 19): Success with Reward",
        ));
}

#[test]
fn huge_round_budget_is_capped() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .args(["new", "-d", "easy", "--hero", "a:Aria", "--rounds", "4294967295"])
        .assert()
        .success();
    montage(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 100"));
    montage(&dir).arg("activate").assert().success();
    montage(&dir)
        .arg("end")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Failure"));
}

#[test]
fn roll_without_approved_action_changes_nothing() {
    let dir = TempDir::new().unwrap();
    bridge_active(&dir);
    montage(&dir)
        .args(["roll", "a", "12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing changed."));
}

#[test]
fn auto_roll_resolves_approved_action() {
    let dir = TempDir::new().unwrap();
    bridge_active(&dir);
    montage(&dir).args(["submit", "a", "roll"]).assert().success();
    montage(&dir)
        .args(["approve", "a", "-d", "easy"])
        .assert()
        .success();
    montage(&dir)
        .args(["auto-roll", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aria rolled"));
}

// ---------------------------------------------------------------------------
// drafts
// ---------------------------------------------------------------------------

#[test]
fn drafts_save_list_and_activate() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .args(["drafts", "save", "-n", "Later", "--hero", "a:Aria"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));
    montage(&dir)
        .args(["drafts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Later").and(predicate::str::contains("1 drafts")));

    let store = std::fs::read_to_string(dir.path().join("default.json")).unwrap();
    let slot: serde_json::Value = serde_json::from_str(&store).unwrap();
    let id = slot["drafts"][0]["id"].as_str().unwrap().to_string();

    montage(&dir)
        .args(["activate", "--draft", &id[..8]])
        .assert()
        .success()
        .stdout(predicate::str::contains("Later is now active"));
    montage(&dir)
        .args(["drafts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No drafts."));
}

#[test]
fn players_cannot_save_drafts() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .args(["--as", "player:alice", "drafts", "save", "-n", "Sneaky"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only the Director"));
}

#[test]
fn deleting_unknown_draft_fails() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .args(["drafts", "delete", "ffff"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no draft matches"));
}

// ---------------------------------------------------------------------------
// roster
// ---------------------------------------------------------------------------

#[test]
fn roster_heroes_join_new_tests() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .args(["hero", "add", "a", "Aria", "--stat", "might=2"])
        .assert()
        .success();
    montage(&dir)
        .args(["hero", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aria").and(predicate::str::contains("+2")));

    montage(&dir).args(["new", "-d", "easy"]).assert().success();
    montage(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aria"));
}

#[test]
fn hero_stat_needs_a_value() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .args(["hero", "add", "a", "Aria", "--stat", "might"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("name=value"));
}

// ---------------------------------------------------------------------------
// open / transcript
// ---------------------------------------------------------------------------

#[test]
fn open_picks_view_by_role() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .args(["open", "/montage new"])
        .assert()
        .success()
        .stdout(predicate::str::contains("configure"));
    montage(&dir)
        .args(["--as", "player:alice", "open", "/montage new"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Only the Director"));
    montage(&dir)
        .args(["open", "hello there"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not a montage command"));
}

#[test]
fn transcript_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    montage(&dir)
        .args(["transcript", "-f", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported format"));
}
