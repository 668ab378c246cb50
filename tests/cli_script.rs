mod common;

use std::path::Path;

use assert_cmd::Command;
use common::{streaming_pair, temp_base, write_snapshot};
use predicates::prelude::*;
use predicates::str::contains;

fn script_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("subtrack_cli").unwrap();
    cmd.env("SUBTRACK_CLI_SCRIPT", "1")
        .env("SUBTRACK_HOME", home)
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn script_mode_loads_snapshot_and_summarizes() {
    let home = temp_base();
    let snapshot = write_snapshot(&streaming_pair());
    let input = format!(
        "load {}\nlist\nsummary --today 2024-06-01\nexit\n",
        snapshot.display()
    );

    script_cmd(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Loaded 2 subscriptions"))
        .stdout(contains("Netflix"))
        .stdout(contains("Cost summary 2024"))
        .stdout(contains("$240.00"))
        .stdout(contains("$20.00"));

    let config = std::fs::read_to_string(home.join("config.json")).unwrap();
    assert!(config.contains("snapshot.json"));
}

#[test]
fn occurrences_command_expands_rules() {
    let home = temp_base();
    script_cmd(&home)
        .write_stdin("occurrences 'FREQ=MONTHLY;BYDAY=-1FR' 2024-01-01 2024-03-31\n")
        .assert()
        .success()
        .stdout(contains("2024-01-26"))
        .stdout(contains("2024-02-23"))
        .stdout(contains("2024-03-29"))
        .stdout(contains("3 occurrence(s)"));
}

#[test]
fn bad_input_is_reported_without_aborting() {
    let home = temp_base();
    script_cmd(&home)
        .write_stdin("occurrences 'FREQ=HOURLY' 2024-01-01 2024-01-02\nsumary\nsummary\nversion\n")
        .assert()
        .success()
        .stdout(contains("invalid recurrence rule"))
        .stdout(contains("Did you mean `summary`?"))
        .stdout(contains("No snapshot loaded"))
        .stdout(contains("Subtrack"));
}

#[test]
fn config_changes_currency_and_persists() {
    let home = temp_base();
    let snapshot = write_snapshot(&streaming_pair());
    let input = format!(
        "config set currency eur\nload {}\ncalendar 2024 3\nconfig show\n",
        snapshot.display()
    );

    script_cmd(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Renewals 2024-03"))
        .stdout(contains("€120.00"))
        .stdout(contains("€130.00"))
        .stdout(contains("EUR"));

    let config = std::fs::read_to_string(home.join("config.json")).unwrap();
    assert!(config.contains("\"EUR\""));
}

#[test]
fn locale_changes_amount_separators() {
    let home = temp_base();
    let snapshot = write_snapshot(&streaming_pair());
    let input = format!(
        "config set currency eur\nconfig set locale de-DE\nload {}\ncalendar 2024 3\n",
        snapshot.display()
    );

    script_cmd(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("€120,00"))
        .stdout(contains("€130,00"))
        .stdout(contains("€130.00").not());
}

#[test]
fn dashboard_excludes_uncounted_categories() {
    let home = temp_base();
    let mut records = streaming_pair();
    records[1].state = subtrack_core::SubscriptionState::Canceled;
    let snapshot = write_snapshot(&records);
    let input = format!(
        "load {}\ndashboard --today 2024-10-16\n",
        snapshot.display()
    );

    script_cmd(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Dashboard as of 2024-10-16"))
        .stdout(contains("canceled: 1"))
        .stdout(contains("Storage").not());
}
