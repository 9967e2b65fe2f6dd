use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
  Command::cargo_bin("contributor-cohort-report").unwrap()
}

#[test]
fn errors_without_required_args() {
  cmd().assert().failure().stderr(predicate::str::contains("--repo"));
}

#[test]
fn errors_on_inverted_range() {
  cmd()
    .args([
      "--repo",
      "https://github.com/acme/widget",
      "--events",
      "events.json",
      "--since",
      "2022-01-01",
      "--until",
      "2021-01-01",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--until must be after --since"));
}

#[test]
fn errors_on_missing_events_file() {
  let td = tempfile::TempDir::new().unwrap();
  cmd()
    .args([
      "--repo",
      "https://github.com/acme/widget",
      "--events",
      td.path().join("nope.json").to_str().unwrap(),
      "--since",
      "2021-01-01",
      "--until",
      "2022-01-01",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("nope.json"));
}
