use assert_cmd::Command;
use serde_json::json;

use crate::common;

#[test]
fn full_run_merges_tags_and_reports() {
  let td = tempfile::TempDir::new().unwrap();
  let bundle = json!({
    "events": [
      common::issue_event("jdoe", "Jane Doe", "jane@corp.com", "2021-01-05T10:00:00"),
      // PR-tracked commit, so no direct push is inferred for Jane.
      common::commit_event("Jane Doe", "jane@corp.com", "c1", "2021-02-01T09:00:00"),
      common::admin_event("pr_MergedEvent", "maint", "2021-03-01T12:00:00"),
      common::star_event("dependabot", "2021-04-01T00:00:00"),
    ],
    "pull_requests": [
      {"user_login": "jdoe", "merge_commit_sha": "m1", "commits_data": ["c1"]}
    ],
    "login_author_map": {"jdoe": ["Jane Doe"]},
  });
  let (events, orgs, bots) = common::write_fixture(td.path(), &bundle);
  let out_dir = td.path().join("out");

  let assert = Command::cargo_bin("contributor-cohort-report")
    .unwrap()
    .args([
      "--repo",
      common::REPO,
      "--events",
      events.to_str().unwrap(),
      "--orgs",
      orgs.to_str().unwrap(),
      "--bots",
      bots.to_str().unwrap(),
      "--since",
      "2021-01-01",
      "--until",
      "2022-01-01",
      "--out",
      out_dir.to_str().unwrap(),
    ])
    .assert()
    .success();
  let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
  assert!(stdout.contains("out"));

  let records = common::read_json(&out_dir.join("contributors.json"));
  assert_eq!(records.as_array().unwrap().len(), 3);

  // Platform and git identities unified into one record with the org resolved.
  let jane = common::find_record(&records, "jdoe").unwrap();
  assert!(jane["id_git_author_name_list"].as_array().unwrap().iter().any(|n| n == "Jane Doe"));
  assert_eq!(jane["org_name"], "Corp");
  assert_eq!(jane["domain"], "corp.com");
  assert_eq!(jane["is_bot"], false);
  assert_eq!(jane["issue_creation_date_list"][0], "2021-01-05T10:00:00");
  assert_eq!(jane["first_code_commit_date"], "2021-02-01T09:00:00");

  let bot = common::find_record(&records, "dependabot").unwrap();
  assert_eq!(bot["is_bot"], true);

  let maint = common::find_record(&records, "maint").unwrap();
  assert_eq!(maint["is_leader"], true);

  // Fresh run: nothing absorbed.
  let absorbed = common::read_json(&out_dir.join("absorbed.json"));
  assert_eq!(absorbed.as_array().unwrap().len(), 0);

  let report = common::read_json(&out_dir.join("report-year-2021-01-01.json"));
  assert_eq!(report["period"], "year");
  // Jane: 2 activity-channel contributions, first-ever inside the window.
  assert!(report["attraction_casual"]["list"].as_array().unwrap().iter().any(|n| n == "jdoe"));
  // Bots never enter cohorts.
  assert!(!report["active"]["list"].as_array().unwrap().iter().any(|n| n == "dependabot"));
  // The maintainer's only event is not an activity channel and is stale by year end.
  assert!(report["silence"]["list"].as_array().unwrap().iter().any(|n| n == "maint"));
}
