use assert_cmd::Command;
use serde_json::json;

use crate::common;

// One contributor: active in Q1, quiet through Q2/Q3, back in Q4.
#[test]
fn quarterly_reports_track_silence_and_wakeup() {
  let td = tempfile::TempDir::new().unwrap();
  let bundle = json!({
    "events": [
      common::issue_event("jdoe", "Jane Doe", "jane@corp.com", "2021-01-15T10:00:00"),
      common::issue_event("jdoe", "Jane Doe", "jane@corp.com", "2021-11-15T10:00:00"),
    ],
  });
  let events = td.path().join("events.json");
  common::write_json(&events, &bundle);
  let out_dir = td.path().join("out");

  Command::cargo_bin("contributor-cohort-report")
    .unwrap()
    .args([
      "--repo",
      common::REPO,
      "--events",
      events.to_str().unwrap(),
      "--since",
      "2021-01-01",
      "--until",
      "2022-01-01",
      "--period",
      "quarter",
      "--out",
      out_dir.to_str().unwrap(),
    ])
    .assert()
    .success();

  let q1 = common::read_json(&out_dir.join("report-quarter-2021-01-01.json"));
  assert!(q1["attraction_casual"]["list"].as_array().unwrap().iter().any(|n| n == "jdoe"));
  assert_eq!(q1["silence"]["count"], 0);

  let q3 = common::read_json(&out_dir.join("report-quarter-2021-07-01.json"));
  assert!(q3["silence"]["list"].as_array().unwrap().iter().any(|n| n == "jdoe"));
  assert_eq!(q3["active"]["count"], 0);

  let q4 = common::read_json(&out_dir.join("report-quarter-2021-10-01.json"));
  assert!(q4["wakeup"]["list"].as_array().unwrap().iter().any(|n| n == "jdoe"));
  assert_eq!(q4["wakeup"]["ratio"], 1.0);
  // Returning after the gap counts as retention, not attraction.
  assert!(q4["retention_casual"]["list"].as_array().unwrap().iter().any(|n| n == "jdoe"));
  assert!(q4["retention_casual"]["from_silence"]["list"].as_array().unwrap().iter().any(|n| n == "jdoe"));
  // Q1, Q2, Q3 history rows plus the current waiting row.
  assert_eq!(q4["wakeup"]["same_period"].as_array().unwrap().len(), 4);
}
