use std::path::{Path, PathBuf};

use serde_json::{Value, json};

pub const REPO: &str = "https://github.com/acme/widget";

#[allow(dead_code)]
pub fn issue_event(login: &str, author_name: &str, email: &str, timestamp: &str) -> Value {
  json!({
    "event_type": "issue",
    "timestamp": timestamp,
    "user_login": login,
    "author_name": author_name,
    "user_email": email,
  })
}

#[allow(dead_code)]
pub fn commit_event(author: &str, email: &str, hash: &str, timestamp: &str) -> Value {
  json!({
    "event_type": "commit",
    "timestamp": timestamp,
    "author_name": author,
    "author_email": email,
    "committer_name": author,
    "committer_email": email,
    "hash": hash,
  })
}

#[allow(dead_code)]
pub fn admin_event(event_type: &str, actor: &str, timestamp: &str) -> Value {
  json!({
    "event_type": event_type,
    "timestamp": timestamp,
    "actor_username": actor,
  })
}

#[allow(dead_code)]
pub fn star_event(login: &str, timestamp: &str) -> Value {
  json!({
    "event_type": "star",
    "timestamp": timestamp,
    "user_login": login,
  })
}

#[allow(dead_code)]
pub fn write_json(path: &Path, value: &Value) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

#[allow(dead_code)]
pub fn read_json(path: &Path) -> Value {
  serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

/// Lay down an events bundle plus org/bot configs in `dir`; returns
/// (events, orgs, bots) paths.
#[allow(dead_code)]
pub fn write_fixture(dir: &Path, bundle: &Value) -> (PathBuf, PathBuf, PathBuf) {
  let events = dir.join("events.json");
  write_json(&events, bundle);

  let orgs = dir.join("orgs.json");
  write_json(
    &orgs,
    &json!({
      "organizations": {"Corp": [{"domain": "corp.com"}]},
    }),
  );

  let bots = dir.join("bots.json");
  write_json(&bots, &json!({"common": {"pattern": ["*bot*"]}}));

  (events, orgs, bots)
}

#[allow(dead_code)]
pub fn find_record<'a>(records: &'a Value, login_or_name: &str) -> Option<&'a Value> {
  records.as_array().unwrap().iter().find(|record| {
    let in_list = |field: &str| {
      record[field]
        .as_array()
        .map(|names| names.iter().any(|n| n == login_or_name))
        .unwrap_or(false)
    };
    in_list("id_platform_login_name_list") || in_list("id_git_author_name_list")
  })
}
