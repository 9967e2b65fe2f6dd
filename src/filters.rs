// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Classify merged contributors as bots (name-pattern registry) and leaders (event/push provenance)
// role: processing/classifiers
// inputs: Bot registry config; raw events and PR cross-references for one repository
// outputs: Pure is_bot predicate over name variants; leader name set
// invariants: first bot match wins; no match means not a bot; leader set is event-actors ∪ direct-push authors
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::extract::{is_direct_commit, pr_hash_set};
use crate::model::{PullRequestRecord, RawEvent};
use crate::util::read_json;

/// Event types whose actors hold elevated repository privileges outright.
const PRIVILEGED_EVENTS: &[&str] = &[
  "LabeledEvent",
  "UnlabeledEvent",
  "MergedEvent",
  "AssignedEvent",
  "LockedEvent",
  "MilestonedEvent",
  "MarkedAsDuplicateEvent",
  "TransferredEvent",
];

/// Review verdicts that count as a maintainer acting on a PR.
const REVIEW_STATES: &[&str] = &["APPROVED", "CHANGES_REQUESTED", "DISMISSED"];

#[derive(Debug, Default, Deserialize)]
struct CommonSection {
  #[serde(default)]
  pattern: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RepoSection {
  #[serde(default)]
  author_name: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CommunitySection {
  #[serde(default)]
  author_name: Vec<String>,
  #[serde(default)]
  repo: BTreeMap<String, RepoSection>,
}

/// On-disk shape of the bot registry config.
#[derive(Debug, Default, Deserialize)]
struct BotConfig {
  #[serde(default)]
  common: CommonSection,
  #[serde(default)]
  community: BTreeMap<String, CommunitySection>,
}

/// Name-based bot classifier: global glob patterns, community name sets
/// (key substring-matched against the repo URL), and exact-repo name sets.
#[derive(Debug, Default)]
pub struct BotRegistry {
  common: Vec<Regex>,
  community: BTreeMap<String, BTreeSet<String>>,
  repo: BTreeMap<String, BTreeSet<String>>,
}

impl BotRegistry {
  pub fn load<P: AsRef<Path>>(path: P) -> Result<BotRegistry> {
    let config: BotConfig = read_json(path)?;
    BotRegistry::from_config(config)
  }

  fn from_config(config: BotConfig) -> Result<BotRegistry> {
    let mut common = Vec::new();
    for glob in &config.common.pattern {
      // Glob `*` becomes `.*`, anchored to the full name.
      let pattern = format!("^{}$", glob.replace('*', ".*"));
      common.push(Regex::new(&pattern).with_context(|| format!("bot pattern {glob:?}"))?);
    }
    let mut community = BTreeMap::new();
    let mut repo = BTreeMap::new();
    for (community_key, section) in config.community {
      if !section.author_name.is_empty() {
        community.insert(community_key, section.author_name.into_iter().collect());
      }
      for (repo_url, repo_section) in section.repo {
        if !repo_section.author_name.is_empty() {
          repo.insert(repo_url, repo_section.author_name.into_iter().collect());
        }
      }
    }
    Ok(BotRegistry { common, community, repo })
  }

  /// First match wins; no match means not a bot.
  pub fn is_bot(&self, repo_url: &str, name_variants: &[&str]) -> bool {
    for name in name_variants {
      if self.common.iter().any(|regex| regex.is_match(name)) {
        return true;
      }
      for (community_key, names) in &self.community {
        if repo_url.contains(community_key.as_str()) && names.contains(*name) {
          return true;
        }
      }
      if let Some(names) = self.repo.get(repo_url) {
        if names.contains(*name) {
          return true;
        }
      }
    }
    false
  }
}

/// Raw names of contributors inferred to hold repository privileges:
/// actors of privileged events (including close/reopen by someone other
/// than the reporter and real review verdicts) plus authors of commits
/// that reached the default branch without going through a tracked PR.
pub fn leader_names(events: &[RawEvent], pull_requests: &[PullRequestRecord]) -> BTreeSet<String> {
  let pr_hashes = pr_hash_set(pull_requests);
  let mut leaders = BTreeSet::new();
  for event in events {
    if event.event_type == "commit" {
      if is_direct_commit(event, &pr_hashes) {
        if let Some(author) = &event.author_name {
          leaders.insert(author.clone());
        }
      }
      continue;
    }
    let Some(actor) = event.actor_username.as_deref().or(event.user_login.as_deref()) else {
      continue;
    };
    let event_kind = event
      .event_type
      .strip_prefix("issue_")
      .or_else(|| event.event_type.strip_prefix("pr_"))
      .unwrap_or(&event.event_type);
    let privileged = if PRIVILEGED_EVENTS.contains(&event_kind) {
      true
    } else if event_kind == "ClosedEvent" || event_kind == "ReopenedEvent" {
      matches!(&event.reporter_user_name, Some(reporter) if reporter != actor)
    } else if event_kind == "PullRequestReview" {
      matches!(&event.merge_state, Some(state) if REVIEW_STATES.contains(&state.as_str()))
    } else {
      false
    };
    if privileged {
      leaders.insert(actor.to_string());
    }
  }
  leaders
}
