// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn raw events into identity fragments: one channel/date observation with normalized join keys
// role: processing/extraction
// inputs: EventBundle events plus the PR cross-reference; org directory for email → org intervals
// outputs: Fragments ready for accumulator folding; direct-commit derivation
// invariants: events with no usable identity key are dropped, never errored; each fragment carries at least one key
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::channel::{Channel, Side};
use crate::config::OrgDirectory;
use crate::identity::{email_parts, login_author_pair, normalize_identity};
use crate::model::{Contributor, EventBundle, OrgInterval, PullRequestRecord, RawEvent};
use crate::util::{fmt_ts, parse_ts, stable_uuid};

/// One identity observation: a single event reduced to its channel, its
/// date, and the identity material it carried.
#[derive(Debug, Clone)]
pub struct Fragment {
  pub channel: Channel,
  pub date: NaiveDateTime,
  pub seed_uuid: String,
  pub identity_keys: BTreeSet<String>,
  pub login: Option<String>,
  pub author_name: Option<String>,
  pub email: Option<String>,
  pub org_interval: Option<OrgInterval>,
}

impl Fragment {
  /// A single-event contributor seed, ready to be folded into an
  /// accumulator. Which identity sets get populated follows the side.
  pub fn to_contributor(&self) -> Contributor {
    let mut c = Contributor::new(self.seed_uuid.clone(), self.date);
    match self.channel.side() {
      Side::Platform => {
        if let Some(login) = &self.login {
          c.platform_logins.insert(login.clone());
          c.platform_login_author_names
            .insert(login_author_pair(Some(login), self.author_name.as_deref()));
        }
        if let Some(name) = &self.author_name {
          c.platform_author_names.insert(name.clone());
        }
        if let Some(email) = &self.email {
          c.platform_author_emails.insert(email.clone());
        }
      }
      Side::Git => {
        if let Some(name) = &self.author_name {
          c.git_author_names.insert(name.clone());
        }
        if let Some(email) = &self.email {
          c.git_author_emails.insert(email.clone());
        }
      }
    }
    c.identity_keys = self.identity_keys.clone();
    c.activity.entry(self.channel).or_default().insert(self.date);
    if let Some(interval) = &self.org_interval {
      c.org_history.push(interval.clone());
    }
    c
  }
}

/// Every commit hash known to have reached the default branch through a
/// tracked pull request: merge commits plus the PRs' own commits.
pub fn pr_hash_set(pull_requests: &[PullRequestRecord]) -> BTreeSet<String> {
  let mut hashes = BTreeSet::new();
  for pr in pull_requests {
    if let Some(sha) = &pr.merge_commit_sha {
      hashes.insert(sha.clone());
    }
    hashes.extend(pr.commits_data.iter().cloned());
  }
  hashes
}

/// A commit counts as a direct push when its hash is unknown to every
/// tracked PR and it was either committed through the hosting provider's
/// web flow or self-committed by its author.
pub fn is_direct_commit(event: &RawEvent, pr_hashes: &BTreeSet<String>) -> bool {
  if event.event_type != "commit" {
    return false;
  }
  let Some(hash) = &event.hash else { return false };
  if pr_hashes.contains(hash) {
    return false;
  }
  let web_flow = matches!(
    &event.committer_email,
    Some(email) if email.ends_with("noreply.github.com") || email.ends_with("noreply.gitee.com")
  );
  let self_committed = event.committer_name.is_some()
    && event.committer_name == event.author_name
    && event.committer_email == event.author_email;
  web_flow || self_committed
}

/// Reduce the bundle's events to fragments. Events with an unknown tag, an
/// unparseable timestamp, or no identity key that survives normalization
/// are logged and dropped.
pub fn extract(repo: &str, bundle: &EventBundle, org_dir: &OrgDirectory) -> Vec<Fragment> {
  let pr_hashes = pr_hash_set(&bundle.pull_requests);
  let mut fragments = Vec::new();
  for event in &bundle.events {
    let Some(channel) = Channel::from_tag(&event.event_type) else {
      debug!(event_type = %event.event_type, "skipping event with unknown tag");
      continue;
    };
    let date = match parse_ts(&event.timestamp) {
      Ok(date) => date,
      Err(err) => {
        warn!(timestamp = %event.timestamp, %err, "skipping event with bad timestamp");
        continue;
      }
    };
    match channel.side() {
      Side::Platform => {
        if let Some(fragment) = platform_fragment(repo, event, channel, date, org_dir) {
          fragments.push(fragment);
        }
      }
      Side::Git => {
        if let Some(fragment) = commit_fragment(repo, event, date, org_dir) {
          if is_direct_commit(event, &pr_hashes) {
            let mut direct = fragment.clone();
            direct.channel = Channel::CodeDirectCommit;
            fragments.push(direct);
          }
          fragments.push(fragment);
        }
      }
    }
  }
  fragments
}

fn platform_fragment(
  repo: &str,
  event: &RawEvent,
  channel: Channel,
  date: NaiveDateTime,
  org_dir: &OrgDirectory,
) -> Option<Fragment> {
  let login = event.user_login.as_deref().or(event.actor_username.as_deref());
  // A platform event without a usable login identifies nobody.
  normalize_identity(login)?;
  let mut keys = BTreeSet::new();
  keys.extend(normalize_identity(login));
  keys.extend(normalize_identity(event.author_name.as_deref()));
  keys.extend(normalize_identity(event.user_email.as_deref()));
  Some(Fragment {
    channel,
    date,
    seed_uuid: stable_uuid(&[
      Some(repo),
      Some("platform"),
      login,
      event.user_email.as_deref(),
      Some(&fmt_ts(date)),
    ]),
    identity_keys: keys,
    login: login.map(str::to_string),
    author_name: event.author_name.clone(),
    email: event.user_email.clone(),
    org_interval: org_interval(event.user_email.as_deref(), date, org_dir),
  })
}

fn commit_fragment(
  repo: &str,
  event: &RawEvent,
  date: NaiveDateTime,
  org_dir: &OrgDirectory,
) -> Option<Fragment> {
  let mut keys = BTreeSet::new();
  keys.extend(normalize_identity(event.author_name.as_deref()));
  keys.extend(normalize_identity(event.author_email.as_deref()));
  if keys.is_empty() {
    debug!("skipping commit with no usable author identity");
    return None;
  }
  Some(Fragment {
    channel: Channel::CodeCommit,
    date,
    seed_uuid: stable_uuid(&[
      Some(repo),
      Some("git"),
      event.author_name.as_deref(),
      event.author_email.as_deref(),
      Some(&fmt_ts(date)),
    ]),
    identity_keys: keys,
    login: None,
    author_name: event.author_name.clone(),
    email: event.author_email.clone(),
    org_interval: org_interval(event.author_email.as_deref(), date, org_dir),
  })
}

/// Point interval for the event's email domain; merging widens it later.
fn org_interval(email: Option<&str>, date: NaiveDateTime, org_dir: &OrgDirectory) -> Option<OrgInterval> {
  let email = email?;
  let (_, domain) = email_parts(email);
  let domain = domain?;
  Some(OrgInterval {
    domain: domain.to_string(),
    org_name: org_dir.org_for_email(email),
    first_date: date,
    last_date: date,
  })
}
