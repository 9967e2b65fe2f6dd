// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the data model shared by extraction, merging, and reporting (events in, contributor records out)
// role: model/types
// outputs: Serializable structs with stable field names; Contributor with set-valued fields and value-type merges
// invariants: persisted record field names match the established contributor schema; date lists serialize sorted
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::channel::{ALL_CHANNELS, Channel};
use crate::org;
use crate::util::fmt_ts;

/// One raw platform/git event as fetched by the upstream collaborator.
/// Platform events carry login/display-name/email; commits carry git
/// author/committer fields plus the commit hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
  /// Event-type tag selecting the channel, e.g. "issue", "pr_MergedEvent", "commit".
  pub event_type: String,
  pub timestamp: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_login: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub actor_username: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub author_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub author_email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub committer_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub committer_email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hash: Option<String>,
  /// Reporter of the issue/PR the event acted on; used for the
  /// closed/reopened-by-someone-else leader signal.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reporter_user_name: Option<String>,
  /// Review verdict for PullRequestReview events (APPROVED etc.).
  #[serde(skip_serializing_if = "Option::is_none")]
  pub merge_state: Option<String>,
}

/// Merged/tracked pull request, used to tell PR-mediated commits from
/// direct pushes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequestRecord {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_login: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub merge_author_login: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub merge_commit_sha: Option<String>,
  #[serde(default)]
  pub commits_data: Vec<String>,
}

/// Everything the extractor needs for one repository and one invocation:
/// already-fetched event pages plus the PR cross-reference data. The
/// `login_author_map` (platform login → git author names) is supplied by
/// the upstream PR/commit correlation step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventBundle {
  #[serde(default)]
  pub events: Vec<RawEvent>,
  #[serde(default)]
  pub pull_requests: Vec<PullRequestRecord>,
  #[serde(default)]
  pub login_author_map: BTreeMap<String, BTreeSet<String>>,
}

/// One contiguous period during which a contributor's email domain mapped
/// to one organization. `org_name` is None when the domain is unmapped.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct OrgInterval {
  pub domain: String,
  pub org_name: Option<String>,
  pub first_date: NaiveDateTime,
  pub last_date: NaiveDateTime,
}

/// A merged contributor entity: the union of every identity observed for
/// one person/bot, with one date set per contribution channel.
///
/// Treated as a value type: merges go through [`Contributor::absorb`],
/// which produces the union in the recipient; records are never shared by
/// reference between old and new mappings.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Contributor {
  pub uuid: String,
  pub platform_login_author_names: BTreeSet<String>,
  pub platform_logins: BTreeSet<String>,
  pub platform_author_names: BTreeSet<String>,
  pub platform_author_emails: BTreeSet<String>,
  pub git_author_names: BTreeSet<String>,
  pub git_author_emails: BTreeSet<String>,
  /// Normalized join keys; never empty for a live contributor.
  pub identity_keys: BTreeSet<String>,
  pub activity: BTreeMap<Channel, BTreeSet<NaiveDateTime>>,
  pub org_history: Vec<OrgInterval>,
  pub last_contribution: NaiveDateTime,
  pub is_bot: bool,
  pub is_leader: bool,
}

impl Contributor {
  pub fn new(uuid: String, last_contribution: NaiveDateTime) -> Self {
    Contributor {
      uuid,
      platform_login_author_names: BTreeSet::new(),
      platform_logins: BTreeSet::new(),
      platform_author_names: BTreeSet::new(),
      platform_author_emails: BTreeSet::new(),
      git_author_names: BTreeSet::new(),
      git_author_emails: BTreeSet::new(),
      identity_keys: BTreeSet::new(),
      activity: BTreeMap::new(),
      org_history: Vec::new(),
      last_contribution,
      is_bot: false,
      is_leader: false,
    }
  }

  /// Fold `other` into `self`. Set-valued fields union, org history
  /// coalesces, `last_contribution` takes the max. `self.uuid` survives.
  pub fn absorb(&mut self, other: &Contributor) {
    self
      .platform_login_author_names
      .extend(other.platform_login_author_names.iter().cloned());
    self.platform_logins.extend(other.platform_logins.iter().cloned());
    self
      .platform_author_names
      .extend(other.platform_author_names.iter().cloned());
    self
      .platform_author_emails
      .extend(other.platform_author_emails.iter().cloned());
    self.git_author_names.extend(other.git_author_names.iter().cloned());
    self.git_author_emails.extend(other.git_author_emails.iter().cloned());
    self.identity_keys.extend(other.identity_keys.iter().cloned());
    for (channel, dates) in &other.activity {
      self.activity.entry(*channel).or_default().extend(dates.iter().copied());
    }
    self.org_history = org::merge_org_history(&other.org_history, &self.org_history);
    if other.last_contribution > self.last_contribution {
      self.last_contribution = other.last_contribution;
    }
  }

  /// Raw name variants checked against the bot registry.
  pub fn name_variants(&self) -> Vec<&str> {
    self
      .git_author_names
      .iter()
      .chain(self.platform_logins.iter())
      .chain(self.platform_author_names.iter())
      .map(String::as_str)
      .collect()
  }

  /// Reporting name: platform login when known, else git author name.
  pub fn display_name(&self) -> Option<&str> {
    self
      .platform_logins
      .iter()
      .next()
      .or_else(|| self.git_author_names.iter().next())
      .map(String::as_str)
  }

  /// Earliest contribution across every channel, or None for an empty record.
  pub fn earliest_contribution(&self) -> Option<NaiveDateTime> {
    self.activity.values().filter_map(|dates| dates.iter().next()).min().copied()
  }

  pub fn dates(&self, channel: Channel) -> Option<&BTreeSet<NaiveDateTime>> {
    self.activity.get(&channel)
  }

  /// Persisted shape, with one sorted `*_date_list` plus `first_*` field
  /// per channel and the current org resolved from the history.
  pub fn to_record(&self, repo: &str, enriched_on: NaiveDateTime) -> ContributorRecord {
    let mut dates = BTreeMap::new();
    for channel in ALL_CHANNELS {
      let list: Vec<String> = self
        .activity
        .get(channel)
        .map(|set| set.iter().map(|d| fmt_ts(*d)).collect())
        .unwrap_or_default();
      let first = list.first().cloned();
      dates.insert(
        channel.date_field().to_string(),
        serde_json::Value::from(list.clone()),
      );
      dates.insert(
        channel.first_date_field(),
        first.map(serde_json::Value::from).unwrap_or(serde_json::Value::Null),
      );
    }
    let current = org::current_org(&self.org_history);
    ContributorRecord {
      uuid: self.uuid.clone(),
      id_git_author_name_list: self.git_author_names.iter().cloned().collect(),
      id_git_author_email_list: self.git_author_emails.iter().cloned().collect(),
      id_platform_login_author_name_list: self.platform_login_author_names.iter().cloned().collect(),
      id_platform_login_name_list: self.platform_logins.iter().cloned().collect(),
      id_platform_author_name_list: self.platform_author_names.iter().cloned().collect(),
      id_platform_author_email_list: self.platform_author_emails.iter().cloned().collect(),
      id_identity_list: self.identity_keys.iter().cloned().collect(),
      dates,
      last_contribution_date: fmt_ts(self.last_contribution),
      org_change_date_list: self.org_history.clone(),
      domain: current.map(|o| o.domain.clone()),
      org_name: current.and_then(|o| o.org_name.clone()),
      repo_name: repo.to_string(),
      is_bot: self.is_bot,
      is_leader: self.is_leader,
      update_at_date: fmt_ts(enriched_on),
    }
  }

  /// Rebuild the in-memory value from a persisted record. Unknown date
  /// fields and `first_*` scalars are ignored; they are derived on output.
  pub fn from_record(record: &ContributorRecord) -> anyhow::Result<Contributor> {
    let last = crate::util::parse_ts(&record.last_contribution_date)?;
    let mut c = Contributor::new(record.uuid.clone(), last);
    c.git_author_names = record.id_git_author_name_list.iter().cloned().collect();
    c.git_author_emails = record.id_git_author_email_list.iter().cloned().collect();
    c.platform_login_author_names = record.id_platform_login_author_name_list.iter().cloned().collect();
    c.platform_logins = record.id_platform_login_name_list.iter().cloned().collect();
    c.platform_author_names = record.id_platform_author_name_list.iter().cloned().collect();
    c.platform_author_emails = record.id_platform_author_email_list.iter().cloned().collect();
    c.identity_keys = record.id_identity_list.iter().cloned().collect();
    for (field, value) in &record.dates {
      let Some(channel) = Channel::from_date_field(field) else {
        continue;
      };
      let Some(items) = value.as_array() else { continue };
      let mut set = BTreeSet::new();
      for item in items {
        if let Some(raw) = item.as_str() {
          set.insert(crate::util::parse_ts(raw)?);
        }
      }
      if !set.is_empty() {
        c.activity.insert(channel, set);
      }
    }
    c.org_history = record.org_change_date_list.clone();
    c.is_bot = record.is_bot;
    c.is_leader = record.is_leader;
    Ok(c)
  }
}

/// Persisted contributor schema. Per-channel date fields are flattened to
/// the top level (`issue_creation_date_list`, `first_issue_creation_date`,
/// ...) to keep the established field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorRecord {
  pub uuid: String,
  pub id_git_author_name_list: Vec<String>,
  pub id_git_author_email_list: Vec<String>,
  pub id_platform_login_author_name_list: Vec<String>,
  pub id_platform_login_name_list: Vec<String>,
  pub id_platform_author_name_list: Vec<String>,
  pub id_platform_author_email_list: Vec<String>,
  pub id_identity_list: Vec<String>,
  #[serde(flatten)]
  pub dates: BTreeMap<String, serde_json::Value>,
  pub last_contribution_date: String,
  pub org_change_date_list: Vec<OrgInterval>,
  pub domain: Option<String>,
  pub org_name: Option<String>,
  pub repo_name: String,
  pub is_bot: bool,
  pub is_leader: bool,
  pub update_at_date: String,
}
