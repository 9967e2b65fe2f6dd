// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the contribution channels (one per tracked date list) and the event-tag dispatch table
// role: model/types
// outputs: Channel enum with stable date-field names; tag lookup replacing per-call string comparison chains
// invariants: date_field names are the persisted schema field names; every platform tag in TAG_TABLE maps to exactly one channel
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

/// Which identity fields an event of this channel carries.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Side {
  /// Platform events: login, display name, platform email.
  Platform,
  /// Git commits: author name and email only.
  Git,
}

/// One contribution type, each tracked as its own date set on a contributor.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
  IssueCreation,
  PrCreation,
  IssueComment,
  PrComment,
  PrReview,
  Fork,
  Star,
  Watch,
  IssueLabel,
  IssueClose,
  IssueReopen,
  IssueAssign,
  IssueMilestone,
  IssueMarkAsDuplicate,
  IssueTransfer,
  IssueLock,
  PrLabel,
  PrClose,
  PrReopen,
  PrAssign,
  PrMilestone,
  PrMarkAsDuplicate,
  PrTransfer,
  PrLock,
  PrMerge,
  CodeCommit,
  CodeDirectCommit,
}

/// Event-type tag → channel. A lookup table rather than an if/else ladder so
/// adding a channel is one row here plus one enum variant.
const TAG_TABLE: &[(&str, Channel)] = &[
  ("issue", Channel::IssueCreation),
  ("pr", Channel::PrCreation),
  ("issue_comments", Channel::IssueComment),
  ("pr_comments", Channel::PrComment),
  ("fork", Channel::Fork),
  ("star", Channel::Star),
  ("watch", Channel::Watch),
  ("issue_LabeledEvent", Channel::IssueLabel),
  ("issue_ClosedEvent", Channel::IssueClose),
  ("issue_ReopenedEvent", Channel::IssueReopen),
  ("issue_AssignedEvent", Channel::IssueAssign),
  ("issue_MilestonedEvent", Channel::IssueMilestone),
  ("issue_MarkedAsDuplicateEvent", Channel::IssueMarkAsDuplicate),
  ("issue_TransferredEvent", Channel::IssueTransfer),
  ("issue_LockedEvent", Channel::IssueLock),
  ("pr_LabeledEvent", Channel::PrLabel),
  ("pr_ClosedEvent", Channel::PrClose),
  ("pr_ReopenedEvent", Channel::PrReopen),
  ("pr_AssignedEvent", Channel::PrAssign),
  ("pr_MilestonedEvent", Channel::PrMilestone),
  ("pr_MarkedAsDuplicateEvent", Channel::PrMarkAsDuplicate),
  ("pr_TransferredEvent", Channel::PrTransfer),
  ("pr_LockedEvent", Channel::PrLock),
  ("pr_MergedEvent", Channel::PrMerge),
  ("pr_PullRequestReview", Channel::PrReview),
  ("commit", Channel::CodeCommit),
];

impl Channel {
  pub fn from_tag(tag: &str) -> Option<Channel> {
    TAG_TABLE.iter().find(|(t, _)| *t == tag).map(|(_, c)| *c)
  }

  /// Persisted field name holding this channel's date set.
  pub fn date_field(self) -> &'static str {
    match self {
      Channel::IssueCreation => "issue_creation_date_list",
      Channel::PrCreation => "pr_creation_date_list",
      Channel::IssueComment => "issue_comments_date_list",
      Channel::PrComment => "pr_comments_date_list",
      Channel::PrReview => "pr_review_date_list",
      Channel::Fork => "fork_date_list",
      Channel::Star => "star_date_list",
      Channel::Watch => "watch_date_list",
      Channel::IssueLabel => "issue_label_date_list",
      Channel::IssueClose => "issue_close_date_list",
      Channel::IssueReopen => "issue_reopen_date_list",
      Channel::IssueAssign => "issue_assign_date_list",
      Channel::IssueMilestone => "issue_milestone_date_list",
      Channel::IssueMarkAsDuplicate => "issue_mark_as_duplicate_date_list",
      Channel::IssueTransfer => "issue_transfer_date_list",
      Channel::IssueLock => "issue_lock_date_list",
      Channel::PrLabel => "pr_label_date_list",
      Channel::PrClose => "pr_close_date_list",
      Channel::PrReopen => "pr_reopen_date_list",
      Channel::PrAssign => "pr_assign_date_list",
      Channel::PrMilestone => "pr_milestone_date_list",
      Channel::PrMarkAsDuplicate => "pr_mark_as_duplicate_date_list",
      Channel::PrTransfer => "pr_transfer_date_list",
      Channel::PrLock => "pr_lock_date_list",
      Channel::PrMerge => "pr_merge_date_list",
      Channel::CodeCommit => "code_commit_date_list",
      Channel::CodeDirectCommit => "code_direct_commit_date_list",
    }
  }

  /// Persisted field name for the earliest date seen on this channel.
  pub fn first_date_field(self) -> String {
    format!("first_{}", self.date_field().trim_end_matches("_list"))
  }

  pub fn side(self) -> Side {
    match self {
      Channel::CodeCommit | Channel::CodeDirectCommit => Side::Git,
      _ => Side::Platform,
    }
  }

  /// Reverse of `date_field`, for reading persisted records back.
  pub fn from_date_field(field: &str) -> Option<Channel> {
    ALL_CHANNELS.iter().copied().find(|c| c.date_field() == field)
  }
}

pub const ALL_CHANNELS: &[Channel] = &[
  Channel::IssueCreation,
  Channel::PrCreation,
  Channel::IssueComment,
  Channel::PrComment,
  Channel::PrReview,
  Channel::Fork,
  Channel::Star,
  Channel::Watch,
  Channel::IssueLabel,
  Channel::IssueClose,
  Channel::IssueReopen,
  Channel::IssueAssign,
  Channel::IssueMilestone,
  Channel::IssueMarkAsDuplicate,
  Channel::IssueTransfer,
  Channel::IssueLock,
  Channel::PrLabel,
  Channel::PrClose,
  Channel::PrReopen,
  Channel::PrAssign,
  Channel::PrMilestone,
  Channel::PrMarkAsDuplicate,
  Channel::PrTransfer,
  Channel::PrLock,
  Channel::PrMerge,
  Channel::CodeCommit,
  Channel::CodeDirectCommit,
];

/// The channels the cohort classifier counts as activity by default:
/// the original model's issue/code/observe signal set.
pub const ACTIVITY_CHANNELS: &[Channel] = &[
  Channel::IssueCreation,
  Channel::PrCreation,
  Channel::IssueComment,
  Channel::PrReview,
  Channel::CodeCommit,
  Channel::Star,
  Channel::Fork,
  Channel::Watch,
];
