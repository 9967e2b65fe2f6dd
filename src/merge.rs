// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Merge identity fragments and contributor generations into unified Contributor records
// role: processing/core
// inputs: Fragments split by side; previous-run contributor map; platform login → git author correspondence
// outputs: Unified contributor map plus the set of absorbed (now stale) uuids
// invariants: key → uuid index stays injective after every fold; the incoming record's uuid survives a merge
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::channel::Side;
use crate::extract::Fragment;
use crate::model::Contributor;

/// Result of merging two contributor generations: the unified map and the
/// uuids whose old records were folded into a survivor and must be dropped
/// from storage.
#[derive(Debug, Default)]
pub struct MergeOutcome {
  pub contributors: BTreeMap<String, Contributor>,
  pub absorbed: BTreeSet<String>,
}

/// One side's streaming accumulator: contributors keyed by uuid plus an
/// identity-key index. Folding a seed absorbs every already-accumulated
/// contributor sharing a key with it; the seed's uuid survives.
#[derive(Debug, Default)]
pub struct Accumulator {
  contributors: BTreeMap<String, Contributor>,
  index: BTreeMap<String, String>,
}

impl Accumulator {
  pub fn fold(&mut self, mut seed: Contributor) {
    let mut matched = Vec::new();
    for key in &seed.identity_keys {
      if let Some(uuid) = self.index.get(key) {
        if self.contributors.contains_key(uuid) && !matched.contains(uuid) {
          matched.push(uuid.clone());
        }
      }
    }
    for uuid in &matched {
      if let Some(old) = self.contributors.remove(uuid) {
        seed.absorb(&old);
      }
    }
    // Absorbing widened the key set; repoint every key it now holds.
    for key in &seed.identity_keys {
      self.index.insert(key.clone(), seed.uuid.clone());
    }
    self.contributors.insert(seed.uuid.clone(), seed);
  }

  pub fn into_contributors(self) -> BTreeMap<String, Contributor> {
    self.contributors
  }
}

/// Fold fragments into one accumulator per side. Platform and git
/// identities never join here; that happens in [`unify`].
pub fn fold_fragments(
  fragments: &[Fragment],
) -> (BTreeMap<String, Contributor>, BTreeMap<String, Contributor>) {
  let mut platform = Accumulator::default();
  let mut git = Accumulator::default();
  for fragment in fragments {
    let seed = fragment.to_contributor();
    match fragment.channel.side() {
      Side::Platform => platform.fold(seed),
      Side::Git => git.fold(seed),
    }
  }
  (platform.into_contributors(), git.into_contributors())
}

/// Merge an `existing` generation into an `incoming` one by shared identity
/// key. The incoming record's uuid survives; matched existing uuids are
/// reported absorbed. Chain rule: when a second incoming record matches an
/// existing record that was already absorbed, the previously produced
/// merged record is folded in instead of the stale existing copy, so the
/// chain collapses to a single survivor.
///
/// Existing records nobody matched are NOT carried over; callers decide
/// what happens to them.
pub fn merge(
  existing: &BTreeMap<String, Contributor>,
  incoming: &BTreeMap<String, Contributor>,
) -> MergeOutcome {
  let mut existing_index: BTreeMap<&str, &str> = BTreeMap::new();
  for (uuid, contributor) in existing {
    for key in &contributor.identity_keys {
      existing_index.insert(key, uuid);
    }
  }

  let mut result: BTreeMap<String, Contributor> = BTreeMap::new();
  let mut result_index: BTreeMap<String, String> = BTreeMap::new();
  let mut absorbed: BTreeSet<String> = BTreeSet::new();

  for item in incoming.values() {
    let mut item = item.clone();
    let mut matched: Vec<&str> = Vec::new();
    for key in &item.identity_keys {
      if let Some(uuid) = existing_index.get(key.as_str()).copied() {
        if !matched.contains(&uuid) {
          matched.push(uuid);
        }
      }
    }
    if matched.is_empty() {
      result_index.extend(item.identity_keys.iter().map(|k| (k.clone(), item.uuid.clone())));
      result.insert(item.uuid.clone(), item);
      continue;
    }
    for old_uuid in matched {
      if absorbed.contains(old_uuid) {
        // Already folded into an earlier survivor; take over that merged
        // record rather than re-reading the stale existing copy.
        let survivor = item
          .identity_keys
          .iter()
          .find_map(|key| result_index.get(key))
          .filter(|uuid| result.contains_key(*uuid))
          .cloned();
        if let Some(survivor_uuid) = survivor {
          if let Some(previous) = result.remove(&survivor_uuid) {
            debug!(from = %survivor_uuid, into = %item.uuid, "collapsing merge chain");
            item.absorb(&previous);
          }
          continue;
        }
      }
      if old_uuid != item.uuid {
        absorbed.insert(old_uuid.to_string());
      }
      if let Some(old) = existing.get(old_uuid) {
        item.absorb(old);
      }
    }
    for key in &item.identity_keys {
      result_index.insert(key.clone(), item.uuid.clone());
    }
    result.insert(item.uuid.clone(), item);
  }

  MergeOutcome { contributors: result, absorbed }
}

/// Join the two sides into one contributor set. The login → git-author
/// correspondence (built upstream from PR/commit correlation) absorbs
/// matching git contributors into the platform record that owns the login;
/// a key-match merge then catches identities the map missed (shared
/// emails). Git contributors with no platform counterpart pass through.
pub fn unify(
  platform: BTreeMap<String, Contributor>,
  git: BTreeMap<String, Contributor>,
  login_author_map: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeMap<String, Contributor> {
  let author_uuid: BTreeMap<String, String> = git
    .values()
    .flat_map(|c| c.git_author_names.iter().map(|name| (name.clone(), c.uuid.clone())))
    .collect();

  let mut remaining_git = git;
  let mut unified_platform = BTreeMap::new();
  for (_, mut contributor) in platform {
    let logins: Vec<String> = contributor.platform_logins.iter().cloned().collect();
    for login in logins {
      let Some(author_names) = login_author_map.get(&login) else { continue };
      for author_name in author_names {
        let Some(git_uuid) = author_uuid.get(author_name) else { continue };
        if let Some(git_side) = remaining_git.remove(git_uuid) {
          contributor.absorb(&git_side);
        }
      }
    }
    unified_platform.insert(contributor.uuid.clone(), contributor);
  }

  let outcome = merge(&remaining_git, &unified_platform);
  let mut contributors = outcome.contributors;
  for (uuid, git_side) in remaining_git {
    if !outcome.absorbed.contains(&uuid) {
      contributors.insert(uuid, git_side);
    }
  }
  contributors
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::parse_ts;
  use chrono::NaiveDateTime;
  use proptest::prelude::*;

  fn ts(raw: &str) -> NaiveDateTime {
    parse_ts(raw).unwrap()
  }

  fn seed(uuid: &str, keys: &[&str], last: &str) -> Contributor {
    let mut c = Contributor::new(uuid.into(), ts(last));
    c.identity_keys = keys.iter().map(|k| k.to_string()).collect();
    c
  }

  #[test]
  fn fold_links_disjoint_records_through_a_bridge() {
    let mut acc = Accumulator::default();
    acc.fold(seed("a", &["k1"], "2021-01-01"));
    acc.fold(seed("b", &["k2"], "2021-02-01"));
    acc.fold(seed("c", &["k1", "k2"], "2021-03-01"));
    let contributors = acc.into_contributors();
    assert_eq!(contributors.len(), 1);
    let merged = &contributors["c"];
    assert_eq!(merged.identity_keys.len(), 2);
    assert_eq!(merged.last_contribution, ts("2021-03-01"));
  }

  #[test]
  fn fold_keeps_unrelated_records_apart() {
    let mut acc = Accumulator::default();
    acc.fold(seed("a", &["k1"], "2021-01-01"));
    acc.fold(seed("b", &["k2"], "2021-02-01"));
    assert_eq!(acc.into_contributors().len(), 2);
  }

  #[test]
  fn merge_reports_absorbed_existing_uuids() {
    let existing: BTreeMap<_, _> = [
      ("old1".to_string(), seed("old1", &["k1"], "2020-01-01")),
      ("old2".to_string(), seed("old2", &["k2"], "2020-02-01")),
    ]
    .into();
    let incoming: BTreeMap<_, _> =
      [("new".to_string(), seed("new", &["k1", "k2"], "2021-01-01"))].into();

    let outcome = merge(&existing, &incoming);
    assert_eq!(outcome.contributors.len(), 1);
    assert!(outcome.contributors.contains_key("new"));
    assert_eq!(outcome.absorbed, ["old1".to_string(), "old2".to_string()].into());
  }

  #[test]
  fn merge_chain_collapses_to_one_survivor() {
    // One existing record bridges two incoming records that share no key
    // with each other.
    let existing: BTreeMap<_, _> =
      [("old".to_string(), seed("old", &["k1", "k2"], "2020-01-01"))].into();
    let incoming: BTreeMap<_, _> = [
      ("new-a".to_string(), seed("new-a", &["k1"], "2021-01-01")),
      ("new-b".to_string(), seed("new-b", &["k2"], "2021-02-01")),
    ]
    .into();

    let outcome = merge(&existing, &incoming);
    assert_eq!(outcome.contributors.len(), 1);
    let survivor = outcome.contributors.values().next().unwrap();
    assert_eq!(survivor.identity_keys.len(), 2);
    assert_eq!(outcome.absorbed, ["old".to_string()].into());
  }

  #[test]
  fn merge_with_self_is_idempotent() {
    let map: BTreeMap<_, _> = [
      ("a".to_string(), seed("a", &["k1"], "2021-01-01")),
      ("b".to_string(), seed("b", &["k2"], "2021-02-01")),
    ]
    .into();
    let outcome = merge(&map, &map);
    assert_eq!(outcome.contributors, map);
    assert!(outcome.absorbed.is_empty());
  }

  #[test]
  fn unify_joins_sides_through_login_author_map() {
    let mut platform_side = seed("p", &["jdoe"], "2021-01-01");
    platform_side.platform_logins.insert("jdoe".into());
    let mut git_side = seed("g", &["janedoe", "jane@corp.com"], "2021-02-01");
    git_side.git_author_names.insert("Jane Doe".into());

    let map: BTreeMap<String, BTreeSet<String>> =
      [("jdoe".to_string(), ["Jane Doe".to_string()].into())].into();
    let contributors = unify(
      [("p".to_string(), platform_side)].into(),
      [("g".to_string(), git_side)].into(),
      &map,
    );
    assert_eq!(contributors.len(), 1);
    let merged = &contributors["p"];
    assert!(merged.git_author_names.contains("Jane Doe"));
    assert!(merged.identity_keys.contains("jane@corp.com"));
  }

  #[test]
  fn unify_falls_back_to_shared_keys() {
    // No map entry, but both sides carry the same normalized email key.
    let mut platform_side = seed("p", &["jdoe", "jane@corp.com"], "2021-01-01");
    platform_side.platform_logins.insert("jdoe".into());
    let git_side = seed("g", &["janedoe", "jane@corp.com"], "2021-02-01");

    let contributors = unify(
      [("p".to_string(), platform_side)].into(),
      [("g".to_string(), git_side)].into(),
      &BTreeMap::new(),
    );
    assert_eq!(contributors.len(), 1);
    assert!(contributors.contains_key("p"));
  }

  #[test]
  fn unify_passes_unmatched_git_contributors_through() {
    let mut platform_side = seed("p", &["jdoe"], "2021-01-01");
    platform_side.platform_logins.insert("jdoe".into());
    let git_side = seed("g", &["stranger"], "2021-02-01");

    let contributors = unify(
      [("p".to_string(), platform_side)].into(),
      [("g".to_string(), git_side)].into(),
      &BTreeMap::new(),
    );
    assert_eq!(contributors.len(), 2);
  }

  proptest! {
    // Folding arbitrary seeds must keep the key index injective: every
    // identity key belongs to exactly one surviving contributor.
    #[test]
    fn fold_partitions_identity_keys(key_sets in proptest::collection::vec(
      proptest::collection::btree_set("[a-d]", 1..4), 1..12,
    )) {
      let mut acc = Accumulator::default();
      for (i, keys) in key_sets.iter().enumerate() {
        let mut c = Contributor::new(format!("u-{i}"), ts("2021-01-01"));
        c.identity_keys = keys.clone();
        acc.fold(c);
      }
      let contributors = acc.into_contributors();
      let mut seen = BTreeSet::new();
      for contributor in contributors.values() {
        for key in &contributor.identity_keys {
          prop_assert!(seen.insert(key.clone()), "key {key} owned twice");
        }
      }
    }
  }
}
