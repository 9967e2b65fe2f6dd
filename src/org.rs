use crate::model::OrgInterval;
use std::collections::BTreeMap;

/// Combine two org-affiliation histories. Intervals sharing a
/// `(domain, org_name)` key coalesce to the widest span; everything else
/// passes through. Output is sorted by key for stable persistence.
pub fn merge_org_history(a: &[OrgInterval], b: &[OrgInterval]) -> Vec<OrgInterval> {
  let mut merged: BTreeMap<(String, Option<String>), OrgInterval> = BTreeMap::new();
  for interval in a.iter().chain(b.iter()) {
    let key = (interval.domain.clone(), interval.org_name.clone());
    merged
      .entry(key)
      .and_modify(|existing| {
        if interval.first_date < existing.first_date {
          existing.first_date = interval.first_date;
        }
        if interval.last_date > existing.last_date {
          existing.last_date = interval.last_date;
        }
      })
      .or_insert_with(|| interval.clone());
  }
  merged.into_values().collect()
}

/// "Current organization": the interval with the greatest `last_date`.
pub fn current_org(history: &[OrgInterval]) -> Option<&OrgInterval> {
  history.iter().max_by_key(|interval| interval.last_date)
}
