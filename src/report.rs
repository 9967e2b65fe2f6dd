// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Assemble one cohort report document per window from the classifier's named sets
// role: output/rendering
// inputs: WindowCohorts plus repo/period/window identification
// outputs: serde_json report document and its file name
// invariants: every cohort is emitted as count plus sorted list; the report uuid is deterministic per (repo, period, window)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde_json::{Value, json};

use crate::cohort::{TransitionBreakdown, WindowCohorts};
use crate::util::{fmt_ts, stable_uuid};
use crate::window::{PeriodKey, Window};

fn set_value(set: &BTreeSet<String>) -> Value {
  json!({
    "count": set.len(),
    "list": set.iter().collect::<Vec<_>>(),
  })
}

fn cohort_value(set: &BTreeSet<String>, breakdown: &TransitionBreakdown) -> Value {
  json!({
    "count": set.len(),
    "list": set.iter().collect::<Vec<_>>(),
    "from_casual": set_value(&breakdown.from_casual),
    "from_regular": set_value(&breakdown.from_regular),
    "from_core": set_value(&breakdown.from_core),
    "from_silence": set_value(&breakdown.from_silence),
    "from_attraction_casual": set_value(&breakdown.from_attraction_casual),
    "from_attraction_regular": set_value(&breakdown.from_attraction_regular),
    "from_attraction_core": set_value(&breakdown.from_attraction_core),
  })
}

pub fn report_file_name(period: PeriodKey, window: &Window) -> String {
  format!("report-{}-{}.json", period.as_str(), window.start_label())
}

/// One report document per window: attraction/retention per level with
/// previous-window breakdowns, silence, wakeup with same-period history,
/// and conversion sets.
pub fn window_report(
  repo: &str,
  period: PeriodKey,
  window: &Window,
  cohorts: &WindowCohorts,
  enriched_on: NaiveDateTime,
) -> Value {
  let history: Vec<Value> = cohorts
    .wakeup_history
    .iter()
    .map(|row| {
      let mut value = json!({
        "start_date": row.start_date,
        "end_date": row.end_date,
        "count": row.count,
        "ratio": row.ratio,
      });
      if let Some(map) = value.as_object_mut() {
        map.insert(format!("{}_num", period.as_str()), json!(row.windows_ago));
      }
      value
    })
    .collect();

  let mut wakeup = set_value(&cohorts.wakeup);
  if let Some(map) = wakeup.as_object_mut() {
    map.insert("ratio".into(), json!(cohorts.wakeup_ratio));
    map.insert("same_period".into(), Value::Array(history));
  }

  json!({
    "uuid": stable_uuid(&[Some(repo), Some(period.as_str()), Some(&window.start_label())]),
    "repo_name": repo,
    "period": period.as_str(),
    "start_date": window.start_label(),
    "end_date": window.end_label(),
    "active": set_value(&cohorts.active_total),
    "attraction_casual": set_value(&cohorts.attraction.casual),
    "attraction_regular": set_value(&cohorts.attraction.regular),
    "attraction_core": set_value(&cohorts.attraction.core),
    "retention_casual": cohort_value(&cohorts.retention.casual, &cohorts.retention_breakdown[0]),
    "retention_regular": cohort_value(&cohorts.retention.regular, &cohorts.retention_breakdown[1]),
    "retention_core": cohort_value(&cohorts.retention.core, &cohorts.retention_breakdown[2]),
    "silence": cohort_value(&cohorts.silence, &cohorts.silence_breakdown),
    "wakeup": wakeup,
    "conversion_up": set_value(&cohorts.conversion_up),
    "conversion_down": set_value(&cohorts.conversion_down),
    "update_at_date": fmt_ts(enriched_on),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cohort::WakeupHistoryRow;
  use crate::util::parse_ts;

  fn sample_window() -> Window {
    Window::new(parse_ts("2021-01-01").unwrap(), parse_ts("2022-01-01").unwrap()).unwrap()
  }

  #[test]
  fn file_name_carries_period_and_start() {
    assert_eq!(
      report_file_name(PeriodKey::Year, &sample_window()),
      "report-year-2021-01-01.json"
    );
  }

  #[test]
  fn report_shape_has_counts_and_sorted_lists() {
    let mut cohorts = WindowCohorts::default();
    cohorts.active_total.extend(["zoe".to_string(), "amy".to_string()]);
    cohorts.attraction.casual.extend(["zoe".to_string(), "amy".to_string()]);
    cohorts.wakeup_ratio = 0.5;
    cohorts.wakeup_history.push(WakeupHistoryRow {
      start_date: "2020-01-01".into(),
      end_date: "2020-12-31".into(),
      count: 1,
      ratio: 0.25,
      windows_ago: 1,
    });

    let report = window_report(
      "https://github.com/acme/widget",
      PeriodKey::Year,
      &sample_window(),
      &cohorts,
      parse_ts("2022-01-02").unwrap(),
    );
    assert_eq!(report["attraction_casual"]["count"], 2);
    assert_eq!(report["attraction_casual"]["list"][0], "amy");
    assert_eq!(report["silence"]["from_core"]["count"], 0);
    assert_eq!(report["wakeup"]["ratio"], 0.5);
    assert_eq!(report["wakeup"]["same_period"][0]["year_num"], 1);
    assert_eq!(report["period"], "year");
  }

  #[test]
  fn report_uuid_is_deterministic() {
    let cohorts = WindowCohorts::default();
    let enriched = parse_ts("2022-01-02").unwrap();
    let a = window_report("repo", PeriodKey::Year, &sample_window(), &cohorts, enriched);
    let b = window_report("repo", PeriodKey::Year, &sample_window(), &cohorts, enriched);
    assert_eq!(a["uuid"], b["uuid"]);
    let c = window_report("repo", PeriodKey::Month, &sample_window(), &cohorts, enriched);
    assert_ne!(a["uuid"], c["uuid"]);
  }
}
