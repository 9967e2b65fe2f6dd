// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Classify contributors into temporal cohorts per window: activity level, attraction/retention, silence, wakeup, conversion
// role: processing/classification
// inputs: Merged contributor map; period key; aligned window; injected activity thresholds
// outputs: WindowCohorts with named sets, transition breakdowns, and same-period wakeup history rows
// invariants: exactly one previous-window snapshot per period key; attraction history capped at MAX_HISTORY_WINDOWS; zero-denominator ratios are 0
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;
use tracing::debug;

use crate::channel::ACTIVITY_CHANNELS;
use crate::model::Contributor;
use crate::window::{PeriodKey, Window};

/// Trailing inactivity span that makes a contributor silent.
pub const SILENCE_DAYS: i64 = 90;

/// Prior attraction sets remembered per period key for same-period wakeup
/// reporting. Output-size bound only; transition logic never reads past
/// the single previous-window snapshot.
pub const MAX_HISTORY_WINDOWS: usize = 49;

/// In-window contribution-count cutoffs separating casual from regular
/// from core contributors. Injected, not derived.
#[derive(Copy, Clone, Debug)]
pub struct Thresholds {
  pub casual: usize,
  pub regular: usize,
}

impl Default for Thresholds {
  fn default() -> Self {
    Thresholds { casual: 3, regular: 9 }
  }
}

/// One activity level's attraction or retention sets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LevelSets {
  pub casual: BTreeSet<String>,
  pub regular: BTreeSet<String>,
  pub core: BTreeSet<String>,
}

/// Where a current cohort's members were in the previous window.
#[derive(Debug, Default, Clone)]
pub struct TransitionBreakdown {
  pub from_casual: BTreeSet<String>,
  pub from_regular: BTreeSet<String>,
  pub from_core: BTreeSet<String>,
  pub from_silence: BTreeSet<String>,
  pub from_attraction_casual: BTreeSet<String>,
  pub from_attraction_regular: BTreeSet<String>,
  pub from_attraction_core: BTreeSet<String>,
}

/// One same-period history row: a prior window's attraction set
/// intersected with the current wakeup set.
#[derive(Debug, Clone)]
pub struct WakeupHistoryRow {
  pub start_date: String,
  pub end_date: String,
  pub count: usize,
  pub ratio: f64,
  pub windows_ago: usize,
}

/// Everything the classifier decides for one window.
#[derive(Debug, Default)]
pub struct WindowCohorts {
  pub active_total: BTreeSet<String>,
  pub attraction: LevelSets,
  pub retention: LevelSets,
  pub retention_breakdown: [TransitionBreakdown; 3],
  pub silence: BTreeSet<String>,
  pub silence_breakdown: TransitionBreakdown,
  pub wakeup: BTreeSet<String>,
  pub wakeup_ratio: f64,
  pub conversion_up: BTreeSet<String>,
  pub conversion_down: BTreeSet<String>,
  pub wakeup_history: Vec<WakeupHistoryRow>,
}

/// The one window of memory retained per period key for transitions.
#[derive(Debug, Default, Clone)]
struct Snapshot {
  attraction: LevelSets,
  retention: LevelSets,
  silence: BTreeSet<String>,
}

impl Snapshot {
  fn casual(&self) -> BTreeSet<String> {
    &self.attraction.casual | &self.retention.casual
  }

  fn regular(&self) -> BTreeSet<String> {
    &self.attraction.regular | &self.retention.regular
  }

  fn core(&self) -> BTreeSet<String> {
    &self.attraction.core | &self.retention.core
  }
}

#[derive(Debug, Clone)]
struct HistoryEntry {
  start_date: String,
  end_date: String,
  attraction: BTreeSet<String>,
}

/// Ratio rounded to 4 places; an empty denominator is 0, never an error.
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
  if denominator == 0 {
    return 0.0;
  }
  (numerator as f64 / denominator as f64 * 10_000.0).round() / 10_000.0
}

/// Temporal cohort classifier. Holds process-lifetime memory: one
/// previous-window snapshot per period key plus the bounded attraction
/// history. Classification itself is a pure function of the contributor
/// date sets, the window, and that memory.
#[derive(Debug)]
pub struct CohortClassifier {
  thresholds: Thresholds,
  previous: BTreeMap<PeriodKey, Snapshot>,
  history: BTreeMap<PeriodKey, Vec<HistoryEntry>>,
}

impl CohortClassifier {
  pub fn new(thresholds: Thresholds) -> Self {
    CohortClassifier {
      thresholds,
      previous: BTreeMap::new(),
      history: BTreeMap::new(),
    }
  }

  /// Classify one window. Windows for one period key must be fed in
  /// chronological order; each call overwrites that key's snapshot.
  pub fn classify(
    &mut self,
    period: PeriodKey,
    window: &Window,
    contributors: &BTreeMap<String, Contributor>,
  ) -> WindowCohorts {
    let previous = self.previous.get(&period).cloned().unwrap_or_default();
    let silence_from = window.to - Duration::days(SILENCE_DAYS);

    let mut cohorts = WindowCohorts::default();
    let mut active_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut attraction_total = BTreeSet::new();

    for contributor in contributors.values() {
      if contributor.is_bot {
        continue;
      }
      let Some(name) = contributor.display_name() else { continue };
      let name = name.to_string();

      let in_window: usize = ACTIVITY_CHANNELS
        .iter()
        .filter_map(|channel| contributor.dates(*channel))
        .flat_map(|dates| dates.iter())
        .filter(|date| window.contains(**date))
        .count();
      if in_window > 0 {
        cohorts.active_total.insert(name.clone());
        active_counts.insert(name.clone(), in_window);
        // Attraction hinges on the global earliest date, not this window's.
        if contributor.earliest_contribution().map(|d| window.contains(d)).unwrap_or(false) {
          attraction_total.insert(name.clone());
        }
      }

      let trailing: usize = ACTIVITY_CHANNELS
        .iter()
        .filter_map(|channel| contributor.dates(*channel))
        .flat_map(|dates| dates.iter())
        .filter(|date| silence_from <= **date && **date < window.to)
        .count();
      let known_before = contributor
        .earliest_contribution()
        .map(|d| d < window.to)
        .unwrap_or(false);
      if known_before && trailing == 0 {
        cohorts.silence.insert(name);
      }
    }

    for (name, count) in &active_counts {
      let attracted = attraction_total.contains(name);
      let sets = if attracted { &mut cohorts.attraction } else { &mut cohorts.retention };
      let bucket = if *count <= self.thresholds.casual {
        &mut sets.casual
      } else if *count <= self.thresholds.regular {
        &mut sets.regular
      } else {
        &mut sets.core
      };
      bucket.insert(name.clone());
    }

    for (i, current) in [
      &cohorts.retention.casual,
      &cohorts.retention.regular,
      &cohorts.retention.core,
    ]
    .into_iter()
    .enumerate()
    {
      cohorts.retention_breakdown[i] = breakdown(&previous, current);
    }
    cohorts.silence_breakdown = breakdown(&previous, &cohorts.silence);

    cohorts.wakeup = &previous.silence & &cohorts.active_total;
    cohorts.wakeup_ratio = ratio(cohorts.wakeup.len(), previous.silence.len());

    let current_higher = &cohorts.attraction.regular
      | &(&cohorts.attraction.core | &(&cohorts.retention.regular | &cohorts.retention.core));
    let current_casual = &cohorts.attraction.casual | &cohorts.retention.casual;
    cohorts.conversion_up = &previous.casual() & &current_higher;
    cohorts.conversion_down = &(&previous.regular() | &previous.core()) & &current_casual;

    cohorts.wakeup_history = self.wakeup_history(period, window, &cohorts.wakeup, &attraction_total);

    debug!(
      period = period.as_str(),
      window = %window.start_label(),
      active = cohorts.active_total.len(),
      silent = cohorts.silence.len(),
      "classified window"
    );

    self.previous.insert(
      period,
      Snapshot {
        attraction: cohorts.attraction.clone(),
        retention: cohorts.retention.clone(),
        silence: cohorts.silence.clone(),
      },
    );
    cohorts
  }

  /// Same-period rows: how many of each remembered window's attracted
  /// contributors woke up in the current one, newest windows first in
  /// memory, emitted oldest first, capped at [`MAX_HISTORY_WINDOWS`]
  /// prior rows plus the current (ratio-less) row.
  fn wakeup_history(
    &mut self,
    period: PeriodKey,
    window: &Window,
    wakeup: &BTreeSet<String>,
    attraction_total: &BTreeSet<String>,
  ) -> Vec<WakeupHistoryRow> {
    let entries = self.history.entry(period).or_default();
    let mut rows = Vec::new();
    let total = entries.len();
    for (i, entry) in entries.iter().enumerate().rev().take(MAX_HISTORY_WINDOWS) {
      let woken = &entry.attraction & wakeup;
      rows.push(WakeupHistoryRow {
        start_date: entry.start_date.clone(),
        end_date: entry.end_date.clone(),
        count: woken.len(),
        ratio: ratio(woken.len(), entry.attraction.len()),
        windows_ago: total - i,
      });
    }
    rows.reverse();
    rows.push(WakeupHistoryRow {
      start_date: window.start_label(),
      end_date: window.end_label(),
      count: attraction_total.len(),
      ratio: 0.0,
      windows_ago: 0,
    });
    entries.push(HistoryEntry {
      start_date: window.start_label(),
      end_date: window.end_label(),
      attraction: attraction_total.clone(),
    });
    rows
  }
}

fn breakdown(previous: &Snapshot, current: &BTreeSet<String>) -> TransitionBreakdown {
  TransitionBreakdown {
    from_casual: &previous.retention.casual & current,
    from_regular: &previous.retention.regular & current,
    from_core: &previous.retention.core & current,
    from_silence: &previous.silence & current,
    from_attraction_casual: &previous.attraction.casual & current,
    from_attraction_regular: &previous.attraction.regular & current,
    from_attraction_core: &previous.attraction.core & current,
  }
}
