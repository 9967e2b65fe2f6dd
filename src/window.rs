use anyhow::{Result, bail};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Reporting cadence. Each key aligns windows to its own calendar
/// boundary: Monday, first of month, quarter start, January 1st.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum PeriodKey {
  Week,
  Month,
  Quarter,
  Year,
}

impl PeriodKey {
  pub fn as_str(self) -> &'static str {
    match self {
      PeriodKey::Week => "week",
      PeriodKey::Month => "month",
      PeriodKey::Quarter => "quarter",
      PeriodKey::Year => "year",
    }
  }

  fn align(self, date: NaiveDate) -> NaiveDate {
    match self {
      PeriodKey::Week => date.week(Weekday::Mon).first_day(),
      PeriodKey::Month => date.with_day(1).unwrap_or(date),
      PeriodKey::Quarter => {
        let month = 1 + ((date.month0() / 3) * 3);
        NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
      }
      PeriodKey::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
    }
  }

  fn step(self, date: NaiveDate) -> NaiveDate {
    match self {
      PeriodKey::Week => date + Duration::weeks(1),
      PeriodKey::Month => date + Months::new(1),
      PeriodKey::Quarter => date + Months::new(3),
      PeriodKey::Year => date + Months::new(12),
    }
  }

  /// All aligned windows whose start falls inside [since, until).
  pub fn windows(self, since: NaiveDateTime, until: NaiveDateTime) -> Result<Vec<Window>> {
    if until <= since {
      bail!("empty range: until {until} is not after since {since}");
    }
    let mut start = self.align(since.date());
    if start.and_hms_opt(0, 0, 0).unwrap_or(since) < since {
      // Partial leading period: begin with the first fully-aligned start.
      start = self.step(start);
    }
    let mut windows = Vec::new();
    while start.and_hms_opt(0, 0, 0).map(|s| s < until).unwrap_or(false) {
      let end = self.step(start);
      match (start.and_hms_opt(0, 0, 0), end.and_hms_opt(0, 0, 0)) {
        (Some(from), Some(to)) => windows.push(Window::new(from, to)?),
        _ => bail!("window bounds out of range at {start}"),
      }
      start = end;
    }
    Ok(windows)
  }
}

impl std::fmt::Display for PeriodKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Half-open analysis window [from, to).
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Window {
  pub from: NaiveDateTime,
  pub to: NaiveDateTime,
}

impl Window {
  pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Result<Window> {
    if to <= from {
      bail!("invalid window: to {to} is not after from {from}");
    }
    Ok(Window { from, to })
  }

  pub fn contains(&self, date: NaiveDateTime) -> bool {
    self.from <= date && date < self.to
  }

  /// Window start as a date label, used in report file names and rows.
  pub fn start_label(&self) -> String {
    self.from.format("%Y-%m-%d").to_string()
  }

  /// Inclusive last day of the window, for report rows.
  pub fn end_label(&self) -> String {
    (self.to.date() - Duration::days(1)).format("%Y-%m-%d").to_string()
  }
}
