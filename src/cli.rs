use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use clap::Parser;
use std::path::PathBuf;

use crate::cohort::Thresholds;
use crate::util;
use crate::window::PeriodKey;

#[derive(Parser, Debug)]
#[command(
    name = "contributor-cohort-report",
    version,
    about = "Merge contributor identities and classify temporal cohorts from contribution events",
    long_about = None
)]
pub struct Cli {
  /// Repository URL the events belong to
  #[arg(long, required_unless_present = "gen_man", default_value = "", hide_default_value = true)]
  pub repo: String,

  /// JSON events bundle (events, pull_requests, login_author_map)
  #[arg(long, required_unless_present = "gen_man", default_value = ".", hide_default_value = true)]
  pub events: PathBuf,

  /// contributors.json written by a previous run, for cross-run merge continuity
  #[arg(long)]
  pub contributors: Option<PathBuf>,

  /// Organization directory config (domain mappings, identity overrides, company)
  #[arg(long)]
  pub orgs: Option<PathBuf>,

  /// Bot registry config (glob patterns, community/repo name sets)
  #[arg(long)]
  pub bots: Option<PathBuf>,

  /// Range start (inclusive), e.g. 2021-01-01
  #[arg(long, required_unless_present = "gen_man", default_value = "", hide_default_value = true)]
  pub since: String,

  /// Range end (exclusive); must be after --since
  #[arg(long, required_unless_present = "gen_man", default_value = "", hide_default_value = true)]
  pub until: String,

  /// Reporting cadence; repeat for several (e.g. --period month --period year)
  #[arg(long, value_enum, default_values_t = vec![PeriodKey::Year])]
  pub period: Vec<PeriodKey>,

  /// In-window contribution count at or below which a contributor is casual
  #[arg(long, default_value_t = 3)]
  pub casual_threshold: usize,

  /// Count at or below which a contributor is regular; above it, core
  #[arg(long, default_value_t = 9)]
  pub regular_threshold: usize,

  /// Directory for contributors.json, absorbed.json, and report files
  #[arg(long, default_value = "out")]
  pub out: PathBuf,

  /// Log at debug instead of info (RUST_LOG overrides either)
  #[arg(long)]
  pub verbose: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true, exclusive = true)]
  pub gen_man: bool,
}

#[derive(Debug)]
pub struct EffectiveConfig {
  pub repo: String,
  pub events: PathBuf,
  pub contributors: Option<PathBuf>,
  pub orgs: Option<PathBuf>,
  pub bots: Option<PathBuf>,
  pub since: NaiveDateTime,
  pub until: NaiveDateTime,
  pub periods: Vec<PeriodKey>,
  pub thresholds: Thresholds,
  pub out: PathBuf,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  if cli.repo.trim().is_empty() {
    bail!("--repo must not be empty");
  }
  let since = util::parse_ts(&cli.since).context("parsing --since")?;
  let until = util::parse_ts(&cli.until).context("parsing --until")?;
  if until <= since {
    bail!("--until must be after --since");
  }
  if cli.regular_threshold <= cli.casual_threshold {
    bail!("--regular-threshold must exceed --casual-threshold");
  }

  let mut periods = cli.period;
  periods.sort();
  periods.dedup();

  Ok(EffectiveConfig {
    repo: cli.repo,
    events: cli.events,
    contributors: cli.contributors,
    orgs: cli.orgs,
    bots: cli.bots,
    since,
    until,
    periods,
    thresholds: Thresholds {
      casual: cli.casual_threshold,
      regular: cli.regular_threshold,
    },
    out: cli.out,
  })
}
