// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Drive one repository run: load inputs, extract, merge, tag, classify, and write outputs
// role: orchestration
// inputs: EffectiveConfig (paths, range, periods, thresholds)
// outputs: contributors.json, absorbed.json, one report file per period/window under --out
// invariants: extraction completes before cross-side unification; previous-run uuids survive unless absorbed
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::cli::EffectiveConfig;
use crate::cohort::CohortClassifier;
use crate::config::OrgDirectory;
use crate::extract;
use crate::filters::{BotRegistry, leader_names};
use crate::merge;
use crate::model::{Contributor, ContributorRecord, EventBundle};
use crate::report;
use crate::util::{read_json, write_json};

pub fn run(cfg: &EffectiveConfig) -> Result<()> {
  let bundle: EventBundle = read_json(&cfg.events)?;
  let org_dir = match &cfg.orgs {
    Some(path) => OrgDirectory::load(path)?,
    None => OrgDirectory::default(),
  };
  let bots = match &cfg.bots {
    Some(path) => BotRegistry::load(path)?,
    None => BotRegistry::default(),
  };
  let previous = load_previous(cfg)?;
  info!(
    repo = %cfg.repo,
    events = bundle.events.len(),
    pull_requests = bundle.pull_requests.len(),
    previous = previous.len(),
    "starting run"
  );

  let fragments = extract::extract(&cfg.repo, &bundle, &org_dir);
  let (platform, git) = merge::fold_fragments(&fragments);
  info!(
    fragments = fragments.len(),
    platform = platform.len(),
    git = git.len(),
    "folded fragments"
  );
  let current = merge::unify(platform, git, &bundle.login_author_map);
  let outcome = merge::merge(&previous, &current);
  let mut contributors = outcome.contributors;
  // Previous-run records this run neither touched nor absorbed stay live.
  for (uuid, contributor) in previous {
    if !outcome.absorbed.contains(&uuid) && !contributors.contains_key(&uuid) {
      contributors.insert(uuid, contributor);
    }
  }
  info!(
    contributors = contributors.len(),
    absorbed = outcome.absorbed.len(),
    "merged identities"
  );

  let leaders = leader_names(&bundle.events, &bundle.pull_requests);
  for contributor in contributors.values_mut() {
    let (is_bot, is_leader) = {
      let names = contributor.name_variants();
      (
        bots.is_bot(&cfg.repo, &names),
        names.iter().any(|name| leaders.contains(*name)),
      )
    };
    contributor.is_bot = is_bot;
    contributor.is_leader = is_leader;
  }

  let enriched_on = Utc::now().naive_utc();
  let records: Vec<ContributorRecord> = contributors
    .values()
    .map(|c| c.to_record(&cfg.repo, enriched_on))
    .collect();
  write_json(cfg.out.join("contributors.json"), &records)?;
  write_json(cfg.out.join("absorbed.json"), &outcome.absorbed)?;

  let mut classifier = CohortClassifier::new(cfg.thresholds);
  for period in &cfg.periods {
    for window in period.windows(cfg.since, cfg.until)? {
      let cohorts = classifier.classify(*period, &window, &contributors);
      let document = report::window_report(&cfg.repo, *period, &window, &cohorts, enriched_on);
      write_json(cfg.out.join(report::report_file_name(*period, &window)), &document)?;
      info!(
        period = period.as_str(),
        window = %window.start_label(),
        active = cohorts.active_total.len(),
        "wrote report"
      );
    }
  }

  println!("{}", cfg.out.display());
  Ok(())
}

fn load_previous(cfg: &EffectiveConfig) -> Result<BTreeMap<String, Contributor>> {
  let Some(path) = &cfg.contributors else {
    return Ok(BTreeMap::new());
  };
  let records: Vec<ContributorRecord> = read_json(path)?;
  let mut previous = BTreeMap::new();
  for record in &records {
    let contributor = Contributor::from_record(record)
      .with_context(|| format!("previous contributor {}", record.uuid))?;
    previous.insert(contributor.uuid.clone(), contributor);
  }
  Ok(previous)
}
