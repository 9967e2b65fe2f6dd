// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for timestamp parsing/formatting, stable uuid derivation, JSON file IO, and man page rendering
// role: utilities/helpers
// inputs: Timestamp strings in several shapes; serde values; clap CommandFactory
// outputs: NaiveDateTime values, deterministic uuid strings, JSON files on disk, man page text
// side_effects: read_json/write_json touch the filesystem
// invariants:
// - parse_ts accepts RFC3339, naive ISO, and bare dates; everything is normalized to UTC-naive
// - stable_uuid skips empty parts and is deterministic for the same inputs
// errors: IO and parse errors bubble with file/value context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::CommandFactory;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Parse a timestamp in any of the shapes the event feeds produce:
/// RFC3339 (`2021-01-05T12:00:00Z`), naive ISO (`2021-01-05T12:00:00`,
/// fractional seconds tolerated), or a bare date (`2021-01-05`).
/// Offsets are converted to UTC and dropped.
pub fn parse_ts(raw: &str) -> Result<NaiveDateTime> {
  if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
    return Ok(dt.naive_utc());
  }
  if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
    return Ok(ndt);
  }
  if let Ok(nd) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    if let Some(ndt) = nd.and_hms_opt(0, 0, 0) {
      return Ok(ndt);
    }
  }
  anyhow::bail!("unparseable timestamp: {raw:?}")
}

pub fn fmt_ts(ts: NaiveDateTime) -> String {
  ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Deterministic identifier over a tuple of optional identity parts.
/// Empty/missing parts are skipped, so re-running over the same input
/// reproduces the id and persisted records can be found again.
pub fn stable_uuid(parts: &[Option<&str>]) -> String {
  let joined: Vec<&str> = parts.iter().filter_map(|p| *p).filter(|p| !p.is_empty()).collect();
  Uuid::new_v5(&Uuid::NAMESPACE_URL, joined.join(":").as_bytes()).to_string()
}

pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
  let path = path.as_ref();
  let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
  serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
  let path = path.as_ref();
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("writing {}", path.display()))?;
  Ok(())
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
