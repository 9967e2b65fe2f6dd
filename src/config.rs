// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Data contracts for injected configuration: the organization directory mapping email domains to orgs
// role: configuration/types
// inputs: JSON config files maintained by the community (organizations, per-email identity overrides)
// outputs: OrgDirectory with a pure org_for_email lookup
// invariants: a missing mapping yields None, never an error; per-email overrides win over domain mappings
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use crate::identity::email_parts;
use crate::util::read_json;

/// Hosting-provider privacy domains; emails there say nothing about the
/// employer, so an explicitly configured company takes over when present.
const NOREPLY_DOMAINS: &[&str] = &["noreply.github.com", "noreply.gitee.com"];

#[derive(Debug, Deserialize)]
struct OrgEntry {
  domain: String,
}

/// On-disk shape of the organization directory.
#[derive(Debug, Default, Deserialize)]
struct OrgConfig {
  #[serde(default)]
  organizations: BTreeMap<String, Vec<OrgEntry>>,
  #[serde(default)]
  identities: BTreeMap<String, String>,
  #[serde(default)]
  company: Option<String>,
}

/// Resolves an email to an organization name. Built once per run from the
/// injected config; lookups are pure.
#[derive(Debug, Default, Clone)]
pub struct OrgDirectory {
  domains: BTreeMap<String, String>,
  identities: BTreeMap<String, String>,
  company: Option<String>,
}

impl OrgDirectory {
  pub fn load<P: AsRef<Path>>(path: P) -> Result<OrgDirectory> {
    let config: OrgConfig = read_json(path)?;
    Ok(OrgDirectory::from_parts(config))
  }

  fn from_parts(config: OrgConfig) -> OrgDirectory {
    let mut domains = BTreeMap::new();
    for (org_name, entries) in config.organizations {
      for entry in entries {
        domains.insert(entry.domain, org_name.clone());
      }
    }
    OrgDirectory {
      domains,
      identities: config.identities,
      company: config.company,
    }
  }

  /// Organization for an email, or None when nothing is configured for it.
  pub fn org_for_email(&self, email: &str) -> Option<String> {
    let (_, domain) = email_parts(email);
    let domain = domain?;
    let mut org = self
      .identities
      .get(email)
      .or_else(|| self.domains.get(domain))
      .cloned();
    if NOREPLY_DOMAINS.iter().any(|noreply| domain.contains(noreply)) {
      if let Some(company) = &self.company {
        org = Some(company.clone());
      }
    }
    org
  }
}
