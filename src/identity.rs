use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder values some feeds emit instead of a real identity.
const DENY_LIST: &[&str] = &["unknown", "-- undefined --"];

// Punctuation stripped from identity tokens before they become join keys.
// Includes the full-width/CJK variants seen in real author fields.
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"[`~!#$%^&*()+=|{}':;',\[\]<>/?～！#￥%……&*（）——+|{}【】‘；：”“’"。 ，、？_-]"#).unwrap()
});

/// Canonicalize one raw identity token into a join key.
///
/// Pure and total: malformed input yields `None`, never an error. The key
/// is the case-folded, punctuation-stripped value; blank or deny-listed
/// tokens and tokens that strip down to nothing are rejected.
pub fn normalize_identity(raw: Option<&str>) -> Option<String> {
  let raw = raw?;
  if raw.trim().is_empty() {
    return None;
  }
  let lowered = raw.to_lowercase();
  if DENY_LIST.contains(&lowered.as_str()) {
    return None;
  }
  let stripped = PUNCTUATION.replace_all(&lowered, "");
  if stripped.is_empty() {
    return None;
  }
  Some(stripped.into_owned())
}

/// Split an email into (local part, domain). A value without `@` is all
/// local part; empty segments are absent rather than empty strings.
pub fn email_parts(email: &str) -> (Option<&str>, Option<&str>) {
  match email.split_once('@') {
    Some((local, domain)) => (
      (!local.is_empty()).then_some(local),
      (!domain.is_empty()).then_some(domain),
    ),
    None => ((!email.is_empty()).then_some(email), None),
  }
}

/// Combined "login &&& author name" marker kept on platform contributors so
/// the original pairing stays visible after merges.
pub fn login_author_pair(login: Option<&str>, author_name: Option<&str>) -> String {
  format!("{} &&& {}", login.unwrap_or(""), author_name.unwrap_or(""))
}
