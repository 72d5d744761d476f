//! Doc source descriptor parsing.
//!
//! Turns one raw configuration entry (a YAML/JSON mapping or a CLI token)
//! into zero or one [`DocSource`].

use mcpdoc_shared::DocSource;
use serde::Deserialize;

/// Schemes that are never split on a colon, even though they contain one.
const URL_PREFIXES: [&str; 2] = ["http:", "https:"];

// ---------------------------------------------------------------------------
// Mapping entries (YAML / JSON)
// ---------------------------------------------------------------------------

/// One entry of a YAML or JSON source list.
///
/// Unknown keys are rejected so that typos surface at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    /// Optional label.
    #[serde(default)]
    pub name: Option<String>,
    /// URL or path of the document.
    #[serde(alias = "llms_txt", alias = "url")]
    pub doc_file: String,
    /// Optional description for source listings.
    #[serde(default)]
    pub description: Option<String>,
}

/// Normalize a mapping entry. Blank locators are dropped.
pub fn parse_entry(entry: SourceEntry) -> Option<DocSource> {
    let locator = entry.doc_file.trim();
    if locator.is_empty() {
        return None;
    }

    Some(DocSource {
        name: non_blank(entry.name),
        locator: locator.to_string(),
        description: non_blank(entry.description),
    })
}

// ---------------------------------------------------------------------------
// CLI tokens
// ---------------------------------------------------------------------------

/// Parse a `locator` or `name:locator` token.
///
/// A token containing a colon is split on the first one unless it starts
/// with `http:` or `https:`. Bare locators that contain a colon for another
/// reason (`C:\docs\a.txt`, `file:///a.txt`) are therefore read as
/// `name:locator`; callers that need those should use a config file.
pub fn parse_token(token: &str) -> Option<DocSource> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    let is_url = URL_PREFIXES.iter().any(|p| token.starts_with(p));
    match token.split_once(':') {
        Some((name, locator)) if !is_url => {
            let locator = locator.trim();
            if locator.is_empty() {
                return None;
            }
            Some(DocSource {
                name: non_blank(Some(name.to_string())),
                locator: locator.to_string(),
                description: None,
            })
        }
        _ => Some(DocSource::new(token)),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
