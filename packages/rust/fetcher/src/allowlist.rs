//! Domain allow-list derivation.
//!
//! The allow-list is computed once at startup from the catalog and the
//! operator's extra domains, then shared read-only by every fetch.

use std::collections::BTreeSet;

use mcpdoc_shared::{DocSource, origin_of, parse_http_url};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Token that disables allow-list enforcement.
pub const WILDCARD: &str = "*";

/// The set of origins outbound fetches may target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowList {
    /// Every origin is permitted.
    Any,
    /// Only these origins (`scheme://host[:port]`) are permitted.
    Origins(BTreeSet<String>),
}

impl Default for AllowList {
    fn default() -> Self {
        Self::Origins(BTreeSet::new())
    }
}

impl AllowList {
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// The explicit origins, or `None` when unrestricted.
    pub fn origins(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Any => None,
            Self::Origins(origins) => Some(origins),
        }
    }

    pub fn allows_origin(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Origins(origins) => origins.contains(origin),
        }
    }

    /// Whether a request to `url` passes the allow-list.
    pub fn allows(&self, url: &Url) -> bool {
        match self {
            Self::Any => true,
            Self::Origins(origins) => origin_of(url).is_some_and(|o| origins.contains(&o)),
        }
    }
}

/// Derive the effective allow-list.
///
/// Origins of every remote doc source are always included. A `*` among
/// `additional` makes the list unrestricted; otherwise each additional
/// domain is normalized to an origin and added.
#[instrument(skip_all, fields(additional = additional.len()))]
pub fn resolve<'a, I>(sources: I, additional: &[String]) -> AllowList
where
    I: IntoIterator<Item = &'a DocSource>,
{
    if additional.iter().any(|d| d.trim() == WILDCARD) {
        info!("wildcard domain configured, allow-list enforcement disabled");
        return AllowList::Any;
    }

    let mut origins = BTreeSet::new();

    for source in sources {
        if let Some(origin) = source.url().as_ref().and_then(origin_of) {
            debug!(%origin, locator = %source.locator, "allowing doc source origin");
            origins.insert(origin);
        }
    }

    for domain in additional {
        let normalized = normalize_domain(domain);
        if normalized.is_empty() {
            warn!(%domain, "ignoring unusable allowed domain");
        }
        origins.extend(normalized);
    }

    info!(origins = origins.len(), "allow-list resolved");
    AllowList::Origins(origins)
}

/// Normalize an operator-supplied domain to the origin(s) it admits.
///
/// `https://example.com/docs/` becomes `https://example.com`. A bare host
/// such as `example.com` or `example.com:8080` admits both schemes.
pub fn normalize_domain(domain: &str) -> Vec<String> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Vec::new();
    }

    if domain.contains("://") {
        return parse_http_url(domain)
            .as_ref()
            .and_then(origin_of)
            .into_iter()
            .collect();
    }

    ["http", "https"]
        .iter()
        .filter_map(|scheme| parse_http_url(&format!("{scheme}://{domain}")))
        .filter_map(|url| origin_of(&url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(locators: &[&str]) -> Vec<DocSource> {
        locators.iter().map(|l| DocSource::new(*l)).collect()
    }

    #[test]
    fn source_origins_always_present() {
        let sources = sources(&["https://a.b/x", "https://docs.rs/llms.txt"]);
        let extra_sets: [&[&str]; 3] = [&[], &["https://other.com"], &["other.com", "not a domain"]];

        for extra in extra_sets {
            let extra: Vec<String> = extra.iter().map(|s| s.to_string()).collect();
            let allow = resolve(&sources, &extra);
            assert!(allow.allows_origin("https://a.b"), "extra = {extra:?}");
            assert!(allow.allows_origin("https://docs.rs"), "extra = {extra:?}");
        }
    }

    #[test]
    fn local_sources_add_no_origins() {
        let allow = resolve(&sources(&["docs/a.txt", "/abs/b.txt"]), &[]);
        assert_eq!(allow.origins().map(|o| o.len()), Some(0));
    }

    #[test]
    fn wildcard_takes_precedence() {
        let extra = vec!["https://other.com".to_string(), "*".to_string()];
        let allow = resolve(&sources(&["https://a.b/x"]), &extra);
        assert!(allow.is_unrestricted());
        assert!(allow.allows(&Url::parse("https://anything.example/x").unwrap()));
    }

    #[test]
    fn additional_domains_are_normalized() {
        let extra = vec![
            "https://example.com/docs/".to_string(),
            "Another.Example:8080".to_string(),
        ];
        let allow = resolve(&sources(&[]), &extra);
        let origins = allow.origins().unwrap();

        assert!(origins.contains("https://example.com"));
        assert!(!origins.contains("http://example.com"));
        assert!(origins.contains("http://another.example:8080"));
        assert!(origins.contains("https://another.example:8080"));
    }

    #[test]
    fn allows_compares_origins_not_prefixes() {
        let allow = resolve(&sources(&["https://good.com/d.txt"]), &[]);
        assert!(allow.allows(&Url::parse("https://good.com/other/page").unwrap()));
        assert!(!allow.allows(&Url::parse("https://evil.com/d.txt").unwrap()));
        assert!(!allow.allows(&Url::parse("https://good.com.evil.com/d.txt").unwrap()));
        assert!(!allow.allows(&Url::parse("http://good.com/d.txt").unwrap()));
    }

    #[test]
    fn unusable_domains_are_skipped() {
        assert!(normalize_domain("").is_empty());
        assert!(normalize_domain("ftp://example.com").is_empty());
        assert!(normalize_domain("exa mple.com").is_empty());
    }
}
