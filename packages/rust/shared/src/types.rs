//! Core domain types for mcpdoc doc sources.

use std::path::Path;

use url::Url;

// ---------------------------------------------------------------------------
// DocSource
// ---------------------------------------------------------------------------

/// A configured documentation source: an optional label plus a locator
/// that is either an HTTP(S) URL or a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSource {
    /// Human-readable label.
    pub name: Option<String>,
    /// URL or filesystem path of the document. Never blank.
    pub locator: String,
    /// Free-form description shown in source listings.
    pub description: Option<String>,
}

impl DocSource {
    /// Create a source with no name or description.
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            name: None,
            locator: locator.into(),
            description: None,
        }
    }

    /// Builder-style setter for the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The locator as an absolute `http`/`https` URL, if it is one.
    pub fn url(&self) -> Option<Url> {
        parse_http_url(&self.locator)
    }

    /// Whether the locator points at a remote document.
    pub fn is_remote(&self) -> bool {
        self.url().is_some()
    }

    /// Name derived from the locator: the URL host, or the file name of a path.
    pub fn derived_name(&self) -> Option<String> {
        match self.url() {
            Some(url) => url.host_str().map(str::to_string),
            None => Path::new(&self.locator)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
        }
    }
}

// ---------------------------------------------------------------------------
// Locator helpers
// ---------------------------------------------------------------------------

/// Parse `locator` as an absolute URL with an `http` or `https` scheme.
///
/// Anything else (relative paths, absolute paths, other schemes) is treated
/// as a filesystem locator by the rest of the system.
pub fn parse_http_url(locator: &str) -> Option<Url> {
    let url = Url::parse(locator.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url),
        _ => None,
    }
}

/// Extract the origin (scheme + host + explicit port) from a URL.
///
/// Default ports are omitted, so `https://a.b:443/x` and `https://a.b/x`
/// share the origin `https://a.b`.
pub fn origin_of(url: &Url) -> Option<String> {
    let scheme = url.scheme();
    let host = url.host_str()?.to_ascii_lowercase();

    match url.port() {
        Some(port) => Some(format!("{scheme}://{host}:{port}")),
        None => Some(format!("{scheme}://{host}")),
    }
}
