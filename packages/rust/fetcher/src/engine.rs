//! Domain-gated document fetcher.
//!
//! Local paths are read straight from disk. URLs are checked against the
//! allow-list before any request is sent, then fetched with the request's
//! timeout and redirect policy.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mcpdoc_shared::{FetchConfig, McpDocError, Result, origin_of, parse_http_url};
use reqwest::{Client, Response, redirect};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::allowlist::AllowList;

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("mcpdoc/", env!("CARGO_PKG_VERSION"));

/// Maximum response size we accept (10 MB).
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// Number of body characters quoted in HTTP error messages.
const ERROR_SNIPPET_CHARS: usize = 200;

/// Bytes read from an error response to build its snippet.
const ERROR_BODY_LIMIT: usize = 4 * 1024;

// ---------------------------------------------------------------------------
// Request / result types
// ---------------------------------------------------------------------------

/// One fetch, built per tool call.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// URL or filesystem path.
    pub locator: String,
    /// Upper bound for the whole request, body included.
    pub timeout: Duration,
    /// Follow 3xx responses instead of failing on them.
    pub follow_redirects: bool,
}

impl FetchRequest {
    /// Build a request using the timeout and redirect policy from `config`.
    pub fn new(locator: impl Into<String>, config: &FetchConfig) -> Self {
        Self {
            locator: locator.into(),
            timeout: config.timeout,
            follow_redirects: config.follow_redirects,
        }
    }
}

/// Where fetched content came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOrigin {
    /// Read from the local filesystem.
    Local { path: PathBuf },
    /// Downloaded over HTTP; `final_url` differs from the request after redirects.
    Remote { final_url: Url, status: u16 },
}

/// Raw, unconverted document content.
#[derive(Debug, Clone)]
pub struct FetchedDoc {
    pub content: String,
    pub origin: ContentOrigin,
}

impl FetchedDoc {
    /// URL to resolve relative links against, for remote content.
    pub fn base_url(&self) -> Option<&Url> {
        match &self.origin {
            ContentOrigin::Remote { final_url, .. } => Some(final_url),
            ContentOrigin::Local { .. } => None,
        }
    }
}

/// Outcome of a single fetch.
pub type FetchResult = Result<FetchedDoc>;

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Fetches doc content, enforcing the allow-list for URLs.
///
/// Holds one pooled HTTP client per redirect mode; cloning is cheap and
/// clones share the pools.
#[derive(Debug, Clone)]
pub struct Fetcher {
    allow_list: Arc<AllowList>,
    /// Exact URLs fetched without an allow-list check.
    pre_approved: Arc<BTreeSet<String>>,
    /// Client that follows redirects (up to the configured cap).
    following: Client,
    /// Client that never follows redirects.
    direct: Client,
}

impl Fetcher {
    /// Create a fetcher bound to an allow-list.
    pub fn new(config: &FetchConfig, allow_list: AllowList) -> Result<Self> {
        let allow_list = Arc::new(allow_list);

        let following = build_client(redirect_policy(config, &allow_list))?;
        let direct = build_client(redirect::Policy::none())?;

        Ok(Self {
            allow_list,
            pre_approved: Arc::default(),
            following,
            direct,
        })
    }

    /// Trust these exact URLs regardless of the allow-list.
    ///
    /// Only the listed URLs are trusted, not their origins. Entries that are
    /// not http(s) URLs are ignored.
    pub fn with_pre_approved<'a>(mut self, urls: impl IntoIterator<Item = &'a str>) -> Self {
        let urls = urls
            .into_iter()
            .filter_map(parse_http_url)
            .map(String::from)
            .collect();
        self.pre_approved = Arc::new(urls);
        self
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Whether `url` is one of the pre-approved URLs.
    pub fn is_pre_approved(&self, url: &Url) -> bool {
        self.pre_approved.contains(url.as_str())
    }

    /// Fetch the raw content behind `request.locator`.
    #[instrument(skip_all, fields(locator = %request.locator))]
    pub async fn fetch(&self, request: &FetchRequest) -> FetchResult {
        match parse_http_url(&request.locator) {
            Some(url) => self.fetch_remote(url, request).await,
            None => read_local(&request.locator).await,
        }
    }

    async fn fetch_remote(&self, url: Url, request: &FetchRequest) -> FetchResult {
        let origin = origin_of(&url).unwrap_or_default();
        if !self.is_pre_approved(&url) && !self.allow_list.allows_origin(&origin) {
            warn!(%url, %origin, "blocked fetch to domain outside allow-list");
            return Err(McpDocError::DomainNotAllowed {
                url: url.to_string(),
                origin,
            });
        }

        let client = if request.follow_redirects {
            &self.following
        } else {
            &self.direct
        };

        let started = Instant::now();
        debug!(%url, timeout_ms = request.timeout.as_millis(), follow_redirects = request.follow_redirects, "fetching");

        let response = client
            .get(url.as_str())
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(e, url.as_str(), request.timeout))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = read_capped(response, ERROR_BODY_LIMIT)
                .await
                .map(|(bytes, _)| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default();

            let message = match location {
                Some(location) if status.is_redirection() => {
                    format!("HTTP {status}, redirect to {location} not followed")
                }
                _ => format!("HTTP {status}: {}", snippet(&body)),
            };
            return Err(McpDocError::Fetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message,
            });
        }

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE {
                return Err(McpDocError::Fetch {
                    url: url.to_string(),
                    status: Some(status.as_u16()),
                    message: format!("response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"),
                });
            }
        }

        let (bytes, truncated) = read_capped(response, MAX_RESPONSE_SIZE as usize)
            .await
            .map_err(|e| map_transport_error(e, url.as_str(), request.timeout))?;
        if truncated {
            return Err(McpDocError::Fetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("response too large (over {MAX_RESPONSE_SIZE} bytes)"),
            });
        }
        let content = String::from_utf8_lossy(&bytes).into_owned();

        info!(
            %final_url,
            status = status.as_u16(),
            bytes = content.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "fetched remote doc"
        );

        Ok(FetchedDoc {
            content,
            origin: ContentOrigin::Remote {
                final_url,
                status: status.as_u16(),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read a local doc file. Local paths bypass the allow-list.
async fn read_local(locator: &str) -> FetchResult {
    let path = PathBuf::from(locator);
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| McpDocError::local_read(&path, e))?;

    debug!(path = %path.display(), bytes = content.len(), "read local doc");

    Ok(FetchedDoc {
        content,
        origin: ContentOrigin::Local { path },
    })
}

/// Read at most `limit` body bytes. The flag is set when the body was longer.
///
/// Content-Length is not trusted here; chunked bodies are capped the same way.
async fn read_capped(mut response: Response, limit: usize) -> reqwest::Result<(Vec<u8>, bool)> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit - body.len();
        if chunk.len() > room {
            body.extend_from_slice(&chunk[..room]);
            return Ok((body, true));
        }
        body.extend_from_slice(&chunk);
    }
    Ok((body, false))
}

/// Build a reqwest client with appropriate settings.
fn build_client(policy: redirect::Policy) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(policy)
        .build()
        .map_err(|e| McpDocError::Network {
            url: String::new(),
            message: format!("failed to build HTTP client: {e}"),
        })
}

/// Redirect policy for the following client.
///
/// With strict redirects every hop's origin must pass the allow-list;
/// otherwise only the initial URL is checked.
fn redirect_policy(config: &FetchConfig, allow_list: &Arc<AllowList>) -> redirect::Policy {
    let max = config.max_redirects;
    if !config.strict_redirects || allow_list.is_unrestricted() {
        return redirect::Policy::limited(max);
    }

    let allow_list = Arc::clone(allow_list);
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() > max {
            return attempt.error(format!("too many redirects (max {max})"));
        }
        let origin = origin_of(attempt.url()).unwrap_or_default();
        if allow_list.allows_origin(&origin) {
            attempt.follow()
        } else {
            let blocked = DisallowedRedirect {
                url: attempt.url().to_string(),
                origin,
            };
            attempt.error(blocked)
        }
    })
}

/// Raised from the redirect policy when a hop leaves the allow-list.
#[derive(Debug, thiserror::Error)]
#[error("redirect to {url} is outside the allowed domains")]
struct DisallowedRedirect {
    url: String,
    origin: String,
}

/// Classify a reqwest error into the fetch error kinds.
fn map_transport_error(err: reqwest::Error, url: &str, timeout: Duration) -> McpDocError {
    if let Some(blocked) = find_disallowed_redirect(&err) {
        warn!(url, redirect = %blocked.url, "blocked redirect outside allow-list");
        return McpDocError::DomainNotAllowed {
            url: blocked.url.clone(),
            origin: blocked.origin.clone(),
        };
    }

    if err.is_timeout() {
        return McpDocError::Timeout {
            url: url.to_string(),
            timeout,
        };
    }

    if err.is_redirect() {
        return McpDocError::Fetch {
            url: url.to_string(),
            status: None,
            message: error_chain(&err),
        };
    }

    McpDocError::Network {
        url: url.to_string(),
        message: error_chain(&err),
    }
}

fn find_disallowed_redirect(err: &reqwest::Error) -> Option<&DisallowedRedirect> {
    let mut source = std::error::Error::source(err);
    while let Some(e) = source {
        if let Some(blocked) = e.downcast_ref::<DisallowedRedirect>() {
            return Some(blocked);
        }
        source = e.source();
    }
    None
}

/// Render an error with its sources, e.g. `error sending request: connection refused`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        message.push_str(": ");
        message.push_str(&e.to_string());
        source = e.source();
    }
    message
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    let mut out: String = trimmed.chars().take(ERROR_SNIPPET_CHARS).collect();
    if trimmed.chars().count() > ERROR_SNIPPET_CHARS {
        out.push_str("...");
    }
    out
}
