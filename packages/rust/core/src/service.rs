//! The docs service: the boundary the tool-call layer talks to.
//!
//! Built once at startup from the operator's configuration. Each request
//! resolves an identifier against the catalog, fetches it through the
//! allow-listed fetcher and converts the result to Markdown. Request-time
//! failures come back as text so the calling agent can read them.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};

use mcpdoc_catalog::{Catalog, OVERVIEW_ALIASES, Resolved};
use mcpdoc_fetcher::{AllowList, FetchRequest, Fetcher};
use mcpdoc_markdown::ConvertOptions;
use mcpdoc_shared::{FetchConfig, McpDocError, Result};

/// Everything needed to stand up a [`DocsService`].
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// YAML source list.
    pub yaml: Option<PathBuf>,
    /// JSON source list.
    pub json: Option<PathBuf>,
    /// `locator` / `name:locator` tokens from the command line.
    pub urls: Vec<String>,
    /// Extra allowed domains; `"*"` disables the allow-list.
    pub allowed_domains: Vec<String>,
    /// Timeout and redirect policy.
    pub fetch: FetchConfig,
}

/// Text payload returned for every tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResponse {
    pub text: String,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResponse {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Immutable catalog + fetcher pair shared by all requests.
#[derive(Debug, Clone)]
pub struct DocsService {
    catalog: Catalog,
    fetcher: Fetcher,
    fetch: FetchConfig,
}

impl DocsService {
    /// Build the catalog and allow-list from configuration.
    ///
    /// Any error here is a configuration error and should stop startup.
    #[instrument(skip_all)]
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let catalog = mcpdoc_catalog::build(
            config.yaml.as_deref(),
            config.json.as_deref(),
            &config.urls,
        )?;
        Self::new(catalog, &config.allowed_domains, config.fetch.clone())
    }

    /// Wrap an existing catalog.
    ///
    /// The overview alias URLs are pre-approved as exact URLs. Their origins
    /// stay out of the allow-list.
    pub fn new(catalog: Catalog, allowed_domains: &[String], fetch: FetchConfig) -> Result<Self> {
        let allow_list = mcpdoc_fetcher::resolve(&catalog, allowed_domains);
        let fetcher = Fetcher::new(&fetch, allow_list)?
            .with_pre_approved(OVERVIEW_ALIASES.iter().map(|alias| alias.url));

        info!(
            sources = catalog.len(),
            unrestricted = fetcher.allow_list().is_unrestricted(),
            "docs service ready"
        );

        Ok(Self {
            catalog,
            fetcher,
            fetch,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn allow_list(&self) -> &AllowList {
        self.fetcher.allow_list()
    }

    /// Text listing of the catalog and the overview aliases.
    pub fn list_doc_sources(&self) -> String {
        let mut out = String::new();

        for source in &self.catalog {
            let name = source.name.as_deref().unwrap_or(&source.locator);
            let label = if source.is_remote() { "URL" } else { "Path" };
            let _ = writeln!(out, "{name}");
            let _ = writeln!(out, "{label}: {}", source.locator);
            if let Some(description) = &source.description {
                let _ = writeln!(out, "Description: {description}");
            }
            out.push('\n');
        }

        out.push_str("Overview aliases:\n");
        for alias in OVERVIEW_ALIASES {
            let _ = writeln!(out, "- {}: {}", alias.name, alias.url);
        }

        out
    }

    /// Fetch and convert the resource behind `identifier`.
    ///
    /// Never fails: errors are rendered into the response text.
    pub async fn fetch_docs(&self, identifier: &str) -> ToolResponse {
        match self.try_fetch_docs(identifier).await {
            Ok(markdown) => ToolResponse::ok(markdown),
            Err(err) => {
                warn!(identifier, kind = %err.kind(), error = %err, "fetch_docs failed");
                ToolResponse::error(self.render_error(identifier, &err))
            }
        }
    }

    /// Like [`fetch_docs`](Self::fetch_docs) but returns the typed error.
    #[instrument(skip(self))]
    pub async fn try_fetch_docs(&self, identifier: &str) -> Result<String> {
        let started = Instant::now();
        let resolved = self.catalog.resolve(identifier);
        if let Resolved::Alias(alias) = resolved {
            info!(alias = alias.name, url = alias.url, "resolved overview alias");
        }

        let request = FetchRequest::new(resolved.locator(), &self.fetch);
        let doc = self.fetcher.fetch(&request).await?;

        let opts = ConvertOptions {
            base_url: doc.base_url().cloned(),
        };
        let converted = mcpdoc_markdown::convert(&doc.content, &opts)?;

        info!(
            locator = %request.locator,
            converted = converted.converted,
            bytes = converted.markdown.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "fetch_docs complete"
        );

        Ok(converted.markdown)
    }

    fn render_error(&self, identifier: &str, err: &McpDocError) -> String {
        let mut text = format!("Error fetching documentation for '{identifier}': {err}");

        if let (McpDocError::DomainNotAllowed { .. }, Some(origins)) =
            (err, self.allow_list().origins())
        {
            text.push_str("\nAllowed domains:");
            for origin in origins {
                let _ = write!(text, "\n- {origin}");
            }
            text.push_str("\nUse list_doc_sources to see the configured documentation sources.");
        }

        text
    }
}
