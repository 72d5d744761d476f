//! Error types for mcpdoc.
//!
//! Library crates use [`McpDocError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;
use std::time::Duration;

/// Coarse classification of an [`McpDocError`].
///
/// Configuration-time kinds are fatal at startup; request-time kinds are
/// reported back to the calling agent as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoSourcesConfigured,
    InvalidConfig,
    ConfigFileError,
    DomainNotAllowed,
    LocalReadError,
    FetchError,
    Timeout,
    NetworkError,
    Conversion,
}

impl ErrorKind {
    /// Whether this kind aborts startup rather than a single request.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::NoSourcesConfigured | Self::InvalidConfig | Self::ConfigFileError
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NoSourcesConfigured => "NoSourcesConfigured",
            Self::InvalidConfig => "InvalidConfig",
            Self::ConfigFileError => "ConfigFileError",
            Self::DomainNotAllowed => "DomainNotAllowed",
            Self::LocalReadError => "LocalReadError",
            Self::FetchError => "FetchError",
            Self::Timeout => "Timeout",
            Self::NetworkError => "NetworkError",
            Self::Conversion => "Conversion",
        };
        f.write_str(name)
    }
}

/// Top-level error type for all mcpdoc operations.
#[derive(Debug, thiserror::Error)]
pub enum McpDocError {
    /// None of the YAML, JSON or CLI source inputs were provided.
    #[error("no doc sources configured: at least one of --yaml, --json or --urls is required")]
    NoSourcesConfigured,

    /// A config file or entry has the wrong shape.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// A config file is missing, unreadable or syntactically broken.
    #[error("error loading config file {path:?}: {message}")]
    ConfigFile { path: PathBuf, message: String },

    /// The URL's origin is not in the allow-list. No request was sent.
    #[error("domain not allowed: {url} (origin {origin} is not in the allowed domains)")]
    DomainNotAllowed { url: String, origin: String },

    /// Reading a local doc file failed.
    #[error("failed to read local file {path:?}: {source}")]
    LocalRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The server answered with a non-2xx status, or the body was unusable.
    #[error("fetch failed for {url}: {message}")]
    Fetch {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {:.1}s", timeout.as_secs_f64())]
    Timeout { url: String, timeout: Duration },

    /// Any other transport-level failure.
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    /// HTML-to-Markdown conversion error.
    #[error("conversion error: {0}")]
    Conversion(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, McpDocError>;

impl McpDocError {
    /// Create an invalid-config error from any displayable message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: msg.into(),
        }
    }

    /// Create a config-file error for `path`.
    pub fn config_file(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::ConfigFile {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` raised while reading a local doc file.
    pub fn local_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalRead {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoSourcesConfigured => ErrorKind::NoSourcesConfigured,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Self::ConfigFile { .. } => ErrorKind::ConfigFileError,
            Self::DomainNotAllowed { .. } => ErrorKind::DomainNotAllowed,
            Self::LocalRead { .. } => ErrorKind::LocalReadError,
            Self::Fetch { .. } => ErrorKind::FetchError,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Network { .. } => ErrorKind::NetworkError,
            Self::Conversion(_) => ErrorKind::Conversion,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = McpDocError::invalid_config("entry 2 is missing doc_file");
        assert_eq!(err.to_string(), "invalid config: entry 2 is missing doc_file");

        let err = McpDocError::Timeout {
            url: "https://example.com/llms.txt".into(),
            timeout: Duration::from_millis(2500),
        };
        assert_eq!(
            err.to_string(),
            "request to https://example.com/llms.txt timed out after 2.5s"
        );
    }

    #[test]
    fn config_time_errors_are_fatal() {
        assert!(McpDocError::NoSourcesConfigured.is_fatal());
        assert!(McpDocError::config_file("a.yaml", "not found").is_fatal());

        let err = McpDocError::DomainNotAllowed {
            url: "https://evil.com/d.txt".into(),
            origin: "https://evil.com".into(),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.kind(), ErrorKind::DomainNotAllowed);
    }

    #[test]
    fn kind_display_uses_variant_name() {
        assert_eq!(ErrorKind::LocalReadError.to_string(), "LocalReadError");
        assert_eq!(ErrorKind::ConfigFileError.to_string(), "ConfigFileError");
    }
}
