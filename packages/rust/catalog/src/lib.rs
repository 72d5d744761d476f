//! Doc source catalog construction.
//!
//! At startup mcpdoc merges doc sources from a YAML file, a JSON file and
//! the `--urls` command-line list into one ordered [`Catalog`]. The catalog
//! is immutable afterwards and also answers which locator a tool request
//! refers to (overview alias, entry name, or a raw URL/path).

mod parser;

use std::path::Path;

use mcpdoc_shared::{DocSource, McpDocError, Result};
use tracing::{debug, info, instrument, warn};

pub use parser::{SourceEntry, parse_entry, parse_token};

// ---------------------------------------------------------------------------
// Overview aliases
// ---------------------------------------------------------------------------

/// A fixed resource name that resolves to a trusted URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverviewAlias {
    pub name: &'static str,
    pub url: &'static str,
}

/// Built-in overview aliases, in listing order.
pub const OVERVIEW_ALIASES: &[OverviewAlias] = &[
    OverviewAlias {
        name: "langgraph_overview",
        url: "https://raw.githubusercontent.com/esakrissa/mcp-doc/main/docs/langgraph.txt",
    },
    OverviewAlias {
        name: "mcp_overview",
        url: "https://raw.githubusercontent.com/esakrissa/mcp-doc/main/docs/mcp.txt",
    },
];

/// Look up an overview alias by name.
pub fn overview_alias(name: &str) -> Option<&'static OverviewAlias> {
    OVERVIEW_ALIASES.iter().find(|a| a.name == name)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Ordered, immutable list of configured doc sources.
///
/// Order is YAML entries, then JSON entries, then CLI entries. Duplicate
/// locators are kept as separate entries.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sources: Vec<DocSource>,
}

/// What a tool request identifier refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<'a> {
    /// A built-in overview alias.
    Alias(&'static OverviewAlias),
    /// A catalog entry, matched by name.
    Source(&'a DocSource),
    /// Not known to the catalog; used verbatim as a URL or path.
    Raw(&'a str),
}

impl Resolved<'_> {
    /// The locator to hand to the fetcher.
    pub fn locator(&self) -> &str {
        match self {
            Self::Alias(alias) => alias.url,
            Self::Source(source) => &source.locator,
            Self::Raw(raw) => raw,
        }
    }
}

impl Catalog {
    /// Wrap already-parsed sources, assigning default names where missing.
    ///
    /// The default is derived from the locator (URL host or file name), or
    /// `source-<n>` (1-based position) when nothing can be derived.
    pub fn new(sources: Vec<DocSource>) -> Self {
        let sources = sources
            .into_iter()
            .enumerate()
            .map(|(idx, mut source)| {
                if source.name.is_none() {
                    source.name = Some(
                        source
                            .derived_name()
                            .unwrap_or_else(|| format!("source-{}", idx + 1)),
                    );
                }
                source
            })
            .collect();

        Self { sources }
    }

    pub fn sources(&self) -> &[DocSource] {
        &self.sources
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocSource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// First entry whose name matches `name` exactly.
    pub fn find(&self, name: &str) -> Option<&DocSource> {
        self.sources
            .iter()
            .find(|s| s.name.as_deref() == Some(name))
    }

    /// Resolve a tool request identifier.
    ///
    /// Overview aliases win over entry names; anything unmatched is raw.
    pub fn resolve<'a>(&'a self, identifier: &'a str) -> Resolved<'a> {
        let identifier = identifier.trim();
        if let Some(alias) = overview_alias(identifier) {
            return Resolved::Alias(alias);
        }
        match self.find(identifier) {
            Some(source) => Resolved::Source(source),
            None => Resolved::Raw(identifier),
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a DocSource;
    type IntoIter = std::slice::Iter<'a, DocSource>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Format of a source config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaml => f.write_str("YAML"),
            Self::Json => f.write_str("JSON"),
        }
    }
}

/// Build the catalog from the three configuration origins.
///
/// Empty paths count as absent. Fails with `NoSourcesConfigured` when no
/// origin is given, `ConfigFile` for unreadable or unparseable files, and
/// `InvalidConfig` for files that are not a list of source mappings.
#[instrument(skip_all, fields(yaml = ?yaml, json = ?json, cli = cli_entries.len()))]
pub fn build(yaml: Option<&Path>, json: Option<&Path>, cli_entries: &[String]) -> Result<Catalog> {
    let yaml = yaml.filter(|p| !p.as_os_str().is_empty());
    let json = json.filter(|p| !p.as_os_str().is_empty());

    if yaml.is_none() && json.is_none() && cli_entries.is_empty() {
        return Err(McpDocError::NoSourcesConfigured);
    }

    let mut sources = Vec::new();

    if let Some(path) = yaml {
        let entries = load_config_file(path, ConfigFormat::Yaml)?;
        debug!(path = %path.display(), entries = entries.len(), "loaded YAML sources");
        sources.extend(entries.into_iter().filter_map(parse_entry));
    }

    if let Some(path) = json {
        let entries = load_config_file(path, ConfigFormat::Json)?;
        debug!(path = %path.display(), entries = entries.len(), "loaded JSON sources");
        sources.extend(entries.into_iter().filter_map(parse_entry));
    }

    sources.extend(cli_entries.iter().filter_map(|t| parse_token(t)));

    let catalog = Catalog::new(sources);
    if catalog.is_empty() {
        warn!("doc source catalog is empty; only raw URLs and paths can be fetched");
    }
    info!(sources = catalog.len(), "doc source catalog built");

    Ok(catalog)
}

/// Read and validate one config file as a list of source entries.
pub fn load_config_file(path: &Path, format: ConfigFormat) -> Result<Vec<SourceEntry>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| McpDocError::config_file(path, e.to_string()))?;

    match format {
        ConfigFormat::Yaml => {
            let value: serde_yaml::Value = serde_yaml::from_str(&content)
                .map_err(|e| McpDocError::config_file(path, e.to_string()))?;
            let serde_yaml::Value::Sequence(items) = value else {
                return Err(not_a_list(path, format));
            };
            items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| {
                    serde_yaml::from_value(item).map_err(|e| bad_entry(path, idx, e))
                })
                .collect()
        }
        ConfigFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(&content)
                .map_err(|e| McpDocError::config_file(path, e.to_string()))?;
            let serde_json::Value::Array(items) = value else {
                return Err(not_a_list(path, format));
            };
            items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| {
                    serde_json::from_value(item).map_err(|e| bad_entry(path, idx, e))
                })
                .collect()
        }
    }
}

fn not_a_list(path: &Path, format: ConfigFormat) -> McpDocError {
    McpDocError::invalid_config(format!(
        "{format} config {} must contain a list of doc sources",
        path.display()
    ))
}

fn bad_entry(path: &Path, idx: usize, err: impl std::fmt::Display) -> McpDocError {
    McpDocError::invalid_config(format!(
        "{} entry {}: {err}",
        path.display(),
        idx + 1
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpdoc_shared::ErrorKind;
    use std::path::PathBuf;

    fn fixture_path(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/config")
            .join(name)
    }

    fn temp_file(ext: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mcpdoc-catalog-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("sources.{ext}"));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn no_inputs_fails_with_no_sources() {
        let err = build(None, None, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSourcesConfigured);
    }

    #[test]
    fn empty_paths_count_as_absent() {
        let err = build(Some(Path::new("")), Some(Path::new("")), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSourcesConfigured);
    }

    #[test]
    fn merges_in_yaml_json_cli_order() {
        let yaml = fixture_path("sample_config.yaml");
        let json = fixture_path("sample_config.json");
        let cli = vec!["Cli:docs/cli.txt".to_string()];

        let catalog = build(Some(&yaml), Some(&json), &cli).unwrap();
        let names: Vec<_> = catalog
            .iter()
            .map(|s| s.name.clone().unwrap_or_default())
            .collect();

        assert_eq!(
            names,
            [
                "LangGraph Python",
                "Local MCP",
                "LangGraph",
                "modelcontextprotocol.io",
                "Cli"
            ]
        );
        assert_eq!(
            catalog.sources()[0].description.as_deref(),
            Some("LangGraph reference for Python")
        );
    }

    #[test]
    fn non_list_yaml_is_invalid_config() {
        let err = build(Some(&fixture_path("not_a_list.yaml")), None, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn non_list_json_is_invalid_config() {
        let err = build(None, Some(&fixture_path("not_a_list.json")), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn scalar_and_empty_documents_are_invalid_config() {
        for (ext, content) in [("yaml", "just a string\n"), ("yaml", ""), ("json", "42")] {
            let path = temp_file(ext, content);
            let format = if ext == "yaml" {
                ConfigFormat::Yaml
            } else {
                ConfigFormat::Json
            };
            let err = load_config_file(&path, format).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfig, "content {content:?}");
        }
    }

    #[test]
    fn entry_without_locator_is_invalid_config() {
        let err = build(None, Some(&fixture_path("missing_doc_file.json")), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(err.to_string().contains("entry 1"));
    }

    #[test]
    fn list_of_strings_is_invalid_config() {
        let path = temp_file("json", r#"["https://example.com/llms.txt"]"#);
        let err = load_config_file(&path, ConfigFormat::Json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn malformed_yaml_is_config_file_error() {
        let err = build(Some(&fixture_path("broken.yaml")), None, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigFileError);
    }

    #[test]
    fn missing_file_is_config_file_error() {
        let err = build(None, Some(&fixture_path("does_not_exist.json")), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigFileError);
    }

    #[test]
    fn blank_entries_are_dropped() {
        let catalog = build(Some(&fixture_path("blank_entries.yaml")), None, &[]).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.sources()[0].name.as_deref(), Some("Kept"));
    }

    #[test]
    fn blank_cli_tokens_yield_empty_catalog() {
        let catalog = build(None, None, &["  ".to_string()]).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn duplicate_locators_coexist() {
        let cli = vec![
            "A:https://example.com/llms.txt".to_string(),
            "B:https://example.com/llms.txt".to_string(),
        ];
        let catalog = build(None, None, &cli).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn default_names_fall_back_to_position() {
        let catalog = Catalog::new(vec![
            DocSource::new("https://example.com/llms.txt"),
            DocSource::new("/"),
        ]);
        assert_eq!(catalog.sources()[0].name.as_deref(), Some("example.com"));
        assert_eq!(catalog.sources()[1].name.as_deref(), Some("source-2"));
    }

    #[test]
    fn resolve_prefers_alias_then_name_then_raw() {
        let catalog = Catalog::new(vec![
            DocSource::new("docs/langgraph.txt").with_name("langgraph_overview"),
            DocSource::new("https://example.com/llms.txt").with_name("Example"),
        ]);

        let alias = catalog.resolve("langgraph_overview");
        assert!(matches!(alias, Resolved::Alias(_)));
        assert!(alias.locator().starts_with("https://raw.githubusercontent.com/"));

        let named = catalog.resolve("Example");
        assert_eq!(named.locator(), "https://example.com/llms.txt");

        let raw = catalog.resolve(" https://other.com/x.txt ");
        assert_eq!(raw, Resolved::Raw("https://other.com/x.txt"));
    }
}
