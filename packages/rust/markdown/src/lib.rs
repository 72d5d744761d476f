//! HTML-to-Markdown conversion for fetched docs.
//!
//! HTML pages are reduced to their main content, converted with `htmd`,
//! then passed through a cleanup pipeline. Content that is already text
//! (llms.txt files, Markdown) is returned unchanged.

mod cleanup;

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use tracing::{debug, instrument};
use url::Url;

use mcpdoc_shared::{McpDocError, Result};

/// Tags whose content is dropped entirely during conversion.
const SKIPPED_TAGS: [&str; 6] = ["script", "style", "nav", "iframe", "noscript", "svg"];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Result of normalizing fetched content.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// The final Markdown (or untouched text) content.
    pub markdown: String,
    /// Title from the first H1, if any.
    pub title: Option<String>,
    /// Whether the input was treated as HTML and converted.
    pub converted: bool,
}

/// Options for the conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// URL the content came from, for resolving relative links.
    pub base_url: Option<Url>,
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Normalize fetched content to Markdown.
///
/// HTML input is:
/// 1. Reduced to its main content container (stripping nav/footer chrome)
/// 2. Pre-processed so tables survive as Markdown tables
/// 3. Converted with `htmd`
/// 4. Run through the cleanup pipeline
///
/// Anything else passes through as-is.
#[instrument(skip_all, fields(bytes = content.len()))]
pub fn convert(content: &str, opts: &ConvertOptions) -> Result<ConvertResult> {
    if !looks_like_html(content) {
        debug!("content is not HTML, passing through");
        return Ok(ConvertResult {
            markdown: content.to_string(),
            title: extract_title_from_markdown(content),
            converted: false,
        });
    }

    let content_html = extract_content_html(content);
    let content_html = preprocess_tables(&content_html);

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(SKIPPED_TAGS.to_vec())
        .build();

    let raw_markdown = converter
        .convert(&content_html)
        .map_err(|e| McpDocError::Conversion(format!("htmd conversion failed: {e}")))?;

    debug!(raw_len = raw_markdown.len(), "htmd conversion complete");

    let markdown = cleanup::run_pipeline(&raw_markdown, opts.base_url.as_ref());
    let title = extract_title_from_markdown(&markdown);

    debug!(final_len = markdown.len(), "conversion complete");

    Ok(ConvertResult {
        markdown,
        title,
        converted: true,
    })
}

/// Heuristic check for HTML documents and fragments.
///
/// True for a doctype, an `<html>`/`<body>` element, or content that opens
/// with a block-level tag. Markdown with the odd inline tag stays text.
pub fn looks_like_html(content: &str) -> bool {
    static DOC_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)^\s*(?:<!doctype\s+html|<html[\s>])|<body[\s>]").expect("valid regex")
    });
    static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"(?i)^\s*<(?:div|p|main|article|section|header|h[1-6]|ul|ol|table|pre|head|meta)[\s>/]",
        )
        .expect("valid regex")
    });

    DOC_RE.is_match(content) || BLOCK_RE.is_match(content)
}

// ---------------------------------------------------------------------------
// Table pre-processing
// ---------------------------------------------------------------------------

/// Convert HTML `<table>` elements to markdown table syntax before htmd conversion.
///
/// `htmd` 0.1 doesn't support table conversion, so we handle it manually.
fn preprocess_tables(html: &str) -> String {
    let doc = Html::parse_fragment(html);

    let Ok(table_sel) = scraper::Selector::parse("table") else {
        return html.to_string();
    };

    if doc.select(&table_sel).next().is_none() {
        return html.to_string();
    }

    let mut result = html.to_string();

    for table_el in doc.select(&table_sel) {
        let table_html = table_el.html();
        let md_table = html_table_to_markdown(&table_el);
        result = result.replacen(&table_html, &md_table, 1);
    }

    result
}

/// Convert a single HTML table element to a markdown table string.
fn html_table_to_markdown(table: &scraper::ElementRef) -> String {
    let (Ok(tr_sel), Ok(cell_sel)) = (
        scraper::Selector::parse("tr"),
        scraper::Selector::parse("th, td"),
    ) else {
        return String::new();
    };

    let mut rows: Vec<Vec<String>> = table
        .select(&tr_sel)
        .map(|tr| {
            tr.select(&cell_sel)
                .map(|cell| cell.text().collect::<String>().trim().replace('|', "\\|"))
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect();

    let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    if col_count == 0 {
        return String::new();
    }

    for row in &mut rows {
        row.resize(col_count, String::new());
    }

    let mut md = String::from("\n\n");
    for (idx, row) in rows.iter().enumerate() {
        md.push_str("| ");
        md.push_str(&row.join(" | "));
        md.push_str(" |\n");

        // Separator after the first row, which serves as the header
        if idx == 0 {
            md.push_str("| ");
            md.push_str(&vec!["---"; col_count].join(" | "));
            md.push_str(" |\n");
        }
    }
    md.push('\n');
    md
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Extract the main content HTML, stripping chrome (nav, header, footer, etc.).
fn extract_content_html(html: &str) -> String {
    let doc = Html::parse_document(html);

    // Known content containers in priority order
    let selectors = [
        "article .markdown",
        ".vp-doc",
        ".markdown-section",
        "[role=\"main\"]",
        "article",
        "main",
        ".content",
        "body",
    ];

    for sel_str in &selectors {
        if let Ok(selector) = scraper::Selector::parse(sel_str) {
            if let Some(el) = doc.select(&selector).next() {
                return el.inner_html();
            }
        }
    }

    html.to_string()
}

/// Extract title from the first H1 in the Markdown text.
fn extract_title_from_markdown(md: &str) -> Option<String> {
    static H1_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^# (.+)$").expect("valid regex"));

    H1_RE.captures(md).map(|c| c[1].trim().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn load_fixture(name: &str) -> String {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    fn opts(url: &str) -> ConvertOptions {
        ConvertOptions {
            base_url: Some(Url::parse(url).unwrap()),
        }
    }

    #[test]
    fn plain_text_passes_through() {
        let text = load_fixture("docs/mcp.txt");
        let result = convert(&text, &ConvertOptions::default()).unwrap();

        assert!(!result.converted);
        assert_eq!(result.markdown, text);
        assert_eq!(result.title.as_deref(), Some("Model Context Protocol"));
    }

    #[test]
    fn markdown_with_inline_tag_is_not_html() {
        let md = "# Title\n\nUse <code>foo</code> here.\n";
        assert!(!looks_like_html(md));
    }

    #[test]
    fn detects_documents_and_fragments() {
        assert!(looks_like_html("<!DOCTYPE html><html></html>"));
        assert!(looks_like_html("  <html lang=\"en\"><body></body></html>"));
        assert!(looks_like_html("<div class=\"doc\"><p>x</p></div>"));
        assert!(looks_like_html("<p>Hello</p>"));
        assert!(!looks_like_html("plain words <br> and more"));
    }

    #[test]
    fn convert_simple_html() {
        let html = "<html><body><main><h1>Hello World</h1><p>Some text.</p></main></body></html>";
        let result = convert(html, &opts("https://example.com/page")).unwrap();

        assert!(result.converted);
        assert!(result.markdown.contains("# Hello World"));
        assert!(result.markdown.contains("Some text."));
        assert_eq!(result.title.as_deref(), Some("Hello World"));
    }

    #[test]
    fn convert_page_fixture() {
        let html = load_fixture("docs/page.html");
        let result = convert(&html, &opts("https://langchain-ai.github.io/langgraph/concepts/"))
            .unwrap();

        assert_eq!(result.title.as_deref(), Some("LangGraph Concepts"));
        assert!(result.markdown.contains("**graphs**"));
        assert!(result.markdown.contains("```python"));
        assert!(
            result
                .markdown
                .contains("(https://langchain-ai.github.io/concepts/low_level/)")
        );
        assert!(!result.markdown.contains("Copyright 2024"));
        assert!(!result.markdown.contains("How-tos"));
        assert!(result.markdown.ends_with('\n'));
    }

    #[test]
    fn convert_preserves_tables() {
        let html = r#"<html><body><main>
            <h1>Data</h1>
            <table>
                <thead><tr><th>Name</th><th>Value</th></tr></thead>
                <tbody>
                    <tr><td>foo</td><td>bar</td></tr>
                    <tr><td>baz</td><td>qux</td></tr>
                </tbody>
            </table>
        </main></body></html>"#;

        let result = convert(html, &ConvertOptions::default()).unwrap();
        assert!(result.markdown.contains("| Name | Value |"));
        assert!(result.markdown.contains("| foo | bar |"));
    }

    #[test]
    fn convert_no_main_element() {
        let html = "<html><body><h1>Direct Body</h1><p>Content in body.</p></body></html>";
        let result = convert(html, &ConvertOptions::default()).unwrap();
        assert!(result.markdown.contains("Direct Body"));
        assert!(result.markdown.contains("Content in body."));
    }

    #[test]
    fn convert_empty_body_has_no_title() {
        let result = convert("<html><body></body></html>", &ConvertOptions::default()).unwrap();
        assert!(result.converted);
        assert_eq!(result.title, None);
    }
}
