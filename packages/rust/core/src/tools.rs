//! Tool definitions and dispatch for the docs service.
//!
//! The RPC layer hands us a tool name plus JSON arguments and sends back
//! whatever [`ToolResponse`] we produce. Bad tool names or arguments are
//! answered in-band like any other failure.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::service::{DocsService, ToolResponse};

pub const LIST_DOC_SOURCES: &str = "list_doc_sources";
pub const FETCH_DOCS: &str = "fetch_docs";
/// Older name for [`FETCH_DOCS`], defaulting to the LangGraph overview.
pub const GET_DOCS: &str = "get_docs";

const DEFAULT_RESOURCE: &str = "langgraph_overview";

/// A tool advertised to the calling agent.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// All tools the service exposes.
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: LIST_DOC_SOURCES,
            description: "List the available documentation sources.\n\n\
                Call this first to see which names, URLs and local files can be \
                passed to fetch_docs.",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolDefinition {
            name: FETCH_DOCS,
            description: "Fetch a documentation file and return it as Markdown.\n\n\
                `url` may be a source name from list_doc_sources, an overview alias \
                (\"langgraph_overview\" or \"mcp_overview\"), a URL on an allowed \
                domain, or a local file path.",
            input_schema: resource_schema(false),
        },
        ToolDefinition {
            name: GET_DOCS,
            description: "Get documentation for LangGraph or MCP.\n\n\
                Always fetch the overview first to get a list of available URLs: \
                use \"langgraph_overview\" for LangGraph and \"mcp_overview\" for MCP.",
            input_schema: resource_schema(true),
        },
    ]
}

fn resource_schema(with_default: bool) -> Value {
    let mut url = json!({
        "type": "string",
        "description": "Source name, overview alias, URL or local path to fetch",
    });
    if with_default {
        url["default"] = json!(DEFAULT_RESOURCE);
        json!({ "type": "object", "properties": { "url": url } })
    } else {
        json!({ "type": "object", "properties": { "url": url }, "required": ["url"] })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FetchDocsArgs {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GetDocsArgs {
    #[serde(default = "default_resource")]
    url: String,
}

fn default_resource() -> String {
    DEFAULT_RESOURCE.to_string()
}

impl DocsService {
    /// Dispatch one tool call.
    #[instrument(skip(self, arguments))]
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResponse {
        let arguments = match arguments {
            Value::Null => json!({}),
            other => other,
        };
        debug!(%arguments, "tool call");

        match name {
            LIST_DOC_SOURCES => ToolResponse::ok(self.list_doc_sources()),
            FETCH_DOCS => match serde_json::from_value::<FetchDocsArgs>(arguments) {
                Ok(args) => self.fetch_docs(&args.url).await,
                Err(e) => ToolResponse::error(format!("Error: invalid arguments for {name}: {e}")),
            },
            GET_DOCS => match serde_json::from_value::<GetDocsArgs>(arguments) {
                Ok(args) => self.fetch_docs(&args.url).await,
                Err(e) => ToolResponse::error(format!("Error: invalid arguments for {name}: {e}")),
            },
            _ => ToolResponse::error(format!(
                "Error: unknown tool '{name}'. Available tools: {LIST_DOC_SOURCES}, {FETCH_DOCS}, {GET_DOCS}"
            )),
        }
    }
}
