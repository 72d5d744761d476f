//! Tool-call boundary for mcpdoc.
//!
//! This crate ties together the catalog, the allow-listed fetcher and the
//! Markdown converter behind [`DocsService`], which the RPC layer calls
//! with a tool name and arguments.

pub mod service;
pub mod tools;

pub use service::{DocsService, ServiceConfig, ToolResponse};
pub use tools::{FETCH_DOCS, GET_DOCS, LIST_DOC_SOURCES, ToolDefinition, definitions};
