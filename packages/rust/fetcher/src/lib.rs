//! Allow-list resolution and domain-gated fetching.
//!
//! This crate provides:
//! - [`allowlist`]: derives the set of origins outbound fetches may target
//! - [`engine`]: the [`Fetcher`], which reads local paths directly and
//!   fetches URLs only when their origin passes the allow-list

pub mod allowlist;
pub mod engine;

pub use allowlist::{AllowList, WILDCARD, normalize_domain, resolve};
pub use engine::{ContentOrigin, FetchRequest, FetchResult, FetchedDoc, Fetcher};
