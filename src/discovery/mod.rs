//! Client side of the managed search service (Discovery Engine / Vertex AI Search).
//!
//! Ranking, snippets, facet counts and summaries are all computed remotely;
//! this module only speaks the wire protocol.

mod auth;
mod client;
pub mod types;

pub use auth::{
    resolve_method, token_source, GcloudToken, MetadataToken, StaticToken, TokenSource,
};
pub use client::DiscoveryEngineClient;
pub use types::{SearchRequest, SearchResponse};

use crate::error::Result;
use async_trait::async_trait;

/// Trait for anything that can answer a search request.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one search against `serving_config`. Returns a single page.
    async fn search(&self, serving_config: &str, request: &SearchRequest) -> Result<SearchResponse>;
}
