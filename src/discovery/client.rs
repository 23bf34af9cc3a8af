//! REST client for the Discovery Engine search method.

use super::auth::TokenSource;
use super::types::{SearchRequest, SearchResponse};
use super::SearchBackend;
use crate::config::Settings;
use crate::error::{Result, VidseekError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Client for `projects.locations.collections.engines.servingConfigs.search`.
pub struct DiscoveryEngineClient {
    http: reqwest::Client,
    endpoint: String,
    quota_project: String,
    tokens: Arc<dyn TokenSource>,
}

impl DiscoveryEngineClient {
    /// Create a client from settings.
    pub fn new(settings: &Settings, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.search.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            endpoint: settings.api_endpoint(),
            quota_project: settings.search.project_id.clone(),
            tokens,
        })
    }

    /// URL of the search method for a serving config.
    pub fn search_url(&self, serving_config: &str) -> String {
        format!("{}/v1/{}:search", self.endpoint, serving_config)
    }
}

#[async_trait]
impl SearchBackend for DiscoveryEngineClient {
    #[instrument(skip(self, request), fields(query = %request.query, page_size = request.page_size))]
    async fn search(&self, serving_config: &str, request: &SearchRequest) -> Result<SearchResponse> {
        let token = self.tokens.access_token().await?;
        let url = self.search_url(serving_config);

        debug!("POST {}", url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header("x-goog-user-project", &self.quota_project)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VidseekError::Discovery {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = resp.json().await?;
        debug!(
            "Received {} results (total {})",
            parsed.results.len(),
            parsed.total_size
        );
        Ok(parsed)
    }
}
