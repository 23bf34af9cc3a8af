//! Access tokens for the Discovery Engine API.

use crate::config::{AuthMethod, Settings};
use crate::error::{Result, VidseekError};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// gcloud doesn't report expiry; tokens live for an hour.
const GCLOUD_TOKEN_TTL: Duration = Duration::from_secs(45 * 60);

/// Refresh metadata tokens this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Source of OAuth bearer tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Return a currently valid access token.
    async fn access_token(&self) -> Result<String>;

    /// Short name for logs and diagnostics.
    fn describe(&self) -> &'static str;
}

/// A fixed token, typically from `GOOGLE_OAUTH_ACCESS_TOKEN`.
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }

    fn describe(&self) -> &'static str {
        "static token"
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn fresh(&self) -> Option<String> {
        (Instant::now() < self.expires_at).then(|| self.token.clone())
    }
}

/// Tokens from the local gcloud CLI (`gcloud auth print-access-token`).
pub struct GcloudToken {
    cache: Mutex<Option<CachedToken>>,
}

impl GcloudToken {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(None),
        }
    }
}

impl Default for GcloudToken {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenSource for GcloudToken {
    #[instrument(skip(self))]
    async fn access_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref().and_then(CachedToken::fresh) {
            return Ok(token);
        }

        debug!("Requesting access token from gcloud");
        let output = tokio::process::Command::new("gcloud")
            .args(["auth", "print-access-token"])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VidseekError::ToolNotFound("gcloud".to_string())
                } else {
                    VidseekError::ToolFailed(format!("Failed to run gcloud: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidseekError::Auth(format!(
                "gcloud auth print-access-token failed: {}",
                stderr.trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(VidseekError::Auth(
                "gcloud returned an empty access token".to_string(),
            ));
        }

        *cache = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + GCLOUD_TOKEN_TTL,
        });
        Ok(token)
    }

    fn describe(&self) -> &'static str {
        "gcloud CLI"
    }
}

#[derive(Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Tokens for the attached service account, read from the GCE / Cloud Run metadata server.
pub struct MetadataToken {
    http: reqwest::Client,
    url: String,
    cache: Mutex<Option<CachedToken>>,
}

impl MetadataToken {
    pub fn new() -> Self {
        Self::with_url(METADATA_TOKEN_URL)
    }

    /// Point at a different metadata endpoint.
    pub fn with_url(url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.to_string(),
            cache: Mutex::new(None),
        }
    }
}

impl Default for MetadataToken {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenSource for MetadataToken {
    #[instrument(skip(self))]
    async fn access_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref().and_then(CachedToken::fresh) {
            return Ok(token);
        }

        debug!("Requesting access token from metadata server");
        let resp = self
            .http
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VidseekError::Auth(format!(
                "metadata server returned {}: {}",
                status, body
            )));
        }

        let parsed: MetadataTokenResponse = resp.json().await?;
        let lifetime = Duration::from_secs(parsed.expires_in).saturating_sub(EXPIRY_MARGIN);
        *cache = Some(CachedToken {
            token: parsed.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(parsed.access_token)
    }

    fn describe(&self) -> &'static str {
        "metadata server"
    }
}

/// Resolve `auto` into a concrete method.
///
/// `on_cloud_run` is whether `K_SERVICE` is present in the environment.
pub fn resolve_method(settings: &Settings, on_cloud_run: bool) -> AuthMethod {
    match settings.auth.method {
        AuthMethod::Auto if settings.auth.access_token.is_some() => AuthMethod::Token,
        AuthMethod::Auto if on_cloud_run => AuthMethod::Metadata,
        AuthMethod::Auto => AuthMethod::Gcloud,
        method => method,
    }
}

/// Build the token source selected by the settings.
pub fn token_source(settings: &Settings) -> Result<Arc<dyn TokenSource>> {
    let on_cloud_run = std::env::var_os("K_SERVICE").is_some();
    let source: Arc<dyn TokenSource> = match resolve_method(settings, on_cloud_run) {
        AuthMethod::Token => {
            let token = settings.auth.access_token.clone().ok_or_else(|| {
                VidseekError::Config(
                    "auth.method is 'token' but no access token is configured \
                     (set GOOGLE_OAUTH_ACCESS_TOKEN)"
                        .to_string(),
                )
            })?;
            Arc::new(StaticToken::new(token))
        }
        AuthMethod::Metadata => Arc::new(MetadataToken::new()),
        AuthMethod::Gcloud | AuthMethod::Auto => Arc::new(GcloudToken::new()),
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let source = StaticToken::new("ya29.token");
        assert_eq!(source.access_token().await.unwrap(), "ya29.token");
    }

    #[test]
    fn test_resolve_auto() {
        let mut settings = Settings::default();
        assert_eq!(resolve_method(&settings, false), AuthMethod::Gcloud);
        assert_eq!(resolve_method(&settings, true), AuthMethod::Metadata);

        settings.auth.access_token = Some("t".to_string());
        assert_eq!(resolve_method(&settings, true), AuthMethod::Token);
    }

    #[test]
    fn test_resolve_explicit_method_wins() {
        let mut settings = Settings::default();
        settings.auth.method = AuthMethod::Gcloud;
        settings.auth.access_token = Some("t".to_string());
        assert_eq!(resolve_method(&settings, true), AuthMethod::Gcloud);
    }

    #[test]
    fn test_token_method_requires_token() {
        let mut settings = Settings::default();
        settings.auth.method = AuthMethod::Token;
        assert!(matches!(
            token_source(&settings),
            Err(VidseekError::Config(_))
        ));

        settings.auth.access_token = Some("t".to_string());
        assert_eq!(token_source(&settings).unwrap().describe(), "static token");
    }

    #[test]
    fn test_cached_token_expiry() {
        let expired = CachedToken {
            token: "old".to_string(),
            expires_at: Instant::now(),
        };
        assert!(expired.fresh().is_none());

        let valid = CachedToken {
            token: "new".to_string(),
            expires_at: Instant::now() + Duration::from_secs(60),
        };
        assert_eq!(valid.fresh().as_deref(), Some("new"));
    }

    /// Local metadata server issuing `expires_in`-second tokens and counting hits.
    async fn metadata_server(expires_in: u64) -> (String, Arc<std::sync::atomic::AtomicUsize>) {
        use axum::{http::HeaderMap, routing::get, Json, Router};
        use std::sync::atomic::{AtomicUsize, Ordering};

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/token",
            get(move |headers: HeaderMap| {
                let counter = counter.clone();
                async move {
                    assert_eq!(headers["metadata-flavor"], "Google");
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    Json(serde_json::json!({
                        "access_token": format!("ya29.meta-{}", n),
                        "expires_in": expires_in,
                        "token_type": "Bearer"
                    }))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/token", addr), hits)
    }

    #[tokio::test]
    async fn test_metadata_token_cached_within_lifetime() {
        use std::sync::atomic::Ordering;

        let (url, hits) = metadata_server(3600).await;
        let source = MetadataToken::with_url(&url);

        assert_eq!(source.access_token().await.unwrap(), "ya29.meta-1");
        assert_eq!(source.access_token().await.unwrap(), "ya29.meta-1");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_metadata_token_refreshed_near_expiry() {
        use std::sync::atomic::Ordering;

        // Lifetime inside the refresh margin: never served from cache
        let (url, hits) = metadata_server(30).await;
        let source = MetadataToken::with_url(&url);

        assert_eq!(source.access_token().await.unwrap(), "ya29.meta-1");
        assert_eq!(source.access_token().await.unwrap(), "ya29.meta-2");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_metadata_error_status_is_auth_error() {
        use axum::{http::StatusCode, routing::get, Router};

        let app = Router::new().route("/token", get(|| async { (StatusCode::NOT_FOUND, "no sa") }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let source = MetadataToken::with_url(&format!("http://{}/token", addr));
        assert!(matches!(
            source.access_token().await,
            Err(VidseekError::Auth(_))
        ));
    }
}
