//! Configuration settings for vidseek.

use crate::error::{Result, VidseekError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    pub server: ServerSettings,
}

/// A facet the search service should count alongside results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacetSpecSettings {
    /// Indexed field to facet on (e.g. "persons.name").
    pub key: String,
    /// Maximum number of facet values returned.
    pub limit: u32,
}

impl FacetSpecSettings {
    fn new(key: &str, limit: u32) -> Self {
        Self {
            key: key.to_string(),
            limit,
        }
    }
}

/// Search engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Google Cloud project ID or number.
    pub project_id: String,
    /// Engine location ("global", "us", "eu", ...).
    pub location: String,
    /// Search engine (app) ID.
    pub engine_id: String,
    /// Collection the engine belongs to.
    pub collection_id: String,
    /// Serving config used to answer queries.
    pub serving_config_id: String,
    /// Explicit API endpoint. Derived from `location` when unset.
    pub api_endpoint: Option<String>,
    /// Results requested per page.
    pub page_size: u32,
    /// Upper bound for `page_size`.
    pub max_page_size: u32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Number of top results the summary is generated from.
    pub summary_result_count: u32,
    /// Ask for citations in the generated summary.
    pub include_citations: bool,
    /// Skip summaries for adversarial queries.
    pub ignore_adversarial_query: bool,
    /// Skip summaries for queries that don't ask for one.
    pub ignore_non_summary_seeking_query: bool,
    /// Preamble sent to the summarization model.
    pub summary_preamble: String,
    /// Summarization model version.
    pub summary_model_version: String,
    /// Time zone reported in the request's user info.
    pub time_zone: String,
    /// Facets requested with every search.
    pub facets: Vec<FacetSpecSettings>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            location: String::new(),
            engine_id: String::new(),
            collection_id: "default_collection".to_string(),
            serving_config_id: "default_config".to_string(),
            api_endpoint: None,
            page_size: 10,
            max_page_size: 20,
            timeout_seconds: 30,
            summary_result_count: 5,
            include_citations: true,
            ignore_adversarial_query: true,
            ignore_non_summary_seeking_query: true,
            summary_preamble: "Provide a brief summary of the video content.".to_string(),
            summary_model_version: "stable".to_string(),
            time_zone: "Asia/Jakarta".to_string(),
            facets: vec![
                FacetSpecSettings::new("persons.name", 20),
                FacetSpecSettings::new("organizations.name", 20),
                FacetSpecSettings::new("hash_tags", 50),
            ],
        }
    }
}

impl SearchSettings {
    /// Whether `key` is one of the configured facet keys.
    pub fn is_facet_key(&self, key: &str) -> bool {
        self.facets.iter().any(|f| f.key == key)
    }
}

/// Object storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Public base URL that `gs://` URIs are rewritten to.
    pub public_base_url: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            public_base_url: crate::search::DEFAULT_PUBLIC_BASE_URL.to_string(),
        }
    }
}

/// How access tokens for the search service are obtained.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Static token if configured, metadata server on Cloud Run, gcloud otherwise.
    #[default]
    Auto,
    /// Use `auth.access_token` as-is.
    Token,
    /// Shell out to `gcloud auth print-access-token`.
    Gcloud,
    /// Query the GCE / Cloud Run metadata server.
    Metadata,
}

impl std::str::FromStr for AuthMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(AuthMethod::Auto),
            "token" | "static" => Ok(AuthMethod::Token),
            "gcloud" => Ok(AuthMethod::Gcloud),
            "metadata" => Ok(AuthMethod::Metadata),
            _ => Err(format!("Unknown auth method: {}", s)),
        }
    }
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::Auto => write!(f, "auto"),
            AuthMethod::Token => write!(f, "token"),
            AuthMethod::Gcloud => write!(f, "gcloud"),
            AuthMethod::Metadata => write!(f, "metadata"),
        }
    }
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthSettings {
    pub method: AuthMethod,
    /// OAuth access token, usually injected through the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VidseekError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidseek")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Override file values from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Override file values using `lookup` to read variables.
    ///
    /// Empty values are treated as unset. Every valid override is applied even
    /// when another variable is malformed; the malformed ones are reported together.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut invalid = Vec::new();

        if let Some(v) = var("GOOGLE_CLOUD_PROJECT") {
            self.search.project_id = v;
        }
        if let Some(v) = var("VERTEX_AI_LOCATION") {
            self.search.location = v;
        }
        if let Some(v) = var("VERTEX_AI_ENGINE_ID") {
            self.search.engine_id = v;
        }
        if let Some(v) = var("VERTEX_AI_API_ENDPOINT") {
            self.search.api_endpoint = Some(v);
        }
        if let Some(v) = var("DEFAULT_PAGE_SIZE") {
            match parse_number("DEFAULT_PAGE_SIZE", &v) {
                Ok(n) => self.search.page_size = n,
                Err(e) => invalid.push(e),
            }
        }
        if let Some(v) = var("MAX_PAGE_SIZE") {
            match parse_number("MAX_PAGE_SIZE", &v) {
                Ok(n) => self.search.max_page_size = n,
                Err(e) => invalid.push(e),
            }
        }
        if let Some(v) = var("GCS_PUBLIC_BASE_URL") {
            self.storage.public_base_url = v;
        }
        if let Some(v) = var("GOOGLE_OAUTH_ACCESS_TOKEN") {
            self.auth.access_token = Some(v);
        }
        if let Some(v) = var("VIDSEEK_AUTH_METHOD") {
            match v.parse() {
                Ok(method) => self.auth.method = method,
                Err(e) => invalid.push(format!("VIDSEEK_AUTH_METHOD: {}", e)),
            }
        }
        if let Some(v) = var("PORT") {
            match parse_number("PORT", &v) {
                Ok(n) => self.server.port = n,
                Err(e) => invalid.push(e),
            }
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(VidseekError::Config(invalid.join("; ")))
        }
    }

    /// Check that everything needed to reach the search service is present.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.search.project_id.trim().is_empty() {
            missing.push("search.project_id (GOOGLE_CLOUD_PROJECT)");
        }
        if self.search.location.trim().is_empty() {
            missing.push("search.location (VERTEX_AI_LOCATION)");
        }
        if self.search.engine_id.trim().is_empty() {
            missing.push("search.engine_id (VERTEX_AI_ENGINE_ID)");
        }
        if !missing.is_empty() {
            return Err(VidseekError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        if self.search.page_size == 0 || self.search.page_size > self.search.max_page_size {
            return Err(VidseekError::Config(format!(
                "page_size must be between 1 and {} (got {})",
                self.search.max_page_size, self.search.page_size
            )));
        }

        Ok(())
    }

    /// Full resource name of the serving config that answers queries.
    pub fn serving_config(&self) -> String {
        format!(
            "projects/{}/locations/{}/collections/{}/engines/{}/servingConfigs/{}",
            self.search.project_id,
            self.search.location,
            self.search.collection_id,
            self.search.engine_id,
            self.search.serving_config_id
        )
    }

    /// Base URL of the Discovery Engine API for the configured location.
    pub fn api_endpoint(&self) -> String {
        if let Some(endpoint) = self.search.api_endpoint.as_deref() {
            return endpoint.trim_end_matches('/').to_string();
        }
        match self.search.location.as_str() {
            "" | "global" => "https://discoveryengine.googleapis.com".to_string(),
            location => format!("https://{}-discoveryengine.googleapis.com", location),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> std::result::Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("{} must be a number, got '{}'", key, value))
}
