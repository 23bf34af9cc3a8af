//! vidseek - search frontend for managed semantic video search
//!
//! Queries a Vertex AI Search (Discovery Engine) app whose documents are
//! time-bounded segments of longer videos, and presents what comes back.
//!
//! # Overview
//!
//! Retrieval, ranking, snippets, facet counts and summaries are all produced by
//! the external service. This crate:
//! - Builds search requests (query, facet filters, summary and spelling options)
//! - Normalizes responses: segments grouped by source video, timestamps parsed
//!   from segment titles, `gs://` URIs rewritten to public URLs, timelines
//! - Serves a search page and JSON endpoints, and a one-shot CLI search
//!
//! # Architecture
//!
//! - `config` - Settings from TOML plus environment overrides
//! - `discovery` - Discovery Engine REST client and access tokens
//! - `search` - Request building and response normalization
//! - `server` - axum router, HTML pages and JSON endpoints
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use vidseek::config::Settings;
//! use vidseek::search::{FacetFilters, SearchService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut settings = Settings::load()?;
//!     settings.apply_env()?;
//!     settings.validate()?;
//!
//!     let service = SearchService::from_settings(settings)?;
//!     let outcome = service.search("late winner", &FacetFilters::new()).await;
//!     for group in &outcome.groups {
//!         println!("{}: {} segments", group.video_name, group.segments.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod search;
pub mod server;

pub use error::{Result, VidseekError};
