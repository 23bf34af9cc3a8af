//! Web frontend server.
//!
//! Serves the search pages and the JSON endpoints.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::search::SearchService;
use crate::server::{self, AppState};
use std::sync::Arc;

/// Run the HTTP server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    preflight::check(Operation::Serve, &settings)?;

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let service = SearchService::from_settings(settings)?;

    let state = Arc::new(AppState {
        service,
        config_valid: true,
    });

    let addr = format!("{}:{}", host, port);

    Output::header("vidseek");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Search page", "GET  /search?q=...");
    Output::kv("Search API", "GET  /api/search?q=...");
    Output::kv("Prototype", "POST /api/search");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    server::serve(&addr, state).await
}
