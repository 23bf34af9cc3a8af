//! HTTP frontend: server-rendered search pages plus JSON endpoints.

mod api;
mod pages;
mod render;

use crate::search::SearchService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

/// Shared application state.
pub struct AppState {
    pub service: SearchService,
    pub config_valid: bool,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(pages::index))
        .route("/search", get(pages::search))
        .route("/api/search", get(api::search).post(api::prototype_search))
        .route("/health", get(api::health))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Serve `router` on `addr` until Ctrl+C or SIGTERM.
pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::discovery::{SearchBackend, SearchRequest, SearchResponse};
    use crate::error::{Result, VidseekError};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct StubBackend {
        fail: bool,
        calls: AtomicUsize,
        filters: Mutex<Vec<String>>,
    }

    impl StubBackend {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                calls: AtomicUsize::new(0),
                filters: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchBackend for StubBackend {
        async fn search(&self, _serving_config: &str, request: &SearchRequest) -> Result<SearchResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.filters.lock().unwrap().push(request.filter.clone());
            if self.fail {
                return Err(VidseekError::Discovery {
                    status: 500,
                    body: "internal".to_string(),
                });
            }
            Ok(serde_json::from_value(json!({
                "results": [
                    {
                        "document": {
                            "id": "seg-2",
                            "structData": {
                                "description": "Segment from final.mp4 at 30s",
                                "title": "Header <clears> the bar",
                                "uri": "gs://media/final_2.mp4",
                                "duration": "15s",
                                "hash_tags": ["#Header"]
                            }
                        }
                    },
                    {
                        "document": {
                            "id": "seg-1",
                            "structData": {
                                "description": "Segment from final.mp4 at 0s",
                                "title": "Kick-off",
                                "uri": "gs://media/final_1.mp4",
                                "duration": "15s"
                            }
                        }
                    }
                ],
                "totalSize": 2,
                "summary": { "summaryText": "The final opens with a header." },
                "facets": [{ "key": "hash_tags", "values": [{ "value": "#Header", "count": "1" }] }]
            }))?)
        }
    }

    fn app(backend: Arc<StubBackend>) -> Router {
        let mut settings = Settings::default();
        settings.search.project_id = "p".to_string();
        settings.search.location = "global".to_string();
        settings.search.engine_id = "e".to_string();

        router(Arc::new(AppState {
            service: SearchService::new(backend, settings),
            config_valid: true,
        }))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(app(StubBackend::new(false)), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["config_valid"], true);
    }

    #[tokio::test]
    async fn test_index_page() {
        let (status, body) = get(app(StubBackend::new(false)), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<form action=\"/search\""));
    }

    #[tokio::test]
    async fn test_search_page_empty_query() {
        let backend = StubBackend::new(false);
        let (status, body) = get(app(backend.clone()), "/search?q=%20").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Please enter a search query"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_page_renders_groups() {
        let backend = StubBackend::new(false);
        let (status, body) = get(
            app(backend.clone()),
            "/search?q=header&hash_tags=%23Header&bogus=x",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("About 2 results"));
        assert!(body.contains("The final opens with a header."));
        assert!(body.contains("final.mp4"));
        // escaped snippet
        assert!(body.contains("Header &lt;clears&gt; the bar"));
        // ascending timestamps within the group
        let first = body.find("Timestamp: 0s").unwrap();
        let second = body.find("Timestamp: 30s").unwrap();
        assert!(first < second);
        assert!(body.contains("https://storage.googleapis.com/media/final_1.mp4"));

        let filters = backend.filters.lock().unwrap().clone();
        assert_eq!(filters, vec![r##"hash_tags: ANY("#Header")"##.to_string()]);
    }

    #[tokio::test]
    async fn test_search_page_shows_error() {
        let (status, body) = get(app(StubBackend::new(true)), "/search?q=goal").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Error"));
        assert!(body.contains("internal"));
        assert!(!body.contains("No results found"));
    }

    #[tokio::test]
    async fn test_api_search_requires_query() {
        let backend = StubBackend::new(false);
        let (status, body) = get(app(backend.clone()), "/api/search").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["error"], "Query parameter required");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_api_search_returns_outcome() {
        let (status, body) = get(app(StubBackend::new(false)), "/api/search?q=header").await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["total_results"], 2);
        assert_eq!(value["page_results"], 2);
        assert_eq!(value["groups"][0]["video_name"], "final.mp4");
        assert_eq!(value["groups"][0]["segments"][0]["id"], "seg-1");
        assert!(value.get("error").is_none());
    }

    #[tokio::test]
    async fn test_api_search_backend_failure() {
        let (status, body) = get(app(StubBackend::new(true)), "/api/search?q=goal").await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["total_results"], 0);
        assert!(value["summary"].is_null());
        assert!(value["error"].as_str().unwrap().contains("internal"));
    }

    #[tokio::test]
    async fn test_prototype_search() {
        let (status, value) = post_json(
            app(StubBackend::new(false)),
            "/api/search",
            json!({ "query": "header" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "success");
        assert_eq!(value["query"], "header");
        let entries = value["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["timestamp"], "00:00");
        assert_eq!(entries[1]["timestamp"], "00:30");
        assert_eq!(
            entries[1]["video_file"],
            "https://storage.googleapis.com/media/final_2.mp4"
        );
        assert_eq!(entries[1]["text_file"], "");
    }

    #[tokio::test]
    async fn test_prototype_search_empty_query() {
        let backend = StubBackend::new(false);
        let (status, value) =
            post_json(app(backend.clone()), "/api/search", json!({ "query": "" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["status"], "error");
        assert_eq!(value["entries"].as_array().unwrap().len(), 0);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_prototype_search_backend_failure() {
        let (status, value) = post_json(
            app(StubBackend::new(true)),
            "/api/search",
            json!({ "query": "goal" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(value["status"], "error");
        assert!(value["message"].as_str().unwrap().contains("internal"));
    }

    #[tokio::test]
    async fn test_prototype_search_malformed_body() {
        for (content_type, body) in [
            ("application/json", "{\"query\": "),
            ("text/plain", "query=goal"),
        ] {
            let backend = StubBackend::new(false);
            let response = app(backend.clone())
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/search")
                        .header(header::CONTENT_TYPE, content_type)
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let value: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(value["status"], "error");
            assert_eq!(value["entries"].as_array().unwrap().len(), 0);
            assert!(value["message"].is_string());
            assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        }
    }
}
