//! JSON endpoints.

use super::AppState;
use crate::search::{FacetFilters, PrototypeEntry, QUERY_REQUIRED};
use axum::{
    extract::{rejection::JsonRejection, RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Deserialize)]
pub(super) struct PrototypeRequest {
    #[serde(default)]
    query: String,
}

#[derive(Serialize)]
struct PrototypeResponse {
    status: &'static str,
    query: String,
    entries: Vec<PrototypeEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl PrototypeResponse {
    fn error(query: String, message: &str) -> Self {
        Self {
            status: "error",
            query,
            entries: Vec::new(),
            message: Some(message.to_string()),
        }
    }
}

pub(super) async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "config_valid": state.config_valid,
    }))
}

/// `GET /api/search?q=...`, with facet filters as extra query parameters.
pub(super) async fn search(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> impl IntoResponse {
    let (query, filters) = super::pages::parse_search_params(raw.as_deref(), &state);

    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: QUERY_REQUIRED.to_string(),
            }),
        )
            .into_response();
    }

    Json(state.service.search(&query, &filters).await).into_response()
}

/// `POST /api/search` with `{"query": "..."}`, answering in the prototype's entry shape.
pub(super) async fn prototype_search(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PrototypeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(PrototypeResponse::error(String::new(), &rejection.body_text())),
            )
                .into_response();
        }
    };

    let query = req.query.trim().to_string();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(PrototypeResponse::error(query, QUERY_REQUIRED)),
        )
            .into_response();
    }

    let outcome = state.service.search(&query, &FacetFilters::new()).await;
    if let Some(error) = outcome.error.as_deref() {
        return (
            StatusCode::BAD_GATEWAY,
            Json(PrototypeResponse::error(query, error)),
        )
            .into_response();
    }

    let entries = outcome.segments().map(PrototypeEntry::from).collect();
    Json(PrototypeResponse {
        status: "success",
        query,
        entries,
        message: None,
    })
    .into_response()
}
