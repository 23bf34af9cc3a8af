//! Server-rendered search pages.

use super::render;
use super::AppState;
use crate::search::FacetFilters;
use axum::{
    extract::{RawQuery, State},
    response::Html,
};
use std::sync::Arc;

const EMPTY_QUERY_MESSAGE: &str = "Please enter a search query";

/// Split a raw query string into the trimmed `q` value and configured facet filters.
///
/// Repeated facet keys select several values; unknown keys are dropped.
pub(super) fn parse_search_params(raw: Option<&str>, state: &AppState) -> (String, FacetFilters) {
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(raw.unwrap_or("").as_bytes())
        .into_owned()
        .collect();

    let query = pairs
        .iter()
        .find(|(k, _)| k == "q")
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_default();

    let search = &state.service.settings().search;
    let filters = FacetFilters::from_pairs(
        pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        |key| search.is_facet_key(key),
    );

    (query, filters)
}

pub(super) async fn index() -> Html<String> {
    Html(render::index_page(None))
}

pub(super) async fn search(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> Html<String> {
    let (query, filters) = parse_search_params(raw.as_deref(), &state);
    if query.is_empty() {
        return Html(render::index_page(Some(EMPTY_QUERY_MESSAGE)));
    }

    let outcome = state.service.search(&query, &filters).await;
    Html(render::results_page(&query, &filters, &outcome))
}
