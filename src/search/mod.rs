//! Search orchestration and response normalization.
//!
//! Turns the loosely typed payload of the search service into stable types:
//! segments grouped by their source video, facet counts, and the generated summary.

mod facet;
mod segment;
mod timeline;

pub use facet::{Facet, FacetFilters, FacetValue};
pub use segment::{
    format_clock, parse_duration, parse_segment_title, public_url, public_url_with_base, Segment,
    DEFAULT_PUBLIC_BASE_URL,
};
pub use timeline::{Timeline, TimelineMark};

use crate::config::Settings;
use crate::discovery::types::{
    ContentSearchSpec, FacetKey, FacetSpec, ModelPromptSpec, ModelSpec, QueryExpansionSpec,
    RelevanceScoreSpec, SnippetSpec, SpellCorrectionSpec, SummarySpec, UserInfo,
};
use crate::discovery::{
    token_source, DiscoveryEngineClient, SearchBackend, SearchRequest, SearchResponse,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Message returned for blank queries.
pub const QUERY_REQUIRED: &str = "Query parameter required";

/// Segments that share a source video.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VideoGroup {
    pub video_name: String,
    /// Ascending by timestamp.
    pub segments: Vec<Segment>,
    pub timeline: Timeline,
}

/// Group segments by derived video name.
///
/// Groups appear in the order their first segment was ranked.
pub fn group_by_video(segments: Vec<Segment>) -> Vec<VideoGroup> {
    let mut groups: Vec<(String, Vec<Segment>)> = Vec::new();

    for segment in segments {
        match groups.iter_mut().find(|(name, _)| *name == segment.video_name) {
            Some((_, members)) => members.push(segment),
            None => groups.push((segment.video_name.clone(), vec![segment])),
        }
    }

    groups
        .into_iter()
        .map(|(video_name, mut segments)| {
            segments.sort_by_key(|s| s.timestamp);
            let timeline = Timeline::for_segments(&segments);
            VideoGroup {
                video_name,
                segments,
                timeline,
            }
        })
        .collect()
}

/// Everything a search page needs to render.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchOutcome {
    pub groups: Vec<VideoGroup>,
    pub summary: Option<String>,
    /// Total hits available, not just this page.
    pub total_results: u64,
    /// Hits on this page.
    pub page_results: usize,
    /// Wall-clock time of the search in seconds, two decimals.
    pub duration: String,
    pub facets: Vec<Facet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchOutcome {
    /// Outcome carrying only an error message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            groups: Vec::new(),
            summary: None,
            total_results: 0,
            page_results: 0,
            duration: "0".to_string(),
            facets: Vec::new(),
            corrected_query: None,
            error: Some(message.into()),
        }
    }

    /// Outcome for a blank query.
    pub fn query_required() -> Self {
        Self::failed(QUERY_REQUIRED)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All segments across groups, in group order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.groups.iter().flat_map(|g| g.segments.iter())
    }
}

/// Entry shape served by the prototype JSON endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PrototypeEntry {
    pub video_file: String,
    pub text_file: String,
    pub description: String,
    /// "MM:SS"
    pub timestamp: String,
}

impl From<&Segment> for PrototypeEntry {
    fn from(segment: &Segment) -> Self {
        Self {
            video_file: segment.uri.clone(),
            text_file: segment.transcript_uri.clone().unwrap_or_default(),
            description: segment.snippet.clone(),
            timestamp: format_clock(segment.timestamp),
        }
    }
}

/// Runs searches against a backend and normalizes the results.
pub struct SearchService {
    backend: Arc<dyn SearchBackend>,
    settings: Settings,
    serving_config: String,
}

impl SearchService {
    pub fn new(backend: Arc<dyn SearchBackend>, settings: Settings) -> Self {
        let serving_config = settings.serving_config();
        Self {
            backend,
            settings,
            serving_config,
        }
    }

    /// Service backed by the Discovery Engine REST API, authenticated per `settings.auth`.
    pub fn from_settings(settings: Settings) -> crate::error::Result<Self> {
        let tokens = token_source(&settings)?;
        info!("Using {} credentials", tokens.describe());
        let client = DiscoveryEngineClient::new(&settings, tokens)?;
        Ok(Self::new(Arc::new(client), settings))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Assemble the wire request for `query` and `filters`.
    pub fn build_request(&self, query: &str, filters: &FacetFilters) -> SearchRequest {
        let search = &self.settings.search;

        SearchRequest {
            query: query.to_string(),
            page_size: search.page_size.min(search.max_page_size),
            filter: filters.to_filter_expression(),
            facet_specs: search
                .facets
                .iter()
                .map(|f| FacetSpec {
                    facet_key: FacetKey { key: f.key.clone() },
                    limit: f.limit,
                })
                .collect(),
            content_search_spec: ContentSearchSpec {
                snippet_spec: SnippetSpec {
                    return_snippet: true,
                },
                summary_spec: Some(SummarySpec {
                    summary_result_count: search.summary_result_count,
                    include_citations: search.include_citations,
                    ignore_adversarial_query: search.ignore_adversarial_query,
                    ignore_non_summary_seeking_query: search.ignore_non_summary_seeking_query,
                    model_prompt_spec: ModelPromptSpec {
                        preamble: search.summary_preamble.clone(),
                    },
                    model_spec: ModelSpec {
                        version: search.summary_model_version.clone(),
                    },
                }),
            },
            query_expansion_spec: QueryExpansionSpec::default(),
            spell_correction_spec: SpellCorrectionSpec::default(),
            relevance_score_spec: RelevanceScoreSpec {
                return_relevance_score: true,
            },
            user_info: (!search.time_zone.is_empty()).then(|| UserInfo {
                time_zone: search.time_zone.clone(),
            }),
        }
    }

    /// Search for `query`, narrowed by `filters`.
    ///
    /// Never fails: a blank query or a backend error is reported in `error`.
    pub async fn search(&self, query: &str, filters: &FacetFilters) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::query_required();
        }

        let started = Instant::now();
        let request = self.build_request(query, filters);
        info!("Search query: {}", query);
        if !request.filter.is_empty() {
            debug!("Filter: {}", request.filter);
        }

        match self.backend.search(&self.serving_config, &request).await {
            Ok(response) => {
                let outcome = self.normalize(response, started);
                info!(
                    "Total results available: {}, results in this page: {}",
                    outcome.total_results, outcome.page_results
                );
                outcome
            }
            Err(e) => {
                error!("Search error: {}", e);
                SearchOutcome::failed(e.to_string())
            }
        }
    }

    /// Map a raw response into a [`SearchOutcome`].
    pub fn normalize(&self, response: SearchResponse, started: Instant) -> SearchOutcome {
        let base = &self.settings.storage.public_base_url;

        let segments: Vec<Segment> = response
            .results
            .iter()
            .map(|item| {
                let document = item.document.clone().unwrap_or_default();
                Segment::from_document(&document, item.relevance_score(), base)
            })
            .collect();
        let page_results = segments.len();

        SearchOutcome {
            groups: group_by_video(segments),
            summary: response
                .summary
                .map(|s| s.summary_text)
                .filter(|s| !s.is_empty()),
            total_results: response.total_size,
            page_results,
            duration: format!("{:.2}", started.elapsed().as_secs_f64()),
            facets: response.facets.into_iter().map(Facet::from).collect(),
            corrected_query: response.corrected_query.filter(|q| !q.is_empty()),
            error: None,
        }
    }
}
