//! Wire types for the Discovery Engine v1 `search` method.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Body of a `servingConfigs.search` call.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub page_size: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facet_specs: Vec<FacetSpec>,
    pub content_search_spec: ContentSearchSpec,
    pub query_expansion_spec: QueryExpansionSpec,
    pub spell_correction_spec: SpellCorrectionSpec,
    pub relevance_score_spec: RelevanceScoreSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetSpec {
    pub facet_key: FacetKey,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FacetKey {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContentSearchSpec {
    pub snippet_spec: SnippetSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_spec: Option<SummarySpec>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SnippetSpec {
    pub return_snippet: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySpec {
    pub summary_result_count: u32,
    pub include_citations: bool,
    pub ignore_adversarial_query: bool,
    pub ignore_non_summary_seeking_query: bool,
    pub model_prompt_spec: ModelPromptSpec,
    pub model_spec: ModelSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelPromptSpec {
    pub preamble: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSpec {
    pub version: String,
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpansionCondition {
    #[default]
    Auto,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct QueryExpansionSpec {
    pub condition: ExpansionCondition,
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpellCorrectionMode {
    #[default]
    Auto,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct SpellCorrectionSpec {
    pub mode: SpellCorrectionMode,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceScoreSpec {
    pub return_relevance_score: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub time_zone: String,
}

/// Response of a `servingConfigs.search` call.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    #[serde(deserialize_with = "int_from_string_or_number")]
    pub total_size: u64,
    pub summary: Option<Summary>,
    pub facets: Vec<FacetResult>,
    pub corrected_query: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResultItem {
    pub id: Option<String>,
    pub document: Option<Document>,
    /// Keyed by score name, e.g. "relevance_score".
    pub model_scores: Map<String, Value>,
}

impl SearchResultItem {
    /// First value of the relevance score, if the service returned one.
    pub fn relevance_score(&self) -> Option<f64> {
        self.model_scores
            .get("relevance_score")?
            .get("values")?
            .as_array()?
            .first()?
            .as_f64()
    }
}

/// An indexed document. `structData` is the schema-less payload written at indexing time.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub id: Option<String>,
    pub struct_data: Map<String, Value>,
    pub derived_struct_data: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    pub summary_text: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FacetResult {
    pub key: String,
    pub values: Vec<FacetResultValue>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FacetResultValue {
    pub value: String,
    #[serde(deserialize_with = "int_from_string_or_number")]
    pub count: u64,
}

/// int64 fields are encoded as JSON strings by the REST surface, but not always.
fn int_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}
