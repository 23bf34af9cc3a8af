//! Mapping of raw result documents into segments.

use crate::discovery::types::Document;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Default target for `gs://` rewrites.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "https://storage.googleapis.com/";

const UNTITLED: &str = "Untitled Video";
const NO_DESCRIPTION: &str = "No video description";
const NO_SNIPPET_PLACEHOLDER: &str = "No snippet is available for this page.";

/// Segment titles written by the indexer: "Segment from <video> at <seconds>s".
static SEGMENT_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Segment from (.*) at ([0-9.]+)s").expect("Invalid regex")
});

/// One scored hit: a clip within a longer source video.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Segment {
    pub id: String,
    pub title: String,
    pub video_name: String,
    /// Start of the clip within the source video, in whole seconds.
    pub timestamp: u64,
    /// Clip length as stored in the index (e.g. "15s").
    pub duration: String,
    pub uri: String,
    pub snippet: String,
    pub persons: Vec<String>,
    pub organizations: Vec<String>,
    pub hash_tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_uri: Option<String>,
}

impl Segment {
    /// Build a segment from a result document.
    pub fn from_document(
        document: &Document,
        relevance_score: Option<f64>,
        public_base_url: &str,
    ) -> Self {
        let data = &document.struct_data;

        let title = string_field(data, "description").unwrap_or_else(|| UNTITLED.to_string());
        let (video_name, timestamp) = parse_segment_title(&title);

        let snippet = string_field(data, "title")
            .or_else(|| derived_snippet(&document.derived_struct_data))
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        let uri = ["video_src", "uri", "url", "link"]
            .iter()
            .find_map(|key| string_field(data, key))
            .map(|uri| public_url_with_base(&uri, public_base_url))
            .unwrap_or_default();

        Self {
            id: document.id.clone().unwrap_or_else(|| "unknown".to_string()),
            title,
            video_name,
            timestamp,
            duration: string_field(data, "duration").unwrap_or_else(|| "0s".to_string()),
            uri,
            snippet,
            persons: named_list(data, "persons"),
            organizations: named_list(data, "organizations"),
            hash_tags: string_list(data, "hash_tags"),
            relevance_score,
            transcript_uri: string_field(data, "text_file")
                .map(|uri| public_url_with_base(&uri, public_base_url)),
        }
    }

    /// Clip length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        parse_duration(&self.duration)
    }
}

/// Split a segment title into its source video name and start second.
///
/// Titles that don't follow the indexer's pattern name their own group and start at 0.
pub fn parse_segment_title(title: &str) -> (String, u64) {
    match SEGMENT_TITLE.captures(title) {
        Some(caps) => {
            let name = caps.get(1).map_or("", |m| m.as_str()).to_string();
            let seconds = caps.get(2).map_or("", |m| m.as_str());
            (name, leading_integer(seconds))
        }
        None => (title.to_string(), 0),
    }
}

/// Rewrite a `gs://` URI to its public HTTPS form. Other URIs are returned as-is.
pub fn public_url(uri: &str) -> String {
    public_url_with_base(uri, DEFAULT_PUBLIC_BASE_URL)
}

/// Like [`public_url`], with a custom public base.
pub fn public_url_with_base(uri: &str, base: &str) -> String {
    match uri.strip_prefix("gs://") {
        Some(rest) => {
            let base = base.trim_end_matches('/');
            format!("{}/{}", base, rest)
        }
        None => uri.to_string(),
    }
}

/// Parse a duration like "15s" or "7.5s" into seconds. Unparseable input yields 0.
pub fn parse_duration(duration: &str) -> f64 {
    let trimmed = duration.trim();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    trimmed[..end].parse::<f64>().unwrap_or(0.0)
}

/// Format seconds as "MM:SS". Minutes keep counting past an hour.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// "12.5" -> 12, "" -> 0.
fn leading_integer(s: &str) -> u64 {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn string_field(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `[{"name": "..."}, ...]` -> names. Entries without a name become empty strings.
fn named_list(data: &Map<String, Value>, key: &str) -> Vec<String> {
    data.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    item.get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn string_list(data: &Map<String, Value>, key: &str) -> Vec<String> {
    data.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| item.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// First service-generated snippet that isn't the "no snippet" placeholder.
fn derived_snippet(derived: &Map<String, Value>) -> Option<String> {
    derived
        .get("snippets")?
        .as_array()?
        .iter()
        .filter_map(|s| s.get("snippet").and_then(Value::as_str))
        .find(|s| !s.is_empty() && *s != NO_SNIPPET_PLACEHOLDER)
        .map(str::to_string)
}
