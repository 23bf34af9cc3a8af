//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::VidseekError;
use crate::search::{FacetFilters, SearchService};
use anyhow::Result;

/// Parse `key=value` filter arguments.
fn parse_filters(raw: &[String], settings: &Settings) -> crate::Result<FacetFilters> {
    let mut filters = FacetFilters::new();
    for item in raw {
        let Some((key, value)) = item.split_once('=') else {
            return Err(VidseekError::InvalidInput(format!(
                "filter '{}': expected KEY=VALUE",
                item
            )));
        };
        let (key, value) = (key.trim(), value.trim());
        if !settings.search.is_facet_key(key) {
            let known: Vec<&str> = settings.search.facets.iter().map(|f| f.key.as_str()).collect();
            return Err(VidseekError::InvalidInput(format!(
                "unknown facet '{}'. Known facets: {}",
                key,
                known.join(", ")
            )));
        }
        if !value.is_empty() {
            filters.add(key, value);
        }
    }
    Ok(filters)
}

/// Run the search command.
pub async fn run_search(
    query: &str,
    raw_filters: &[String],
    json: bool,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Search, &settings)?;
    let filters = parse_filters(raw_filters, &settings)?;
    let service = SearchService::from_settings(settings)?;

    let spinner = (!json).then(|| Output::spinner("Searching..."));
    let outcome = service.search(query, &filters).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return match outcome.error {
            Some(error) => Err(anyhow::anyhow!("{}", error)),
            None => Ok(()),
        };
    }

    if let Some(error) = outcome.error.as_deref() {
        Output::error(&format!("Search failed: {}", error));
        return Err(anyhow::anyhow!("{}", error));
    }

    if outcome.is_empty() {
        Output::warning(&format!("Your search - {} - did not match any videos.", query));
        return Ok(());
    }

    Output::success(&format!(
        "About {} result{} ({} seconds)",
        outcome.total_results,
        if outcome.total_results == 1 { "" } else { "s" },
        outcome.duration
    ));

    if let Some(summary) = outcome.summary.as_deref() {
        Output::header("Summary");
        println!("{}", summary);
    }

    for group in &outcome.groups {
        Output::video_group(group);
    }

    if !outcome.facets.is_empty() {
        Output::header("Facets");
        for facet in &outcome.facets {
            let values: Vec<String> = facet
                .values
                .iter()
                .map(|v| format!("{} ({})", v.value, v.count))
                .collect();
            Output::kv(&facet.key, &values.join(", "));
        }
    }

    Ok(())
}
