//! Plain HTML rendering for the search pages.

use crate::search::{Facet, FacetFilters, SearchOutcome, Segment, VideoGroup};
use std::fmt::Write;

const SEARCH_PLACEHOLDER: &str = "Search for videos, shows, sports...";

/// Escape text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `uri` if it is safe to link or embed: only absolute http(s) URLs qualify.
fn playable_uri(uri: &str) -> Option<&str> {
    let parsed = url::Url::parse(uri).ok()?;
    matches!(parsed.scheme(), "http" | "https").then_some(uri)
}

/// `/search?...` link for `query` with `filters` applied.
pub fn search_href(query: &str, filters: &FacetFilters) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("q", query);
    for (key, value) in filters.pairs() {
        serializer.append_pair(key, value);
    }
    format!("/search?{}", serializer.finish())
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n<main class=\"container\">\n{}</main>\n</body>\n</html>\n",
        escape(title),
        body
    )
}

fn search_form(query: &str) -> String {
    format!(
        "<form action=\"/search\" method=\"get\" class=\"search-form\">\n\
         <input type=\"text\" name=\"q\" value=\"{}\" placeholder=\"{}\" required>\n\
         <button type=\"submit\">Search</button>\n</form>\n",
        escape(query),
        SEARCH_PLACEHOLDER
    )
}

fn card(class: &str, title: &str, content: &str) -> String {
    format!(
        "<section class=\"card {}\">\n<h2>{}</h2>\n{}</section>\n",
        class,
        escape(title),
        content
    )
}

/// Landing page with the search form and an optional input error.
pub fn index_page(error: Option<&str>) -> String {
    let mut body = String::new();
    body.push_str("<h1>Video Search</h1>\n");
    body.push_str(&search_form(""));
    if let Some(error) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(error));
    }
    layout("Video Search", &body)
}

/// Results page for `query`.
pub fn results_page(query: &str, filters: &FacetFilters, outcome: &SearchOutcome) -> String {
    let mut body = String::new();
    body.push_str(&search_form(query));

    if outcome.total_results > 0 {
        let _ = writeln!(
            body,
            "<p class=\"stats\">About {} result{} ({} seconds)</p>",
            outcome.total_results,
            if outcome.total_results != 1 { "s" } else { "" },
            escape(&outcome.duration)
        );
    }

    if let Some(corrected) = outcome.corrected_query.as_deref() {
        let _ = writeln!(
            body,
            "<p class=\"corrected\">Showing results for <em>{}</em></p>",
            escape(corrected)
        );
    }

    if let Some(error) = outcome.error.as_deref() {
        body.push_str(&card("error", "Error", &format!("<p>{}</p>\n", escape(error))));
    }

    if let Some(summary) = outcome.summary.as_deref() {
        body.push_str(&card("summary", "Summary", &format!("<p>{}</p>\n", escape(summary))));
    }

    if outcome.is_empty() && outcome.error.is_none() {
        body.push_str(&no_results(query));
    }

    body.push_str(&facet_panel(query, filters, &outcome.facets));

    body.push_str("<div class=\"results\">\n");
    for group in &outcome.groups {
        body.push_str(&video_card(group));
    }
    body.push_str("</div>\n");

    layout(&format!("{} - Video Search", query), &body)
}

fn no_results(query: &str) -> String {
    let content = format!(
        "<p>Your search - <strong>{}</strong> - did not match any videos.</p>\n\
         <p>Suggestions:</p>\n<ul>\n\
         <li>Make sure all words are spelled correctly.</li>\n\
         <li>Try different keywords.</li>\n\
         <li>Try more general keywords.</li>\n\
         <li>Try fewer keywords.</li>\n</ul>\n\
         <a href=\"/\">New Search</a>\n",
        escape(query)
    );
    card("empty", "No results found", &content)
}

fn facet_panel(query: &str, filters: &FacetFilters, facets: &[Facet]) -> String {
    let mut content = String::new();
    content.push_str(
        "<p>Refine your search by filtering by persons, organizations, and tags.</p>\n",
    );

    if facets.is_empty() {
        content.push_str("<p>No filters.</p>\n");
    }

    for facet in facets {
        let _ = writeln!(content, "<details open>\n<summary>{}</summary>\n<ul>", escape(&facet.key));
        for value in &facet.values {
            let selected = filters.is_selected(&facet.key, &value.value);
            let href = search_href(query, &filters.toggled(&facet.key, &value.value));
            let _ = writeln!(
                content,
                "<li><a href=\"{}\" class=\"facet{}\">{} {} ({})</a></li>",
                escape(&href),
                if selected { " selected" } else { "" },
                if selected { "&#9745;" } else { "&#9744;" },
                escape(&value.value),
                value.count
            );
        }
        content.push_str("</ul>\n</details>\n");
    }

    card("filters", "Filters", &content)
}

fn video_card(group: &VideoGroup) -> String {
    let mut content = String::new();

    if let Some(uri) = group.segments.first().and_then(|s| playable_uri(&s.uri)) {
        let _ = writeln!(
            content,
            "<video controls preload=\"metadata\" src=\"{}\"></video>",
            escape(uri)
        );
    }

    if !group.timeline.is_empty() {
        content.push_str("<div class=\"timeline\" style=\"position:relative;height:12px\">\n");
        for mark in &group.timeline.marks {
            let _ = writeln!(
                content,
                "<span class=\"timeline-mark\" data-segment=\"{}\" title=\"Segment at {}s\" \
                 style=\"position:absolute;left:{:.2}%;width:{:.2}%;height:12px\"></span>",
                escape(&mark.segment_id),
                mark.timestamp,
                mark.left_percent,
                mark.width_percent
            );
        }
        content.push_str("</div>\n");
    }

    for segment in &group.segments {
        content.push_str(&segment_item(segment));
    }

    card("video", &group.video_name, &content)
}

fn segment_item(segment: &Segment) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<div class=\"segment\" id=\"{}\">", escape(&segment.id));
    let _ = writeln!(
        out,
        "<p class=\"timestamp\">Timestamp: {}s (Duration: {})</p>",
        segment.timestamp,
        escape(&segment.duration)
    );
    let _ = writeln!(out, "<p>{}</p>", escape(&segment.snippet));

    let chips: Vec<(&str, &String)> = segment
        .persons
        .iter()
        .map(|p| ("person", p))
        .chain(segment.organizations.iter().map(|o| ("organization", o)))
        .chain(segment.hash_tags.iter().map(|t| ("tag", t)))
        .filter(|(_, text)| !text.is_empty())
        .collect();
    if !chips.is_empty() {
        out.push_str("<div class=\"chips\">");
        for (kind, text) in chips {
            let _ = write!(out, "<span class=\"chip {}\">{}</span>", kind, escape(text));
        }
        out.push_str("</div>\n");
    }

    if let Some(uri) = playable_uri(&segment.uri) {
        let _ = writeln!(
            out,
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">Watch segment</a>",
            escape(uri)
        );
    }
    out.push_str("</div>\n");
    out
}
