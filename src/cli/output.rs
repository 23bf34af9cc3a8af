//! CLI output formatting utilities.

use crate::search::{format_clock, Segment, VideoGroup};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a video group with its segments.
    pub fn video_group(group: &VideoGroup) {
        println!(
            "\n{} {} ({} segment{})",
            style(">>").green(),
            style(&group.video_name).bold(),
            group.segments.len(),
            if group.segments.len() == 1 { "" } else { "s" }
        );
        for segment in &group.segments {
            Self::segment(segment);
        }
    }

    fn segment(segment: &Segment) {
        let score = segment
            .relevance_score
            .map(|s| format!(" (score: {:.2})", s))
            .unwrap_or_default();
        println!(
            "   {} {}{}",
            style(format_clock(segment.timestamp)).cyan(),
            style(&segment.duration).dim(),
            score
        );
        println!("     {}", content_preview(&segment.snippet, 200));
        if !segment.uri.is_empty() {
            println!("     {}", style(&segment.uri).dim());
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis, on a character boundary.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
