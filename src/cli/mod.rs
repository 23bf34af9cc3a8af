//! CLI module for vidseek.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// vidseek - search frontend for managed semantic video search
///
/// Sends queries to a Vertex AI Search (Discovery Engine) app and presents the
/// matching video segments grouped by source video.
#[derive(Parser, Debug)]
#[command(name = "vidseek")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web frontend
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port / $PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run a single search and print the grouped segments
    Search {
        /// Search query
        query: String,

        /// Facet filter as key=value (repeatable), e.g. --filter hash_tags=#Goal
        #[arg(short, long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,

        /// Print the normalized result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check configuration and credentials
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Commands {
    /// Whether a malformed environment override should abort the command.
    ///
    /// `config` keeps working so the file can still be inspected and fixed.
    pub fn requires_valid_env(&self) -> bool {
        !matches!(self, Commands::Config { .. })
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (after environment overrides)
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_commands_tolerate_bad_env() {
        let cli = Cli::parse_from(["vidseek", "config", "path"]);
        assert!(!cli.command.requires_valid_env());

        let cli = Cli::parse_from(["vidseek", "-v", "search", "goal", "-f", "hash_tags=#Goal"]);
        assert!(cli.command.requires_valid_env());
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["vidseek", "serve", "--port", "8080"]);
        assert!(cli.command.requires_valid_env());
    }
}
