//! Pre-flight checks before talking to the search service.
//!
//! Validates configuration up front so commands fail with a clear message
//! instead of an opaque API error.

use crate::config::Settings;
use crate::error::{Result, VidseekError};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Serving needs a complete search configuration.
    Serve,
    /// A one-off search needs the same.
    Search,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Serve | Operation::Search => settings.validate(),
    }
}

/// Check that the gcloud CLI is installed and runs.
pub fn check_gcloud() -> Result<()> {
    match Command::new("gcloud").arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(VidseekError::ToolFailed(
            "gcloud is installed but not working correctly".to_string(),
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VidseekError::ToolNotFound("gcloud".to_string()))
        }
        Err(e) => Err(VidseekError::ToolFailed(format!("gcloud: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_requires_config() {
        let mut settings = Settings::default();
        assert!(check(Operation::Search, &settings).is_err());

        settings.search.project_id = "p".to_string();
        settings.search.location = "global".to_string();
        settings.search.engine_id = "e".to_string();
        assert!(check(Operation::Search, &settings).is_ok());
        assert!(check(Operation::Serve, &settings).is_ok());
    }
}
