//! Doctor command - verify configuration and credentials.

use crate::cli::{preflight, Output};
use crate::config::{AuthMethod, Settings};
use crate::discovery::{resolve_method, token_source};
use console::style;
use std::path::PathBuf;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(config_path: Option<PathBuf>, settings: &Settings) -> anyhow::Result<()> {
    Output::header("vidseek doctor");
    println!();
    println!("Checking configuration and credentials...\n");

    let mut checks = Vec::new();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![
        check_config_file(config_path),
        check_search_settings(settings),
    ];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    println!("{}", style("Credentials").bold());
    let on_cloud_run = std::env::var_os("K_SERVICE").is_some();
    let method = resolve_method(settings, on_cloud_run);
    let auth_checks = vec![
        CheckResult::ok("Auth method", &format!("{} ({})", method, settings.auth.method)),
        check_gcloud(method),
        check_token(settings).await,
    ];
    for check in &auth_checks {
        check.print();
    }
    checks.extend(auth_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before searching.",
            errors
        ));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! vidseek is ready to use.");
    }

    Ok(())
}

fn check_config_file(config_path: Option<PathBuf>) -> CheckResult {
    let config_path = config_path.unwrap_or_else(Settings::default_config_path);
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults and environment",
            "Create with: vidseek config edit",
        )
    }
}

fn check_search_settings(settings: &Settings) -> CheckResult {
    match settings.validate() {
        Ok(()) => CheckResult::ok(
            "Search engine",
            &format!("{} @ {}", settings.serving_config(), settings.api_endpoint()),
        ),
        Err(e) => CheckResult::error(
            "Search engine",
            &e.to_string(),
            "Set GOOGLE_CLOUD_PROJECT, VERTEX_AI_LOCATION and VERTEX_AI_ENGINE_ID",
        ),
    }
}

fn check_gcloud(method: AuthMethod) -> CheckResult {
    match preflight::check_gcloud() {
        Ok(()) => CheckResult::ok("gcloud", "installed"),
        Err(e) if method == AuthMethod::Gcloud => {
            CheckResult::error("gcloud", &e.to_string(), install_hint_gcloud())
        }
        Err(_) => CheckResult::warning(
            "gcloud",
            "not found (not needed for the selected auth method)",
            install_hint_gcloud(),
        ),
    }
}

async fn check_token(settings: &Settings) -> CheckResult {
    let source = match token_source(settings) {
        Ok(source) => source,
        Err(e) => {
            return CheckResult::error(
                "Access token",
                &e.to_string(),
                "Set GOOGLE_OAUTH_ACCESS_TOKEN or choose another auth.method",
            )
        }
    };

    match source.access_token().await {
        Ok(token) => CheckResult::ok(
            "Access token",
            &format!("obtained via {} ({})", source.describe(), mask(&token)),
        ),
        Err(e) => CheckResult::error(
            "Access token",
            &e.to_string(),
            "Run: gcloud auth login (or gcloud auth application-default login)",
        ),
    }
}

/// Show only the edges of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Platform-specific install hint for the gcloud CLI.
fn install_hint_gcloud() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install --cask google-cloud-sdk"
    } else {
        "Install from: https://cloud.google.com/sdk/docs/install"
    }
}
