//! Shared plumbing of the example binaries.

use std::process::ExitCode;
use std::time::Duration;

use azure_agents_core::{HandoffRecord, ModelClient};
use azure_agents_openai::AzureProvider;
use indicatif::{ProgressBar, ProgressStyle};

use crate::Settings;

/// Loads `.env` and installs the log subscriber. Logs go to stderr and
/// are filtered by `RUST_LOG`.
pub fn init() {
    if let Err(err) = dotenvy::dotenv() {
        // A missing file is fine, the variables may come from the shell.
        if !err.not_found() {
            eprintln!("failed to load .env: {err}");
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Creates a model client for the configured Azure OpenAI deployment.
///
/// Reports the missing variable on stderr and returns the exit code to
/// use when the configuration is incomplete.
pub fn model_client() -> Result<ModelClient, ExitCode> {
    let settings = Settings::from_env().map_err(|err| {
        eprintln!("{err}");
        ExitCode::FAILURE
    })?;
    info!(
        "using deployment `{}` at {}",
        settings.deployment, settings.endpoint
    );
    Ok(ModelClient::new(AzureProvider::new(settings.azure_config())))
}

/// Awaits `fut` while a "Processing..." spinner runs on stderr.
pub async fn with_spinner<F: Future>(fut: F) -> F::Output {
    let progress_bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {wide_msg}") {
        progress_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    progress_bar.set_message("Processing...");
    progress_bar.enable_steady_tick(Duration::from_millis(100));

    let output = fut.await;
    // Clear the spinner before anything else is printed.
    progress_bar.finish_and_clear();
    output
}

/// Formats the handoff path, or `None` when no handoff happened.
pub fn handoff_path(handoffs: &[HandoffRecord]) -> Option<String> {
    if handoffs.is_empty() {
        return None;
    }
    let mut path = String::from("Handoff Path:");
    for (i, handoff) in handoffs.iter().enumerate() {
        path.push_str(&format!(
            "\n  {}. {} → {}",
            i + 1,
            handoff.from_agent,
            handoff.to_agent
        ));
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handoff_path() {
        assert_eq!(handoff_path(&[]), None);
        let handoffs = [HandoffRecord {
            from_agent: "Education Assistant".to_owned(),
            to_agent: "Math Tutor".to_owned(),
        }];
        assert_eq!(
            handoff_path(&handoffs).unwrap(),
            "Handoff Path:\n  1. Education Assistant → Math Tutor"
        );
    }
}
