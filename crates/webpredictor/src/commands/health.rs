//! Health command - prints the API and model versions.

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use super::App;

/// Runs the health command.
///
/// # Errors
///
/// Returns an error if the API cannot be reached.
pub async fn run(app: &App) -> Result<()> {
    info!(api_url = app.client.base_url(), "Checking API health");

    let health = app
        .client
        .api_versions(&app.session)
        .await
        .context("Health check failed")?;

    println!("{} {}", "API version:".bold(), health.api_version);
    println!("{} {}", "Model version:".bold(), health.model_version);

    Ok(())
}
