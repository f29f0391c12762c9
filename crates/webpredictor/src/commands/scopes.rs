//! Scopes command - lists the scopes a login may request.

use anyhow::{Context, Result};
use colored::Colorize;

use super::App;

/// Runs the scopes command.
///
/// # Errors
///
/// Returns an error if the scope list cannot be loaded.
pub async fn run(app: &App) -> Result<()> {
    let scopes = app
        .client
        .load_scopes(&app.session)
        .await
        .context("Failed to load scopes")?;

    let width = scopes.scopes.keys().map(String::len).max().unwrap_or(0);
    for (name, description) in &scopes.scopes {
        println!("{}  {description}", format!("{name:<width$}").bold());
    }

    Ok(())
}
