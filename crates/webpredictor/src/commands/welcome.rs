//! Welcome command - prints the service description.

use anyhow::{Context, Result};
use colored::Colorize;

use super::App;

/// Runs the welcome command.
///
/// # Errors
///
/// Returns an error if the API cannot be reached.
pub async fn run(app: &App) -> Result<()> {
    let welcome = app
        .client
        .welcome(&app.session)
        .await
        .context("Failed to read service description")?;

    println!("{} ({})", welcome.service_name.bold(), welcome.status);
    println!("{}", welcome.description);
    println!(
        "API version {}, model version {}",
        welcome.api_version, welcome.model_version
    );

    if !welcome.resources.is_empty() {
        println!();
        println!("{}", "Resources".bold());
        for resource in &welcome.resources {
            println!("  {resource}");
        }
    }
    if !welcome.links.is_empty() {
        println!();
        println!("{}", "Links".bold());
        for (name, href) in &welcome.links {
            println!("  {name}: {href}");
        }
    }

    Ok(())
}
