//! Train-predict command - logs in, submits two CSV files and prints the
//! result tables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use predictor_client::tabular::{TabularForm, TabularResults};
use tracing::info;

use super::{App, Credentials};
use crate::render;

/// Arguments of one train/predict run.
#[derive(Debug, Clone, clap::Args)]
pub struct TrainPredictArgs {
    #[command(flatten)]
    pub credentials: Credentials,

    /// Model type (e.g. "LinearRegression", "Ridge")
    #[arg(short, long)]
    pub model: String,

    /// Comma-separated target columns
    #[arg(short, long)]
    pub targets: String,

    /// Comma-separated feature columns (all columns when omitted)
    #[arg(short, long, default_value = "")]
    pub features: String,

    /// CSV file with the training rows
    #[arg(long)]
    pub train: PathBuf,

    /// CSV file with the rows to predict
    #[arg(long)]
    pub predict: PathBuf,

    /// Also write the result tables to this HTML file
    #[arg(long)]
    pub html: Option<PathBuf>,
}

/// Reads a CSV file into a string.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_csv_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read CSV file {}", path.display()))
}

/// Submits the form and prints the results.
///
/// # Errors
///
/// Returns an error if validation or the request fails.
pub async fn submit(app: &App, form: &TabularForm) -> Result<TabularResults> {
    let results = app
        .workflow
        .submit(&app.client, &app.session, form)
        .await
        .context("Train/predict failed")?;

    render::print_results(&results);
    Ok(results)
}

/// Runs the train-predict command.
///
/// # Errors
///
/// Returns an error if a file cannot be read, the login fails, the
/// submission fails or the report cannot be written.
pub async fn run(app: &mut App, args: &TrainPredictArgs) -> Result<()> {
    let form = TabularForm {
        model_type: args.model.clone(),
        target_columns: args.targets.clone(),
        feature_columns: args.features.clone(),
        train_csv: read_csv_file(&args.train)?,
        predict_csv: read_csv_file(&args.predict)?,
    };

    app.login(&args.credentials.to_login_form()).await?;

    let results = submit(app, &form).await?;

    if let Some(path) = &args.html {
        render::write_html_report(path, &results)?;
        info!(path = %path.display(), "Wrote HTML report");
    }

    Ok(())
}
