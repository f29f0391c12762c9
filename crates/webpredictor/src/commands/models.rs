//! Models command - lists the model types the API can train.

use anyhow::{Context, Result};
use predictor_client::tabular::load_model_choices;
use predictor_structs::ModelType;
use tracing::debug;

use super::{App, Credentials};

/// Runs the models command, logging in first when credentials are given.
///
/// # Errors
///
/// Returns an error if the login fails or the model list cannot be loaded.
pub async fn run(app: &mut App, credentials: &Credentials) -> Result<()> {
    if credentials.is_given() {
        app.login(&credentials.to_login_form()).await?;
    }

    let models = load_model_choices(&app.client, &app.session)
        .await
        .context("Could not load models")?;

    for model in &models {
        if model.parse::<ModelType>().is_err() {
            debug!(model = %model, "Model type not known to this client");
        }
        println!("{model}");
    }

    Ok(())
}
