//! Gated train/predict submission.

use core::sync::atomic::{AtomicBool, Ordering};

use predictor_structs::TrainPredictResponse;
use tracing::{info, warn};

use super::form::{TabularForm, ValidationError};
use super::tables::{Table, metrics_table, predictions_table};
use crate::api::client::ApiClient;
use crate::error::ApiError;
use crate::notify::Severity;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another submission on the same workflow has not finished.
    #[error("A request is already in progress")]
    Busy,

    #[error(transparent)]
    Request(#[from] ApiError),
}

/// Tables and versions of a completed train/predict run.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularResults {
    pub metrics: Table,
    pub predictions: Table,
    pub api_version: String,
    pub model_version: String,
    pub response: TrainPredictResponse,
}

impl TabularResults {
    /// Builds the tables; metrics get one row per requested target.
    #[must_use]
    pub fn new(response: TrainPredictResponse, targets: &[String]) -> Self {
        Self {
            metrics: metrics_table(&response.metrics, targets),
            predictions: predictions_table(&response.predictions),
            api_version: response.api_version.clone(),
            model_version: response.model_version.clone(),
            response,
        }
    }
}

/// Runs train/predict submissions, at most one at a time.
#[derive(Debug, Default)]
pub struct TabularWorkflow {
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TabularWorkflow {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a submission is waiting on the API.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<PendingGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PendingGuard(&self.in_flight))
    }

    /// Validates the form, submits it and builds the result tables.
    ///
    /// Nothing is sent when validation fails or another submission is still
    /// pending. Every outcome is posted to the client's message slot.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Busy`], [`WorkflowError::Validation`], or
    /// [`WorkflowError::Request`] if the API call fails.
    pub async fn submit(
        &self,
        client: &ApiClient,
        session: &Session,
        form: &TabularForm,
    ) -> Result<TabularResults, WorkflowError> {
        let messages = client.messages();

        let Some(_guard) = self.try_begin() else {
            warn!("Train/predict submission rejected, previous one still pending");
            messages.post(WorkflowError::Busy.to_string(), Severity::Info);
            return Err(WorkflowError::Busy);
        };

        let request = form
            .build_request(session)
            .inspect_err(|err| messages.post(err.to_string(), Severity::Error))?;

        messages.post("Training and predicting...", Severity::Info);
        let response = client.train_predict(session, &request).await?;

        info!(
            api_version = %response.api_version,
            model_version = %response.model_version,
            predictions = response.predictions.len(),
            "Train/predict completed"
        );
        messages.post("Operation completed", Severity::Success);

        Ok(TabularResults::new(response, &request.target_columns))
    }
}

/// Loads the model types offered for selection.
///
/// # Errors
///
/// Returns the request error after posting "Could not load models".
pub async fn load_model_choices(
    client: &ApiClient,
    session: &Session,
) -> Result<Vec<String>, ApiError> {
    client
        .load_available_models(session)
        .await
        .map(|response| response.available_models)
        .inspect_err(|_| {
            client
                .messages()
                .post("Could not load models", Severity::Error);
        })
}
