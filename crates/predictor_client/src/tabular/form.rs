use predictor_structs::{LimitViolation, TabularData, TrainPredictRequest};

use super::csv::parse_csv;
use crate::session::Session;

/// Why a train/predict submission was refused before any request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please login first")]
    NotAuthenticated,

    #[error("Model and targets required")]
    MissingModelOrTargets,

    #[error("Train and predict CSV required")]
    MissingCsv,

    /// The CSV reader rejected the text.
    #[error("Invalid {section} CSV: {message}")]
    InvalidCsv {
        section: &'static str,
        message: String,
    },

    #[error(transparent)]
    Limits(#[from] LimitViolation),
}

/// Raw train/predict form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularForm {
    pub model_type: String,
    /// Comma-separated target column names
    pub target_columns: String,
    /// Comma-separated feature column names; empty means all columns
    pub feature_columns: String,
    pub train_csv: String,
    pub predict_csv: String,
}

/// Splits a comma-separated column list, dropping empty entries.
#[must_use]
pub fn split_columns(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn row_set(text: &str, section: &'static str) -> Result<TabularData, ValidationError> {
    parse_csv(text)
        .map(|parsed| parsed.to_row_set())
        .map_err(|err| ValidationError::InvalidCsv {
            section,
            message: err.to_string(),
        })
}

impl TabularForm {
    /// Checks the form and shapes it into the request body.
    ///
    /// # Errors
    ///
    /// Returns the first failed check, in the order: authentication, model
    /// and targets, CSV text, CSV parsing, payload limits.
    pub fn build_request(&self, session: &Session) -> Result<TrainPredictRequest, ValidationError> {
        if !session.is_authenticated() {
            return Err(ValidationError::NotAuthenticated);
        }

        let model_type = self.model_type.trim();
        let target_columns = split_columns(&self.target_columns);
        if model_type.is_empty() || target_columns.is_empty() {
            return Err(ValidationError::MissingModelOrTargets);
        }

        if self.train_csv.trim().is_empty() || self.predict_csv.trim().is_empty() {
            return Err(ValidationError::MissingCsv);
        }

        let feature_columns = Some(split_columns(&self.feature_columns)).filter(|f| !f.is_empty());

        let request = TrainPredictRequest {
            model_type: model_type.to_owned(),
            target_columns,
            feature_columns,
            train_data: row_set(&self.train_csv, "training")?,
            predict_data: row_set(&self.predict_csv, "prediction")?,
        };
        request.check_limits()?;

        Ok(request)
    }
}
