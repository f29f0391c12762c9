//! Payload limits enforced by the API, checked locally before submission.

use std::collections::HashSet;

use crate::{CellValue, RowIndex, TabularData, TrainPredictRequest};

pub const MAX_TRAIN_ROWS: usize = 1_000;
pub const MAX_PREDICT_ROWS: usize = 1_000;
/// Total union of feature and target columns in a row, excluding the index.
pub const MAX_TOTAL_COLUMNS: usize = 200;
pub const MAX_FEATURE_COLUMNS: usize = 150;
pub const MAX_TARGET_COLUMNS: usize = 10;
pub const MAX_COLUMN_NAME_LENGTH: usize = 64;
pub const MAX_STRING_LENGTH: usize = 64;
pub const MAX_INDEX_STRING_LENGTH: usize = 64;

/// A request that the API would reject for its size or shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitViolation {
    #[error("At least one target column required")]
    NoTargets,

    #[error("Number of target columns ({0}) exceeds {limit}", limit = MAX_TARGET_COLUMNS)]
    TooManyTargets(usize),

    #[error("Duplicate target columns detected")]
    DuplicateTargets,

    #[error("feature_columns if provided must not be empty")]
    EmptyFeatures,

    #[error("Number of feature columns ({0}) exceeds {limit}", limit = MAX_FEATURE_COLUMNS)]
    TooManyFeatures(usize),

    #[error("Duplicate feature columns detected")]
    DuplicateFeatures,

    #[error("Column name '{0}' exceeds length {limit}", limit = MAX_COLUMN_NAME_LENGTH)]
    ColumnNameTooLong(String),

    #[error("{section} rows must not be empty")]
    EmptyRows { section: &'static str },

    #[error("Number of {section} rows ({count}) exceeds {max}")]
    TooManyRows {
        section: &'static str,
        count: usize,
        max: usize,
    },

    #[error("Number of columns ({0}) exceeds {limit}", limit = MAX_TOTAL_COLUMNS)]
    TooManyColumns(usize),

    #[error("Column '{0}' string length exceeds {limit}", limit = MAX_STRING_LENGTH)]
    CellTooLong(String),

    #[error("Index string length exceeds {limit}", limit = MAX_INDEX_STRING_LENGTH)]
    IndexTooLong,
}

impl TrainPredictRequest {
    /// Checks the request against the API's payload limits.
    ///
    /// # Errors
    ///
    /// Returns the first limit the request violates.
    pub fn check_limits(&self) -> Result<(), LimitViolation> {
        check_targets(&self.target_columns)?;
        if let Some(features) = &self.feature_columns {
            check_features(features)?;
        }
        check_rows(&self.train_data, "training", MAX_TRAIN_ROWS)?;
        check_rows(&self.predict_data, "prediction", MAX_PREDICT_ROWS)?;
        Ok(())
    }
}

fn check_targets(targets: &[String]) -> Result<(), LimitViolation> {
    if targets.is_empty() {
        return Err(LimitViolation::NoTargets);
    }
    if targets.len() > MAX_TARGET_COLUMNS {
        return Err(LimitViolation::TooManyTargets(targets.len()));
    }
    if has_duplicates(targets) {
        return Err(LimitViolation::DuplicateTargets);
    }
    check_column_names(targets)
}

fn check_features(features: &[String]) -> Result<(), LimitViolation> {
    if features.is_empty() {
        return Err(LimitViolation::EmptyFeatures);
    }
    if features.len() > MAX_FEATURE_COLUMNS {
        return Err(LimitViolation::TooManyFeatures(features.len()));
    }
    if has_duplicates(features) {
        return Err(LimitViolation::DuplicateFeatures);
    }
    check_column_names(features)
}

fn check_rows(data: &TabularData, section: &'static str, max: usize) -> Result<(), LimitViolation> {
    if data.rows.is_empty() {
        return Err(LimitViolation::EmptyRows { section });
    }
    if data.rows.len() > max {
        return Err(LimitViolation::TooManyRows {
            section,
            count: data.rows.len(),
            max,
        });
    }

    for row in &data.rows {
        if let RowIndex::Text(index) = &row.index
            && index.chars().count() > MAX_INDEX_STRING_LENGTH
        {
            return Err(LimitViolation::IndexTooLong);
        }
        if row.columns.len() > MAX_TOTAL_COLUMNS {
            return Err(LimitViolation::TooManyColumns(row.columns.len()));
        }
        for (name, value) in &row.columns {
            if name.chars().count() > MAX_COLUMN_NAME_LENGTH {
                return Err(LimitViolation::ColumnNameTooLong(name.clone()));
            }
            if let CellValue::Text(text) = value
                && text.chars().count() > MAX_STRING_LENGTH
            {
                return Err(LimitViolation::CellTooLong(name.clone()));
            }
        }
    }

    Ok(())
}

fn check_column_names(columns: &[String]) -> Result<(), LimitViolation> {
    match columns
        .iter()
        .find(|name| name.chars().count() > MAX_COLUMN_NAME_LENGTH)
    {
        Some(name) => Err(LimitViolation::ColumnNameTooLong(name.clone())),
        None => Ok(()),
    }
}

fn has_duplicates(columns: &[String]) -> bool {
    let mut seen = HashSet::with_capacity(columns.len());
    columns.iter().any(|name| !seen.insert(name.as_str()))
}
