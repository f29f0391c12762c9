use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Regressor families the API ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum ModelType {
    LinearRegression,
    Ridge,
    Lasso,
    RandomForestRegressor,
}

impl ModelType {
    /// Returns the API string representation for this model type.
    #[must_use]
    pub const fn as_api_string(self) -> &'static str {
        match self {
            Self::LinearRegression => "LinearRegression",
            Self::Ridge => "Ridge",
            Self::Lasso => "Lasso",
            Self::RandomForestRegressor => "RandomForestRegressor",
        }
    }

    /// Returns an iterator over every known model type.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

impl FromStr for ModelType {
    type Err = UnknownModelType;

    /// Accepts the API spelling, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::all()
            .find(|model| model.as_api_string().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownModelType(trimmed.to_owned()))
    }
}

/// Model type name not among the known regressors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown model type: {0}")]
pub struct UnknownModelType(pub String);

/// Response from POST /tabular_regressor/available_models.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AvailableModelsResponse {
    #[serde(default)]
    pub available_models: Vec<String>,
}
