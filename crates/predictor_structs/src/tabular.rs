//! Request and response bodies of the tabular regressor endpoints.

use core::fmt;
use std::collections::BTreeMap;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Name of the synthesized row index column.
pub const INDEX_COLUMN: &str = "index";

/// A single cell value: numeric when it parses as a number, text otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Coerces raw cell text: finite numbers become `Number`, anything else
    /// stays text. An empty cell counts as zero.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Number(0.0);
        }
        match raw.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => Self::Text(raw.to_owned()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Row identifier, integer or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RowIndex {
    Int(i64),
    Text(String),
}

impl From<usize> for RowIndex {
    fn from(position: usize) -> Self {
        i64::try_from(position).map_or_else(|_| Self::Text(position.to_string()), Self::Int)
    }
}

impl From<&CellValue> for RowIndex {
    /// Integral numbers become integer indices, anything else a string index.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        reason = "checked integral and in range"
    )]
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Number(n)
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 =>
            {
                Self::Int(*n as i64)
            }
            other => Self::Text(other.to_string()),
        }
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One row of tabular data: the index plus every other column.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DataRow {
    pub index: RowIndex,

    #[serde(flatten)]
    pub columns: BTreeMap<String, CellValue>,
}

/// Tabular data represented as a list of rows (a row-set).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TabularData {
    pub rows: Vec<DataRow>,
}

/// Body of POST /tabular_regressor/train_predict.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrainPredictRequest {
    /// Model type, one of the available models
    pub model_type: String,

    /// Target columns present in the training rows
    pub target_columns: Vec<String>,

    /// Feature columns; `None` lets the server use all remaining columns
    pub feature_columns: Option<Vec<String>>,

    /// Rows including features and targets
    pub train_data: TabularData,

    /// Rows including features only
    pub predict_data: TabularData,
}

/// Per-target predicted values, kept in response order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionValues(pub Vec<(String, f64)>);

impl PredictionValues {
    /// Returns the predicted value for a target column.
    #[must_use]
    pub fn get(&self, target: &str) -> Option<f64> {
        self.0
            .iter()
            .find_map(|(name, value)| (name == target).then_some(*value))
    }

    /// Returns the target names in response order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for PredictionValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PredictionValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = PredictionValues;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of target column to number")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, f64>()? {
                    match entries.iter_mut().find(|(existing, _)| *existing == name) {
                        Some(entry) => entry.1 = value,
                        None => entries.push((name, value)),
                    }
                }
                Ok(PredictionValues(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Predicted values for one row of the predict data.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Prediction {
    pub index: RowIndex,

    #[serde(default)]
    pub values: PredictionValues,
}

/// Metric name (`mse`, `mae`, `baseline_mse`, ...) to per-target value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Metrics(pub BTreeMap<String, BTreeMap<String, f64>>);

impl Metrics {
    /// Returns the value of `metric` for `target`, if reported.
    #[must_use]
    pub fn get(&self, metric: &str, target: &str) -> Option<f64> {
        self.0.get(metric)?.get(target).copied()
    }
}

/// Response from POST /tabular_regressor/train_predict.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TrainPredictResponse {
    #[serde(default)]
    pub model_type: Option<String>,

    pub model_version: String,

    pub api_version: String,

    #[serde(default)]
    pub targets: Vec<String>,

    #[serde(default)]
    pub metrics: Metrics,

    #[serde(default)]
    pub predictions: Vec<Prediction>,
}
