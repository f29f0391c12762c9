//! CSV train/predict workflow: parse, shape, submit, tabulate.

pub mod csv;
mod form;
pub mod tables;
mod workflow;

pub use self::csv::{CsvRecord, ParsedCsv, parse_csv};
pub use form::{TabularForm, ValidationError, split_columns};
pub use tables::{Table, escape_html, metrics_table, predictions_table};
pub use workflow::{TabularResults, TabularWorkflow, WorkflowError, load_model_choices};
