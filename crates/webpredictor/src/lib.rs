//! WebPredictor command-line client
//!
//! Logs in to the WebPredictor API, submits CSV data for training and
//! prediction, and prints the resulting tables.

pub mod commands;
pub mod render;
