//! HTTP access to the WebPredictor API.

pub mod client;
