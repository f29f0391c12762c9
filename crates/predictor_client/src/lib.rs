//! WebPredictor API client library.
//!
//! Holds everything a front end needs besides drawing: the in-memory
//! session, the shared message slot, the authenticated request client, the
//! login flow and the CSV train/predict workflow.

pub mod api;
pub mod auth;
mod error;
pub mod notify;
mod session;
pub mod tabular;

#[cfg(test)]
mod test_server;

pub use api::client::{ApiClient, ApiPayload, RequestBody, RequestOptions};
pub use error::ApiError;
pub use notify::{MessageBoard, Notification, Severity};
pub use session::{AuthStatus, Session};
