use reqwest::StatusCode;

/// A failed API call. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("{0}")]
    Decode(String),
}

impl ApiError {
    /// Returns the HTTP status, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}
