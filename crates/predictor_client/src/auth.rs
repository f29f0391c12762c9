//! Login, logout and the navigation state derived from the session.

use tracing::{debug, info};

use crate::api::client::ApiClient;
use crate::error::ApiError;
use crate::notify::{MessageBoard, Severity};
use crate::session::Session;

/// Views a front end can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum View {
    Login,
    Tabular,
}

/// Which navigation controls are usable for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    pub login_enabled: bool,
    pub workflow_enabled: bool,
    pub logout_enabled: bool,
    /// View the front end must switch to, if any.
    pub forced_view: Option<View>,
}

/// Derives navigation state from the session alone.
#[must_use]
pub const fn nav_state(session: &Session) -> NavState {
    let authenticated = session.is_authenticated();
    NavState {
        login_enabled: !authenticated,
        workflow_enabled: authenticated,
        logout_enabled: authenticated,
        forced_view: if authenticated {
            None
        } else {
            Some(View::Login)
        },
    }
}

/// Failed login attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Rejected locally; no request was sent.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Request(#[from] ApiError),
}

/// Raw login form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Whitespace-separated scope names, may be empty.
    pub scopes: String,
}

impl LoginForm {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        scopes: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            scopes: scopes.into(),
        }
    }

    /// Trimmed username and password, or a validation error if either is empty.
    fn credentials(&self) -> Result<(&str, &str), AuthError> {
        let username = self.username.trim();
        let password = self.password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password required".to_owned(),
            ));
        }
        Ok((username, password))
    }
}

/// Splits a whitespace-separated scope list.
#[must_use]
pub fn scope_list(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_owned).collect()
}

/// Validates the form, logs in and stores the token in `session`.
///
/// On failure the session is left as it was and the message slot explains
/// why.
///
/// # Errors
///
/// Returns [`AuthError::Validation`] for empty credentials (no request is
/// sent) or [`AuthError::Request`] if the API rejects the login.
pub async fn login(
    client: &ApiClient,
    session: &mut Session,
    form: &LoginForm,
) -> Result<NavState, AuthError> {
    let (username, password) = form
        .credentials()
        .inspect_err(|err| client.messages().post(err.to_string(), Severity::Error))?;
    let scopes = scope_list(&form.scopes);

    let token = client.login(session, username, password, &scopes).await?;
    session.establish(token);

    debug!(scopes = ?session.scopes(), "Scopes granted");
    info!(username, "Login successful");
    client.messages().post("Login successful", Severity::Success);

    Ok(nav_state(session))
}

/// Clears the session, whatever its state.
pub fn logout(session: &mut Session, messages: &MessageBoard) -> NavState {
    session.clear();
    info!("Logged out");
    messages.post("Logged out", Severity::Success);
    nav_state(session)
}
