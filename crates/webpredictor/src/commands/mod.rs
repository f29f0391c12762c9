//! CLI command implementations.

use anyhow::{Context, Result};
use config::Config;
use predictor_client::auth::{self, LoginForm};
use predictor_client::tabular::TabularWorkflow;
use predictor_client::{ApiClient, MessageBoard, Session};

pub mod health;
pub mod models;
pub mod scopes;
pub mod shell;
pub mod train_predict;
pub mod welcome;

/// Client, session and workflow shared by every command.
pub struct App {
    pub client: ApiClient,
    pub session: Session,
    pub workflow: TabularWorkflow,
}

impl App {
    /// Creates an unauthenticated app for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &Config) -> Result<Self> {
        let messages = MessageBoard::new(config.message_clear_after);
        Ok(Self {
            client: ApiClient::new(config, messages)?,
            session: Session::new(),
            workflow: TabularWorkflow::new(),
        })
    }

    #[must_use]
    pub const fn messages(&self) -> &MessageBoard {
        self.client.messages()
    }

    /// Logs in, replacing any current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are empty or rejected.
    pub async fn login(&mut self, form: &LoginForm) -> Result<()> {
        auth::login(&self.client, &mut self.session, form)
            .await
            .context("Login failed")?;
        Ok(())
    }
}

/// Username, password and scopes given on the command line.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct Credentials {
    /// Username to log in with
    #[arg(short, long, env = "WEBPREDICTOR_USERNAME")]
    pub username: Option<String>,

    /// Password to log in with
    #[arg(short, long, env = "WEBPREDICTOR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Whitespace-separated scopes to request (e.g. "admin client")
    #[arg(long, default_value = "")]
    pub scopes: String,
}

impl Credentials {
    #[must_use]
    pub fn is_given(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }

    #[must_use]
    pub fn to_login_form(&self) -> LoginForm {
        LoginForm::new(
            self.username.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
            self.scopes.clone(),
        )
    }
}
