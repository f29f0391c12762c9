//! Authenticated HTTP client for the WebPredictor API.

use core::num::NonZeroU32;

use anyhow::{Context, Result};
use config::Config;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use predictor_structs::{
    AvailableModelsResponse, HealthResponse, ScopesResponse, TokenResponse, TrainPredictRequest,
    TrainPredictResponse, WelcomeResponse,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::notify::{MessageBoard, Severity, sanitize_text};
use crate::session::Session;

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

type RateLimiterType = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Outgoing request body.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// URL-encoded pairs; repeated keys are sent as repeated fields.
    Form(Vec<(String, String)>),
    /// Multipart form; the transport sets the content type with its boundary.
    Multipart(reqwest::multipart::Form),
}

/// Method, extra headers and body of a request.
#[derive(Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn post(body: RequestBody) -> Self {
        Self {
            method: Method::POST,
            body,
            ..Self::default()
        }
    }
}

/// Parsed response body, chosen by the response content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiPayload {
    Json(Value),
    Text(String),
}

impl ApiPayload {
    /// Decodes the payload into a typed response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body does not match `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let decoded = match self {
            Self::Json(value) => serde_json::from_value(value),
            Self::Text(text) => serde_json::from_str(&text),
        };
        decoded.map_err(|e| ApiError::Decode(sanitize_text(&format!("Unexpected response: {e}"))))
    }
}

/// Client for the WebPredictor API.
///
/// Every failure is posted to the shared [`MessageBoard`] before it is
/// returned, so callers may ignore the error.
pub struct ApiClient {
    client: Client,
    base_url: String,
    messages: MessageBoard,
    limiter: Option<RateLimiterType>,
}

impl ApiClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &Config, messages: MessageBoard) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        let limiter = config
            .rate_limit_per_minute
            .and_then(NonZeroU32::new)
            .map(|per_minute| RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            messages,
            limiter,
        })
    }

    /// The message slot this client reports failures to.
    #[must_use]
    pub const fn messages(&self) -> &MessageBoard {
        &self.messages
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits for the throttle, if one is configured.
    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Sends a request to `path` (relative to the base URL) and returns the
    /// parsed body.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status; the
    /// message has already been posted to the message slot.
    pub async fn fetch(
        &self,
        session: &Session,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiPayload, ApiError> {
        self.send(session, path, options)
            .await
            .inspect_err(|err| self.report(path, err))
    }

    /// Like [`Self::fetch`], then decodes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error on request failure or if the body does not match `T`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.fetch(session, path, options)
            .await?
            .decode()
            .inspect_err(|err| self.report(path, err))
    }

    fn report(&self, path: &str, err: &ApiError) {
        error!(path, status = ?err.status(), "Request failed: {err}");
        self.messages.post(err.to_string(), Severity::Error);
    }

    async fn send(
        &self,
        session: &Session,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiPayload, ApiError> {
        self.wait_for_rate_limit().await;

        let url = format!("{}{path}", self.base_url);
        let RequestOptions {
            method,
            mut headers,
            body,
        } = options;

        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if !headers.contains_key(CONTENT_TYPE) {
            match &body {
                RequestBody::Form(_) => {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
                }
                RequestBody::Multipart(_) => {}
                RequestBody::Empty | RequestBody::Json(_) => {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
                }
            }
        }
        if let Some(token) = session.token() {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::Transport("Invalid access token".to_owned()))?;
            headers.insert(AUTHORIZATION, value);
        }

        debug!(%method, %url, "Sending request");

        let request = self.client.request(method, &url).headers(headers);
        let request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Form(pairs) => request.form(&pairs),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(sanitize_text(&e.to_string())))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let is_json = content_type.contains(JSON_CONTENT_TYPE);

        debug!(path, status = status.as_u16(), %content_type, "Received response");

        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = if is_json {
                json_error_message(&raw, status)
            } else {
                sanitize_text(&raw)
            };
            let message = if message.is_empty() {
                format!("Error {}", status.as_u16())
            } else {
                message
            };
            return Err(ApiError::Status { status, message });
        }

        let payload = if is_json {
            let value = response.json::<Value>().await.map_err(|e| {
                ApiError::Decode(sanitize_text(&format!("Invalid JSON response: {e}")))
            })?;
            ApiPayload::Json(value)
        } else {
            let text = response
                .text()
                .await
                .map_err(|e| ApiError::Transport(sanitize_text(&e.to_string())))?;
            ApiPayload::Text(text)
        };

        debug!(path, ?payload, "Response payload");

        Ok(payload)
    }

    /// Exchanges credentials for a token via POST /auth/login.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    pub async fn login(
        &self,
        session: &Session,
        username: &str,
        password: &str,
        scopes: &[String],
    ) -> Result<TokenResponse, ApiError> {
        let mut form = vec![
            ("username".to_owned(), username.to_owned()),
            ("password".to_owned(), password.to_owned()),
        ];
        form.extend(scopes.iter().map(|s| ("scopes".to_owned(), s.clone())));

        info!(username, scopes = ?scopes, "Logging in");

        self.fetch_json(
            session,
            "/auth/login",
            RequestOptions::post(RequestBody::Form(form)),
        )
        .await
    }

    /// Lists the scopes the API knows about via GET /auth/scopes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn load_scopes(&self, session: &Session) -> Result<ScopesResponse, ApiError> {
        self.fetch_json(session, "/auth/scopes", RequestOptions::get())
            .await
    }

    /// Lists the model types via POST /tabular_regressor/available_models.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn load_available_models(
        &self,
        session: &Session,
    ) -> Result<AvailableModelsResponse, ApiError> {
        self.fetch_json(
            session,
            "/tabular_regressor/available_models",
            RequestOptions::post(RequestBody::Empty),
        )
        .await
    }

    /// Trains a model and predicts via POST /tabular_regressor/train_predict.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn train_predict(
        &self,
        session: &Session,
        request: &TrainPredictRequest,
    ) -> Result<TrainPredictResponse, ApiError> {
        let body = serde_json::to_value(request)
            .map_err(|e| ApiError::Decode(format!("Failed to encode request: {e}")))
            .inspect_err(|err| self.report("/tabular_regressor/train_predict", err))?;

        info!(
            model_type = %request.model_type,
            targets = ?request.target_columns,
            train_rows = request.train_data.rows.len(),
            predict_rows = request.predict_data.rows.len(),
            "Submitting train/predict request",
        );

        self.fetch_json(
            session,
            "/tabular_regressor/train_predict",
            RequestOptions::post(RequestBody::Json(body)),
        )
        .await
    }

    /// Reads API and model versions via GET /health.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn api_versions(&self, session: &Session) -> Result<HealthResponse, ApiError> {
        self.fetch_json(session, "/health", RequestOptions::get())
            .await
    }

    /// Reads the service description via GET /.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn welcome(&self, session: &Session) -> Result<WelcomeResponse, ApiError> {
        self.fetch_json(session, "/", RequestOptions::get()).await
    }
}

/// Picks the message out of a JSON error body: `detail` if present,
/// otherwise the whole body.
fn json_error_message(raw: &str, status: StatusCode) -> String {
    let Ok(body) = serde_json::from_str::<Value>(raw) else {
        return format!("Error {}", status.as_u16());
    };
    let message = match body.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(detail) if !detail.is_null() && !detail.is_string() => detail.to_string(),
        _ => body.to_string(),
    };
    sanitize_text(&message)
}
