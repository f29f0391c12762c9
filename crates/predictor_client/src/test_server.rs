//! In-process fake of the WebPredictor API for tests.

use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;
use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use config::Config;
use predictor_structs::{
    CellValue, Metrics, Prediction, PredictionValues, TokenResponse, TrainPredictRequest,
    TrainPredictResponse,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::{ApiClient, MessageBoard, Session};

pub const TOKEN: &str = "tok-alice";

/// Shared state of the fake API, inspected by tests.
#[derive(Default)]
pub struct FakeApi {
    pub login_calls: AtomicUsize,
    pub train_calls: AtomicUsize,
    /// When set, train/predict waits for a notification before answering.
    pub hold_train: Option<Arc<Notify>>,
}

impl FakeApi {
    pub const API_VERSION: &'static str = "2.1.0";
    pub const MODEL_VERSION: &'static str = "0.4.2";
}

/// Starts the fake API on an ephemeral port.
pub async fn spawn() -> (String, Arc<FakeApi>) {
    spawn_with(FakeApi::default()).await
}

pub async fn spawn_with(api: FakeApi) -> (String, Arc<FakeApi>) {
    let api = Arc::new(api);
    let router = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/scopes", get(scopes))
        .route("/tabular_regressor/available_models", post(available_models))
        .route("/tabular_regressor/train_predict", post(train_predict))
        .route("/echo", post(echo))
        .route("/plain", get(|| async { "pong" }))
        .route("/broken", get(broken))
        .with_state(Arc::clone(&api));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}"), api)
}

/// Client without throttle pointed at `base_url`.
pub fn client(base_url: &str) -> ApiClient {
    let config = Config {
        api_base_url: base_url.to_owned(),
        rate_limit_per_minute: None,
        ..Config::default()
    };
    ApiClient::new(&config, MessageBoard::new(Duration::from_secs(20))).unwrap()
}

pub fn authenticated_session() -> Session {
    let mut session = Session::new();
    session.establish(TokenResponse {
        access_token: TOKEN.to_owned(),
        token_type: "bearer".to_owned(),
        expires_minutes: Some(15),
        scopes: vec!["client".to_owned()],
    });
    session
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn welcome() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service_name": "WebPredictorV2 API",
        "description": "Training and inference service for several purposes",
        "api_version": FakeApi::API_VERSION,
        "model_version": FakeApi::MODEL_VERSION,
        "resources": ["/auth/login", "/health"],
        "links": {"docs": "/docs"}
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "api_version": FakeApi::API_VERSION,
        "model_version": FakeApi::MODEL_VERSION,
    }))
}

async fn login(State(api): State<Arc<FakeApi>>, Form(fields): Form<Vec<(String, String)>>) -> Response {
    api.login_calls.fetch_add(1, Ordering::SeqCst);

    let field = |name: &str| {
        fields
            .iter()
            .find_map(|(k, v)| (k == name).then(|| v.as_str()))
            .unwrap_or_default()
    };
    if field("username") != "alice" || field("password") != "secret" {
        return detail(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let mut scopes: Vec<String> = fields
        .iter()
        .filter(|(k, _)| k == "scopes")
        .map(|(_, v)| v.clone())
        .collect();
    if scopes.iter().any(|s| s != "admin" && s != "client") {
        return detail(StatusCode::FORBIDDEN, "Insufficient role for scope");
    }
    if scopes.is_empty() {
        scopes.push("admin".to_owned());
    }

    Json(json!({
        "access_token": TOKEN,
        "token_type": "bearer",
        "expires_minutes": 15,
        "scopes": scopes,
    }))
    .into_response()
}

async fn scopes() -> Json<serde_json::Value> {
    Json(json!({
        "scopes": {
            "admin": "Administrative privileged operations",
            "client": "Client operations",
        }
    }))
}

async fn available_models() -> Json<serde_json::Value> {
    Json(json!({
        "available_models": ["LinearRegression", "Ridge", "Lasso", "RandomForestRegressor"]
    }))
}

/// Predicts the training mean of every target.
async fn train_predict(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Json(request): Json<TrainPredictRequest>,
) -> Response {
    api.train_calls.fetch_add(1, Ordering::SeqCst);

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str());
    if !authorized {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }

    if let Some(notify) = &api.hold_train {
        notify.notified().await;
    }

    let mut mse = BTreeMap::new();
    let mut means = Vec::new();
    for target in &request.target_columns {
        let values: Vec<f64> = request
            .train_data
            .rows
            .iter()
            .filter_map(|row| match row.columns.get(target) {
                Some(CellValue::Number(n)) => Some(*n),
                _ => None,
            })
            .collect();
        #[expect(clippy::cast_precision_loss, reason = "test data is tiny")]
        let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
        mse.insert(target.clone(), 0.5);
        means.push((target.clone(), mean));
    }

    let predictions = request
        .predict_data
        .rows
        .iter()
        .map(|row| Prediction {
            index: row.index.clone(),
            values: PredictionValues(means.clone()),
        })
        .collect();

    let response = TrainPredictResponse {
        model_type: Some(request.model_type.clone()),
        model_version: FakeApi::MODEL_VERSION.to_owned(),
        api_version: FakeApi::API_VERSION.to_owned(),
        targets: request.target_columns.clone(),
        metrics: Metrics(BTreeMap::from([
            ("mse".to_owned(), mse.clone()),
            ("mae".to_owned(), mse),
            (
                "baseline_mse".to_owned(),
                request
                    .target_columns
                    .iter()
                    .map(|t| (t.clone(), 1.0))
                    .collect(),
            ),
        ])),
        predictions,
    };
    Json(response).into_response()
}

/// Reflects request headers and body back as JSON.
async fn echo(headers: HeaderMap, body: String) -> Json<serde_json::Value> {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    Json(json!({
        "accept": header_text(header::ACCEPT),
        "content_type": header_text(header::CONTENT_TYPE),
        "authorization": header_text(header::AUTHORIZATION),
        "body": body,
    }))
}

async fn broken() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/plain")],
        "Upstream <proxy> failed\r\nwhile reading\n",
    )
        .into_response()
}
