//! HTTP endpoint: knowledge-graph generation and stateless analysis
//!
//! Routes:
//! - `POST /generate-knowledge-graph` `{text}` → `{knowledgeGraph}`
//! - `POST /analyze` `{feature, text}` → `{title, content}`
//! - `GET /health`
//!
//! Every route answers CORS preflight with an open origin. A bare `OPTIONS`
//! without preflight headers gets the same allow lists.

use crate::config::ServerConfig;
use crate::content::AnalysisResult;
use crate::feature::FeatureKind;
use crate::model::ModelClient;
use crate::normalize::Normalizer;
use crate::prompt;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, AUTHORIZATION, CONTENT_TYPE,
};
use axum::http::{HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared handler state.
pub struct AppState {
    client: Arc<dyn ModelClient>,
    normalizer: Normalizer,
}

impl AppState {
    pub fn new(client: Arc<dyn ModelClient>, normalizer: Normalizer) -> Self {
        Self { client, normalizer }
    }
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Deserialize)]
pub struct GraphRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub feature: String,
    #[serde(default)]
    pub text: String,
}

const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
const ALLOWED_METHODS: &str = "POST, OPTIONS";

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}

/// Build the router with all routes, CORS and request tracing.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route(
            "/generate-knowledge-graph",
            post(generate_knowledge_graph).options(allow_options),
        )
        .route("/analyze", post(analyze).options(allow_options))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

/// `OPTIONS` requests that are not preflights; the CORS layer adds the origin.
async fn allow_options() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
            (ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS),
        ],
    )
}

async fn generate_knowledge_graph(
    State(state): State<SharedState>,
    payload: Result<Json<GraphRequest>, JsonRejection>,
) -> Response {
    let text = match payload {
        Ok(Json(req)) => req.text.unwrap_or_default(),
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    if text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Text content is required");
    }

    info!(text_len = text.len(), "generating knowledge graph");
    let prompt = prompt::feature_prompt(FeatureKind::KnowledgeGraph, &text);
    match state.client.invoke(&prompt, &[]).await {
        Ok(raw) => {
            let graph = state.normalizer.graph(&raw);
            Json(serde_json::json!({ "knowledgeGraph": graph })).into_response()
        }
        Err(e) => {
            error!(error = %e, "knowledge graph generation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn analyze(
    State(state): State<SharedState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let kind: FeatureKind = match req.feature.parse() {
        Ok(kind) => kind,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("{}", e)),
    };
    if req.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Text content is required");
    }

    info!(feature = %kind, text_len = req.text.len(), "analyzing");
    match state
        .client
        .invoke(&prompt::feature_prompt(kind, &req.text), &[])
        .await
    {
        Ok(raw) => {
            let content = state.normalizer.normalize(kind, &raw);
            Json(AnalysisResult::for_feature(kind, content)).into_response()
        }
        Err(e) => {
            error!(feature = %kind, error = %e, "analysis failed");
            error_response(
                StatusCode::BAD_GATEWAY,
                format!("could not connect to the model service: {}", e),
            )
        }
    }
}

async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.client.model_name(),
    }))
}

/// Serve on the configured address until the process is stopped.
pub async fn run(config: &ServerConfig, state: SharedState) -> Result<(), std::io::Error> {
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = addr.as_str(), "folio server listening");
    axum::serve(listener, router(state)).await
}
