use anyhow::Context;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{request::Parts, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::api::envelope::RequestEnvelope;
use crate::auth::TokenAuthority;
use crate::config::{ApiConfig, AppConfig};
use crate::database::{self, ItemStore};
use crate::error::ApiError;
use crate::middleware::{jwt_auth_middleware, Dispatcher, FaultBarrier, RequestLogger, VerifiedClaims};
use crate::router;
use crate::services::ItemService;

/// Shared, explicitly constructed dependencies of the HTTP server
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub tokens: Arc<TokenAuthority>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn ItemStore>, tokens: TokenAuthority, api: &ApiConfig) -> Self {
        Self {
            dispatcher: Arc::new(build_dispatcher(store, api)),
            tokens: Arc::new(tokens),
            max_body_bytes: api.max_request_size_bytes,
        }
    }

    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store = database::connect(&config.storage)
            .await
            .context("failed to initialize item store")?;
        let tokens = TokenAuthority::from_config(&config.security).context("failed to initialize token verifier")?;
        Ok(Self::new(store, tokens, &config.api))
    }
}

/// Router and service wired together with the standard interceptors
pub fn build_dispatcher(store: Arc<dyn ItemStore>, api: &ApiConfig) -> Dispatcher {
    let dispatcher = Dispatcher::new(router::Router::items(), ItemService::new(store));
    let dispatcher = if api.enable_request_logging {
        dispatcher.with_interceptor(RequestLogger)
    } else {
        dispatcher
    };
    dispatcher.with_interceptor(FaultBarrier)
}

pub fn app(state: AppState) -> Router {
    // Everything except /health is handed to the dispatcher, which owns routing
    let items = Router::new()
        .fallback(gateway)
        .layer(from_fn_with_state(state.tokens.clone(), jwt_auth_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(items)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn serve(config: &AppConfig, state: AppState) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Items API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install ctrl-c handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Translate an HTTP request into an envelope and dispatch it
async fn gateway(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let envelope = match envelope_from_parts(&parts, body, state.max_body_bytes).await {
        Ok(envelope) => envelope,
        Err(err) => return err.into_response(),
    };

    state.dispatcher.dispatch(envelope).await.into_response()
}

async fn envelope_from_parts(parts: &Parts, body: Body, limit: usize) -> Result<RequestEnvelope, ApiError> {
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|_| ApiError::bad_request("Request body too large or unreadable"))?;

    let request_id = parts
        .headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut envelope = RequestEnvelope::new(parts.method.as_str(), parts.uri.path()).with_request_id(request_id);

    if !bytes.is_empty() {
        let body = String::from_utf8(bytes.to_vec()).map_err(|_| ApiError::bad_request("Request body must be UTF-8"))?;
        envelope = envelope.with_body(body);
    }

    if let Some(VerifiedClaims(claims)) = parts.extensions.get::<VerifiedClaims>() {
        envelope = envelope.with_claims(claims.clone());
    }

    Ok(envelope)
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.dispatcher.service().store().health_check().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        ApiError::service_unavailable("Storage unavailable")
    })?;

    Ok(Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "storage": "ok"
    })))
}
