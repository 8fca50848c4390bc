//! Gateway HTTP server: health, static documents, and the message endpoint.

use crate::activity::{ActivityRouter, RouterError, TurnContext};
use crate::config::RuntimeConfig;
use crate::gateway::documents::{load_document, StaticDocument};
use crate::gateway::protocol::{InboundEnvelope, JsonRpcResponse, OutboundEnvelope};
use crate::jokes::JokeSource;
use crate::AGENT_NAME;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared, read-only state for all handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<RuntimeConfig>,
    pub jokes: Arc<JokeSource>,
    pub router: ActivityRouter,
}

impl GatewayState {
    /// State with the joke source built from config (completion client when a key is set).
    pub fn new(config: RuntimeConfig) -> Self {
        let jokes = JokeSource::from_config(&config);
        Self::with_jokes(config, jokes)
    }

    pub fn with_jokes(config: RuntimeConfig, jokes: JokeSource) -> Self {
        let jokes = Arc::new(jokes);
        Self {
            config: Arc::new(config),
            router: ActivityRouter::new(jokes.clone()),
            jokes,
        }
    }
}

/// Failure on the message endpoint; surfaced as HTTP 500 with the description as body.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("invalid request body: {0}")]
    Body(#[from] serde_json::Error),
    #[error(transparent)]
    Route(#[from] RouterError),
}

impl IntoResponse for MessageError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

impl IntoResponse for OutboundEnvelope {
    fn into_response(self) -> Response {
        match self {
            Self::JsonRpc(res) => Json(res).into_response(),
            Self::Single(activity) => Json(activity).into_response(),
            Self::Batch(batch) => Json(batch).into_response(),
            Self::Empty => StatusCode::OK.into_response(),
        }
    }
}

/// All routes, with request logging.
pub fn app(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health_http))
        .route("/api/card", get(agent_card_http))
        .route(
            "/.well-known/agent-card.json",
            get(agent_card_http).post(messages_http),
        )
        .route("/api/discovery", get(discovery_http))
        .route("/.well-known/agent-discovery.json", get(discovery_http))
        .route("/api/manifest", get(manifest_http))
        .route("/api/declarative-agent", get(declarative_agent_http))
        .route("/api/messages", post(messages_http).get(messages_probe_http))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Bind and serve until SIGINT/SIGTERM.
pub async fn run_gateway(config: RuntimeConfig) -> Result<()> {
    let state = GatewayState::new(config);
    let config = state.config.clone();

    log::info!("{} starting", AGENT_NAME);
    log::info!(
        "listening on http://{}:{}/api/messages (public base {})",
        config.bind,
        config.port,
        config.base_url
    );
    if state.jokes.generation_enabled() {
        log::info!("OpenAI integration: enabled");
    } else {
        log::info!("OpenAI integration: disabled (using random jokes only)");
    }

    let bind_addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// Logs method, path and remote of every request, then the response status.
async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    log::info!("{} {} from {}", method, path, remote);
    let res = next.run(req).await;
    log::info!("{} {} -> {}", method, path, res.status().as_u16());
    res
}

/// GET /health
async fn health_http() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "agent": AGENT_NAME }))
}

async fn agent_card_http(State(state): State<GatewayState>) -> Response {
    document_response(&state, StaticDocument::AgentCard).await
}

async fn discovery_http(State(state): State<GatewayState>) -> Response {
    document_response(&state, StaticDocument::Discovery).await
}

async fn manifest_http(State(state): State<GatewayState>) -> Response {
    document_response(&state, StaticDocument::Manifest).await
}

async fn declarative_agent_http(State(state): State<GatewayState>) -> Response {
    document_response(&state, StaticDocument::DeclarativeAgent).await
}

/// Serve a static document, or 404 `{error, message}` when it cannot be loaded.
async fn document_response(state: &GatewayState, doc: StaticDocument) -> Response {
    match load_document(&state.config.documents_dir, doc, &state.config.base_url).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => {
            log::warn!("{} unavailable: {}", doc.label(), e);
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("{} not found", doc.label()),
                    "message": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// GET /api/messages: liveness probe used by hosting platforms.
async fn messages_probe_http() -> StatusCode {
    StatusCode::OK
}

/// POST /api/messages (and POST /.well-known/agent-card.json): activity or JSON-RPC message.
async fn messages_http(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if log::log_enabled!(log::Level::Debug) {
        for (name, value) in headers.iter() {
            if name.as_str().eq_ignore_ascii_case("authorization") {
                log::debug!("  {}: Bearer ***masked***", name);
            } else {
                log::debug!("  {}: {}", name, value.to_str().unwrap_or("<binary>"));
            }
        }
        log::debug!("body: {}", String::from_utf8_lossy(&body));
    }
    match handle_message(&state, &body).await {
        Ok(envelope) => envelope.into_response(),
        Err(e) => {
            log::error!("error processing message: {}", e);
            e.into_response()
        }
    }
}

/// Parse the body, run it through the joke source or the router, and build the reply body.
pub async fn handle_message(
    state: &GatewayState,
    body: &[u8],
) -> Result<OutboundEnvelope, MessageError> {
    match InboundEnvelope::parse(body)? {
        InboundEnvelope::JsonRpc(req) => {
            log::info!("detected JSON-RPC 2.0 {} message", req.method);
            let text = req.message_text();
            log::debug!("extracted text: {}", text);
            let joke = state.jokes.get_joke(text).await;
            Ok(OutboundEnvelope::JsonRpc(JsonRpcResponse::assistant_text(
                req.id.clone(),
                joke,
            )))
        }
        InboundEnvelope::Activity(activity) => {
            log::info!("routing activity type: {}", activity.typ);
            let inbound = activity.to_inbound();
            let mut ctx = TurnContext::new();
            state.router.dispatch(&inbound, &mut ctx).await?;
            let responses = ctx.into_responses();
            log::info!("responses generated: {}", responses.len());
            Ok(OutboundEnvelope::from_responses(&activity, responses))
        }
    }
}
