use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::cli::ServeArgs;
use crate::core::Group;
use crate::delivery::{self, ConsoleSink, DeliverySink, WebhookSink, DEFAULT_MESSAGE};
use crate::engine::PairingEngine;
use crate::store::{self, PendingRound, SessionStore};

/// Request timeout applied to every route
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared application state.
///
/// The session store doubles as the serialization point: every handler
/// that loads, computes, or persists takes this lock for its whole body,
/// so at most one assignment computation is in flight at a time and a
/// preview/confirm sequence cannot interleave with another generate.
pub struct AppState {
    roster_path: PathBuf,
    weights_path: PathBuf,
    secret: Option<String>,
    webhook: Option<String>,
    engine: PairingEngine,
    sessions: Mutex<SessionStore>,
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Build an error response without leaking internals to the client;
/// details go to the server log instead.
fn api_error(status: StatusCode, error_type: &str, user_message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: user_message.to_string(),
            error_type: error_type.to_string(),
        }),
    )
}

#[derive(Deserialize)]
struct GenerateRequest {
    secret: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    session: String,
    attempts: u32,
    groups: Vec<Group>,
}

#[derive(Deserialize)]
struct FrequencyRequest {
    id: String,
    demand: u32,
}

#[derive(Serialize)]
struct FrequencyResponse {
    id: String,
    demand: u32,
}

#[derive(Deserialize)]
struct SendRequest {
    secret: Option<String>,
    session: String,
    message: Option<String>,
}

#[derive(Serialize)]
struct SendResponse {
    delivered: usize,
    failed: usize,
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created or the server
/// fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", args.address, args.port).parse()?;
    let app = create_router(&args);

    if args.secret.is_none() {
        tracing::warn!("no --secret configured; generate and send are unauthenticated");
    }
    tracing::info!(%addr, "pairwheel serving");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the application router with all routes and middleware configured
pub fn create_router(args: &ServeArgs) -> Router {
    let state = Arc::new(AppState {
        roster_path: args.roster.clone(),
        weights_path: args.weights.clone(),
        secret: args.secret.clone(),
        webhook: args.webhook.clone(),
        engine: PairingEngine::new(),
        sessions: Mutex::new(SessionStore::new(chrono::Duration::minutes(
            args.session_ttl,
        ))),
    });

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/generate", post(generate_handler))
        .route("/api/frequency", post(frequency_handler))
        .route("/api/send", post(send_handler))
        // The engine is synchronous and the state lock serializes it
        // anyway; one request at a time keeps the queue visible to callers.
        .layer(ConcurrencyLimitLayer::new(1))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn check_secret(state: &AppState, supplied: Option<&str>) -> Result<(), ApiError> {
    match &state.secret {
        Some(expected) if supplied != Some(expected.as_str()) => Err(api_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or incorrect secret",
        )),
        _ => Ok(()),
    }
}

async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    check_secret(&state, req.secret.as_deref())?;

    let mut sessions = state.sessions.lock().await;

    let roster = store::roster::parse_roster_file(&state.roster_path).map_err(|err| {
        tracing::error!(%err, "roster load failed");
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "roster_error",
            "roster could not be read",
        )
    })?;

    let mut table = store::weights::load_or_empty(&state.weights_path).map_err(|err| {
        tracing::error!(%err, "weight store load failed");
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "store_error",
            "weight store could not be read",
        )
    })?;

    table.sync(&roster);
    table.verify().map_err(|err| {
        tracing::error!(%err, "weight table corrupt");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "invariant_violation",
            "weight table is corrupt; refusing to continue",
        )
    })?;

    let outcome = state.engine.assign(&roster, table).map_err(|err| {
        tracing::error!(%err, "assignment failed");
        api_error(
            StatusCode::CONFLICT,
            "assignment_failed",
            "no feasible assignment for this roster",
        )
    })?;

    let round = PendingRound::new(outcome.assignment, outcome.table);
    let groups = round.assignment.groups.clone();
    let session = sessions.insert(round);

    Ok(Json(GenerateResponse {
        session,
        attempts: outcome.attempts,
        groups,
    }))
}

async fn frequency_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FrequencyRequest>,
) -> Result<Json<FrequencyResponse>, ApiError> {
    if req.demand > 2 {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_demand",
            "demand must be between 0 and 2",
        ));
    }
    if req.id.trim().is_empty() {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_id",
            "participant id cannot be empty",
        ));
    }

    // Hold the lock: the roster file must not change under a generate
    let _sessions = state.sessions.lock().await;

    store::roster::update_entry(&state.roster_path, req.id.trim(), req.demand).map_err(|err| {
        tracing::error!(%err, "roster update failed");
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "roster_error",
            "roster could not be updated",
        )
    })?;

    Ok(Json(FrequencyResponse {
        id: req.id.trim().to_string(),
        demand: req.demand,
    }))
}

async fn send_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    check_secret(&state, req.secret.as_deref())?;

    let mut sessions = state.sessions.lock().await;

    let Some(round) = sessions.take(&req.session) else {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            "unknown_session",
            "no pending round for that session; generate first",
        ));
    };

    let sink: Box<dyn DeliverySink + Send + Sync> = match &state.webhook {
        Some(url) => Box::new(WebhookSink::from_url(url.clone()).map_err(|err| {
            tracing::error!(%err, "webhook sink configuration invalid");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "sink_error",
                "delivery sink could not be built",
            )
        })?),
        None => Box::new(ConsoleSink),
    };

    let message = req.message.as_deref().unwrap_or(DEFAULT_MESSAGE);
    let report = delivery::deliver_assignment(sink.as_ref(), &round.assignment, message).await;

    store::weights::save_to_file(&state.weights_path, &round.table).map_err(|err| {
        tracing::error!(%err, "weight store persist failed");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            "delivered, but the weight table could not be persisted",
        )
    })?;

    Ok(Json(SendResponse {
        delivered: report.delivered,
        failed: report.failures.len(),
    }))
}
