use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{info, warn};

use crate::{
    scenario::Scenario,
    session::{Command, Event, Session, SessionError},
    snapshot::{CitySnapshot, TileInfo},
};

#[derive(Clone, Debug, Serialize)]
pub struct StateEnvelope {
    pub scenario: String,
    pub snapshot: CitySnapshot,
    pub undo_depth: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct CommandResponse {
    pub event: Event,
    pub message: String,
    pub snapshot: CitySnapshot,
}

#[derive(Clone, Debug, Serialize)]
pub struct ErrorBody {
    pub reason: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Rejected(SessionError),
    TileNotFound { x: i32, y: i32 },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Rejected(err) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    reason: err.reason(),
                    message: err.to_string(),
                },
            ),
            ApiError::TileNotFound { x, y } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    reason: "invalid_position",
                    message: format!("no tile at ({x}, {y})"),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Shared server state. The mutex is the single-caller guarantee the session
/// relies on: one command at a time against one snapshot.
pub struct AppState {
    session: Mutex<Session>,
    broadcaster: broadcast::Sender<String>,
    scenario_name: String,
}

impl AppState {
    pub fn new(scenario_name: impl Into<String>, session: Session) -> Arc<Self> {
        let (broadcaster, _) = broadcast::channel::<String>(256);
        Arc::new(Self {
            session: Mutex::new(session),
            broadcaster,
            scenario_name: scenario_name.into(),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.broadcaster.subscribe()
    }

    pub fn envelope(&self) -> StateEnvelope {
        let session = self.session();
        StateEnvelope {
            scenario: self.scenario_name.clone(),
            snapshot: session.snapshot(),
            undo_depth: session.history_len(),
        }
    }

    pub fn inspect(&self, x: i32, y: i32) -> Option<TileInfo> {
        self.session().inspect(x, y)
    }

    /// Applies one command and, on success, pushes the new snapshot to every
    /// event-stream subscriber.
    pub fn execute(&self, command: Command) -> Result<CommandResponse, SessionError> {
        let mut session = self.session();
        let event = session.apply(command)?;
        let response = CommandResponse {
            message: event.to_string(),
            event,
            snapshot: session.snapshot(),
        };
        // Sent under the session lock so frames go out in commit order.
        if let Ok(payload) = serde_json::to_string(&response.snapshot) {
            // No subscribers is not an error.
            let _ = self.broadcaster.send(payload);
        }
        drop(session);
        Ok(response)
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct WebServerConfig {
    pub scenario: Scenario,
    pub host: String,
    pub port: u16,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/state", get(latest_state))
        .route("/api/tiles/:x/:y", get(tile))
        .route("/api/commands", post(apply_command))
        .route("/api/events", get(stream_events))
        .with_state(state)
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        host,
        port,
    } = config;

    let mut session = scenario.build_session();
    for command in &scenario.commands {
        if let Err(err) = session.apply(*command) {
            warn!(?command, %err, "scenario command rejected");
        }
    }
    let state = AppState::new(scenario.name.clone(), session);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, scenario = %scenario.name, "city API listening (Ctrl+C to stop)");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down city API");
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Json<StateEnvelope> {
    Json(state.envelope())
}

async fn tile(
    State(state): State<Arc<AppState>>,
    Path((x, y)): Path<(i32, i32)>,
) -> Result<Json<TileInfo>, ApiError> {
    state
        .inspect(x, y)
        .map(Json)
        .ok_or(ApiError::TileNotFound { x, y })
}

async fn apply_command(
    State(state): State<Arc<AppState>>,
    Json(command): Json<Command>,
) -> Result<Json<CommandResponse>, ApiError> {
    state.execute(command).map(Json).map_err(ApiError::Rejected)
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(SseEvent::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
