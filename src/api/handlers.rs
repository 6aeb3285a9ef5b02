//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{debug, info, warn};

use crate::{
    error::TimerError,
    state::AppState,
    tasks::TimerSnapshot,
};
use super::responses::{ApiResponse, DurationRequest, HealthResponse, StatusResponse, TimerView};

type ApiResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

/// Map a timer error onto the HTTP status reported to the client
fn error_status(error: &TimerError) -> StatusCode {
    match error {
        TimerError::InvalidTransition { .. } => StatusCode::CONFLICT,
        TimerError::InvalidDuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TimerError::TaskUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        TimerError::TickWhileNotRunning => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond(
    state: &AppState,
    action: &str,
    message: &str,
    result: Result<TimerSnapshot, TimerError>,
) -> ApiResult {
    match result {
        Ok(snapshot) => {
            info!("{} endpoint called - {}", action, message);
            state.record_action(action);
            Ok(Json(ApiResponse::ok(
                message.to_string(),
                TimerView::from_snapshot(&snapshot),
            )))
        }
        Err(e) => {
            warn!("{} request rejected: {}", action, e);
            let timer = TimerView::from_snapshot(&state.timer.snapshot());
            Err((error_status(&e), Json(ApiResponse::error(e.to_string(), timer))))
        }
    }
}

/// Handle POST /timer/start - Start counting down from the configured duration
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let result = state.timer.start().await;
    respond(&state, "start", "Timer started", result)
}

/// Handle POST /timer/pause - Pause a running countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let result = state.timer.pause().await;
    respond(&state, "pause", "Timer paused", result)
}

/// Handle POST /timer/resume - Resume a paused countdown
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let result = state.timer.resume().await;
    respond(&state, "resume", "Timer resumed", result)
}

/// Handle POST /timer/reset - Return to idle
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let result = state.timer.reset().await;
    respond(&state, "reset", "Timer reset", result)
}

/// Handle PUT /timer/duration - Change the configured duration while idle
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DurationRequest>,
) -> ApiResult {
    let result = state.timer.set_duration(request.value).await;
    respond(&state, "duration", "Duration updated", result)
}

/// Handle GET /timer - Return the current timer view
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Json<TimerView> {
    Json(TimerView::from_snapshot(&state.timer.snapshot()))
}

/// Handle GET /timer/events - Stream a timer view on every change
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Client connected to timer event stream");
    let snapshots = state.timer.subscribe();

    let stream = stream::unfold((snapshots, true), |(mut snapshots, first)| async move {
        if !first && snapshots.changed().await.is_err() {
            debug!("Timer task stopped, closing event stream");
            return None;
        }

        let view = TimerView::from_snapshot(&snapshots.borrow_and_update());
        let data = serde_json::to_string(&view).unwrap_or_else(|_| "{}".to_string());
        let event = Event::default().event("timer").data(data);
        Some((Ok(event), (snapshots, false)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return timer and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: TimerView::from_snapshot(&state.timer.snapshot()),
        completed_countdowns: state.completed_count(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
