//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::display::format_seconds_left;
use crate::{
    state::{progress_percentage, TimerPhase, TimerState},
    tasks::TimerSnapshot,
};

/// Timer as presented to clients; derived values are computed per read
#[derive(Debug, Clone, Serialize)]
pub struct TimerView {
    pub phase: TimerPhase,
    pub state: TimerState,
    pub seconds_left: Option<f64>,
    pub display: String,
    pub progress_percentage: f64,
    pub target_seconds: u32,
    pub duration_input: String,
    pub revision: u64,
}

impl TimerView {
    pub fn from_snapshot(snapshot: &TimerSnapshot) -> Self {
        Self {
            phase: snapshot.state.phase(),
            state: snapshot.state,
            seconds_left: snapshot.state.seconds_left(),
            display: format_seconds_left(&snapshot.state, snapshot.target_seconds),
            progress_percentage: progress_percentage(&snapshot.state, snapshot.target_seconds),
            target_seconds: snapshot.target_seconds.get(),
            duration_input: snapshot.raw_duration.clone(),
            revision: snapshot.revision,
        }
    }
}

/// API response structure for timer commands
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerView) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    pub fn ok(message: String, timer: TimerView) -> Self {
        Self::new("ok".to_string(), message, timer)
    }

    pub fn error(message: String, timer: TimerView) -> Self {
        Self::new("error".to_string(), message, timer)
    }
}

/// Body of PUT /timer/duration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationRequest {
    pub value: String,
}

/// Status response with timer and server information
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timer: TimerView,
    pub completed_countdowns: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
