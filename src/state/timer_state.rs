//! Timer state structure and derived values

use serde::{Deserialize, Serialize};

use super::TargetSeconds;

/// Millisecond timestamp read from a [`Clock`](crate::services::Clock)
pub type Millis = i64;

/// Countdown state; exactly one variant is active at a time
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimerState {
    /// No countdown in progress; the duration is configurable
    #[default]
    Idle,
    /// Counting down. `last_update_time` is the instant `seconds_left` was last correct
    Running {
        seconds_left: f64,
        last_update_time: Millis,
    },
    /// Countdown suspended
    Paused { seconds_left: f64 },
    /// Countdown reached zero; terminal until reset
    Done,
}

/// Variant tag of a [`TimerState`], without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Done,
}

impl std::fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
            TimerPhase::Done => "done",
        };
        f.write_str(name)
    }
}

impl TimerState {
    pub fn phase(&self) -> TimerPhase {
        match self {
            TimerState::Idle => TimerPhase::Idle,
            TimerState::Running { .. } => TimerPhase::Running,
            TimerState::Paused { .. } => TimerPhase::Paused,
            TimerState::Done => TimerPhase::Done,
        }
    }

    /// Exact seconds left, if a countdown is in progress
    pub fn seconds_left(&self) -> Option<f64> {
        match self {
            TimerState::Running { seconds_left, .. } | TimerState::Paused { seconds_left } => {
                Some(*seconds_left)
            }
            TimerState::Idle | TimerState::Done => None,
        }
    }
}

/// Seconds elapsed between two millisecond timestamps.
///
/// A clock that went backwards yields zero rather than a negative value, so
/// it can never add time back to a countdown.
pub fn elapsed_seconds(last_update_time: Millis, now: Millis) -> f64 {
    let elapsed = now.saturating_sub(last_update_time) as f64 / 1000.0;
    elapsed.max(0.0)
}

/// Progress of the countdown in percent, from 0 (just started) to 100 (done)
pub fn progress_percentage(state: &TimerState, target: TargetSeconds) -> f64 {
    match state {
        TimerState::Idle => 0.0,
        TimerState::Running { seconds_left, .. } | TimerState::Paused { seconds_left } => {
            (1.0 - seconds_left / target.as_secs_f64()) * 100.0
        }
        TimerState::Done => 100.0,
    }
}
