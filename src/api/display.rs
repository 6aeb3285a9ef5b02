//! Human-readable rendering of the timer state
//!
//! While running, the seconds are rounded up so "0 seconds" never shows while
//! time remains. While paused, two fraction digits are shown since the value
//! is not about to change.

use crate::state::{TargetSeconds, TimerState};

/// Text shown when the countdown has reached zero
pub const DONE_TEXT: &str = "Time's up!";

pub fn format_seconds_left(state: &TimerState, target: TargetSeconds) -> String {
    match state {
        TimerState::Idle => whole_seconds(u64::from(target.get())),
        TimerState::Running { seconds_left, .. } => whole_seconds(seconds_left.ceil() as u64),
        TimerState::Paused { seconds_left } => format!("{:.2} seconds", seconds_left),
        TimerState::Done => DONE_TEXT.to_string(),
    }
}

fn whole_seconds(seconds: u64) -> String {
    if seconds == 1 {
        "1 second".to_string()
    } else {
        format!("{} seconds", seconds)
    }
}
