//! State management module
//!
//! This module contains the timer state machine and the shared service state.

pub mod app_state;
pub mod duration_input;
pub mod engine;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use duration_input::{DurationInput, TargetSeconds};
pub use engine::{TickOutcome, TimerEngine, DEFAULT_TICK_INTERVAL};
pub use timer_state::{elapsed_seconds, progress_percentage, Millis, TimerPhase, TimerState};
