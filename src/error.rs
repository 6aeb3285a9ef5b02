//! Timer error taxonomy

use thiserror::Error;

use crate::state::TimerPhase;

/// Events that can be applied to the timer, used in error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Start,
    Pause,
    Resume,
    Reset,
    SetDuration,
}

impl std::fmt::Display for TimerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TimerEvent::Start => "start",
            TimerEvent::Pause => "pause",
            TimerEvent::Resume => "resume",
            TimerEvent::Reset => "reset",
            TimerEvent::SetDuration => "set the duration",
        };
        f.write_str(name)
    }
}

/// Errors produced by the timer engine and the task hosting it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// The event is not valid from the current phase; state was left untouched
    #[error("cannot {event} while the timer is {phase}")]
    InvalidTransition { event: TimerEvent, phase: TimerPhase },

    /// A tick arrived while the timer was not running
    #[error("timer tick called when the timer is not running")]
    TickWhileNotRunning,

    /// Duration input that is not a positive whole number of seconds
    #[error("invalid duration {0:?}: expected a positive whole number of seconds")]
    InvalidDuration(String),

    /// The timer task has stopped and no longer accepts commands
    #[error("timer task is unavailable")]
    TaskUnavailable,
}
