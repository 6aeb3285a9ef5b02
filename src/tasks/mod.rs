//! Background tasks module
//!
//! This module contains the task that owns and drives the timer engine.

pub mod timer_task;

// Re-export main types
pub use timer_task::{spawn_timer_task, TimerCommand, TimerHandle, TimerSnapshot};
