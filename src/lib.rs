//! Countdown - A drift-free countdown timer served over HTTP
//!
//! The core is [`TimerEngine`], a countdown state machine that reconciles
//! the seconds left against a clock on every tick. The rest of the crate
//! hosts the engine on a tokio task and exposes it over a small HTTP API.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::TimerError;
pub use state::{AppState, TargetSeconds, TimerEngine, TimerState};
pub use tasks::{spawn_timer_task, TimerHandle, TimerSnapshot};
pub use utils::signals::shutdown_signal;
