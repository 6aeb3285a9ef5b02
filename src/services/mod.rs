//! Services module
//!
//! Collaborators injected into the timer engine: time source, tick scheduler
//! and key-value persistence.

pub mod clock;
pub mod scheduler;
pub mod storage;

// Re-export main types
pub use clock::{Clock, ManualClock, TokioClock};
pub use scheduler::{IntervalScheduler, Scheduler};
pub use storage::{
    load_target_seconds, save_target_seconds, FileStore, KeyValueStore, MemoryStore,
    TARGET_SECONDS_KEY,
};
