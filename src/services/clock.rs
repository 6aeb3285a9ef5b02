//! Time sources for the timer engine

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use tokio::time::Instant;

use crate::state::Millis;

/// Source of millisecond timestamps
pub trait Clock {
    fn now(&self) -> Millis;
}

/// Monotonic clock measured from its creation.
///
/// Built on `tokio::time::Instant`, so it follows tokio's paused clock in tests.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Millis {
        Millis::try_from(self.origin.elapsed().as_millis()).unwrap_or(Millis::MAX)
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start)),
        }
    }

    pub fn set(&self, now: Millis) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move the clock by `delta_ms`; negative values move it backwards
    pub fn advance(&self, delta_ms: Millis) -> Millis {
        self.now.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.now.load(Ordering::SeqCst)
    }
}
