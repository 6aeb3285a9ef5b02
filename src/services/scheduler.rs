//! Periodic tick scheduling

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::debug;

/// Periodic tick source owned by the timer engine.
///
/// At most one schedule is active: arming again replaces the previous one,
/// and `cancel` must take effect before it returns.
pub trait Scheduler {
    fn schedule_repeating(&mut self, every: Duration);
    fn cancel(&mut self);
    fn is_scheduled(&self) -> bool;
}

/// Scheduler backed by a tokio interval and polled from the owning task
#[derive(Debug, Default)]
pub struct IntervalScheduler {
    interval: Option<Interval>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve on the next tick. Never resolves while nothing is scheduled.
    pub async fn next_tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule_repeating(&mut self, every: Duration) {
        // First tick one period from now; the state was just made correct
        let mut interval = interval_at(Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        if self.interval.replace(interval).is_some() {
            debug!("Replaced existing tick schedule");
        }
        debug!("Tick schedule armed every {:?}", every);
    }

    fn cancel(&mut self) {
        if self.interval.take().is_some() {
            debug!("Tick schedule cancelled");
        }
    }

    fn is_scheduled(&self) -> bool {
        self.interval.is_some()
    }
}
