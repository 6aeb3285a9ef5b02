//! Countdown state machine with elapsed-time tick reconciliation
//!
//! The engine stores the exact floating point seconds left and reconciles it
//! against the clock on every tick, so display accuracy depends only on
//! wall-clock deltas and never on the scheduler firing on time.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::{elapsed_seconds, Millis, TargetSeconds, TimerPhase, TimerState};
use crate::{
    error::{TimerError, TimerEvent},
    services::{Clock, Scheduler},
};

/// Default period between ticks while running
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(20);

/// Result of a successful tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Running { seconds_left: f64 },
    Done,
}

type DoneCallback = Box<dyn FnMut() + Send>;

/// Owner of the [`TimerState`] and of the periodic tick schedule
pub struct TimerEngine<C, S>
where
    C: Clock,
    S: Scheduler,
{
    state: TimerState,
    clock: C,
    scheduler: S,
    tick_interval: Duration,
    on_done: Option<DoneCallback>,
}

impl<C, S> TimerEngine<C, S>
where
    C: Clock,
    S: Scheduler,
{
    pub fn new(clock: C, scheduler: S, tick_interval: Duration) -> Self {
        Self {
            state: TimerState::Idle,
            clock,
            scheduler,
            tick_interval,
            on_done: None,
        }
    }

    /// Register the callback fired once per Running -> Done transition
    pub fn on_done(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_done = Some(Box::new(callback));
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn phase(&self) -> TimerPhase {
        self.state.phase()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn start(&mut self, target: TargetSeconds) -> Result<(), TimerError> {
        self.expect_phase(TimerEvent::Start, &[TimerPhase::Idle])?;

        self.enter_running(target.as_secs_f64());
        info!("Timer started for {} seconds", target);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        let TimerState::Running {
            seconds_left,
            last_update_time,
        } = self.state
        else {
            return Err(self.rejected(TimerEvent::Pause));
        };

        let now = self.clock.now();
        let seconds_left = seconds_left - elapsed_seconds(last_update_time, now);
        if seconds_left <= 0.0 {
            self.finish();
            return Ok(());
        }

        self.scheduler.cancel();
        self.state = TimerState::Paused { seconds_left };
        info!("Timer paused with {:.2} seconds left", seconds_left);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TimerError> {
        let TimerState::Paused { seconds_left } = self.state else {
            return Err(self.rejected(TimerEvent::Resume));
        };

        self.enter_running(seconds_left);
        info!("Timer resumed with {:.2} seconds left", seconds_left);
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), TimerError> {
        self.expect_phase(
            TimerEvent::Reset,
            &[TimerPhase::Running, TimerPhase::Paused, TimerPhase::Done],
        )?;

        self.scheduler.cancel();
        self.state = TimerState::Idle;
        info!("Timer reset");
        Ok(())
    }

    /// Reconcile `seconds_left` against `now`.
    ///
    /// Only the scheduler driving this engine may call this. The schedule is
    /// cancelled synchronously on every exit from Running, so an error here
    /// means the caller polled a schedule it did not own.
    pub fn tick(&mut self, now: Millis) -> Result<TickOutcome, TimerError> {
        let TimerState::Running {
            seconds_left,
            last_update_time,
        } = self.state
        else {
            return Err(TimerError::TickWhileNotRunning);
        };

        let seconds_left = seconds_left - elapsed_seconds(last_update_time, now);
        if seconds_left <= 0.0 {
            self.finish();
            return Ok(TickOutcome::Done);
        }

        self.state = TimerState::Running {
            seconds_left,
            last_update_time: now,
        };
        Ok(TickOutcome::Running { seconds_left })
    }

    fn enter_running(&mut self, seconds_left: f64) {
        self.state = TimerState::Running {
            seconds_left,
            last_update_time: self.clock.now(),
        };
        self.scheduler.schedule_repeating(self.tick_interval);
    }

    fn finish(&mut self) {
        self.scheduler.cancel();
        self.state = TimerState::Done;
        info!("Timer done");
        if let Some(callback) = self.on_done.as_mut() {
            callback();
        }
    }

    fn expect_phase(&self, event: TimerEvent, allowed: &[TimerPhase]) -> Result<(), TimerError> {
        if allowed.contains(&self.phase()) {
            Ok(())
        } else {
            Err(self.rejected(event))
        }
    }

    fn rejected(&self, event: TimerEvent) -> TimerError {
        let phase = self.phase();
        warn!("Ignoring {} while the timer is {}", event, phase);
        TimerError::InvalidTransition { event, phase }
    }
}

impl<C, S> Drop for TimerEngine<C, S>
where
    C: Clock,
    S: Scheduler,
{
    fn drop(&mut self) {
        if self.scheduler.is_scheduled() {
            debug!("Cancelling tick schedule on engine drop");
            self.scheduler.cancel();
        }
    }
}

impl<C, S> std::fmt::Debug for TimerEngine<C, S>
where
    C: Clock,
    S: Scheduler,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("tick_interval", &self.tick_interval)
            .field("scheduled", &self.scheduler.is_scheduled())
            .finish()
    }
}
