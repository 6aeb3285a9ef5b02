//! Timer background task
//!
//! The task exclusively owns the [`TimerEngine`]. Commands from the HTTP
//! handlers and ticks from the engine's scheduler are handled one at a time
//! in the same `select!` loop, and a snapshot is published after each.

use std::time::Duration;

use serde::Serialize;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    error::{TimerError, TimerEvent},
    services::{save_target_seconds, Clock, IntervalScheduler, KeyValueStore, TokioClock},
    state::{DurationInput, TargetSeconds, TickOutcome, TimerEngine, TimerPhase, TimerState},
};

/// Read-only copy of the timer published after every change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub target_seconds: TargetSeconds,
    pub raw_duration: String,
    pub revision: u64,
}

/// Commands accepted by the timer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    Pause,
    Resume,
    Reset,
    SetDuration(String),
    Shutdown,
}

type Reply = oneshot::Sender<Result<TimerSnapshot, TimerError>>;

#[derive(Debug)]
struct Request {
    command: TimerCommand,
    reply: Reply,
}

/// Cloneable handle used to drive the timer task
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::Sender<Request>,
    snapshots: watch::Receiver<TimerSnapshot>,
}

impl TimerHandle {
    /// Send a command and wait for the resulting snapshot
    pub async fn send(&self, command: TimerCommand) -> Result<TimerSnapshot, TimerError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Request { command, reply })
            .await
            .map_err(|_| TimerError::TaskUnavailable)?;
        response.await.map_err(|_| TimerError::TaskUnavailable)?
    }

    pub async fn start(&self) -> Result<TimerSnapshot, TimerError> {
        self.send(TimerCommand::Start).await
    }

    pub async fn pause(&self) -> Result<TimerSnapshot, TimerError> {
        self.send(TimerCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<TimerSnapshot, TimerError> {
        self.send(TimerCommand::Resume).await
    }

    pub async fn reset(&self) -> Result<TimerSnapshot, TimerError> {
        self.send(TimerCommand::Reset).await
    }

    pub async fn set_duration(&self, raw: impl Into<String>) -> Result<TimerSnapshot, TimerError> {
        self.send(TimerCommand::SetDuration(raw.into())).await
    }

    /// Stop the task. Any running countdown is dropped along with its schedule.
    pub async fn shutdown(&self) -> Result<TimerSnapshot, TimerError> {
        self.send(TimerCommand::Shutdown).await
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> TimerSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.clone()
    }
}

/// Spawn the timer task.
///
/// The duration input is seeded from `initial`; the timer itself always
/// starts Idle. `on_done` runs on the task once per completed countdown.
pub fn spawn_timer_task(
    initial: TargetSeconds,
    store: Box<dyn KeyValueStore>,
    tick_interval: Duration,
    on_done: impl FnMut() + Send + 'static,
) -> (TimerHandle, JoinHandle<()>) {
    let mut engine = TimerEngine::new(TokioClock::new(), IntervalScheduler::new(), tick_interval);
    engine.on_done(on_done);

    let input = DurationInput::new(initial);
    let first = TimerSnapshot {
        state: engine.state(),
        target_seconds: input.target_seconds(),
        raw_duration: input.raw().to_string(),
        revision: 0,
    };
    let (snapshot_tx, snapshot_rx) = watch::channel(first);
    let (command_tx, command_rx) = mpsc::channel(32);

    let task = TimerTask {
        engine,
        input,
        store,
        snapshots: snapshot_tx,
        revision: 0,
    };
    let join = tokio::spawn(task.run(command_rx));

    (
        TimerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        },
        join,
    )
}

struct TimerTask {
    engine: TimerEngine<TokioClock, IntervalScheduler>,
    input: DurationInput,
    store: Box<dyn KeyValueStore>,
    snapshots: watch::Sender<TimerSnapshot>,
    revision: u64,
}

impl TimerTask {
    async fn run(mut self, mut commands: mpsc::Receiver<Request>) {
        info!("Starting timer task");

        loop {
            tokio::select! {
                request = commands.recv() => {
                    let Some(Request { command, reply }) = request else {
                        debug!("All timer handles dropped");
                        break;
                    };

                    let shutdown = command == TimerCommand::Shutdown;
                    let result = self.handle(command);
                    // Rejected commands may still rewrite malformed input text
                    let snapshot = self.publish();
                    let result = result.map(|()| snapshot);
                    if reply.send(result).is_err() {
                        debug!("Timer command caller went away before the reply");
                    }
                    if shutdown {
                        break;
                    }
                }

                _ = self.engine.scheduler_mut().next_tick() => {
                    self.on_tick();
                    self.publish();
                }
            }
        }

        info!("Timer task stopped");
    }

    fn handle(&mut self, command: TimerCommand) -> Result<(), TimerError> {
        debug!("Handling timer command: {:?}", command);
        match command {
            TimerCommand::Start => {
                if self.input.has_parse_error() {
                    warn!("Refusing to start with malformed duration {:?}", self.input.raw());
                    return Err(TimerError::InvalidDuration(self.input.raw().to_string()));
                }
                self.engine.start(self.input.target_seconds())
            }
            TimerCommand::Pause => self.engine.pause(),
            TimerCommand::Resume => self.engine.resume(),
            TimerCommand::Reset => self.engine.reset(),
            TimerCommand::SetDuration(raw) => self.set_duration(raw),
            TimerCommand::Shutdown => Ok(()),
        }
    }

    fn set_duration(&mut self, raw: String) -> Result<(), TimerError> {
        let phase = self.engine.phase();
        if phase != TimerPhase::Idle {
            warn!("Ignoring duration change while the timer is {}", phase);
            return Err(TimerError::InvalidTransition {
                event: TimerEvent::SetDuration,
                phase,
            });
        }

        match self.input.set_raw(raw) {
            Ok(target) => {
                // Accepted text like "007" or " 7" would otherwise block start
                self.input.synchronize_if_malformed();
                info!("Duration set to {} seconds", target);
                if let Err(e) = save_target_seconds(&mut *self.store, target) {
                    warn!("Failed to persist duration: {:#}", e);
                }
                Ok(())
            }
            Err(e) => {
                warn!("{}; keeping {} seconds", e, self.input.target_seconds());
                self.input.synchronize_if_malformed();
                Err(e)
            }
        }
    }

    fn on_tick(&mut self) {
        let now = self.engine.clock().now();
        match self.engine.tick(now) {
            Ok(TickOutcome::Running { seconds_left }) => {
                debug!("Tick: {:.3} seconds left", seconds_left);
            }
            Ok(TickOutcome::Done) => {
                info!("Countdown finished");
            }
            Err(e) => {
                error!("{}", e);
            }
        }
    }

    fn publish(&mut self) -> TimerSnapshot {
        self.revision += 1;
        let snapshot = TimerSnapshot {
            state: self.engine.state(),
            target_seconds: self.input.target_seconds(),
            raw_duration: self.input.raw().to_string(),
            revision: self.revision,
        };
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }
}
