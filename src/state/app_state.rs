//! Main application state management

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::info;

use crate::{
    services::{load_target_seconds, KeyValueStore},
    tasks::{spawn_timer_task, TimerHandle},
};

/// Application state shared by the HTTP handlers
#[derive(Debug)]
pub struct AppState {
    /// Handle to the task owning the timer engine
    pub timer: TimerHandle,
    /// Number of countdowns that reached zero since startup
    pub completions: Arc<AtomicU64>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Load the stored duration and spawn the timer task backed by `store`
    pub fn new(
        port: u16,
        host: String,
        store: Box<dyn KeyValueStore>,
        tick_interval: Duration,
    ) -> (Self, JoinHandle<()>) {
        let initial = load_target_seconds(&*store);
        info!("Initial duration: {} seconds", initial);

        let completions = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&completions);
        let (timer, join) = spawn_timer_task(initial, store, tick_interval, move || {
            let total = counter.fetch_add(1, Ordering::SeqCst) + 1;
            info!("Time's up! ({} countdowns completed)", total);
        });

        let state = Self {
            timer,
            completions,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        };
        (state, join)
    }

    /// Remember the most recent successful action
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    pub fn completed_count(&self) -> u64 {
        self.completions.load(Ordering::SeqCst)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
