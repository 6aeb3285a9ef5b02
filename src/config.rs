//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

use crate::state::DEFAULT_TICK_INTERVAL;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "countdown")]
#[command(about = "A drift-free countdown timer served over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Milliseconds between timer ticks while running
    #[arg(
        long,
        default_value_t = DEFAULT_TICK_INTERVAL.as_millis() as u64,
        value_parser = clap::value_parser!(u64).range(1..=1000)
    )]
    pub tick_ms: u64,

    /// JSON file holding the persisted duration
    #[arg(short, long, default_value = "countdown-store.json")]
    pub store: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
