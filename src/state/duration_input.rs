//! Configured countdown duration and the text input that edits it

use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// Countdown duration in whole seconds, always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetSeconds(NonZeroU32);

impl TargetSeconds {
    pub const DEFAULT: TargetSeconds = TargetSeconds(match NonZeroU32::new(5) {
        Some(secs) => secs,
        None => unreachable!(),
    });

    pub fn new(secs: u32) -> Option<Self> {
        NonZeroU32::new(secs).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn as_secs_f64(self) -> f64 {
        f64::from(self.0.get())
    }
}

impl Default for TargetSeconds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for TargetSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TargetSeconds {
    type Err = TimerError;

    /// Accepts a positive base-10 integer surrounded by optional whitespace
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimerError::InvalidDuration(raw.to_string()));
        }
        trimmed
            .parse::<NonZeroU32>()
            .map(Self)
            .map_err(|_| TimerError::InvalidDuration(raw.to_string()))
    }
}

/// Raw duration text as typed, plus the last value that parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationInput {
    raw: String,
    target: TargetSeconds,
}

impl DurationInput {
    pub fn new(initial: TargetSeconds) -> Self {
        Self {
            raw: initial.to_string(),
            target: initial,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn target_seconds(&self) -> TargetSeconds {
        self.target
    }

    /// Replace the raw text. The target only changes when the text parses;
    /// returns the new target if it did.
    pub fn set_raw(&mut self, raw: impl Into<String>) -> Result<TargetSeconds, TimerError> {
        self.raw = raw.into();
        let parsed = self.raw.parse::<TargetSeconds>()?;
        self.target = parsed;
        Ok(parsed)
    }

    pub fn has_parse_error(&self) -> bool {
        self.raw.trim() != self.target.to_string()
    }

    /// Rewrite malformed raw text to the last valid value. Returns whether
    /// anything changed.
    pub fn synchronize_if_malformed(&mut self) -> bool {
        let canonical = self.target.to_string();
        if self.raw != canonical {
            self.raw = canonical;
            true
        } else {
            false
        }
    }
}

impl Default for DurationInput {
    fn default() -> Self {
        Self::new(TargetSeconds::default())
    }
}
