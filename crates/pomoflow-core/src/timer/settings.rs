use serde::{Deserialize, Serialize};

use super::mode::TimerMode;
use crate::error::ConfigError;

/// Timer preferences. Read-only to the timer; always passed in explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_work_duration")]
    pub work_duration_minutes: u32,
    #[serde(default = "default_short_break")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break")]
    pub long_break_minutes: u32,
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub flow_mode_enabled: bool,
}

fn default_work_duration() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_duration_minutes: default_work_duration(),
            short_break_minutes: default_short_break(),
            long_break_minutes: default_long_break(),
            long_break_interval: default_long_break_interval(),
            auto_start_breaks: false,
            sound_enabled: true,
            notifications_enabled: true,
            flow_mode_enabled: false,
        }
    }
}

impl TimerSettings {
    /// Configured length of `mode` in seconds.
    pub fn duration_secs(&self, mode: TimerMode) -> u64 {
        let minutes = match mode {
            TimerMode::Work => self.work_duration_minutes,
            TimerMode::ShortBreak => self.short_break_minutes,
            TimerMode::LongBreak => self.long_break_minutes,
        };
        u64::from(minutes).saturating_mul(60)
    }

    /// Whether a run in `mode` counts up instead of down.
    pub fn is_flow(&self, mode: TimerMode) -> bool {
        self.flow_mode_enabled && mode == TimerMode::Work
    }

    /// Reject values the timer cannot work with.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("timer.work_duration_minutes", self.work_duration_minutes),
            ("timer.short_break_minutes", self.short_break_minutes),
            ("timer.long_break_minutes", self.long_break_minutes),
            ("timer.long_break_interval", self.long_break_interval),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be a positive integer".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Configured length of `mode` in seconds.
pub fn duration_secs(mode: TimerMode, settings: &TimerSettings) -> u64 {
    settings.duration_secs(mode)
}
