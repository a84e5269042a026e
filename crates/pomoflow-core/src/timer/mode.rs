use serde::{Deserialize, Serialize};

/// The three phases a pomodoro cycle moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::ShortBreak => "shortBreak",
            TimerMode::LongBreak => "longBreak",
        }
    }

    /// Break that follows the `completed`-th finished work session.
    ///
    /// `completed` is the session counter after incrementing; an interval of
    /// zero is treated as one so every break is long rather than dividing by zero.
    pub fn break_after(completed: u32, long_break_interval: u32) -> TimerMode {
        if completed % long_break_interval.max(1) == 0 {
            TimerMode::LongBreak
        } else {
            TimerMode::ShortBreak
        }
    }
}

impl std::str::FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" | "focus" => Ok(TimerMode::Work),
            "shortBreak" | "short-break" | "short_break" | "short" => Ok(TimerMode::ShortBreak),
            "longBreak" | "long-break" | "long_break" | "long" => Ok(TimerMode::LongBreak),
            other => Err(format!("unknown timer mode: {other}")),
        }
    }
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
