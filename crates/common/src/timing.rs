//! Timing for simulated mouse gestures.
//!
//! A click is a press, a hold of `down_up`, a release, and a settle pause
//! of `after_up` before the next input is issued.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default press-to-release hold.
pub const DEFAULT_CLICK_DELAY_MS: u64 = 70;

/// Delays applied around a single simulated click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickTiming {
    /// Hold between button down and button up (ms).
    pub down_up_ms: u64,

    /// Pause after button up (ms).
    pub after_up_ms: u64,
}

impl Default for ClickTiming {
    fn default() -> Self {
        Self {
            down_up_ms: DEFAULT_CLICK_DELAY_MS,
            after_up_ms: DEFAULT_CLICK_DELAY_MS / 2,
        }
    }
}

impl ClickTiming {
    pub fn down_up(&self) -> Duration {
        Duration::from_millis(self.down_up_ms)
    }

    pub fn after_up(&self) -> Duration {
        Duration::from_millis(self.after_up_ms)
    }

    /// Total wall time a click occupies.
    pub fn total(&self) -> Duration {
        self.down_up() + self.after_up()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_click_is_seventy_then_thirty_five() {
        let timing = ClickTiming::default();
        assert_eq!(timing.down_up(), Duration::from_millis(70));
        assert_eq!(timing.after_up(), Duration::from_millis(35));
        assert_eq!(timing.total(), Duration::from_millis(105));
    }

    #[test]
    fn partial_json_keeps_other_default() {
        let timing: ClickTiming = serde_json::from_str(r#"{"down_up_ms": 20}"#).unwrap();
        assert_eq!(timing.down_up(), Duration::from_millis(20));
        assert_eq!(timing.after_up(), Duration::from_millis(35));
    }
}
