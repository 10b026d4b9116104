//! Orchestrator configuration.
//!
//! Loaded from JSON (camelCase, partial files allowed — missing fields take
//! production defaults) and validated by clamping rather than rejecting, so
//! a bad value corrects itself with a warning instead of refusing to start.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tunable limits for the orchestration pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrchestratorSettings {
    /// Maximum accepted input length in characters (after trimming).
    pub max_input_length: usize,
    /// Requests allowed per user per window.
    pub requests_per_window: u32,
    /// Rate-limit window length in seconds.
    pub window_secs: u64,
    /// Context snapshot time-to-live in seconds.
    pub context_ttl_secs: u64,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_input_length: 2000,
            requests_per_window: 10,
            window_secs: 60,
            context_ttl_secs: 300,
        }
    }
}

impl OrchestratorSettings {
    /// Clamp zero or degenerate values up to workable minimums.
    pub fn validate(&mut self) {
        fn clamp_min<T: PartialOrd + Copy + std::fmt::Display>(val: &mut T, min: T, name: &str) {
            if *val < min {
                warn!("{name} too small ({val}), clamped to {min}");
                *val = min;
            }
        }

        clamp_min(&mut self.max_input_length, 1, "max_input_length");
        clamp_min(&mut self.requests_per_window, 1, "requests_per_window");
        clamp_min(&mut self.window_secs, 1, "window_secs");
        // TTL of zero is legal: it disables the context cache.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_production_values() {
        let settings = OrchestratorSettings::default();
        assert_eq!(settings.max_input_length, 2000);
        assert_eq!(settings.requests_per_window, 10);
        assert_eq!(settings.window_secs, 60);
        assert_eq!(settings.context_ttl_secs, 300);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: OrchestratorSettings =
            serde_json::from_str(r#"{"maxInputLength": 500}"#).unwrap();
        assert_eq!(settings.max_input_length, 500);
        assert_eq!(settings.requests_per_window, 10);
    }

    #[test]
    fn validate_clamps_zeroes() {
        let mut settings = OrchestratorSettings {
            max_input_length: 0,
            requests_per_window: 0,
            window_secs: 0,
            context_ttl_secs: 0,
        };
        settings.validate();
        assert_eq!(settings.max_input_length, 1);
        assert_eq!(settings.requests_per_window, 1);
        assert_eq!(settings.window_secs, 1);
        assert_eq!(settings.context_ttl_secs, 0);
    }
}
