//! Ambient CLI configuration — not persistence for device state (explicitly
//! out of scope), just the handful of knobs a human running the CLI wants to
//! override: the SCSI executor path, and HR10 daemon defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrccConfig {
    /// Override for the external raw-SCSI pass-through binary (default `sg_raw`).
    pub scsi_executor: Option<String>,
    /// HR10 daemon tick interval, in milliseconds. Never honoured below 1000ms.
    pub hr10_tick_interval_ms: u64,
    /// Consecutive sensor read failures before the HR10 daemon exits.
    pub hr10_failure_threshold: u32,
    pub hr10_breathing_enabled: bool,
    pub hr10_breathing_period_ms: u64,
}

impl Default for TrccConfig {
    fn default() -> Self {
        Self {
            scsi_executor: None,
            hr10_tick_interval_ms: 1000,
            hr10_failure_threshold: 10,
            hr10_breathing_enabled: false,
            hr10_breathing_period_ms: 2000,
        }
    }
}

impl TrccConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("trcc").join("config.toml"))
    }

    /// Loads the config file if present; falls back to defaults on any error
    /// (missing file, bad TOML), logging a warning so it's never silent.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("ignoring malformed config at {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let cfg = TrccConfig::default();
        assert_eq!(cfg.hr10_tick_interval_ms, 1000);
        assert_eq!(cfg.hr10_failure_threshold, 10);
        assert!(!cfg.hr10_breathing_enabled);
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = TrccConfig {
            scsi_executor: Some("/usr/bin/sg_raw".into()),
            hr10_tick_interval_ms: 2500,
            hr10_failure_threshold: 5,
            hr10_breathing_enabled: true,
            hr10_breathing_period_ms: 3000,
        };
        let text = toml::to_string(&cfg).unwrap();
        let parsed: TrccConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed: TrccConfig = toml::from_str("hr10_failure_threshold = 3\n").unwrap();
        assert_eq!(parsed.hr10_failure_threshold, 3);
        assert_eq!(parsed.hr10_tick_interval_ms, 1000);
    }
}
