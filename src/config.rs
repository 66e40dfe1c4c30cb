//! Host-level engine settings.
//!
//! Economy tuning (yields, care penalties, cost growth) lives as constants in
//! `economy::state`; this struct only holds what a host may reasonably change.

use serde::{Deserialize, Serialize};

/// localStorage key used when the host does not override it.
pub const DEFAULT_STORAGE_KEY: &str = "careful_tires_save";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Key the snapshot is stored under.
    pub storage_key: String,
    /// Nominal cadence of the tick loop in milliseconds.
    pub tick_interval_ms: f64,
    /// Seconds of simulated time between autosaves.
    pub autosave_interval_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            tick_interval_ms: 400.0,
            autosave_interval_secs: 5.0,
        }
    }
}
