//! Panel configuration parameters
//!
//! All tunable timing and path parameters for the quick panel.
//! Values can be overridden through the [`ConfigPort`](crate::app::ports::ConfigPort).

use serde::{Deserialize, Serialize};

/// Core panel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    // --- Confirmation polling ---
    /// Polls per confirmation job before it retires
    pub confirm_window_ticks: u8,
    /// Delay between confirmation polls (milliseconds)
    pub tick_interval_ms: u32,

    // --- Quick record ---
    /// Recording is stopped automatically after this long (milliseconds)
    pub record_auto_stop_ms: u32,
    /// JustRecorded falls back to Idle after this long (milliseconds)
    pub record_revert_ms: u32,
    /// Backing file for the quick recording
    pub quick_record_path: String,

    // --- Torch ---
    /// Delay between torch readiness checks (milliseconds)
    pub torch_confirm_interval_ms: u32,
    /// Readiness checks before the torch start is abandoned
    pub torch_confirm_attempts: u8,

    // --- Fast charge ---
    /// Sysfs-style node toggled by the fast-charge tile; `None` hides the tile
    pub fast_charge_path: Option<String>,
    /// Delay before the fast-charge tile re-reads the node (milliseconds)
    pub fast_charge_refresh_ms: u32,

    // --- Layout ---
    /// Columns per row when the setting is absent
    pub default_columns: u8,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            // Confirmation polling: 12 × 250 ms covers typical radio latency
            confirm_window_ticks: 12,
            tick_interval_ms: 250,

            // Quick record
            record_auto_stop_ms: 60_000,
            record_revert_ms: 2_000,
            quick_record_path: String::from("/sdcard/quickrecord.3gp"),

            // Torch
            torch_confirm_interval_ms: 100,
            torch_confirm_attempts: 30,

            // Fast charge
            fast_charge_path: None,
            fast_charge_refresh_ms: 250,

            // Layout
            default_columns: 3,
        }
    }
}

impl PanelConfig {
    /// Total confirmation window for one polled job (milliseconds).
    pub fn confirm_window_ms(&self) -> u64 {
        u64::from(self.confirm_window_ticks) * u64::from(self.tick_interval_ms)
    }
}
