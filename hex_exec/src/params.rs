//! # Hexapod Executable Parameters
//!
//! This module provides parameters for the hexapod executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HexExecParams {
    /// Minimum level of log messages, one of `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,

    /// Level of the per-cycle control loop messages.
    pub cycle_log_level: String,

    /// Path to the touch script, relative to the software root. The script can also be given as
    /// the only command line argument, which takes precedence.
    pub touch_script: Option<String>,

    /// Stop the executable once the touch script has been fully consumed.
    pub stop_at_end_of_script: bool,

    /// Stop after this many outer ticks, or never if `None`.
    pub max_ticks: Option<u64>,

    /// Period of an outer tick in which the current mode runs no control cycle.
    ///
    /// Units: seconds
    pub idle_period_s: f64,

    /// Name of the file the calibration offsets are saved to, inside the session directory.
    pub calib_file: String,
}

impl Default for HexExecParams {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            cycle_log_level: "info".into(),
            touch_script: None,
            stop_at_end_of_script: true,
            max_ticks: None,
            idle_period_s: 0.02,
            calib_file: "calib_offsets.json".into(),
        }
    }
}
