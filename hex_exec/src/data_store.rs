//! # Data Store

use log::info;

use crate::robot_ctrl::{self, RobotMode};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Tick management
    /// Number of outer ticks already executed
    pub num_ticks: u64,

    /// Session elapsed time at the start of the tick
    pub session_time_s: f64,

    // RobotCtrl
    pub robot_ctrl_output: robot_ctrl::OutputData,
    pub robot_ctrl_status_rpt: robot_ctrl::StatusReport,

    /// Mode at the end of the previous tick
    pub prev_mode: RobotMode,

    // Monitoring counters
    /// Number of invalid touches ignored
    pub num_invalid_touches: u64,

    /// Number of calibration writes attempted
    pub num_calib_writes: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a tick.
    pub fn tick_start(&mut self) {
        self.robot_ctrl_status_rpt = robot_ctrl::StatusReport::default();

        self.session_time_s = util::session::get_elapsed_seconds();
    }

    /// Record the results of RobotCtrl processing, logging mode changes.
    pub fn record(&mut self, output: robot_ctrl::OutputData, report: robot_ctrl::StatusReport) {
        if output.mode != self.prev_mode {
            info!(
                "Tick {}: now in {:?} mode ({} cycles, {} overruns)",
                self.num_ticks, output.mode, report.cycles, report.overruns
            );
        }

        if report.invalid_touch {
            self.num_invalid_touches += 1;
        }

        self.prev_mode = output.mode;
        self.robot_ctrl_output = output;
        self.robot_ctrl_status_rpt = report;
    }

    /// Returns true if RobotCtrl ran a control cycle since the previous report.
    pub fn ran_cycle(&self, prev_cycles: u64) -> bool {
        self.robot_ctrl_status_rpt.cycles > prev_cycles
    }

    /// Perform actions required at the end of a tick.
    pub fn tick_end(&mut self) {
        self.num_ticks += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_record_tracks_mode_and_cycles() {
        let mut ds = DataStore::default();

        let report = robot_ctrl::StatusReport {
            mode: RobotMode::Walking,
            cycles: 3,
            ..Default::default()
        };
        let output = robot_ctrl::OutputData {
            mode: RobotMode::Walking,
            ..Default::default()
        };

        ds.record(output, report);
        ds.tick_end();

        assert_eq!(ds.prev_mode, RobotMode::Walking);
        assert!(ds.ran_cycle(2));
        assert!(!ds.ran_cycle(3));
        assert_eq!(ds.num_ticks, 1);
    }
}
