//! Parameters structure for RobotCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{RobotCtrlError, DEFAULT_LEG_SELECT_MAP};
use hw_if::NUM_LEGS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Robot control.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Params {
    // ---- GAIT ----
    /// Frequency of the control loop, written into the shared state for the kinematics engine.
    ///
    /// Units: hertz
    pub freq_hz: f64,

    /// Body speed used by the linear movement primitives.
    ///
    /// Units: units/second
    pub go_speed: f64,

    /// Rotation rate used by the turning primitives.
    ///
    /// Units: radians/second
    pub turn_speed_rads: f64,

    /// Maximum time to wait for the home pose.
    ///
    /// Units: seconds
    pub home_timeout_s: f64,

    // ---- BEHAVIOURS ----
    /// Distance walked by the offline and dancing scripted sequences.
    ///
    /// Units: units
    pub scripted_walk_dist: f64,

    /// Nominal duration of one dance hip pulse. The pulse is held for two thirds of it.
    ///
    /// Units: seconds
    pub dance_pulse_s: f64,

    /// Hip rotation of a dance pulse.
    ///
    /// Units: radians
    pub dance_hip_rot_rad: f64,

    /// Seed for the dance randomisation, or `None` to seed from entropy.
    pub dance_seed: Option<u64>,

    // ---- CALIBRATION ----
    /// Order in which the legs are visited when advancing the calibration selection.
    pub leg_select_map: [usize; NUM_LEGS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            freq_hz: hw_if::shared::DEFAULT_FREQ_HZ,
            go_speed: 3.0,
            turn_speed_rads: 0.5,
            home_timeout_s: 1.0,
            scripted_walk_dist: 5.0,
            dance_pulse_s: 0.5,
            dance_hip_rot_rad: super::ROT_TRIM_LIMIT_RAD,
            dance_seed: None,
            leg_select_map: DEFAULT_LEG_SELECT_MAP,
        }
    }
}

impl Params {
    /// Check the parameters are usable by the controller.
    pub fn validate(&self) -> Result<(), RobotCtrlError> {
        let positive = [
            ("freq_hz", self.freq_hz),
            ("go_speed", self.go_speed),
            ("turn_speed_rads", self.turn_speed_rads),
        ];

        for (name, value) in positive.iter() {
            if !(*value > 0.0) || !value.is_finite() {
                return Err(RobotCtrlError::InvalidParams(format!(
                    "{} must be a positive number, found {}",
                    name, value
                )));
            }
        }

        let durations = [
            ("home_timeout_s", self.home_timeout_s),
            ("dance_pulse_s", self.dance_pulse_s),
        ];

        for (name, value) in durations.iter() {
            if !(*value >= 0.0) || !value.is_finite() {
                return Err(RobotCtrlError::InvalidParams(format!(
                    "{} must be a finite, non-negative duration, found {}",
                    name, value
                )));
            }
        }

        let finite = [
            ("scripted_walk_dist", self.scripted_walk_dist),
            ("dance_hip_rot_rad", self.dance_hip_rot_rad),
        ];

        for (name, value) in finite.iter() {
            if !value.is_finite() {
                return Err(RobotCtrlError::InvalidParams(format!(
                    "{} must be finite, found {}",
                    name, value
                )));
            }
        }

        super::validate_leg_map(&self.leg_select_map)
    }
}
