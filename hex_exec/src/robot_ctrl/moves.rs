//! Movement primitives
//!
//! Distance and angle requests are converted into a number of gait cycles, handed to the
//! kinematics engine, and then executed by ticking the control loop until the engine has counted
//! the step counter down to zero.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use std::f64::consts::{FRAC_PI_2, PI};
use std::time::Duration;

use super::RobotCtrl;
use hw_if::{
    eqpt::{BodyKinematics, HardwareIo},
    shared::{
        TRIM_ROT_X, TRIM_ROT_Y, TRIM_ROT_Z, TRIM_TRANS_X, TRIM_TRANS_Y, TRIM_TRANS_Z,
    },
};
use util::{
    maths::saturate,
    time::{secs_to_duration, Clock},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Empirical correction for the distance lost to gait drift on linear walks.
pub const LINEAR_DRIFT_CORRECTION: f64 = 1.08;

/// Empirical correction for the angle lost to gait drift on turns.
pub const ROTATIONAL_DRIFT_CORRECTION: f64 = 1.15;

/// Limit of the rotation trims.
///
/// Units: radians
pub const ROT_TRIM_LIMIT_RAD: f64 = 0.15;

/// Range of the vertical translation trim.
pub const TRANS_Z_RANGE: (f64, f64) = (1.0, 7.0);

/// Limit of the lateral translation trims when set as a pose.
pub const TRANS_XY_LIMIT: f64 = 2.0;

/// Change applied to the lateral trim by one walking-mode touch.
pub const LATERAL_TRIM_STEP: f64 = 3.0;

/// Limit of the lateral trim when adjusted by touch in walking mode.
pub const LATERAL_TRIM_LIMIT: f64 = 3.0;

/// Direction of travel for a forward walk.
const DIR_FORWARD: f64 = FRAC_PI_2;

/// Direction of travel for a backward walk.
const DIR_BACKWARD: f64 = -FRAC_PI_2;

/// Direction of travel for a walk to the left.
const DIR_LEFT: f64 = PI;

/// Direction of travel for a walk to the right.
const DIR_RIGHT: f64 = 0.0;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<B, H, C> RobotCtrl<B, H, C>
where
    B: BodyKinematics,
    H: HardwareIo,
    C: Clock,
{
    /// Walk forward by `distance` units and block until done.
    pub fn walk_forward(&mut self, distance: f64) {
        self.walk(distance, DIR_FORWARD);
    }

    /// Walk backward by `distance` units and block until done.
    pub fn walk_backward(&mut self, distance: f64) {
        self.walk(distance, DIR_BACKWARD);
    }

    /// Walk left by `distance` units and block until done.
    pub fn walk_left(&mut self, distance: f64) {
        self.walk(distance, DIR_LEFT);
    }

    /// Walk right by `distance` units and block until done.
    pub fn walk_right(&mut self, distance: f64) {
        self.walk(distance, DIR_RIGHT);
    }

    /// Turn left on the spot by `angle_deg` degrees and block until done.
    pub fn turn_left(&mut self, angle_deg: f64) {
        self.turn(angle_deg, -self.params.turn_speed_rads);
    }

    /// Turn right on the spot by `angle_deg` degrees and block until done.
    pub fn turn_right(&mut self, angle_deg: f64) {
        self.turn(angle_deg, self.params.turn_speed_rads);
    }

    /// Number of gait cycles needed to walk `distance` units.
    pub fn linear_steps(&self, distance: f64) -> u32 {
        let corrected = distance * LINEAR_DRIFT_CORRECTION;
        (corrected / self.params.go_speed * self.shared.param.freq).abs() as u32
    }

    /// Number of gait cycles needed to turn `angle_deg` degrees.
    pub fn rotational_steps(&self, angle_deg: f64) -> u32 {
        let corrected_rad = (angle_deg * ROTATIONAL_DRIFT_CORRECTION).to_radians();
        (corrected_rad / self.params.turn_speed_rads * self.shared.param.freq).abs() as u32
    }

    /// Return to the home pose, giving up after `timeout`.
    ///
    /// Any movement in progress is cancelled. One extra tick is always run after the wait so the
    /// pose settles, and no tick is started that would end after the timeout. A timeout too long
    /// to represent waits for the home pose without limit.
    pub fn go_home(&mut self, timeout: Duration) {
        let deadline = self.cycle.now().checked_add(timeout);

        loop {
            self.shared.move_ctrl.n_move = 0;

            if self.body.check_home_reached() || self.tick_ends_after(deadline) {
                break;
            }

            self.tick();
        }

        self.tick();
    }

    /// Return to the home pose using the configured timeout.
    pub fn go_home_default(&mut self) {
        self.go_home(secs_to_duration(self.params.home_timeout_s));
    }

    /// Set the body tilt trims, each saturated to `±ROT_TRIM_LIMIT_RAD`.
    pub fn set_rotation(&mut self, x_tilt: f64, y_tilt: f64, z_tilt: f64) {
        let tr = &mut self.shared.move_ctrl.tr;
        tr[TRIM_ROT_Z] = saturate(z_tilt, -ROT_TRIM_LIMIT_RAD, ROT_TRIM_LIMIT_RAD);
        tr[TRIM_ROT_X] = saturate(x_tilt, -ROT_TRIM_LIMIT_RAD, ROT_TRIM_LIMIT_RAD);
        tr[TRIM_ROT_Y] = saturate(y_tilt, -ROT_TRIM_LIMIT_RAD, ROT_TRIM_LIMIT_RAD);
    }

    /// Set the body translation trims.
    ///
    /// `z` is saturated into `TRANS_Z_RANGE`, `x` and `y` to `±TRANS_XY_LIMIT`.
    pub fn set_translation(&mut self, x: f64, y: f64, z: f64) {
        let tr = &mut self.shared.move_ctrl.tr;
        tr[TRIM_TRANS_Z] = saturate(z, TRANS_Z_RANGE.0, TRANS_Z_RANGE.1);
        tr[TRIM_TRANS_X] = saturate(x, -TRANS_XY_LIMIT, TRANS_XY_LIMIT);
        tr[TRIM_TRANS_Y] = saturate(y, -TRANS_XY_LIMIT, TRANS_XY_LIMIT);
    }

    /// Zero all trims except the vertical translation.
    pub fn reset_pose(&mut self) {
        let z = self.shared.move_ctrl.tr[TRIM_TRANS_Z];

        self.set_rotation(0.0, 0.0, 0.0);
        self.set_translation(0.0, 0.0, z);
    }

    /// Swing the hips to `angle` with the given lateral translation and hold the pose for two
    /// thirds of `time_s`. A negative or NaN `time_s` holds for no time.
    pub fn dance_hip(&mut self, angle: f64, translation: f64, time_s: f64) {
        let tr = &mut self.shared.move_ctrl.tr;
        tr[TRIM_ROT_Z] = saturate(angle, -ROT_TRIM_LIMIT_RAD, ROT_TRIM_LIMIT_RAD);
        tr[TRIM_TRANS_X] = saturate(translation, -TRANS_XY_LIMIT, TRANS_XY_LIMIT);

        let hold = secs_to_duration(time_s * 2.0 / 3.0);
        debug!(
            "Dance hip {:+.2} rad held for {:.3} s",
            angle,
            hold.as_secs_f64()
        );

        self.hold(hold);
    }

    /// Step the lateral trim used while walking, saturating to `±LATERAL_TRIM_LIMIT`.
    pub(crate) fn adjust_lateral_trim(&mut self, step: f64) -> f64 {
        let trim = &mut self.shared.move_ctrl.tr[TRIM_TRANS_Y];
        *trim = saturate(*trim + step, -LATERAL_TRIM_LIMIT, LATERAL_TRIM_LIMIT);
        *trim
    }

    fn walk(&mut self, distance: f64, direction: f64) {
        let n_move = self.linear_steps(distance);
        self.set_move(self.params.go_speed, direction, 0.0, n_move);
        self.loop_move();
    }

    fn turn(&mut self, angle_deg: f64, turn_rate: f64) {
        let n_move = self.rotational_steps(angle_deg);
        self.set_move(0.0, 0.0, turn_rate, n_move);
        self.loop_move();
    }

    /// Write the movement parameters into the shared state and notify the kinematics.
    fn set_move(&mut self, speed: f64, direction: f64, turn_rate: f64, n_move: u32) {
        debug!(
            "Move: speed {:.2}, direction {:.3} rad, turn rate {:.3} rad/s, {} cycles",
            speed, direction, turn_rate, n_move
        );

        let mc = &mut self.shared.move_ctrl;
        mc.speed = speed;
        mc.direction = direction;
        mc.turn_rate = turn_rate;
        mc.n_move = n_move;

        self.body.set_move_param(speed, direction, turn_rate, n_move);
    }

    /// Tick until the kinematics has exhausted the step counter.
    fn loop_move(&mut self) {
        while self.shared.move_ctrl.n_move > 0 {
            self.tick();
        }
    }
}
