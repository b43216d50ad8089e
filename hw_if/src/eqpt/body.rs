//! Body kinematics interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{shared::SharedState, NUM_JOINTS};

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Linearisation mode of the kinematics engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum LinMode {
    /// Normal gait operation.
    Off,

    /// Legs are held in a fixed, linear reference pose so that servo calibration offsets can be
    /// judged by eye.
    Permanent,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The kinematics engine which turns movement parameters into joint angles.
pub trait BodyKinematics {
    /// Advance the kinematics by one step.
    ///
    /// The engine consumes `shared.move_ctrl` and shall decrement `shared.move_ctrl.n_move` by one
    /// for each completed gait cycle while it is non-zero.
    fn run(&mut self, shared: &mut SharedState);

    /// Flatten the computed joint angles into an actuation buffer.
    ///
    /// Units: radians
    fn pack_targets(&self) -> [f64; NUM_JOINTS];

    /// Notify the engine of the movement parameters for the next movement.
    ///
    /// The same values have already been written into `shared.move_ctrl` by the controller.
    ///
    /// ## Arguments
    /// - `speed` - body speed in units/second
    /// - `direction` - direction of travel in radians, `PI/2` is forward
    /// - `turn_rate` - rotation rate in radians/second
    /// - `n_move` - number of gait cycles the movement lasts
    fn set_move_param(&mut self, speed: f64, direction: f64, turn_rate: f64, n_move: u32);

    /// Set the linearisation mode.
    fn set_lin_mode(&mut self, mode: LinMode);

    /// Select the gait sequence with the given ID.
    fn select_gait(&mut self, gait_id: u8);

    /// Returns true if the body has reached the home pose.
    fn check_home_reached(&self) -> bool;

    /// Duration of one kinematic cycle.
    fn cycle_duration(&self) -> Duration;
}
