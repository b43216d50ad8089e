//! # Shared state context
//!
//! The shared state is the only channel between the behavioural controller and its
//! collaborators. It is owned by the controller and lent (`&mut`) to a collaborator for the
//! duration of a call, so each field has a single writer at any one time:
//!
//! | Field                         | Writer                               |
//! |-------------------------------|--------------------------------------|
//! | `servo.servo_angles`          | Controller (once per tick)           |
//! | `servo.calibration_offsets`   | Controller (calibration mode)        |
//! | `servo.store`                 | Controller sets, store service clears|
//! | `move_ctrl.n_move`            | Controller sets, kinematics decrements |
//! | `move_ctrl.tr`                | Controller                           |
//! | `move_ctrl.speed/direction/turn_rate` | Controller                 |
//! | `move_ctrl.gait_id`           | Controller (offline mode)            |

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{NUM_JOINTS, NUM_TRIMS};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Index of the vertical translation trim in `MoveCtrl::tr`.
pub const TRIM_TRANS_Z: usize = 0;

/// Index of the lateral X translation trim in `MoveCtrl::tr`.
pub const TRIM_TRANS_X: usize = 1;

/// Index of the lateral Y translation trim in `MoveCtrl::tr`.
pub const TRIM_TRANS_Y: usize = 2;

/// Index of the Z axis (yaw) rotation trim in `MoveCtrl::tr`.
pub const TRIM_ROT_Z: usize = 3;

/// Index of the X axis tilt trim in `MoveCtrl::tr`.
pub const TRIM_ROT_X: usize = 4;

/// Index of the Y axis tilt trim in `MoveCtrl::tr`.
pub const TRIM_ROT_Y: usize = 5;

/// Default vertical translation trim, centre of its allowed range.
pub const DEFAULT_TRANS_Z: f64 = 4.0;

/// Default control frequency.
///
/// Units: hertz
pub const DEFAULT_FREQ_HZ: f64 = 50.0;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Process-wide state shared between the controller and its collaborators.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SharedState {
    pub servo: ServoCtrl,
    pub move_ctrl: MoveCtrl,
    pub param: CtrlParam,
}

/// Servo actuation state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServoCtrl {
    /// Actuation targets published by the control loop, one per joint, indexed
    /// `leg * NUM_SERVO_LAYERS + layer`.
    ///
    /// Units: radians
    pub servo_angles: [f64; NUM_JOINTS],

    /// Per-joint calibration offsets, indexed like `servo_angles`.
    ///
    /// Range: [-100, 100]
    pub calibration_offsets: [i8; NUM_JOINTS],

    /// One-shot request for the calibration store to persist `calibration_offsets`.
    pub store: bool,

    /// Servo power enable.
    pub power: bool,
}

/// Movement control state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoveCtrl {
    /// Body speed.
    ///
    /// Units: units/second
    pub speed: f64,

    /// Direction of travel in the body frame, `PI/2` is forward.
    ///
    /// Units: radians
    pub direction: f64,

    /// Rotation rate about the body centre.
    ///
    /// Units: radians/second
    pub turn_rate: f64,

    /// Number of gait cycles remaining in the current movement. Decremented by the kinematics
    /// engine.
    pub n_move: u32,

    /// Pose trims, see the `TRIM_*` index constants.
    pub tr: [f64; NUM_TRIMS],

    /// Selected gait sequence.
    pub gait_id: u8,
}

/// Control parameters shared with the kinematics engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CtrlParam {
    /// Control frequency.
    ///
    /// Units: hertz
    pub freq: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for MoveCtrl {
    fn default() -> Self {
        let mut tr = [0.0; NUM_TRIMS];
        tr[TRIM_TRANS_Z] = DEFAULT_TRANS_Z;

        Self {
            speed: 0.0,
            direction: 0.0,
            turn_rate: 0.0,
            n_move: 0,
            tr,
            gait_id: 1,
        }
    }
}

impl Default for CtrlParam {
    fn default() -> Self {
        Self {
            freq: DEFAULT_FREQ_HZ,
        }
    }
}

impl ServoCtrl {
    /// Return the calibration offset of the given leg and servo layer.
    pub fn offset(&self, leg: usize, layer: usize) -> i8 {
        self.calibration_offsets[joint_index(leg, layer)]
    }

    /// Return a mutable reference to the calibration offset of the given leg and servo layer.
    pub fn offset_mut(&mut self, leg: usize, layer: usize) -> &mut i8 {
        &mut self.calibration_offsets[joint_index(leg, layer)]
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Flat joint index of a leg and servo layer.
pub fn joint_index(leg: usize, layer: usize) -> usize {
    leg * crate::NUM_SERVO_LAYERS + layer
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let state = SharedState::default();

        assert_eq!(state.move_ctrl.tr, [DEFAULT_TRANS_Z, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(state.move_ctrl.n_move, 0);
        assert!(!state.servo.store);
        assert!(state.servo.calibration_offsets.iter().all(|o| *o == 0));
    }

    #[test]
    fn test_offset_indexing() {
        let mut servo = ServoCtrl::default();
        *servo.offset_mut(4, 2) = -30;

        assert_eq!(servo.calibration_offsets[14], -30);
        assert_eq!(servo.offset(4, 2), -30);
        assert_eq!(joint_index(5, 2), crate::NUM_JOINTS - 1);
    }
}
