//! # Hardware interface crate.
//!
//! Provides the interfaces between the hexapod's behavioural control layer and the equipment it
//! drives: the shared state context, touch patterns and the collaborator traits.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Shared state context lent by the controller to every collaborator
pub mod shared;

/// Touch pattern codes produced by the touch sensors
pub mod touch;

/// Collaborator interfaces for equipment (kinematics engine, touch hardware, calibration store)
pub mod eqpt;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of legs on the robot.
pub const NUM_LEGS: usize = 6;

/// Number of servo layers (joints) per leg.
pub const NUM_SERVO_LAYERS: usize = 3;

/// Total number of actuated joints.
pub const NUM_JOINTS: usize = NUM_LEGS * NUM_SERVO_LAYERS;

/// Number of pose trim axes (3 translation, 3 rotation).
pub const NUM_TRIMS: usize = 6;
