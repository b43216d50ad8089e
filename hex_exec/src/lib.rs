//! # Hexapod library.
//!
//! This library allows other crates in the workspace (and the integration tests) to access items
//! defined inside the hexapod executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Robot control module - mode state machine, fixed-period control loop and movement primitives
pub mod robot_ctrl;

/// Calibration store - persists calibration offsets when the controller requests it
pub mod calib_store;

/// Data store - per-execution bookkeeping for the main loop
pub mod data_store;

/// Executable parameters
pub mod params;

/// Simulated collaborators - kinematics, touch hardware and store used without a robot attached
pub mod sim;
