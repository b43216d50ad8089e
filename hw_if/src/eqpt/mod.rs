//! # Equipment interfaces
//!
//! Traits implemented by the collaborators the behavioural controller drives. Every method that
//! reads or writes shared data takes the [`SharedState`](crate::shared::SharedState) context explicitly.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Body kinematics (gait solver) interface
pub mod body;

/// Touch hardware interface
pub mod touch;

/// Calibration offset store interface
pub mod store;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use body::*;
pub use store::*;
pub use touch::*;
