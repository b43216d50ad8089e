//! # Simulated equipment
//!
//! Stand-ins for the kinematics engine, the touch hardware and the calibration store, used by the
//! executable when no robot is attached and by the tests.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod body;
mod store;
mod touch;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use body::*;
pub use store::*;
pub use touch::*;
