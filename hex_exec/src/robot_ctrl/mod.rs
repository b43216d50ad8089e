//! Robot control module
//!
//! The behavioural core of the hexapod. `RobotCtrl` owns the operating mode, the calibration
//! selection and the cycle clock, and drives the kinematics engine through the shared state.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calib;
mod cycle;
mod mode;
mod moves;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use calib::*;
pub use cycle::*;
pub use mode::*;
pub use moves::*;
pub use params::*;
pub use state::*;

use hw_if::touch::TouchPatternError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during RobotCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum RobotCtrlError {
    #[error("Could not load the RobotCtrl parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Invalid RobotCtrl parameters: {0}")]
    InvalidParams(String),

    #[error("The leg selection map {0:?} is not a permutation of the legs")]
    InvalidLegMap([usize; hw_if::NUM_LEGS]),

    #[error("Received an invalid touch: {0}")]
    InvalidTouch(#[from] TouchPatternError),
}
