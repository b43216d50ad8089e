//! Calibration offset store interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use thiserror::Error;

use crate::NUM_JOINTS;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while persisting calibration offsets.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("The calibration store is not available: {0}")]
    Unavailable(String),

    #[error("Could not write the calibration offsets: {0}")]
    WriteError(String),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Persistent storage for servo calibration offsets.
pub trait CalibStore {
    /// Persist the given offsets, indexed `leg * NUM_SERVO_LAYERS + layer`.
    fn store(&mut self, offsets: &[i8; NUM_JOINTS]) -> Result<(), StoreError>;
}
