//! Simulated calibration store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use hw_if::{
    eqpt::{CalibStore, StoreError},
    NUM_JOINTS,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// In-memory calibration store which records every write.
#[derive(Debug, Default)]
pub struct SimCalibStore {
    writes: Vec<[i8; NUM_JOINTS]>,
    fail: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimCalibStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a store which rejects every write.
    pub fn failing() -> Self {
        Self {
            writes: Vec::new(),
            fail: true,
        }
    }

    /// All offsets written so far, oldest first.
    pub fn writes(&self) -> &[[i8; NUM_JOINTS]] {
        &self.writes
    }
}

impl CalibStore for SimCalibStore {
    fn store(&mut self, offsets: &[i8; NUM_JOINTS]) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Unavailable("simulated store failure".into()));
        }

        self.writes.push(*offsets);
        Ok(())
    }
}
