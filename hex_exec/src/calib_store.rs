//! # Calibration persistence
//!
//! The controller only raises the `servo.store` flag. This module services the flag once per
//! outer tick by handing the offsets to a [`CalibStore`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};
use std::path::PathBuf;

use hw_if::{
    eqpt::{CalibStore, StoreError},
    shared::SharedState,
    NUM_JOINTS,
};
use util::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Calibration store which saves the offsets as JSON into the session directory.
pub struct SessionCalibStore {
    session: Session,
    file_name: PathBuf,
    num_writes: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SessionCalibStore {
    /// Create a new store writing to `file_name` inside the session directory.
    ///
    /// Each write gets its own file, the write number being appended to the file stem.
    pub fn new<P: Into<PathBuf>>(session: &Session, file_name: P) -> Self {
        Self {
            session: session.clone(),
            file_name: file_name.into(),
            num_writes: 0,
        }
    }

    pub fn num_writes(&self) -> usize {
        self.num_writes
    }
}

impl CalibStore for SessionCalibStore {
    fn store(&mut self, offsets: &[i8; NUM_JOINTS]) -> Result<(), StoreError> {
        if !self.session.session_root.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "session directory {:?} does not exist",
                self.session.session_root
            )));
        }

        let path =
            util::session::timestamped_path(&self.file_name, &format!("{:03}", self.num_writes));
        self.session.save(path, offsets.to_vec());
        self.num_writes += 1;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Persist the calibration offsets if a store has been requested.
///
/// The request flag is cleared whether or not the write succeeds, a failed write is only
/// logged. Returns true if a write was attempted.
pub fn service_store_request<S: CalibStore>(shared: &mut SharedState, store: &mut S) -> bool {
    if !shared.servo.store {
        return false;
    }

    match store.store(&shared.servo.calibration_offsets) {
        Ok(()) => info!(
            "Calibration offsets stored: {:?}",
            shared.servo.calibration_offsets
        ),
        Err(e) => warn!("Could not store the calibration offsets: {}", e),
    }

    shared.servo.store = false;

    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::SimCalibStore;

    #[test]
    fn test_no_request_no_write() {
        let mut shared = SharedState::default();
        let mut store = SimCalibStore::new();

        assert!(!service_store_request(&mut shared, &mut store));
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_request_is_one_shot() {
        let mut shared = SharedState::default();
        let mut store = SimCalibStore::new();

        shared.servo.calibration_offsets[3] = 40;
        shared.servo.store = true;

        assert!(service_store_request(&mut shared, &mut store));
        assert!(!shared.servo.store);
        assert_eq!(store.writes().len(), 1);
        assert_eq!(store.writes()[0][3], 40);

        assert!(!service_store_request(&mut shared, &mut store));
        assert_eq!(store.writes().len(), 1);
    }

    #[test]
    fn test_failed_write_clears_request() {
        let mut shared = SharedState::default();
        let mut store = SimCalibStore::failing();
        shared.servo.store = true;

        assert!(service_store_request(&mut shared, &mut store));
        assert!(!shared.servo.store);
    }
}
