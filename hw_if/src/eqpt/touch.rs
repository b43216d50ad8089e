//! Touch hardware interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::touch::{TouchPattern, TouchPatternError};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The touch sensing hardware.
pub trait HardwareIo {
    /// Sample the touch sensors.
    fn poll_touch(&mut self);

    /// Returns true if a touch gesture has been detected since it was last consumed.
    fn touch_detected(&self) -> bool;

    /// Decode the detected gesture into a touch pattern.
    ///
    /// If `consume` is true the detection is cleared so the same gesture is not reported twice.
    fn decode_touch_pattern(&mut self, consume: bool) -> Result<TouchPattern, TouchPatternError>;
}
