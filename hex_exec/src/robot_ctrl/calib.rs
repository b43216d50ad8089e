//! Servo calibration selection and offset adjustment

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::Serialize;

use super::RobotCtrlError;
use hw_if::{shared::ServoCtrl, NUM_LEGS, NUM_SERVO_LAYERS};
use util::maths;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default traversal order of the legs during calibration: down the left side then back up the
/// right side, so consecutive selections are physically adjacent.
pub const DEFAULT_LEG_SELECT_MAP: [usize; NUM_LEGS] = [0, 1, 2, 5, 4, 3];

/// Change applied to a calibration offset by one adjustment.
pub const OFFSET_STEP: i8 = 10;

/// Lowest allowed calibration offset.
pub const OFFSET_MIN: i8 = -100;

/// Highest allowed calibration offset.
pub const OFFSET_MAX: i8 = 100;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The servo currently selected for calibration.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CalibSelection {
    counter: usize,
    leg: usize,
    layer: usize,
    leg_map: [usize; NUM_LEGS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CalibSelection {
    /// Create a selection starting at the first leg of `leg_map`, bottom servo layer.
    ///
    /// `leg_map` must have been checked with [`validate_leg_map`].
    pub fn new(leg_map: [usize; NUM_LEGS]) -> Self {
        Self {
            counter: 0,
            leg: leg_map[0],
            layer: 0,
            leg_map,
        }
    }

    /// Physical index of the selected leg.
    pub fn leg(&self) -> usize {
        self.leg
    }

    /// Selected servo layer.
    pub fn layer(&self) -> usize {
        self.layer
    }

    /// Position of the selected leg in the traversal order.
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Move to the next leg in the traversal order, returning the new leg.
    pub fn advance_leg(&mut self) -> usize {
        self.counter = (self.counter + 1) % NUM_LEGS;
        self.leg = self.leg_map[self.counter];
        self.leg
    }

    /// Move to the next servo layer, returning the new layer.
    pub fn advance_layer(&mut self) -> usize {
        self.layer = (self.layer + 1) % NUM_SERVO_LAYERS;
        self.layer
    }

    /// Step the selected servo's calibration offset, saturating into
    /// `[OFFSET_MIN, OFFSET_MAX]`. Returns the new offset.
    pub fn adjust_offset(&self, servo: &mut ServoCtrl, step: i8) -> i8 {
        let offset = servo.offset_mut(self.leg, self.layer);
        *offset = maths::saturating_step(*offset, step, OFFSET_MIN, OFFSET_MAX);
        let new_offset = *offset;

        debug!("Calibration offsets: {:?}", servo.calibration_offsets);
        debug!(
            "Leg {} layer {} offset {} (servo byte {:.1})",
            self.leg,
            self.layer,
            new_offset,
            offset_to_servo_byte(new_offset)
        );

        new_offset
    }
}

impl Default for CalibSelection {
    fn default() -> Self {
        Self::new(DEFAULT_LEG_SELECT_MAP)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that a leg selection map visits every leg exactly once.
pub fn validate_leg_map(leg_map: &[usize; NUM_LEGS]) -> Result<(), RobotCtrlError> {
    let mut seen = [false; NUM_LEGS];

    for leg in leg_map.iter() {
        match seen.get_mut(*leg) {
            Some(s) if !*s => *s = true,
            _ => return Err(RobotCtrlError::InvalidLegMap(*leg_map)),
        }
    }

    Ok(())
}

/// Map a calibration offset onto the byte range the servo driver stores it in.
pub fn offset_to_servo_byte(offset: i8) -> f64 {
    maths::lin_map(
        (OFFSET_MIN as f64, OFFSET_MAX as f64),
        (0.0, 255.0),
        offset as f64,
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_leg_traversal_visits_all_legs() {
        for start in 0..NUM_LEGS {
            let mut sel = CalibSelection::default();
            for _ in 0..start {
                sel.advance_leg();
            }
            let start_leg = sel.leg();

            let mut visited = [0usize; NUM_LEGS];
            for _ in 0..NUM_LEGS {
                visited[sel.advance_leg()] += 1;
            }

            assert_eq!(sel.leg(), start_leg);
            assert!(visited.iter().all(|v| *v == 1));
        }
    }

    #[test]
    fn test_traversal_follows_map() {
        let mut sel = CalibSelection::new([3, 0, 4, 1, 5, 2]);

        assert_eq!(sel.leg(), 3);
        assert_eq!(sel.advance_leg(), 0);
        assert_eq!(sel.advance_leg(), 4);
        assert_eq!(sel.counter(), 2);
    }

    #[test]
    fn test_layer_wraps() {
        let mut sel = CalibSelection::default();

        assert_eq!(sel.advance_layer(), 1);
        assert_eq!(sel.advance_layer(), 2);
        assert_eq!(sel.advance_layer(), 0);
    }

    #[test]
    fn test_offset_saturates() {
        let sel = CalibSelection::default();
        let mut servo = ServoCtrl::default();

        for _ in 0..15 {
            sel.adjust_offset(&mut servo, OFFSET_STEP);
            assert!(servo.offset(sel.leg(), sel.layer()) <= OFFSET_MAX);
        }
        assert_eq!(servo.offset(sel.leg(), sel.layer()), OFFSET_MAX);

        for _ in 0..25 {
            sel.adjust_offset(&mut servo, -OFFSET_STEP);
            assert!(servo.offset(sel.leg(), sel.layer()) >= OFFSET_MIN);
        }
        assert_eq!(servo.offset(sel.leg(), sel.layer()), OFFSET_MIN);
    }

    #[test]
    fn test_validate_leg_map() {
        assert!(validate_leg_map(&DEFAULT_LEG_SELECT_MAP).is_ok());
        assert!(validate_leg_map(&[0, 1, 2, 3, 4, 6]).is_err());
        assert!(validate_leg_map(&[0, 0, 2, 3, 4, 5]).is_err());
    }

    #[test]
    fn test_offset_to_servo_byte() {
        assert_eq!(offset_to_servo_byte(OFFSET_MIN), 0.0);
        assert_eq!(offset_to_servo_byte(OFFSET_MAX), 255.0);
    }
}
