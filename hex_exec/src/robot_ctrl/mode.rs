//! Operating modes and the touch-driven mode transition table

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{LATERAL_TRIM_STEP, OFFSET_STEP};
use hw_if::{eqpt::LinMode, touch::TouchPattern};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of operating modes.
pub const NUM_MODES: usize = 7;

/// Gait sequence used while in offline mode.
pub const OFFLINE_GAIT_ID: u8 = 3;

/// Decrease, or negative hip flag.
const CODE_DECREMENT: u8 = 1;

/// Advance: next mode, or next leg in calibration.
const CODE_ADVANCE: u8 = 2;

/// Next servo layer in calibration.
const CODE_LAYER: u8 = 3;

/// Increase, or positive hip flag.
const CODE_INCREMENT: u8 = 4;

/// Enter or leave calibration.
const CODE_SWITCH: u8 = 5;

/// Next servo layer in calibration.
const CODE_LAYER_ALT: u8 = 6;

/// Reset all calibration offsets.
const CODE_RESET: u8 = 7;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Operating mode of the robot.
///
/// The discriminants define the cycling order used by the advance code.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum RobotMode {
    /// Gate between calibration and the rest of the modes, no actuation.
    PreCalibration = 0,
    /// Servo calibration offsets are adjusted.
    Calibration = 1,
    /// Free walking, the gait is driven by the shared movement parameters.
    Walking = 2,
    /// Scripted walk then home.
    Offline = 3,
    /// Randomised hip dance.
    Dancing = 4,
    /// Reset to the home pose.
    Random = 5,
    /// Gripper mode, transitions only.
    Grip = 6,
}

/// Transient direction flag set by touches in the scripted modes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum HipMode {
    Negative,
    Neutral,
    Positive,
}

/// A side effect requested by a mode transition, applied by the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intent {
    /// Step the selected calibration offset.
    AdjustOffset(i8),
    /// Select the next servo layer and nudge it.
    AdvanceServoLayer,
    /// Select the next leg in the traversal order.
    AdvanceLeg,
    /// Ask the calibration store to persist the offsets.
    RequestStore,
    /// Change the kinematics linearisation mode.
    SetLinMode(LinMode),
    /// Step the lateral translation trim.
    AdjustLateralTrim(f64),
    /// Set the hip flag.
    SetHip(HipMode),
    /// Zero the lateral trim and switch to the offline gait.
    SelectOfflineGait,
    /// Reset all calibration offsets (reserved).
    ResetOffsets,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of applying a touch to a mode.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// The mode after the touch.
    pub next: RobotMode,

    /// Side effects to apply, in order.
    pub intents: Vec<Intent>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotMode {
    /// All modes in cycling order.
    pub const ALL: [RobotMode; NUM_MODES] = [
        RobotMode::PreCalibration,
        RobotMode::Calibration,
        RobotMode::Walking,
        RobotMode::Offline,
        RobotMode::Dancing,
        RobotMode::Random,
        RobotMode::Grip,
    ];

    /// Position of the mode in the cycling order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The mode following this one in the cycling order.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % NUM_MODES]
    }
}

impl Default for RobotMode {
    fn default() -> Self {
        RobotMode::PreCalibration
    }
}

impl HipMode {
    /// Signed value of the flag.
    pub fn value(self) -> i8 {
        match self {
            HipMode::Negative => -1,
            HipMode::Neutral => 0,
            HipMode::Positive => 1,
        }
    }
}

impl Default for HipMode {
    fn default() -> Self {
        HipMode::Neutral
    }
}

impl Transition {
    fn to(next: RobotMode) -> Self {
        Self {
            next,
            intents: Vec::new(),
        }
    }

    fn with(mut self, intent: Intent) -> Self {
        self.intents.push(intent);
        self
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the transition caused by a touch in the given mode.
///
/// This is a pure function of `(mode, touch)`; the returned intents are applied by the
/// controller. Codes with no meaning in a mode leave it unchanged with no intents.
pub fn transition(mode: RobotMode, touch: TouchPattern) -> Transition {
    let code = touch.code();

    match mode {
        RobotMode::PreCalibration => match code {
            CODE_SWITCH => Transition::to(RobotMode::Calibration),
            _ => Transition::to(RobotMode::Walking),
        },

        RobotMode::Calibration => match code {
            CODE_DECREMENT => Transition::to(mode).with(Intent::AdjustOffset(-OFFSET_STEP)),
            CODE_INCREMENT => Transition::to(mode).with(Intent::AdjustOffset(OFFSET_STEP)),
            CODE_LAYER | CODE_LAYER_ALT => Transition::to(mode).with(Intent::AdvanceServoLayer),
            CODE_ADVANCE => Transition::to(mode).with(Intent::AdvanceLeg),
            CODE_SWITCH => Transition::to(RobotMode::Walking)
                .with(Intent::RequestStore)
                .with(Intent::SetLinMode(LinMode::Off)),
            CODE_RESET => Transition::to(mode).with(Intent::ResetOffsets),
            _ => Transition::to(mode),
        },

        RobotMode::Walking => match code {
            CODE_DECREMENT => {
                Transition::to(mode).with(Intent::AdjustLateralTrim(-LATERAL_TRIM_STEP))
            }
            CODE_INCREMENT => {
                Transition::to(mode).with(Intent::AdjustLateralTrim(LATERAL_TRIM_STEP))
            }
            _ => cycle_or_gate(mode, code),
        },

        RobotMode::Offline => {
            // Any touch in offline mode reselects the offline gait first
            let mut t = hip_mode_transition(mode, code);
            t.intents.insert(0, Intent::SelectOfflineGait);
            t
        }

        RobotMode::Dancing | RobotMode::Random | RobotMode::Grip => {
            hip_mode_transition(mode, code)
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Transitions shared by the scripted modes.
fn hip_mode_transition(mode: RobotMode, code: u8) -> Transition {
    match code {
        CODE_DECREMENT => Transition::to(mode).with(Intent::SetHip(HipMode::Negative)),
        CODE_INCREMENT => Transition::to(mode).with(Intent::SetHip(HipMode::Positive)),
        _ => cycle_or_gate(mode, code),
    }
}

/// Advance to the next mode or return to the calibration gate.
fn cycle_or_gate(mode: RobotMode, code: u8) -> Transition {
    match code {
        CODE_ADVANCE => Transition::to(mode.next()),
        CODE_SWITCH => Transition::to(RobotMode::PreCalibration),
        _ => Transition::to(mode),
    }
}
