//! Simulated body kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::Serialize;
use std::time::Duration;

use hw_if::{
    eqpt::{BodyKinematics, LinMode},
    shared::{
        joint_index, SharedState, TRIM_ROT_X, TRIM_ROT_Y, TRIM_ROT_Z, TRIM_TRANS_X, TRIM_TRANS_Y,
        TRIM_TRANS_Z,
    },
    NUM_JOINTS, NUM_LEGS,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of cycles the body takes to settle into the home pose after a movement.
pub const DEFAULT_SETTLE_CYCLES: u32 = 5;

/// Joint angle produced by one unit of calibration offset.
///
/// Units: radians
const OFFSET_SCALE_RAD: f64 = 0.001;

/// Joint angle produced by one unit of translation trim.
///
/// Units: radians/unit
const TRANS_SCALE_RAD: f64 = 0.05;

/// Amplitude of the simulated leg swing while moving.
///
/// Units: radians
const SWING_AMPLITUDE_RAD: f64 = 0.2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A movement requested through `set_move_param`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MoveRecord {
    pub speed: f64,
    pub direction: f64,
    pub turn_rate: f64,
    pub n_move: u32,
}

/// Simplified kinematics engine.
///
/// Each run consumes one gait cycle of the current movement. Once the movement is exhausted the
/// body takes `settle_cycles` runs to return to the home pose. Joint targets are a simple
/// function of the trims, the calibration offsets and the gait phase.
#[derive(Debug)]
pub struct SimBody {
    cycle_duration: Duration,

    settle_cycles: u32,
    settle_remaining: u32,
    never_home: bool,

    lin_mode: LinMode,
    gait_id: u8,

    num_runs: u64,
    phase: u64,
    targets: [f64; NUM_JOINTS],

    moves: Vec<MoveRecord>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimBody {
    /// Create a new body running at `freq_hz`, starting in the home pose.
    pub fn new(freq_hz: f64) -> Self {
        Self {
            cycle_duration: Duration::from_secs_f64(1.0 / freq_hz),
            settle_cycles: DEFAULT_SETTLE_CYCLES,
            settle_remaining: 0,
            never_home: false,
            lin_mode: LinMode::Off,
            gait_id: 1,
            num_runs: 0,
            phase: 0,
            targets: [0.0; NUM_JOINTS],
            moves: Vec::new(),
        }
    }

    /// Set the number of runs needed to settle into the home pose.
    pub fn with_settle_cycles(mut self, settle_cycles: u32) -> Self {
        self.settle_cycles = settle_cycles;
        self
    }

    /// Make a body that never reports reaching the home pose.
    pub fn never_home(mut self) -> Self {
        self.never_home = true;
        self
    }

    pub fn lin_mode(&self) -> LinMode {
        self.lin_mode
    }

    pub fn gait_id(&self) -> u8 {
        self.gait_id
    }

    /// Number of times the kinematics has been run.
    pub fn num_runs(&self) -> u64 {
        self.num_runs
    }

    /// All movements requested so far, oldest first.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    fn compute_targets(&mut self, shared: &SharedState) {
        let tr = &shared.move_ctrl.tr;
        let moving = shared.move_ctrl.n_move > 0;

        for leg in 0..NUM_LEGS {
            // Left legs are 0..3, right legs 3..6
            let side = if leg < NUM_LEGS / 2 { 1.0 } else { -1.0 };

            let swing = if moving && self.lin_mode == LinMode::Off {
                // Tripod gait, alternate legs are half a cycle apart
                let half = (self.phase + leg as u64) % 2 == 0;
                if half {
                    SWING_AMPLITUDE_RAD
                } else {
                    -SWING_AMPLITUDE_RAD
                }
            } else {
                0.0
            };

            let pose = match self.lin_mode {
                LinMode::Off => [
                    tr[TRIM_ROT_Z] + side * tr[TRIM_TRANS_Y] * TRANS_SCALE_RAD + swing,
                    tr[TRIM_TRANS_Z] * TRANS_SCALE_RAD + side * tr[TRIM_ROT_X] + tr[TRIM_ROT_Y],
                    -tr[TRIM_TRANS_Z] * TRANS_SCALE_RAD + tr[TRIM_TRANS_X] * TRANS_SCALE_RAD,
                ],
                LinMode::Permanent => [0.0; 3],
            };

            for (layer, angle) in pose.iter().enumerate() {
                let j = joint_index(leg, layer);
                self.targets[j] =
                    angle + shared.servo.calibration_offsets[j] as f64 * OFFSET_SCALE_RAD;
            }
        }
    }
}

impl BodyKinematics for SimBody {
    fn run(&mut self, shared: &mut SharedState) {
        self.num_runs += 1;

        if shared.param.freq > 0.0 {
            self.cycle_duration = Duration::from_secs_f64(1.0 / shared.param.freq);
        }

        if shared.move_ctrl.n_move > 0 {
            self.phase += 1;
            self.settle_remaining = self.settle_cycles;
        } else if self.settle_remaining > 0 {
            self.settle_remaining -= 1;
        }

        self.compute_targets(shared);

        if shared.move_ctrl.n_move > 0 {
            shared.move_ctrl.n_move -= 1;
        }

        trace!(
            "SimBody run {}: n_move {}, settle {}",
            self.num_runs,
            shared.move_ctrl.n_move,
            self.settle_remaining
        );
    }

    fn pack_targets(&self) -> [f64; NUM_JOINTS] {
        self.targets
    }

    fn set_move_param(&mut self, speed: f64, direction: f64, turn_rate: f64, n_move: u32) {
        self.moves.push(MoveRecord {
            speed,
            direction,
            turn_rate,
            n_move,
        });
    }

    fn set_lin_mode(&mut self, mode: LinMode) {
        self.lin_mode = mode;
    }

    fn select_gait(&mut self, gait_id: u8) {
        self.gait_id = gait_id;
    }

    fn check_home_reached(&self) -> bool {
        !self.never_home && self.settle_remaining == 0
    }

    fn cycle_duration(&self) -> Duration {
        self.cycle_duration
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_run_consumes_steps_then_settles() {
        let mut body = SimBody::new(50.0).with_settle_cycles(2);
        let mut shared = SharedState::default();
        shared.move_ctrl.n_move = 3;

        for expected in [2, 1, 0].iter() {
            body.run(&mut shared);
            assert_eq!(shared.move_ctrl.n_move, *expected);
            assert!(!body.check_home_reached());
        }

        body.run(&mut shared);
        assert!(!body.check_home_reached());
        body.run(&mut shared);
        assert!(body.check_home_reached());
        assert_eq!(body.num_runs(), 5);
    }

    #[test]
    fn test_never_home() {
        let mut body = SimBody::new(50.0).never_home();
        let mut shared = SharedState::default();

        body.run(&mut shared);
        assert!(!body.check_home_reached());
    }

    #[test]
    fn test_permanent_lin_mode_shows_offsets_only() {
        let mut body = SimBody::new(50.0);
        let mut shared = SharedState::default();
        shared.servo.calibration_offsets[4] = 100;

        body.set_lin_mode(LinMode::Permanent);
        body.run(&mut shared);

        let targets = body.pack_targets();
        assert!((targets[4] - 0.1).abs() < 1e-12);
        assert!(targets
            .iter()
            .enumerate()
            .all(|(i, t)| i == 4 || *t == 0.0));
    }

    #[test]
    fn test_cycle_duration_follows_freq() {
        let mut body = SimBody::new(50.0);
        let mut shared = SharedState::default();
        shared.param.freq = 100.0;

        body.run(&mut shared);
        assert!((body.cycle_duration().as_secs_f64() - 0.01).abs() < 1e-9);
    }
}
