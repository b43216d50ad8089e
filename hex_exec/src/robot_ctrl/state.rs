//! Implementations for the RobotCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

// Internal
use super::{
    transition, CalibSelection, CycleClock, HipMode, Intent, Params, RobotCtrlError, RobotMode,
    OFFLINE_GAIT_ID,
};
use hw_if::{
    eqpt::{BodyKinematics, HardwareIo, LinMode},
    shared::{SharedState, TRIM_TRANS_Y},
    touch::TouchPattern,
    NUM_JOINTS,
};
use util::{module::State, params, session::Session, time::Clock};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of hip pulses in one dance repetition.
pub const DANCE_PULSES: usize = 4;

/// Range of the number of dance repetitions.
const DANCE_REPS_MIN: u32 = 4;
const DANCE_REPS_MAX: u32 = 7;

/// Range of the dance pitch, in tenths of a radian.
const DANCE_PITCH_MIN_DECI: i32 = -5;
const DANCE_PITCH_MAX_DECI: i32 = 4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Robot control module state
pub struct RobotCtrl<B, H, C>
where
    B: BodyKinematics,
    H: HardwareIo,
    C: Clock,
{
    pub(crate) params: Params,

    pub(crate) body: B,
    hardware: H,

    pub(crate) shared: SharedState,
    pub(crate) cycle: CycleClock<C>,

    mode: RobotMode,
    calib: CalibSelection,
    hip: HipMode,
    nudge: bool,

    /// True if the previous mode step ran no control cycle.
    idle: bool,

    rng: StdRng,

    report: StatusReport,
}

/// Output data from RobotCtrl.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct OutputData {
    /// The mode the robot is in after this outer tick.
    pub mode: RobotMode,

    /// Joint actuation targets published by the last control cycle.
    ///
    /// Units: radians
    pub servo_angles: [f64; NUM_JOINTS],
}

/// Status report for RobotCtrl processing.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct StatusReport {
    /// Mode at the end of processing.
    pub mode: RobotMode,

    /// Total number of control cycles executed so far.
    pub cycles: u64,

    /// Total number of control cycles that overran so far.
    pub overruns: u64,

    /// True if a servo layer change was acknowledged in calibration mode this tick.
    pub nudge: bool,

    /// Code of the touch handled this tick, if any.
    pub last_touch: Option<u8>,

    /// True if an invalid touch was ignored this tick.
    pub invalid_touch: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<B, H, C> RobotCtrl<B, H, C>
where
    B: BodyKinematics,
    H: HardwareIo,
    C: Clock,
{
    /// Create a new controller from its collaborators.
    ///
    /// The controller uses default parameters and is not powered until [`RobotCtrl::start`] (or
    /// [`State::init`]) has been called.
    pub fn new(body: B, hardware: H, clock: C) -> Self {
        let params = Params::default();

        Self {
            calib: CalibSelection::new(params.leg_select_map),
            rng: StdRng::from_entropy(),
            params,
            body,
            hardware,
            shared: SharedState::default(),
            cycle: CycleClock::new(clock),
            mode: RobotMode::default(),
            hip: HipMode::default(),
            nudge: false,
            idle: false,
            report: StatusReport::default(),
        }
    }

    /// Apply the parameters, power the servos and run the first control cycle.
    pub fn start(&mut self, params: Params) -> Result<(), RobotCtrlError> {
        params.validate()?;

        self.calib = CalibSelection::new(params.leg_select_map);
        self.rng = match params.dance_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.shared.param.freq = params.freq_hz;
        self.params = params;

        self.shared.servo.power = true;
        self.tick();

        info!("RobotCtrl started in {:?} mode", self.mode);

        Ok(())
    }

    /// Poll the touch hardware and return the decoded touch, if any.
    ///
    /// The detection is consumed so that each gesture is reported once.
    pub fn check_input(&mut self) -> Result<Option<TouchPattern>, RobotCtrlError> {
        self.hardware.poll_touch();

        if !self.hardware.touch_detected() {
            return Ok(None);
        }

        let touch = self.hardware.decode_touch_pattern(true)?;
        debug!("Touch {} in {:?} mode", touch, self.mode);

        Ok(Some(touch))
    }

    /// Apply a touch to the mode state machine.
    ///
    /// Never blocks and never ticks the control loop.
    pub fn handle_input(&mut self, touch: TouchPattern) {
        let t = transition(self.mode, touch);

        for intent in t.intents {
            self.apply_intent(intent);
        }

        if t.next != self.mode {
            info!("Mode change: {:?} -> {:?}", self.mode, t.next);
            self.mode = t.next;
        }
    }

    /// Run the behaviour of the current mode.
    ///
    /// The scripted modes block until their movement sequence has finished.
    pub fn mode_step(&mut self) {
        self.idle = matches!(self.mode, RobotMode::PreCalibration | RobotMode::Grip);

        match self.mode {
            RobotMode::PreCalibration => (),
            RobotMode::Calibration => {
                if self.nudge {
                    debug!(
                        "Nudge: leg {} layer {}",
                        self.calib.leg(),
                        self.calib.layer()
                    );
                    self.nudge = false;
                    self.report.nudge = true;
                }

                self.body.set_lin_mode(LinMode::Permanent);
                self.tick();
            }
            RobotMode::Walking => self.tick(),
            RobotMode::Offline => self.offline_step(),
            RobotMode::Dancing => self.dancing_step(),
            RobotMode::Random => {
                self.reset_pose();
                self.go_home_default();
            }
            RobotMode::Grip => (),
        }
    }

    pub fn mode(&self) -> RobotMode {
        self.mode
    }

    pub fn hip(&self) -> HipMode {
        self.hip
    }

    pub fn calib_selection(&self) -> &CalibSelection {
        &self.calib
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn shared(&self) -> &SharedState {
        &self.shared
    }

    /// Mutable access to the shared state for the per-cycle services.
    pub fn shared_mut(&mut self) -> &mut SharedState {
        &mut self.shared
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    pub fn cycle_clock(&self) -> &CycleClock<C> {
        &self.cycle
    }

    fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::AdjustOffset(step) => {
                self.calib.adjust_offset(&mut self.shared.servo, step);
            }
            Intent::AdvanceServoLayer => {
                let layer = self.calib.advance_layer();
                self.nudge = true;
                debug!("Calibration servo layer {}", layer);
            }
            Intent::AdvanceLeg => {
                let leg = self.calib.advance_leg();
                debug!("Calibration leg {}", leg);
            }
            Intent::RequestStore => {
                self.shared.servo.store = true;
            }
            Intent::SetLinMode(mode) => self.body.set_lin_mode(mode),
            Intent::AdjustLateralTrim(step) => {
                let trim = self.adjust_lateral_trim(step);
                debug!("Lateral trim {:+.1}", trim);
            }
            Intent::SetHip(hip) => self.hip = hip,
            Intent::SelectOfflineGait => {
                self.shared.move_ctrl.tr[TRIM_TRANS_Y] = 0.0;
                self.shared.move_ctrl.gait_id = OFFLINE_GAIT_ID;
                self.body.select_gait(OFFLINE_GAIT_ID);
            }
            Intent::ResetOffsets => {
                warn!("Resetting the calibration offsets is not implemented, touch ignored");
            }
        }
    }

    fn offline_step(&mut self) {
        let dist = self.params.scripted_walk_dist;

        match self.hip {
            HipMode::Negative => self.walk_backward(dist),
            HipMode::Positive => self.walk_forward(dist),
            HipMode::Neutral => self.reset_pose(),
        }

        self.go_home_default();
        self.hip = HipMode::Neutral;
    }

    fn dancing_step(&mut self) {
        match self.hip {
            HipMode::Negative => {
                let reps = self.rng.gen_range(DANCE_REPS_MIN..=DANCE_REPS_MAX);
                let hip_rot = self.params.dance_hip_rot_rad;
                let pulse_s = self.params.dance_pulse_s;

                info!("Dancing {} repetitions", reps);

                for _ in 0..reps {
                    let pitch_deci = self
                        .rng
                        .gen_range(DANCE_PITCH_MIN_DECI..=DANCE_PITCH_MAX_DECI);
                    let pitch = pitch_deci as f64 / 10.0;
                    debug!("Dance pitch {:+.1}", pitch);

                    self.set_rotation(pitch, 0.0, 0.0);

                    for pulse in 0..DANCE_PULSES {
                        let angle = if pulse % 2 == 0 { hip_rot } else { -hip_rot };
                        self.dance_hip(angle, 0.0, pulse_s);
                    }
                }

                self.reset_pose();
            }
            HipMode::Positive => self.walk_forward(self.params.scripted_walk_dist),
            HipMode::Neutral => self.go_home_default(),
        }

        self.hip = HipMode::Neutral;
    }
}

impl<B, H, C> State for RobotCtrl<B, H, C>
where
    B: BodyKinematics,
    H: HardwareIo,
    C: Clock,
{
    type InitData = &'static str;
    type InitError = RobotCtrlError;

    type InputData = ();
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = RobotCtrlError;

    /// Initialise the RobotCtrl module.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)?;
        self.start(params)
    }

    /// Perform one outer tick: check the touch input then run the current mode.
    ///
    /// Invalid touches are logged and ignored.
    fn proc(
        &mut self,
        _input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();

        // The cycle start is stale after idle steps
        if self.idle {
            self.cycle.resync();
        }

        match self.check_input() {
            Ok(Some(touch)) => {
                self.report.last_touch = Some(touch.code());
                self.handle_input(touch);
            }
            Ok(None) => (),
            Err(e) => {
                warn!("Ignoring touch: {}", e);
                self.report.invalid_touch = true;
            }
        }

        self.mode_step();

        let stats = self.cycle.stats();
        self.report.mode = self.mode;
        self.report.cycles = stats.num_cycles;
        self.report.overruns = stats.num_overruns;

        let output = OutputData {
            mode: self.mode,
            servo_angles: self.shared.servo.servo_angles,
        };

        Ok((output, self.report))
    }
}

impl Default for OutputData {
    fn default() -> Self {
        Self {
            mode: RobotMode::default(),
            servo_angles: [0.0; NUM_JOINTS],
        }
    }
}

