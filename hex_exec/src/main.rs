//! Main hexapod executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise RobotCtrl with its collaborators
//!     - Main loop:
//!         - Touch input acquisition and mode handling (RobotCtrl::proc)
//!         - Mode behaviour, which runs the fixed-period control loop (RobotCtrl::proc)
//!         - Calibration persistence
//!
//! The control loop paces itself, so the main loop only sleeps when the current mode ran no
//! control cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::Duration;

// Internal
use hex_lib::{
    calib_store::{service_store_request, SessionCalibStore},
    data_store::DataStore,
    params::HexExecParams,
    robot_ctrl::RobotCtrl,
    sim::{ScriptedTouchIo, SimBody},
};
use hw_if::shared::DEFAULT_FREQ_HZ;
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::ScriptInterpreter,
    session::Session,
    time::MonotonicClock,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("hex_exec", "sessions").wrap_err("Failed to create the session")?;

    let exec_params: HexExecParams =
        util::params::load("hex_exec.toml").wrap_err("Could not load the exec params")?;

    // Initialise logger
    logger_init(
        parse_level(&exec_params.log_level)?,
        parse_level(&exec_params.cycle_log_level)?,
        &session,
    )
    .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Hexapod Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("Exec parameters: {:#?}", exec_params);

    // ---- INITIALISE TOUCH SOURCE ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let script_path = match (args.len(), &exec_params.touch_script) {
        (2, _) => args[1].clone().into(),
        (1, Some(p)) => host::get_sw_root()
            .wrap_err("Could not resolve the touch script path")?
            .join(p),
        (1, None) => {
            return Err(eyre!(
                "No touch script given, provide one as an argument or in hex_exec.toml"
            ))
        }
        (n, _) => return Err(eyre!("Expected zero or one argument, found {}", n - 1)),
    };

    info!("Loading touch script from {:?}", script_path);

    let si = ScriptInterpreter::new(&script_path).wrap_err("Failed to load the touch script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} touches\n",
        si.get_duration(),
        si.get_num_touches()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    let mut robot_ctrl = RobotCtrl::new(
        SimBody::new(DEFAULT_FREQ_HZ),
        ScriptedTouchIo::new(si),
        MonotonicClock::default(),
    );
    robot_ctrl
        .init("robot_ctrl.toml", &session)
        .wrap_err("Failed to initialise RobotCtrl")?;
    info!("RobotCtrl init complete");

    let mut calib_store = SessionCalibStore::new(&session, exec_params.calib_file.clone());

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    let idle_period = Duration::from_secs_f64(exec_params.idle_period_s);

    info!("Begining main loop\n");

    loop {
        let prev_cycles = ds.robot_ctrl_status_rpt.cycles;

        ds.tick_start();

        // ---- ROBOT CONTROL ----

        match robot_ctrl.proc(&()) {
            Ok((o, r)) => ds.record(o, r),
            Err(e) => warn!("Error during RobotCtrl processing: {}", e),
        }

        // ---- CALIBRATION PERSISTENCE ----

        if service_store_request(robot_ctrl.shared_mut(), &mut calib_store) {
            ds.num_calib_writes += 1;
        }

        // ---- TICK MANAGEMENT ----

        // Modes without actuation would otherwise spin
        if !ds.ran_cycle(prev_cycles) {
            thread::sleep(idle_period);
        }

        ds.tick_end();

        if exec_params.stop_at_end_of_script && robot_ctrl.hardware().end_of_script() {
            info!("End of touch script reached, stopping");
            break;
        }

        if let Some(max) = exec_params.max_ticks {
            if ds.num_ticks >= max {
                info!("Maximum number of ticks ({}) reached, stopping", max);
                break;
            }
        }
    }

    // ---- SHUTDOWN ----

    let stats = robot_ctrl.cycle_clock().stats();

    info!(
        "Ran {} ticks and {} control cycles ({} overruns) ending in {:?} mode",
        ds.num_ticks,
        stats.num_cycles,
        stats.num_overruns,
        robot_ctrl.mode()
    );
    info!(
        "{} invalid touches ignored, {} calibration writes",
        ds.num_invalid_touches, ds.num_calib_writes
    );

    session.exit();

    info!("End of execution");

    Ok(())
}

/// Parse a log level from the exec parameters.
fn parse_level(level: &str) -> Result<LevelFilter, Report> {
    level
        .parse()
        .map_err(|_| eyre!("Invalid log level \"{}\"", level))
}
