//! Scenario tests driving RobotCtrl through touch sequences with the simulated collaborators.

use hex_lib::{
    calib_store::service_store_request,
    robot_ctrl::{
        HipMode, Params, RobotCtrl, RobotMode, StatusReport, DEFAULT_LEG_SELECT_MAP,
        OFFLINE_GAIT_ID,
    },
    sim::{SimBody, SimCalibStore, TouchQueue},
};
use hw_if::{
    eqpt::{BodyKinematics, LinMode},
    shared::TRIM_TRANS_Y,
    NUM_LEGS,
};
use std::{f64::consts::FRAC_PI_2, time::Duration};
use util::{module::State, time::SimClock};

type TestCtrl = RobotCtrl<SimBody, TouchQueue, SimClock>;

fn robot() -> TestCtrl {
    let mut rc = RobotCtrl::new(SimBody::new(50.0), TouchQueue::new(), SimClock::new());
    rc.start(Params {
        dance_seed: Some(7),
        ..Params::default()
    })
    .unwrap();
    rc
}

/// Inject a touch and run one outer tick.
fn touch(rc: &mut TestCtrl, code: u8) -> StatusReport {
    rc.hardware_mut().push(code);
    let (_, report) = rc.proc(&()).unwrap();
    report
}

#[test]
fn test_start_powers_and_ticks() {
    let rc = robot();

    assert!(rc.shared().servo.power);
    assert_eq!(rc.body().num_runs(), 1);
    assert_eq!(rc.cycle_clock().stats().num_cycles, 1);
    assert_eq!(rc.mode(), RobotMode::PreCalibration);
}

#[test]
fn test_idle_time_is_not_an_overrun() {
    let mut rc = robot();

    for _ in 0..3 {
        rc.proc(&()).unwrap();
        rc.cycle_clock().clock().advance(Duration::from_millis(20));
    }

    let report = touch(&mut rc, 5);

    assert_eq!(report.mode, RobotMode::Calibration);
    assert_eq!(report.cycles, 2);
    assert_eq!(report.overruns, 0);
}

#[test]
fn test_invalid_params_rejected() {
    let mut rc = RobotCtrl::new(SimBody::new(50.0), TouchQueue::new(), SimClock::new());

    let res = rc.start(Params {
        leg_select_map: [0, 1, 2, 3, 4, 4],
        ..Params::default()
    });

    assert!(res.is_err());
    assert!(!rc.shared().servo.power);
}

#[test]
fn test_calibration_end_to_end() {
    let mut rc = robot();
    let mut store = SimCalibStore::new();

    touch(&mut rc, 5);
    assert_eq!(rc.mode(), RobotMode::Calibration);
    assert_eq!(rc.body().lin_mode(), LinMode::Permanent);

    for _ in 0..4 {
        touch(&mut rc, 4);
    }

    let leg = rc.calib_selection().leg();
    let layer = rc.calib_selection().layer();
    assert_eq!((leg, layer), (DEFAULT_LEG_SELECT_MAP[0], 0));
    assert_eq!(rc.shared().servo.offset(leg, layer), 40);

    touch(&mut rc, 5);
    assert_eq!(rc.mode(), RobotMode::Walking);
    assert!(rc.shared().servo.store);
    assert_eq!(rc.body().lin_mode(), LinMode::Off);

    assert!(service_store_request(rc.shared_mut(), &mut store));
    assert!(!rc.shared().servo.store);
    assert_eq!(store.writes().len(), 1);
    assert_eq!(store.writes()[0][leg * 3 + layer], 40);
    assert_eq!(store.writes()[0].iter().filter(|o| **o != 0).count(), 1);
}

#[test]
fn test_calibration_offsets_saturate() {
    let mut rc = robot();
    touch(&mut rc, 5);

    for _ in 0..12 {
        touch(&mut rc, 4);
    }
    let sel = *rc.calib_selection();
    assert_eq!(rc.shared().servo.offset(sel.leg(), sel.layer()), 100);

    for _ in 0..25 {
        touch(&mut rc, 1);
    }
    assert_eq!(rc.shared().servo.offset(sel.leg(), sel.layer()), -100);
}

#[test]
fn test_calibration_leg_traversal() {
    let mut rc = robot();
    touch(&mut rc, 5);

    let start = rc.calib_selection().leg();
    let mut visited = [false; NUM_LEGS];

    for _ in 0..NUM_LEGS {
        touch(&mut rc, 2);
        visited[rc.calib_selection().leg()] = true;
    }

    assert!(visited.iter().all(|v| *v));
    assert_eq!(rc.calib_selection().leg(), start);
    assert_eq!(rc.mode(), RobotMode::Calibration);
}

#[test]
fn test_calibration_layer_change_nudges() {
    let mut rc = robot();
    touch(&mut rc, 5);

    let report = touch(&mut rc, 3);
    assert!(report.nudge);
    assert_eq!(rc.calib_selection().layer(), 1);

    let report = touch(&mut rc, 6);
    assert!(report.nudge);
    assert_eq!(rc.calib_selection().layer(), 2);

    let (_, report) = rc.proc(&()).unwrap();
    assert!(!report.nudge);
}

#[test]
fn test_calibration_reset_code_is_ignored() {
    let mut rc = robot();
    touch(&mut rc, 5);
    touch(&mut rc, 4);

    let before = rc.shared().servo.calibration_offsets;
    touch(&mut rc, 7);

    assert_eq!(rc.shared().servo.calibration_offsets, before);
    assert_eq!(rc.mode(), RobotMode::Calibration);
}

#[test]
fn test_walking_lateral_trim() {
    let mut rc = robot();
    touch(&mut rc, 1);
    assert_eq!(rc.mode(), RobotMode::Walking);

    touch(&mut rc, 4);
    touch(&mut rc, 4);
    assert_eq!(rc.shared().move_ctrl.tr[TRIM_TRANS_Y], 3.0);

    touch(&mut rc, 1);
    touch(&mut rc, 1);
    touch(&mut rc, 1);
    assert_eq!(rc.shared().move_ctrl.tr[TRIM_TRANS_Y], -3.0);
}

#[test]
fn test_walking_ticks_once_per_step() {
    let mut rc = robot();
    touch(&mut rc, 1);

    let cycles = rc.cycle_clock().stats().num_cycles;
    let (_, report) = rc.proc(&()).unwrap();

    assert_eq!(report.cycles, cycles + 1);
    assert_eq!(report.last_touch, None);
}

#[test]
fn test_pre_calibration_and_grip_do_not_actuate() {
    let mut rc = robot();

    let runs = rc.body().num_runs();
    rc.proc(&()).unwrap();
    assert_eq!(rc.body().num_runs(), runs);

    // Walking -> Offline -> Dancing -> Random -> Grip
    touch(&mut rc, 1);
    for _ in 0..4 {
        touch(&mut rc, 2);
    }
    assert_eq!(rc.mode(), RobotMode::Grip);

    let runs = rc.body().num_runs();
    rc.proc(&()).unwrap();
    assert_eq!(rc.body().num_runs(), runs);

    touch(&mut rc, 2);
    assert_eq!(rc.mode(), RobotMode::PreCalibration);
}

#[test]
fn test_switch_code_returns_to_pre_calibration() {
    let mut rc = robot();
    touch(&mut rc, 1);
    touch(&mut rc, 2);
    assert_eq!(rc.mode(), RobotMode::Offline);

    touch(&mut rc, 5);
    assert_eq!(rc.mode(), RobotMode::PreCalibration);
}

#[test]
fn test_offline_selects_gait_and_walks() {
    let mut rc = robot();
    touch(&mut rc, 1);
    touch(&mut rc, 4);
    touch(&mut rc, 2);
    assert_eq!(rc.mode(), RobotMode::Offline);
    assert_eq!(rc.body().gait_id(), 1);

    rc.shared_mut().move_ctrl.tr[TRIM_TRANS_Y] = 2.0;
    touch(&mut rc, 4);

    assert_eq!(rc.shared().move_ctrl.tr[TRIM_TRANS_Y], 0.0);
    assert_eq!(rc.shared().move_ctrl.gait_id, OFFLINE_GAIT_ID);
    assert_eq!(rc.body().gait_id(), OFFLINE_GAIT_ID);
    assert_eq!(rc.hip(), HipMode::Neutral);

    let last = rc.body().moves().last().copied().unwrap();
    assert_eq!(last.direction, FRAC_PI_2);
    assert_eq!(last.n_move, rc.linear_steps(rc.params().scripted_walk_dist));
    assert_eq!(rc.shared().move_ctrl.n_move, 0);
    assert!(rc.body().check_home_reached());
}

#[test]
fn test_dancing_negative_hip_resets_pose() {
    let mut rc = robot();
    touch(&mut rc, 1);
    touch(&mut rc, 2);
    touch(&mut rc, 2);
    assert_eq!(rc.mode(), RobotMode::Dancing);

    let cycles = rc.cycle_clock().stats().num_cycles;
    touch(&mut rc, 1);

    // At least four repetitions of four pulses, each holding for several cycles
    assert!(rc.cycle_clock().stats().num_cycles - cycles >= 16);
    assert_eq!(rc.hip(), HipMode::Neutral);

    let tr = rc.shared().move_ctrl.tr;
    assert!(tr[1..].iter().all(|t| *t == 0.0));
}

#[test]
fn test_dancing_positive_hip_walks_forward() {
    let mut rc = robot();
    touch(&mut rc, 1);
    touch(&mut rc, 2);
    touch(&mut rc, 2);

    let moves = rc.body().moves().len();
    touch(&mut rc, 4);

    assert_eq!(rc.body().moves().len(), moves + 1);
    assert_eq!(rc.body().moves()[moves].direction, FRAC_PI_2);
    assert_eq!(rc.hip(), HipMode::Neutral);
}

#[test]
fn test_invalid_touch_is_ignored() {
    let mut rc = robot();

    let report = touch(&mut rc, 9);

    assert!(report.invalid_touch);
    assert_eq!(report.last_touch, None);
    assert_eq!(rc.mode(), RobotMode::PreCalibration);

    let report = touch(&mut rc, 5);
    assert!(!report.invalid_touch);
    assert_eq!(report.last_touch, Some(5));
    assert_eq!(rc.mode(), RobotMode::Calibration);
}
