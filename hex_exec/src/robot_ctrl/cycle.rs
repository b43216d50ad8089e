//! Fixed-period control loop
//!
//! Every tick advances the kinematics by one step and republishes the joint targets no earlier
//! than one cycle duration after the previous publish. A tick that runs longer than the cycle is
//! not corrected (no catch-up, no skipped cycles), it is only counted and reported.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{trace, warn};
use serde::Serialize;
use std::time::{Duration, Instant};

use super::RobotCtrl;
use hw_if::eqpt::{BodyKinematics, HardwareIo};
use util::time::Clock;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tracks the start of the current cycle and the cycle statistics.
pub struct CycleClock<C: Clock> {
    clock: C,
    last_start: Instant,
    stats: CycleStats,
}

/// Cycle statistics.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct CycleStats {
    /// Number of cycles executed.
    pub num_cycles: u64,

    /// Total number of cycles which took longer than the cycle duration.
    pub num_overruns: u64,

    /// Number of consecutive overruns up to the latest cycle.
    pub num_consec_overruns: u64,

    /// Amount by which the latest overrun exceeded the cycle duration.
    ///
    /// Units: seconds
    pub last_overrun_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C: Clock> CycleClock<C> {
    /// Create a new cycle clock, the first cycle starting now.
    pub fn new(clock: C) -> Self {
        let last_start = clock.now();

        Self {
            clock,
            last_start,
            stats: CycleStats::default(),
        }
    }

    /// Block until `period` has elapsed since the start of the current cycle.
    ///
    /// Returns the overrun if the cycle already took longer than `period`.
    pub fn wait(&mut self, period: Duration) -> Option<Duration> {
        let deadline = self.last_start + period;
        let now = self.clock.now();

        match now.checked_duration_since(deadline) {
            Some(overrun) if overrun > Duration::from_secs(0) => {
                self.stats.num_overruns += 1;
                self.stats.num_consec_overruns += 1;
                self.stats.last_overrun_s = overrun.as_secs_f64();
                warn!("Cycle overran by {:.06} s", overrun.as_secs_f64());
                Some(overrun)
            }
            _ => {
                self.stats.num_consec_overruns = 0;
                self.clock.sleep_until(deadline);
                None
            }
        }
    }

    /// Start a new cycle now.
    pub fn mark_start(&mut self) {
        self.last_start = self.clock.now();
        self.stats.num_cycles += 1;
    }

    /// Restart the current cycle now, without counting a cycle.
    ///
    /// Used after a pause in ticking so the pause is not reported as an overrun.
    pub fn resync(&mut self) {
        self.last_start = self.clock.now();
    }

    /// The current time.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Start time of the current cycle.
    pub fn last_start(&self) -> Instant {
        self.last_start
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<B, H, C> RobotCtrl<B, H, C>
where
    B: BodyKinematics,
    H: HardwareIo,
    C: Clock,
{
    /// Perform exactly one kinematic step.
    ///
    /// Runs the kinematics, waits out the rest of the cycle, publishes the joint targets into the
    /// shared state and starts the next cycle.
    pub fn tick(&mut self) {
        self.body.run(&mut self.shared);
        let targets = self.body.pack_targets();

        self.cycle.wait(self.body.cycle_duration());

        self.shared.servo.servo_angles = targets;
        self.cycle.mark_start();

        trace!(
            "Cycle {}: n_move {}, targets {:?}",
            self.cycle.stats().num_cycles,
            self.shared.move_ctrl.n_move,
            targets
        );
    }

    /// Tick until `duration` has elapsed, without starting a tick that would end after it.
    ///
    /// A duration too long to represent is held indefinitely.
    pub(crate) fn hold(&mut self, duration: Duration) {
        let deadline = self.cycle.now().checked_add(duration);

        while !self.tick_ends_after(deadline) {
            self.tick();
        }
    }

    /// True if a tick started now would end after `deadline`. `None` is no deadline.
    pub(crate) fn tick_ends_after(&self, deadline: Option<Instant>) -> bool {
        let deadline = match deadline {
            Some(d) => d,
            None => return false,
        };

        match self.cycle.now().checked_add(self.body.cycle_duration()) {
            Some(end) => end > deadline,
            None => true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use util::time::SimClock;

    const PERIOD: Duration = Duration::from_millis(20);

    #[test]
    fn test_wait_paces_cycles() {
        let mut cc = CycleClock::new(SimClock::new());
        let start = cc.last_start();

        for i in 1..=5u32 {
            assert_eq!(cc.wait(PERIOD), None);
            cc.mark_start();
            assert_eq!(cc.last_start() - start, PERIOD * i);
        }

        let stats = cc.stats();
        assert_eq!(stats.num_cycles, 5);
        assert_eq!(stats.num_overruns, 0);
    }

    #[test]
    fn test_resync_after_pause() {
        let mut cc = CycleClock::new(SimClock::new());
        assert_eq!(cc.wait(PERIOD), None);
        cc.mark_start();

        cc.clock().advance(Duration::from_millis(100));
        cc.resync();

        let resynced = cc.last_start();
        assert_eq!(cc.wait(PERIOD), None);
        assert_eq!(cc.now() - resynced, PERIOD);

        let stats = cc.stats();
        assert_eq!(stats.num_overruns, 0);
        assert_eq!(stats.num_cycles, 1);
    }

    #[test]
    fn test_overrun_is_counted_not_corrected() {
        // Every read of the clock costs 30 ms, more than the whole period
        let mut cc = CycleClock::new(SimClock::with_now_cost(Duration::from_millis(30)));

        let overrun = cc.wait(PERIOD);
        assert_eq!(overrun, Some(Duration::from_millis(10)));
        cc.mark_start();

        assert!(cc.wait(PERIOD).is_some());
        cc.mark_start();

        let stats = cc.stats();
        assert_eq!(stats.num_overruns, 2);
        assert_eq!(stats.num_consec_overruns, 2);
        assert_eq!(stats.num_cycles, 2);
    }

    #[test]
    fn test_consecutive_overruns_reset() {
        let mut cc = CycleClock::new(SimClock::new());

        // Burn time past the deadline by sleeping the underlying clock directly
        let late = cc.last_start() + PERIOD * 2;
        cc.clock.sleep_until(late);
        assert!(cc.wait(PERIOD).is_some());
        cc.mark_start();

        assert_eq!(cc.wait(PERIOD), None);
        assert_eq!(cc.stats().num_consec_overruns, 0);
        assert_eq!(cc.stats().num_overruns, 1);
    }
}
