//! General time utility functions
//!
//! Provides the [`Clock`] abstraction used by fixed-period loops, with a real monotonic
//! implementation and a simulated one for deterministic tests.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use spin_sleep::SpinSleeper;
use std::cell::Cell;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A monotonic time source which can block until a deadline.
pub trait Clock {
    /// The current time.
    fn now(&self) -> Instant;

    /// Block until `deadline`. Returns immediately if the deadline has already passed.
    fn sleep_until(&mut self, deadline: Instant);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Wall clock backed by `std::time::Instant`, sleeping with a spin sleeper for low jitter.
pub struct MonotonicClock {
    sleeper: SpinSleeper,
}

/// Simulated clock for tests.
///
/// Time only moves when the clock is slept on, or by `now_cost` on every call to `now()` which
/// models the computation done between two reads.
pub struct SimClock {
    origin: Instant,
    elapsed: Cell<Duration>,
    now_cost: Duration,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            sleeper: SpinSleeper::default(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&mut self, deadline: Instant) {
        if let Some(d) = deadline.checked_duration_since(Instant::now()) {
            self.sleeper.sleep(d);
        }
    }
}

impl SimClock {
    /// Create a new simulated clock where reading the time is free.
    pub fn new() -> Self {
        Self::with_now_cost(Duration::from_secs(0))
    }

    /// Create a new simulated clock which advances by `now_cost` on every read.
    pub fn with_now_cost(now_cost: Duration) -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Cell::new(Duration::from_secs(0)),
            now_cost,
        }
    }

    /// Total simulated time since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    /// Manually advance the simulated time, modelling time spent outside the clock's users.
    pub fn advance(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SimClock {
    fn now(&self) -> Instant {
        let now = self.origin + self.elapsed.get();
        self.elapsed.set(self.elapsed.get() + self.now_cost);
        now
    }

    fn sleep_until(&mut self, deadline: Instant) {
        let target = deadline.saturating_duration_since(self.origin);
        if target > self.elapsed.get() {
            self.elapsed.set(target);
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a number of seconds into a duration, saturating instead of panicking.
///
/// Negative and NaN values give a zero duration, values too large for a `Duration` give
/// `Duration::MAX`.
pub fn secs_to_duration(seconds: f64) -> Duration {
    if !(seconds > 0.0) {
        Duration::from_secs(0)
    } else if seconds >= u64::MAX as f64 {
        Duration::MAX
    } else {
        Duration::from_secs_f64(seconds)
    }
}

/// Convert a chrono duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_clock_sleep() {
        let mut clock = SimClock::new();
        let start = clock.now();

        clock.sleep_until(start + Duration::from_millis(20));
        assert_eq!(clock.now() - start, Duration::from_millis(20));

        // Sleeping into the past does not move time backwards
        clock.sleep_until(start + Duration::from_millis(5));
        assert_eq!(clock.elapsed(), Duration::from_millis(20));
    }

    #[test]
    fn test_sim_clock_now_cost() {
        let clock = SimClock::with_now_cost(Duration::from_millis(3));

        let a = clock.now();
        let b = clock.now();

        assert_eq!(b - a, Duration::from_millis(3));
    }

    #[test]
    fn test_monotonic_clock_sleeps() {
        let mut clock = MonotonicClock::default();
        let start = clock.now();

        clock.sleep_until(start + Duration::from_millis(2));
        assert!(clock.now() - start >= Duration::from_millis(2));
    }

    #[test]
    fn test_sim_clock_advance() {
        let clock = SimClock::new();
        let start = clock.now();

        clock.advance(Duration::from_millis(7));
        assert_eq!(clock.now() - start, Duration::from_millis(7));
    }

    #[test]
    fn test_secs_to_duration_saturates() {
        assert_eq!(secs_to_duration(0.25), Duration::from_millis(250));
        assert_eq!(secs_to_duration(-1.0), Duration::from_secs(0));
        assert_eq!(secs_to_duration(std::f64::NAN), Duration::from_secs(0));
        assert_eq!(secs_to_duration(std::f64::INFINITY), Duration::MAX);
        assert_eq!(secs_to_duration(1e30), Duration::MAX);
    }

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(1500)),
            Some(1.5)
        );
    }
}
