//! Monotonic time and blocking delays.
//!
//! Every blocking operation in the core (timed drives, waits, the vision poll
//! interval, the teleop tick) goes through [`Clock`], so the same code runs
//! against the `embassy_time` driver on hardware and against a virtual clock in
//! tests and simulation.

use embassy_time::{Duration, Instant};

/// Millisecond-resolution monotonic clock with a blocking sleep.
pub trait Clock {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Block the calling context for `duration`.
    fn delay(
        &mut self,
        duration: Duration,
    );

    /// Time elapsed since `start`.
    fn since(
        &self,
        start: Instant,
    ) -> Duration {
        self.now().saturating_duration_since(start)
    }
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn delay(
        &mut self,
        duration: Duration,
    ) {
        (**self).delay(duration)
    }
}

/// Clock backed by the global `embassy_time` driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn delay(
        &mut self,
        duration: Duration,
    ) {
        embassy_time::block_for(duration);
    }
}

/// Virtual clock whose `delay` advances time immediately.
///
/// Used for deterministic tests and faster-than-real-time simulation.
#[derive(Debug, Clone, Copy)]
pub struct ManualClock {
    now: Instant,
}

impl ManualClock {
    /// A clock reading zero ticks.
    pub const fn new() -> Self {
        Self {
            now: Instant::from_ticks(0),
        }
    }

    /// Move time forward without blocking anyone.
    pub fn advance(
        &mut self,
        duration: Duration,
    ) {
        self.now += duration;
    }

    /// Milliseconds since the clock was created.
    pub fn elapsed_ms(&self) -> u64 {
        self.now.as_millis()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now
    }

    fn delay(
        &mut self,
        duration: Duration,
    ) {
        self.advance(duration);
    }
}

/// Convert a configured millisecond count into an `embassy_time::Duration`.
pub const fn ms(value: u32) -> Duration {
    Duration::from_millis(value as u64)
}
