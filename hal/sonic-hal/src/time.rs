//! Time source abstraction
//!
//! Drivers take deadlines from [`Timebase::now`] and suspend through
//! [`Timebase::sleep`], so the same code runs on the embassy time driver
//! and on a virtual clock in host tests.

use embassy_time::{Duration, Instant};

/// Monotonic clock with cooperative delays
pub trait Timebase {
    /// Current instant
    fn now(&self) -> Instant;

    /// Suspend the caller for at least `duration`
    fn sleep(&mut self, duration: Duration) -> impl core::future::Future<Output = ()>;

    /// Instant `timeout` from now
    fn deadline(&self, timeout: Duration) -> Instant {
        self.now() + timeout
    }

    /// Check whether `deadline` has been reached
    fn expired(&self, deadline: Instant) -> bool {
        self.now() >= deadline
    }
}
