//! Power-state hooks

use super::ranger::RangeError;

/// Peripherals that react to the platform entering and leaving sleep
pub trait SleepAware {
    /// Called before the platform goes to sleep
    fn before_sleep(&mut self) -> impl core::future::Future<Output = Result<(), RangeError>>;

    /// Called after the platform wakes up
    fn after_wake(&mut self) -> impl core::future::Future<Output = Result<(), RangeError>>;
}
