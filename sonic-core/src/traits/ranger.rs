//! Rangefinder trait and errors

use core::fmt;

use crate::config::ConfigError;
use crate::distance::Distance;

/// Errors that can occur while taking a measurement
///
/// Framing noise (a bad checksum, no frame in the window) is not an error;
/// drivers retry or report "no reading" instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeError {
    /// The serial port could not be opened
    TransportUnavailable,
    /// A read, write or clear on the open port failed
    Transport,
    /// No valid frame arrived before the read deadline
    Timeout,
    /// The driver was given a configuration it cannot honour
    InvalidConfig(ConfigError),
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::TransportUnavailable => f.write_str("serial port unavailable"),
            RangeError::Transport => f.write_str("serial port I/O failed"),
            RangeError::Timeout => f.write_str("timed out waiting for a distance frame"),
            RangeError::InvalidConfig(e) => write!(f, "invalid sensor config: {:?}", e),
        }
    }
}

/// Trait for distance sensors
pub trait RangeFinder {
    /// Take one measurement
    ///
    /// Returns `Ok(None)` when the sensor was reachable but no valid frame
    /// could be recovered this cycle. That is distinct from both a zero
    /// distance and [`RangeError::Timeout`].
    fn measure(&mut self) -> impl core::future::Future<Output = Result<Option<Distance>, RangeError>>;

    /// Most recent successful measurement, if any
    fn latest(&self) -> Option<Distance>;
}
