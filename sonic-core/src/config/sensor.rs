//! Sensor configuration
//!
//! Only the knobs that are genuinely tunable live here. Protocol timings
//! (trigger response delay, drain-wait poll interval) are fixed by the
//! hardware and are constants in the driver.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use sonic_protocol::RESPONSE_DELAY_MS;

/// Output mode code for UART auto output
pub const MODE_UART_AUTO: u8 = 1;

/// Output mode code for UART controlled output
pub const MODE_UART_CONTROL: u8 = 2;

/// Current configuration layout version
pub const CONFIG_VERSION: u8 = 1;

/// Upper bound on a serialized [`SensorConfig`]
pub const MAX_CONFIG_SIZE: usize = 32;

/// Baud rate the A02 series is fixed to
pub const A02_BAUDRATE: u32 = 9600;

/// Longest accepted read timeout
pub const MAX_READ_TIMEOUT_MS: u32 = 60_000;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Read timeout shorter than one trigger cycle or too long
    InvalidTimeout,
    /// Update interval is zero
    InvalidInterval,
    /// Baud rate other than 9600
    UnsupportedBaudrate,
    /// Unknown output mode code
    InvalidMode,
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Stored layout version does not match
    VersionMismatch,
}

/// Sensor output mode
///
/// Selected when the module is ordered and cannot be changed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputMode {
    /// The host triggers each frame with a write
    ControlTriggered,
    /// The sensor streams frames on its own
    #[default]
    AutoContinuous,
}

impl OutputMode {
    /// Numeric mode code
    pub const fn as_u8(self) -> u8 {
        match self {
            OutputMode::AutoContinuous => MODE_UART_AUTO,
            OutputMode::ControlTriggered => MODE_UART_CONTROL,
        }
    }

    /// Parse a numeric mode code
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            MODE_UART_AUTO => Some(OutputMode::AutoContinuous),
            MODE_UART_CONTROL => Some(OutputMode::ControlTriggered),
            _ => None,
        }
    }
}

impl TryFrom<u8> for OutputMode {
    type Error = ConfigError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_u8(code).ok_or(ConfigError::InvalidMode)
    }
}

/// Rangefinder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    /// Layout version
    pub version: u8,
    /// Output mode the module was ordered with
    pub mode: OutputMode,
    /// Deadline for a single read cycle in milliseconds
    pub read_timeout_ms: u32,
    /// Interval between polled readings in milliseconds
    pub update_interval_ms: u32,
    /// Serial baud rate
    pub baudrate: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            mode: OutputMode::AutoContinuous,
            read_timeout_ms: 2000,
            update_interval_ms: 1000,
            baudrate: A02_BAUDRATE,
        }
    }
}

impl SensorConfig {
    /// Default configuration for the given mode
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Read deadline as a duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms as u64)
    }

    /// Polling interval as a duration
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms as u64)
    }

    /// Check the configuration for values the driver cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        // A deadline shorter than the trigger response delay can never succeed
        if (self.read_timeout_ms as u64) < RESPONSE_DELAY_MS
            || self.read_timeout_ms > MAX_READ_TIMEOUT_MS
        {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.update_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        if self.baudrate != A02_BAUDRATE {
            return Err(ConfigError::UnsupportedBaudrate);
        }
        Ok(())
    }

    /// Serialize into `buffer` with postcard
    ///
    /// Returns the number of bytes written.
    pub fn to_bytes(&self, buffer: &mut [u8]) -> Result<usize, ConfigError> {
        postcard::to_slice(self, buffer)
            .map(|used| used.len())
            .map_err(|_| ConfigError::Serialize)
    }

    /// Deserialize and validate a stored configuration
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: SensorConfig =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        if config.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_config() {
        let config = SensorConfig::default();
        assert_eq!(config.mode, OutputMode::AutoContinuous);
        assert_eq!(config.read_timeout(), Duration::from_secs(2));
        assert_eq!(config.baudrate, 9600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mode_codes() {
        assert_eq!(OutputMode::from_u8(1), Some(OutputMode::AutoContinuous));
        assert_eq!(OutputMode::from_u8(2), Some(OutputMode::ControlTriggered));
        assert_eq!(OutputMode::try_from(3), Err(ConfigError::InvalidMode));
        assert_eq!(OutputMode::ControlTriggered.as_u8(), MODE_UART_CONTROL);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SensorConfig::default();
        config.read_timeout_ms = 50;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTimeout));

        let mut config = SensorConfig::default();
        config.update_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidInterval));

        let mut config = SensorConfig::default();
        config.baudrate = 115_200;
        assert_eq!(config.validate(), Err(ConfigError::UnsupportedBaudrate));
    }

    #[test]
    fn test_persisted_config_loads() {
        let config = SensorConfig {
            read_timeout_ms: 500,
            ..SensorConfig::with_mode(OutputMode::ControlTriggered)
        };
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let len = config.to_bytes(&mut buffer).unwrap();

        let loaded = SensorConfig::from_bytes(&buffer[..len]).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_version_mismatch() {
        let config = SensorConfig {
            version: CONFIG_VERSION + 1,
            ..SensorConfig::default()
        };
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let len = config.to_bytes(&mut buffer).unwrap();
        assert_eq!(
            SensorConfig::from_bytes(&buffer[..len]),
            Err(ConfigError::VersionMismatch)
        );
    }

    #[test]
    fn test_truncated_bytes() {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let len = SensorConfig::default().to_bytes(&mut buffer).unwrap();
        assert_eq!(
            SensorConfig::from_bytes(&buffer[..len - 1]),
            Err(ConfigError::Deserialize)
        );
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buffer = [0u8; 2];
        assert_eq!(
            SensorConfig::default().to_bytes(&mut buffer),
            Err(ConfigError::Serialize)
        );
    }

    proptest! {
        #[test]
        fn prop_timeout_range(timeout in 0u32..120_000) {
            let config = SensorConfig { read_timeout_ms: timeout, ..SensorConfig::default() };
            let in_range = (70..=MAX_READ_TIMEOUT_MS).contains(&timeout);
            prop_assert_eq!(config.validate().is_ok(), in_range);
        }
    }
}
