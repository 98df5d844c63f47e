//! RP2040-specific HAL for the rangefinder stack
//!
//! This crate provides RP2040 implementations of the shared `sonic-hal`
//! traits:
//!
//! - Buffered serial port over an embassy-rp `BufferedUart`
//!   (implements `sonic_hal::SerialPort`)
//! - Embassy time driver timebase (implements `sonic_hal::Timebase`)

#![no_std]

pub mod serial;
pub mod time;

// Re-export shared traits from sonic-hal for convenience
pub use sonic_hal::{SerialConfig, SerialPort as SerialPortTrait, Timebase as TimebaseTrait};

pub use serial::{uart_config, BufferedSerialPort, SerialError};
pub use time::EmbassyTimebase;
