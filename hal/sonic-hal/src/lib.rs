//! Sonic Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the rangefinder
//! drivers are written against. Chip-specific HALs (RP2040, ...) implement
//! them, and host tests substitute scripted fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Drivers (sonic-drivers: A02YYUW, ...)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sonic-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ sonic-hal-    │       │  host test    │
//! │    rp2040     │       │   doubles     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`serial::SerialPort`] - Buffered serial transport
//! - [`time::Timebase`] - Monotonic clock and cooperative delays

#![no_std]
#![deny(unsafe_code)]

pub mod serial;
pub mod time;

// Re-export key traits at crate root for convenience
pub use serial::{DataBits, Parity, SerialConfig, SerialPort, StopBits};
pub use time::Timebase;
