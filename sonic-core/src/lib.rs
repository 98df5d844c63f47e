//! Board-agnostic core types for the rangefinder stack
//!
//! This crate contains everything a rangefinder driver shares with the
//! application, independent of the transport it talks over:
//!
//! - [`Distance`] measurement type
//! - Driver traits ([`RangeFinder`], [`SleepAware`]) and [`RangeError`]
//! - Sensor configuration with postcard persistence

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod distance;
pub mod traits;

pub use config::{ConfigError, OutputMode, SensorConfig};
pub use distance::Distance;
pub use traits::{RangeError, RangeFinder, SleepAware};
