//! Configuration types
//!
//! Sensor configuration stored as postcard binary data.

pub mod sensor;

pub use sensor::*;
