//! Driver traits
//!
//! These traits define the interface between application code and the
//! rangefinder drivers.

pub mod power;
pub mod ranger;

pub use power::SleepAware;
pub use ranger::{RangeError, RangeFinder};
