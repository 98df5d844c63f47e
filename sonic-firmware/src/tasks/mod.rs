//! Embassy async tasks
//!
//! The ranger task drives the sensor; the report task consumes the
//! distances it publishes.

pub mod ranger;
pub mod report;

pub use ranger::{ranger_task, Ranger};
pub use report::report_task;
