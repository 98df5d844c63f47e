//! Embassy time driver timebase

use embassy_time::{Duration, Instant, Timer};
use sonic_hal::Timebase;

/// [`Timebase`] backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyTimebase;

impl Timebase for EmbassyTimebase {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&mut self, duration: Duration) {
        Timer::after(duration).await
    }
}
