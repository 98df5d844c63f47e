//! Sensor polling task

use defmt::*;
use embassy_rp::uart::BufferedUart;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use sonic_drivers::a02yyuw::PollingRanger;
use sonic_hal_rp2040::{BufferedSerialPort, EmbassyTimebase};

/// Concrete ranger type shared between tasks
pub type Ranger =
    PollingRanger<CriticalSectionRawMutex, BufferedSerialPort<BufferedUart>, EmbassyTimebase>;

/// Ranger task - drives the polling loop
///
/// The loop parks while sampling is stopped, so this task lives for the
/// whole firmware run.
#[embassy_executor::task]
pub async fn ranger_task(ranger: &'static Ranger) {
    info!("Ranger task started");

    let mut timebase = EmbassyTimebase;
    ranger.run(&mut timebase).await;
}
