//! Distance reporting task

use defmt::*;

use super::ranger::Ranger;

/// Report task - logs every distance the ranger publishes
#[embassy_executor::task]
pub async fn report_task(ranger: &'static Ranger) {
    info!("Report task started");

    loop {
        let distance = ranger.wait_for_update().await;
        info!(
            "Distance: {} mm ({} cm)",
            distance.millimeters(),
            distance.centimeters()
        );
    }
}
