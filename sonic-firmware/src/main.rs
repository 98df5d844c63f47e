//! Sonic - A02YYUW Rangefinder Firmware
//!
//! Main firmware binary for RP2040 boards with a DFRobot A02YYUW
//! ultrasonic sensor on UART0 (GPIO0 = TX to the sensor RX pin,
//! GPIO1 = RX from the sensor TX pin).
//!
//! The sensor runs in UART auto mode by default. Build with the
//! `control-mode` feature when the sensor RX line is wired for
//! triggered measurements.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use sonic_core::config::{OutputMode, SensorConfig};
use sonic_drivers::a02yyuw::{FrameDecoder, PortOwnership};
use sonic_hal::SerialConfig;
use sonic_hal_rp2040::{uart_config, BufferedSerialPort, EmbassyTimebase};

use crate::tasks::Ranger;

mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Shared between the polling and report tasks
static RANGER: StaticCell<Ranger> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Sonic firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = sensor_config();
    info!(
        "Sensor config: mode={}, timeout={}ms, interval={}ms",
        config.mode.as_u8(),
        config.read_timeout_ms,
        config.update_interval_ms
    );

    // Setup UART for the sensor (9600 8N1)
    let line = SerialConfig {
        baudrate: config.baudrate,
        ..SerialConfig::A02
    };

    let tx_buf = TX_BUF.init([0u8; 16]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config(&line));
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);

    info!("UART initialized for A02YYUW at {} baud", line.baudrate);

    let port = BufferedSerialPort::new(uart);
    let decoder = match FrameDecoder::new(port, EmbassyTimebase, PortOwnership::Owned, config) {
        Ok(decoder) => decoder,
        Err(e) => {
            error!("Sensor port unavailable: {:?}", e);
            return;
        }
    };

    let ranger: &'static Ranger = RANGER.init(Ranger::new(decoder));
    if let Err(e) = ranger.start_updating(None).await {
        error!("Failed to start sampling: {:?}", e);
        return;
    }

    info!("Spawning tasks...");

    spawner.spawn(tasks::ranger_task(ranger).unwrap());
    spawner.spawn(tasks::report_task(ranger).unwrap());

    info!("All tasks spawned, firmware running");
}

/// Build the sensor configuration for this image
///
/// Falls back to defaults if the compiled-in settings fail validation.
fn sensor_config() -> SensorConfig {
    let mode = if cfg!(feature = "control-mode") {
        OutputMode::ControlTriggered
    } else {
        OutputMode::AutoContinuous
    };

    let config = SensorConfig::with_mode(mode);
    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            warn!("Invalid sensor config ({:?}), using defaults", e);
            SensorConfig::default()
        }
    }
}
