//! A02YYUW waterproof ultrasonic rangefinder
//!
//! The sensor reports distance over a 9600 baud 8N1 UART in one of two
//! output modes, fixed when the module is ordered:
//!
//! - **UART controlled**: each frame is requested by writing a zero byte
//!   and arrives after ~70 ms.
//! - **UART auto**: frames are pushed at up to 10 Hz whether or not anyone
//!   reads them, so a read has to find the newest complete frame in
//!   whatever has piled up in the receive queue.
//!
//! # Pinout
//!
//! 1. (red) VCC 3.3-5 V
//! 2. (black) GND
//! 3. (yellow) RX, trigger input in controlled mode
//! 4. (white) TX, frame output
//!
//! [`FrameDecoder`] owns the framing logic; [`PollingRanger`] wraps it for
//! periodic sampling from a task.

mod decoder;
mod poller;

#[cfg(test)]
mod mock;

pub use decoder::{
    FrameDecoder, PortOwnership, AUTO_BUFFER_SIZE, CONTROL_BUFFER_SIZE, POLL_INTERVAL_MS,
};
pub use poller::PollingRanger;
