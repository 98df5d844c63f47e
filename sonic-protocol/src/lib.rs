//! A02 Ultrasonic Sensor UART Protocol
//!
//! This crate defines the wire format spoken by the A02 series of
//! waterproof ultrasonic rangefinders (A02YYUW and relatives) on their
//! 9600 baud UART output.
//!
//! # Protocol Overview
//!
//! Every measurement is a fixed 4-byte frame:
//! ```text
//! ┌────────┬────────┬────────┬──────────┐
//! │ MARKER │ DATA_H │ DATA_L │ SUM      │
//! │ 0xFF   │ 1B     │ 1B     │ 1B       │
//! └────────┴────────┴────────┴──────────┘
//! ```
//!
//! `SUM` is the low byte of `MARKER + DATA_H + DATA_L` and the distance in
//! millimetres is `DATA_H * 256 + DATA_L`. The marker is not unique (a data
//! byte may also be 0xFF), so a frame boundary is only trusted once the
//! checksum at that offset agrees.
//!
//! In controlled mode the host requests each frame by writing
//! [`TRIGGER_BYTE`]; in auto mode the sensor emits frames on its own at up
//! to 10 Hz.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod frame;

pub use frame::{
    checksum, is_frame_at, scan_latest, Frame, FrameError, FRAME_LEN, FRAME_MARKER,
    MIN_SCAN_WINDOW, RESPONSE_DELAY_MS, TRIGGER_BYTE,
};
