//! Rangefinder driver implementations
//!
//! This crate provides concrete drivers for the traits defined in
//! sonic-core, written against the transport traits of sonic-hal:
//!
//! - A02YYUW ultrasonic sensor (UART controlled and UART auto output)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod a02yyuw;
