//! Frame decoding for the A02 UART protocol.
//!
//! Frame format:
//! - MARKER (1 byte): 0xFF start indicator (not unique in the stream)
//! - DATA_H (1 byte): distance high byte
//! - DATA_L (1 byte): distance low byte
//! - SUM (1 byte): low 8 bits of MARKER + DATA_H + DATA_L

/// Frame start marker
pub const FRAME_MARKER: u8 = 0xFF;

/// Length of a complete frame in bytes
pub const FRAME_LEN: usize = 4;

/// Byte written by the host to request a frame in controlled mode
///
/// All bits low makes a single high-low-high pulse on the sensor's RX line.
pub const TRIGGER_BYTE: u8 = 0x00;

/// Minimum delay between a trigger and the response frame
pub const RESPONSE_DELAY_MS: u64 = 70;

/// Smallest window that always contains one complete frame
///
/// A window may open in the middle of a frame, so up to three leading
/// bytes can belong to the previous one.
pub const MIN_SCAN_WINDOW: usize = 2 * FRAME_LEN - 1;

/// Errors that can occur while parsing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Fewer than [`FRAME_LEN`] bytes
    Incomplete,
    /// First byte is not [`FRAME_MARKER`]
    MissingMarker,
    /// Checksum mismatch
    InvalidChecksum,
}

/// A validated distance frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Distance high byte
    pub high: u8,
    /// Distance low byte
    pub low: u8,
}

impl Frame {
    /// Create a frame carrying the given distance
    pub const fn from_distance_mm(distance_mm: u16) -> Self {
        let [high, low] = distance_mm.to_be_bytes();
        Self { high, low }
    }

    /// Parse a frame from the first [`FRAME_LEN`] bytes of `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < FRAME_LEN {
            return Err(FrameError::Incomplete);
        }
        if bytes[0] != FRAME_MARKER {
            return Err(FrameError::MissingMarker);
        }
        if checksum(bytes[0], bytes[1], bytes[2]) != bytes[3] {
            return Err(FrameError::InvalidChecksum);
        }

        Ok(Self {
            high: bytes[1],
            low: bytes[2],
        })
    }

    /// Decoded distance in millimetres (`DATA_H * 256 + DATA_L`)
    pub const fn distance_mm(&self) -> u16 {
        u16::from_be_bytes([self.high, self.low])
    }

    /// Checksum byte for this frame
    pub const fn checksum(&self) -> u8 {
        checksum(FRAME_MARKER, self.high, self.low)
    }

    /// Wire representation of this frame
    pub const fn to_bytes(&self) -> [u8; FRAME_LEN] {
        [FRAME_MARKER, self.high, self.low, self.checksum()]
    }
}

/// Low byte of the sum of marker and data bytes
///
/// Summed in 16 bits so the carry is dropped only by the final mask.
pub const fn checksum(marker: u8, high: u8, low: u8) -> u8 {
    let sum = marker as u16 + high as u16 + low as u16;
    (sum & 0x00FF) as u8
}

/// Check whether a valid frame starts at `offset` in `buffer`
///
/// This is the only test used to locate frame boundaries. An offset whose
/// four-byte window runs past the end of `buffer` is never a frame.
pub fn is_frame_at(buffer: &[u8], offset: usize) -> bool {
    let Some(end) = offset.checked_add(FRAME_LEN) else {
        return false;
    };
    match buffer.get(offset..end) {
        Some(window) => {
            window[0] == FRAME_MARKER && checksum(window[0], window[1], window[2]) == window[3]
        }
        None => false,
    }
}

/// Find the most recent frame in `buffer`
///
/// Scans backward from the last offset that can hold a whole frame down to
/// offset 0 and returns the first hit, so newer frames win over older ones.
pub fn scan_latest(buffer: &[u8]) -> Option<usize> {
    let last = buffer.len().checked_sub(FRAME_LEN)?;
    (0..=last).rev().find(|&offset| is_frame_at(buffer, offset))
}
