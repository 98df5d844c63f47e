//! Buffered serial port abstraction
//!
//! Models a UART whose receive side is backed by a driver-owned queue: the
//! caller can ask how many bytes are pending, drain them without blocking,
//! and discard them wholesale.

use embassy_time::Duration;

/// Buffered serial transport
///
/// All operations are synchronous. `read` returns immediately with whatever
/// is queued (or waits at most the configured read timeout), so callers that
/// need to wait for data poll [`SerialPort::bytes_available`] between
/// cooperative delays.
pub trait SerialPort {
    /// Error type for port operations
    type Error;

    /// Open the port
    ///
    /// Opening an already open port is a no-op.
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Close the port
    ///
    /// Closing an already closed port is a no-op.
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Check whether the port is open
    fn is_open(&self) -> bool;

    /// Write data to the port
    ///
    /// Blocks until all data has been queued for transmission.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Number of received bytes waiting to be read
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Read queued bytes into `buf`
    ///
    /// Returns the number of bytes copied, which may be less than
    /// `buf.len()`.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Discard every byte currently waiting in the receive queue
    fn clear_receive_buffer(&mut self) -> Result<(), Self::Error>;

    /// Set the upper bound a single `read` may wait for data
    fn set_read_timeout(&mut self, timeout: Duration);
}

/// Lend a port to a consumer without giving up ownership
impl<P: SerialPort + ?Sized> SerialPort for &mut P {
    type Error = P::Error;

    fn open(&mut self) -> Result<(), Self::Error> {
        (**self).open()
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write_blocking(data)
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        (**self).bytes_available()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }

    fn clear_receive_buffer(&mut self) -> Result<(), Self::Error> {
        (**self).clear_receive_buffer()
    }

    fn set_read_timeout(&mut self, timeout: Duration) {
        (**self).set_read_timeout(timeout)
    }
}

/// Serial line configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl SerialConfig {
    /// Line settings used by the A02 series: 9600 baud, 8N1
    pub const A02: Self = Self {
        baudrate: 9600,
        data_bits: DataBits::Eight,
        parity: Parity::None,
        stop_bits: StopBits::One,
    };
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::A02
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
