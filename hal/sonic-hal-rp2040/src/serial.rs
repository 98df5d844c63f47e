//! Buffered serial port on top of the embassy-rp UART driver
//!
//! embassy-rp's `BufferedUart` fills an interrupt-driven ring buffer but
//! does not report how many bytes it holds. [`BufferedSerialPort`] drains
//! that ring into its own queue whenever it is asked, which gives the
//! `bytes_available` / `clear_receive_buffer` semantics the drivers need.

use embassy_rp::uart::{Config as UartConfig, DataBits as RpDataBits, Parity as RpParity, StopBits as RpStopBits};
use embassy_time::Duration;
use embedded_io::{Read, ReadReady, Write};
use heapless::Deque;

use sonic_hal::{DataBits, Parity, SerialConfig, SerialPort, StopBits};

/// Default receive queue depth
pub const DEFAULT_RX_QUEUE: usize = 256;

/// Chunk size used when draining the UART ring buffer
const DRAIN_CHUNK: usize = 32;

/// Error from serial port operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// Operation on a closed port
    NotOpen,
    /// Framing error
    Framing,
    /// Overrun error
    Overrun,
    /// Other error
    Other,
}

fn io_error<E: embedded_io::Error>(e: E) -> SerialError {
    match e.kind() {
        embedded_io::ErrorKind::InvalidData => SerialError::Framing,
        embedded_io::ErrorKind::OutOfMemory => SerialError::Overrun,
        _ => SerialError::Other,
    }
}

/// Convert the shared line settings to an embassy-rp UART config
pub fn uart_config(config: &SerialConfig) -> UartConfig {
    let mut uart = UartConfig::default();
    uart.baudrate = config.baudrate;
    uart.data_bits = match config.data_bits {
        DataBits::Seven => RpDataBits::DataBits7,
        DataBits::Eight => RpDataBits::DataBits8,
    };
    uart.parity = match config.parity {
        Parity::None => RpParity::ParityNone,
        Parity::Even => RpParity::ParityEven,
        Parity::Odd => RpParity::ParityOdd,
    };
    uart.stop_bits = match config.stop_bits {
        StopBits::One => RpStopBits::STOP1,
        StopBits::Two => RpStopBits::STOP2,
    };
    uart
}

/// Serial port with a host-visible receive queue
///
/// `U` is usually an embassy-rp `BufferedUart`. The UART itself stays
/// configured for the life of the port; open/close gate access and reset
/// the queue. When the queue is full the oldest bytes are dropped, which
/// matches how a stale backlog is treated upstream.
pub struct BufferedSerialPort<U, const N: usize = DEFAULT_RX_QUEUE> {
    uart: U,
    queue: Deque<u8, N>,
    open: bool,
    read_timeout: Duration,
}

impl<U, const N: usize> BufferedSerialPort<U, N>
where
    U: Read + ReadReady + Write,
{
    /// Wrap a UART; the port starts closed
    pub fn new(uart: U) -> Self {
        Self {
            uart,
            queue: Deque::new(),
            open: false,
            read_timeout: Duration::from_secs(2),
        }
    }

    /// Current read timeout
    ///
    /// Reads never block on this port, so it is informational only.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Move everything the UART has received into the queue
    fn drain_uart(&mut self) -> Result<(), SerialError> {
        if !self.open {
            return Err(SerialError::NotOpen);
        }

        let mut chunk = [0u8; DRAIN_CHUNK];
        while self.uart.read_ready().map_err(io_error)? {
            let n = self.uart.read(&mut chunk).map_err(io_error)?;
            if n == 0 {
                break;
            }
            for &byte in &chunk[..n] {
                if self.queue.is_full() {
                    self.queue.pop_front();
                }
                let _ = self.queue.push_back(byte);
            }
        }
        Ok(())
    }
}

impl<U, const N: usize> SerialPort for BufferedSerialPort<U, N>
where
    U: Read + ReadReady + Write,
{
    type Error = SerialError;

    fn open(&mut self) -> Result<(), Self::Error> {
        if !self.open {
            self.open = true;
            self.queue.clear();
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.open = false;
        self.queue.clear();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if !self.open {
            return Err(SerialError::NotOpen);
        }
        self.uart.write_all(data).map_err(io_error)?;
        self.uart.flush().map_err(io_error)?;
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        self.drain_uart()?;
        Ok(self.queue.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.drain_uart()?;
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.queue.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }

    fn clear_receive_buffer(&mut self) -> Result<(), Self::Error> {
        self.drain_uart()?;
        self.queue.clear();
        Ok(())
    }

    fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = timeout;
    }
}
