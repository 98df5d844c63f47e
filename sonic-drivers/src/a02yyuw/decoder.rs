//! Frame recovery for the A02 UART output modes

use embassy_time::{Duration, Instant};
use heapless::Vec;

use sonic_core::{Distance, OutputMode, RangeError, RangeFinder, SensorConfig, SleepAware};
use sonic_hal::{SerialPort, Timebase};
use sonic_protocol::{
    is_frame_at, scan_latest, Frame, FRAME_LEN, MIN_SCAN_WINDOW, RESPONSE_DELAY_MS, TRIGGER_BYTE,
};

/// Receive buffer size in auto mode
///
/// At 10 Hz the sensor produces 40 bytes/s, so this holds about five
/// seconds of frames between reads.
pub const AUTO_BUFFER_SIZE: usize = 200;

/// Receive window in controlled mode (exactly one frame)
pub const CONTROL_BUFFER_SIZE: usize = FRAME_LEN;

/// Drain-wait poll interval in auto mode
pub const POLL_INTERVAL_MS: u64 = 100;

/// Trailing bytes kept between auto-mode reads
const MAX_CARRY: usize = FRAME_LEN - 1;

/// Who is responsible for closing the serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortOwnership {
    /// The decoder opened the port for itself and closes it on sleep and
    /// teardown
    Owned,
    /// The port belongs to the caller and is left open
    Borrowed,
}

/// A02YYUW frame decoder
///
/// Recovers one checksum-validated distance frame per [`read`](Self::read)
/// from a serial port, using the strategy that matches the sensor's output
/// mode. Every read is bounded by the configured read timeout.
pub struct FrameDecoder<P: SerialPort, T: Timebase> {
    port: P,
    timebase: T,
    ownership: PortOwnership,
    config: SensorConfig,
    /// Receive storage, sized for auto mode
    ///
    /// The mode is a runtime setting, so both modes share this array and
    /// only `capacity` differs: controlled mode never touches more than the
    /// first [`CONTROL_BUFFER_SIZE`] bytes.
    buffer: [u8; AUTO_BUFFER_SIZE],
    capacity: usize,
    /// Unconsumed tail of the previous auto-mode window
    carry: Vec<u8, MAX_CARRY>,
    latest: Option<Distance>,
    released: bool,
}

impl<P: SerialPort, T: Timebase> FrameDecoder<P, T> {
    /// Create a decoder and prepare the port
    ///
    /// Rejects a configuration that fails [`SensorConfig::validate`] before
    /// touching the port. Otherwise propagates the read timeout to the port,
    /// opens it if needed and discards anything already queued.
    pub fn new(
        mut port: P,
        timebase: T,
        ownership: PortOwnership,
        config: SensorConfig,
    ) -> Result<Self, RangeError> {
        config.validate().map_err(RangeError::InvalidConfig)?;

        port.set_read_timeout(config.read_timeout());
        if !port.is_open() {
            port.open().map_err(|_| RangeError::TransportUnavailable)?;
        }
        port.clear_receive_buffer()
            .map_err(|_| RangeError::Transport)?;

        let capacity = match config.mode {
            OutputMode::AutoContinuous => AUTO_BUFFER_SIZE,
            OutputMode::ControlTriggered => CONTROL_BUFFER_SIZE,
        };

        Ok(Self {
            port,
            timebase,
            ownership,
            config,
            buffer: [0; AUTO_BUFFER_SIZE],
            capacity,
            carry: Vec::new(),
            latest: None,
            released: false,
        })
    }

    /// Output mode this decoder was built for
    pub fn mode(&self) -> OutputMode {
        self.config.mode
    }

    /// Port ownership
    pub fn ownership(&self) -> PortOwnership {
        self.ownership
    }

    /// Active configuration
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Receive buffer capacity for the current mode
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent validated distance
    pub fn latest(&self) -> Option<Distance> {
        self.latest
    }

    /// Shared access to the port
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Exclusive access to the port
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Open the port if a sleep or the caller closed it
    ///
    /// Anything that queued up while the port was closed is stale and is
    /// discarded along with the carried tail.
    pub fn ensure_open(&mut self) -> Result<(), RangeError> {
        if self.released {
            return Err(RangeError::TransportUnavailable);
        }
        if !self.port.is_open() {
            self.port
                .open()
                .map_err(|_| RangeError::TransportUnavailable)?;
            self.port
                .clear_receive_buffer()
                .map_err(|_| RangeError::Transport)?;
            self.carry.clear();
        }
        Ok(())
    }

    /// Take one measurement
    ///
    /// Returns `Ok(None)` in auto mode when the drained window held no valid
    /// frame. Controlled mode keeps re-triggering until a frame validates or
    /// the deadline passes.
    pub async fn read(&mut self) -> Result<Option<Distance>, RangeError> {
        self.ensure_open()?;
        let deadline = self.timebase.deadline(self.config.read_timeout());

        let distance = match self.config.mode {
            OutputMode::ControlTriggered => Some(self.read_triggered(deadline).await?),
            OutputMode::AutoContinuous => self.read_continuous(deadline).await?,
        };

        if let Some(distance) = distance {
            self.latest = Some(distance);
        }
        Ok(distance)
    }

    /// Trigger, wait for the response, validate; repeat until success
    async fn read_triggered(&mut self, deadline: Instant) -> Result<Distance, RangeError> {
        loop {
            self.port
                .write_blocking(&[TRIGGER_BYTE])
                .map_err(|_| RangeError::Transport)?;
            self.timebase
                .sleep(Duration::from_millis(RESPONSE_DELAY_MS))
                .await;

            let window = &mut self.buffer[..CONTROL_BUFFER_SIZE];
            let read = self
                .port
                .read(window)
                .map_err(|_| RangeError::Transport)?;
            if read == FRAME_LEN && is_frame_at(window, 0) {
                return Ok(decode_at(window, 0));
            }

            #[cfg(feature = "defmt")]
            defmt::trace!("A02: rejected {} byte response, re-triggering", read);

            // Drop the partial or corrupt response before the next trigger
            self.port
                .clear_receive_buffer()
                .map_err(|_| RangeError::Transport)?;

            if self.timebase.expired(deadline) {
                #[cfg(feature = "defmt")]
                defmt::warn!("A02: no valid response before deadline");
                return Err(RangeError::Timeout);
            }
        }
    }

    /// Drain the receive queue and pick the newest valid frame
    async fn read_continuous(&mut self, deadline: Instant) -> Result<Option<Distance>, RangeError> {
        let mut available = self
            .port
            .bytes_available()
            .map_err(|_| RangeError::Transport)?;

        // A backlog this large is stale; only the newest reading matters
        if available >= self.capacity {
            #[cfg(feature = "defmt")]
            defmt::debug!("A02: discarding {} byte backlog", available);

            self.port
                .clear_receive_buffer()
                .map_err(|_| RangeError::Transport)?;
            self.carry.clear();
            available = 0;
        }

        while available < MIN_SCAN_WINDOW {
            if self.timebase.expired(deadline) {
                #[cfg(feature = "defmt")]
                defmt::warn!("A02: stream stalled at {} bytes", available);
                return Err(RangeError::Timeout);
            }
            self.timebase
                .sleep(Duration::from_millis(POLL_INTERVAL_MS))
                .await;
            available = self
                .port
                .bytes_available()
                .map_err(|_| RangeError::Transport)?;
        }

        let carried = self.carry.len();
        self.buffer[..carried].copy_from_slice(&self.carry);
        let wanted = available.min(self.capacity - carried);
        let read = self
            .port
            .read(&mut self.buffer[carried..carried + wanted])
            .map_err(|_| RangeError::Transport)?;

        let window = &self.buffer[..carried + read];
        let found = scan_latest(window);

        // Keep at most a partial frame for the next window
        let consumed = found.map_or(0, |offset| offset + FRAME_LEN);
        let tail_start = consumed.max(window.len().saturating_sub(MAX_CARRY));
        self.carry.clear();
        // Cannot fail: the tail is at most MAX_CARRY bytes
        let _ = self.carry.extend_from_slice(&window[tail_start..]);

        match found {
            Some(offset) => Ok(Some(decode_at(window, offset))),
            None => {
                #[cfg(feature = "defmt")]
                defmt::trace!("A02: no frame in {} byte window", window.len());
                Ok(None)
            }
        }
    }

    /// Close an owned port before the platform sleeps
    ///
    /// The port is reopened lazily by the next read.
    pub fn before_sleep(&mut self) -> Result<(), RangeError> {
        if self.ownership == PortOwnership::Owned && self.port.is_open() {
            self.port.close().map_err(|_| RangeError::Transport)?;
        }
        self.carry.clear();
        Ok(())
    }

    /// Nothing to restore; the next read reopens the port
    pub fn after_wake(&mut self) -> Result<(), RangeError> {
        Ok(())
    }

    /// Release the port
    ///
    /// Closes it if owned. Safe to call more than once; also runs on drop.
    /// Reads after shutdown fail with [`RangeError::TransportUnavailable`].
    pub fn shutdown(&mut self) -> Result<(), RangeError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.carry.clear();
        if self.ownership == PortOwnership::Owned && self.port.is_open() {
            self.port.close().map_err(|_| RangeError::Transport)?;
        }
        Ok(())
    }
}

impl<P: SerialPort, T: Timebase> Drop for FrameDecoder<P, T> {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

impl<P: SerialPort, T: Timebase> RangeFinder for FrameDecoder<P, T> {
    async fn measure(&mut self) -> Result<Option<Distance>, RangeError> {
        self.read().await
    }

    fn latest(&self) -> Option<Distance> {
        self.latest
    }
}

impl<P: SerialPort, T: Timebase> SleepAware for FrameDecoder<P, T> {
    async fn before_sleep(&mut self) -> Result<(), RangeError> {
        FrameDecoder::before_sleep(self)
    }

    async fn after_wake(&mut self) -> Result<(), RangeError> {
        FrameDecoder::after_wake(self)
    }
}

/// Distance of the frame at a validated offset
fn decode_at(buffer: &[u8], offset: usize) -> Distance {
    Distance::from(Frame {
        high: buffer[offset + 1],
        low: buffer[offset + 2],
    })
}
