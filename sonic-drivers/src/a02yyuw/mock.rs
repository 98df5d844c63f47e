//! Test doubles: a scripted serial port and a virtual clock

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embassy_time::{Duration, Instant};
use sonic_hal::{SerialPort, Timebase};
use sonic_protocol::{Frame, RESPONSE_DELAY_MS, TRIGGER_BYTE};

/// Clock that only moves when someone sleeps on it
///
/// Clones share the same time, so a port and a decoder can agree on "now".
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now_ms: Rc<Cell<u64>>,
}

impl VirtualClock {
    pub fn elapsed_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

impl Timebase for VirtualClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.now_ms.get())
    }

    async fn sleep(&mut self, duration: Duration) {
        self.now_ms.set(self.now_ms.get() + duration.as_millis());
        // Let other futures in a join/select make progress
        embassy_futures::yield_now().await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortError;

/// Serial port whose receive queue is fed from a script
#[derive(Debug, Default)]
pub struct MockPort {
    pub clock: VirtualClock,
    pub open: bool,
    pub fail_open: bool,
    pub rx: VecDeque<u8>,
    /// Bytes that land in `rx` once the clock reaches the given time
    pub scheduled: VecDeque<(u64, Vec<u8>)>,
    /// Replies queued one per trigger write, delivered after the response delay
    pub responses: VecDeque<Vec<u8>>,
    pub written: Vec<u8>,
    pub read_timeout: Option<Duration>,
    pub opens: usize,
    pub closes: usize,
    pub clears: usize,
}

impl MockPort {
    pub fn new(clock: &VirtualClock) -> Self {
        Self {
            clock: clock.clone(),
            ..Self::default()
        }
    }

    pub fn opened(clock: &VirtualClock) -> Self {
        Self {
            open: true,
            ..Self::new(clock)
        }
    }

    pub fn push_frame(&mut self, distance_mm: u16) {
        self.rx.extend(Frame::from_distance_mm(distance_mm).to_bytes());
    }

    pub fn schedule(&mut self, at_ms: u64, bytes: &[u8]) {
        self.scheduled.push_back((at_ms, bytes.to_vec()));
    }

    pub fn respond_with(&mut self, bytes: &[u8]) {
        self.responses.push_back(bytes.to_vec());
    }

    pub fn triggers(&self) -> usize {
        self.written.iter().filter(|&&b| b == TRIGGER_BYTE).count()
    }

    fn deliver_due(&mut self) {
        let now = self.clock.elapsed_ms();
        while let Some((at, _)) = self.scheduled.front() {
            if *at > now {
                break;
            }
            if let Some((_, bytes)) = self.scheduled.pop_front() {
                self.rx.extend(bytes);
            }
        }
    }
}

impl SerialPort for MockPort {
    type Error = PortError;

    fn open(&mut self) -> Result<(), Self::Error> {
        if self.fail_open {
            return Err(PortError);
        }
        if !self.open {
            self.open = true;
            self.opens += 1;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        if self.open {
            self.open = false;
            self.closes += 1;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if !self.open {
            return Err(PortError);
        }
        self.written.extend_from_slice(data);
        if data.contains(&TRIGGER_BYTE) {
            if let Some(reply) = self.responses.pop_front() {
                let at = self.clock.elapsed_ms() + RESPONSE_DELAY_MS;
                self.scheduled.push_back((at, reply));
            }
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        if !self.open {
            return Err(PortError);
        }
        self.deliver_due();
        Ok(self.rx.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if !self.open {
            return Err(PortError);
        }
        self.deliver_due();
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.rx.pop_front() {
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
        self.deliver_due();
        self.rx.clear();
        self.clears += 1;
        Ok(())
    }

    fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = Some(timeout);
    }
}
