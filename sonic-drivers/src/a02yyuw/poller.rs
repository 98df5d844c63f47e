//! Periodic sampling on top of [`FrameDecoder`]

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;

use sonic_core::{Distance, RangeError};
use sonic_hal::{SerialPort, Timebase};

use super::decoder::FrameDecoder;

/// Sampling state, guarded separately from the decoder
struct Sampling {
    running: bool,
    interval: Duration,
}

/// Polling wrapper around a [`FrameDecoder`]
///
/// One task drives [`run`](Self::run); any number of others can start and
/// stop sampling, take on-demand readings and wait for updates. Start/stop
/// transitions are serialized by their own lock, so they wait for an
/// in-flight read to finish but never hold up reads themselves.
pub struct PollingRanger<M: RawMutex, P: SerialPort, T: Timebase> {
    decoder: Mutex<M, FrameDecoder<P, T>>,
    sampling: Mutex<M, Sampling>,
    /// Wakes a parked polling loop
    started: Signal<M, ()>,
    updates: Signal<M, Distance>,
    /// Copy of the decoder's latest reading, readable without the decoder lock
    latest: BlockingMutex<M, Cell<Option<Distance>>>,
}

impl<M: RawMutex, P: SerialPort, T: Timebase> PollingRanger<M, P, T> {
    /// Wrap a decoder; sampling starts stopped
    pub fn new(decoder: FrameDecoder<P, T>) -> Self {
        let interval = decoder.config().update_interval();
        let latest = decoder.latest();
        Self {
            decoder: Mutex::new(decoder),
            sampling: Mutex::new(Sampling {
                running: false,
                interval,
            }),
            started: Signal::new(),
            updates: Signal::new(),
            latest: BlockingMutex::new(Cell::new(latest)),
        }
    }

    /// Start sampling
    ///
    /// Reopens the port if a sleep closed it and wakes the polling loop.
    /// `None` keeps the current interval (initially the configured update
    /// interval).
    pub async fn start_updating(&self, interval: Option<Duration>) -> Result<(), RangeError> {
        let mut sampling = self.sampling.lock().await;
        self.decoder.lock().await.ensure_open()?;
        if let Some(interval) = interval {
            sampling.interval = interval;
        }
        sampling.running = true;
        self.started.signal(());
        Ok(())
    }

    /// Stop sampling
    ///
    /// The polling loop parks after its current cycle until sampling is
    /// started again.
    pub async fn stop_updating(&self) {
        self.sampling.lock().await.running = false;
    }

    /// Check whether sampling is active
    pub async fn is_updating(&self) -> bool {
        self.sampling.lock().await.running
    }

    /// Polling loop
    ///
    /// Reads, publishes each new distance, then sleeps for the interval.
    /// Read failures are logged and the loop carries on. While sampling is
    /// stopped the loop waits for [`start_updating`](Self::start_updating);
    /// it never returns.
    pub async fn run<B: Timebase>(&self, timebase: &mut B) {
        loop {
            let interval = self.wait_until_running().await;

            match self.read().await {
                Ok(Some(distance)) => self.updates.signal(distance),
                Ok(None) => {}
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("A02 poll failed: {:?}", _e);
                }
            }

            timebase.sleep(interval).await;
        }
    }

    /// Current interval once sampling is running
    async fn wait_until_running(&self) -> Duration {
        loop {
            {
                let sampling = self.sampling.lock().await;
                if sampling.running {
                    return sampling.interval;
                }
            }
            // A start that raced with the check leaves the signal set
            self.started.wait().await;
        }
    }

    /// Take one on-demand reading
    pub async fn read(&self) -> Result<Option<Distance>, RangeError> {
        let mut decoder = self.decoder.lock().await;
        let result = decoder.read().await;
        self.latest.lock(|latest| latest.set(decoder.latest()));
        result
    }

    /// Most recent validated distance
    ///
    /// Does not wait for a read in progress.
    pub fn latest(&self) -> Option<Distance> {
        self.latest.lock(|latest| latest.get())
    }

    /// Wait for the next distance published by the polling loop
    pub async fn wait_for_update(&self) -> Distance {
        self.updates.wait().await
    }

    /// Forward the pre-sleep hook to the decoder
    pub async fn before_sleep(&self) -> Result<(), RangeError> {
        self.decoder.lock().await.before_sleep()
    }

    /// Forward the post-wake hook to the decoder
    pub async fn after_wake(&self) -> Result<(), RangeError> {
        self.decoder.lock().await.after_wake()
    }

    /// Unwrap the decoder
    pub fn into_inner(self) -> FrameDecoder<P, T> {
        self.decoder.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a02yyuw::decoder::PortOwnership;
    use crate::a02yyuw::mock::{MockPort, VirtualClock};
    use embassy_futures::block_on;
    use embassy_futures::select::{select, Either};
    use embassy_futures::yield_now;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use sonic_core::{OutputMode, SensorConfig};
    use sonic_protocol::Frame;

    type TestRanger = PollingRanger<NoopRawMutex, MockPort, VirtualClock>;

    fn ranger(clock: &VirtualClock, mode: OutputMode) -> TestRanger {
        let decoder = FrameDecoder::new(
            MockPort::opened(clock),
            clock.clone(),
            PortOwnership::Owned,
            SensorConfig::with_mode(mode),
        )
        .unwrap();
        PollingRanger::new(decoder)
    }

    #[test]
    fn test_on_demand_read() {
        let clock = VirtualClock::default();
        let ranger = ranger(&clock, OutputMode::AutoContinuous);
        block_on(async {
            ranger.decoder.lock().await.port_mut().push_frame(900);
            ranger.decoder.lock().await.port_mut().rx.extend([0x00; 3]);

            let distance = ranger.read().await.unwrap();
            assert_eq!(distance, Some(Distance::from_millimeters(900)));
            assert_eq!(ranger.latest(), distance);
        });
    }

    #[test]
    fn test_latest_does_not_wait_for_decoder() {
        let clock = VirtualClock::default();
        let ranger = ranger(&clock, OutputMode::ControlTriggered);
        block_on(async {
            ranger
                .decoder
                .lock()
                .await
                .port_mut()
                .respond_with(&Frame::from_distance_mm(350).to_bytes());
            ranger.read().await.unwrap();

            // A read in progress holds the decoder lock
            let _busy = ranger.decoder.lock().await;
            assert_eq!(ranger.latest(), Some(Distance::from_millimeters(350)));
        });
    }

    #[test]
    fn test_run_parks_when_not_started() {
        let clock = VirtualClock::default();
        let ranger = ranger(&clock, OutputMode::ControlTriggered);
        let mut timebase = clock.clone();

        block_on(async {
            let idle = async {
                for _ in 0..10 {
                    yield_now().await;
                }
            };
            assert!(matches!(
                select(ranger.run(&mut timebase), idle).await,
                Either::Second(())
            ));
        });
        assert_eq!(clock.elapsed_ms(), 0);
        assert_eq!(ranger.into_inner().port().triggers(), 0);
    }

    #[test]
    fn test_polling_publishes_until_stopped() {
        let clock = VirtualClock::default();
        let ranger = ranger(&clock, OutputMode::ControlTriggered);
        let mut timebase = clock.clone();

        block_on(async {
            {
                let mut decoder = ranger.decoder.lock().await;
                let port = decoder.port_mut();
                port.respond_with(&Frame::from_distance_mm(100).to_bytes());
                port.respond_with(&Frame::from_distance_mm(200).to_bytes());
            }
            ranger
                .start_updating(Some(Duration::from_millis(500)))
                .await
                .unwrap();
            assert!(ranger.is_updating().await);

            let consumer = async {
                let first = ranger.wait_for_update().await;
                let second = ranger.wait_for_update().await;
                ranger.stop_updating().await;
                (first, second)
            };
            let (first, second) = match select(ranger.run(&mut timebase), consumer).await {
                Either::First(()) => unreachable!("polling loop returned"),
                Either::Second(updates) => updates,
            };

            assert_eq!(first, Distance::from_millimeters(100));
            assert_eq!(second, Distance::from_millimeters(200));
            assert!(!ranger.is_updating().await);
            assert_eq!(ranger.latest(), Some(second));
        });

        // Two triggered reads, each followed by an interval
        assert_eq!(clock.elapsed_ms(), 2 * (70 + 500));
    }

    #[test]
    fn test_restart_resumes_polling() {
        let clock = VirtualClock::default();
        let ranger = ranger(&clock, OutputMode::ControlTriggered);
        let mut timebase = clock.clone();

        block_on(async {
            {
                let mut decoder = ranger.decoder.lock().await;
                let port = decoder.port_mut();
                port.respond_with(&Frame::from_distance_mm(100).to_bytes());
                port.respond_with(&Frame::from_distance_mm(200).to_bytes());
            }
            ranger.start_updating(None).await.unwrap();

            let consumer = async {
                let first = ranger.wait_for_update().await;
                ranger.stop_updating().await;

                // Let the loop observe the stop and park
                for _ in 0..3 {
                    yield_now().await;
                }
                let parked_at = clock.elapsed_ms();
                assert_eq!(ranger.decoder.lock().await.port().triggers(), 1);

                ranger.start_updating(None).await.unwrap();
                let second = ranger.wait_for_update().await;
                (first, parked_at, second)
            };
            let (first, parked_at, second) =
                match select(ranger.run(&mut timebase), consumer).await {
                    Either::First(()) => unreachable!("polling loop returned"),
                    Either::Second(result) => result,
                };

            assert_eq!(first, Distance::from_millimeters(100));
            assert_eq!(second, Distance::from_millimeters(200));
            // One configured interval, then the restarted cycle
            assert_eq!(parked_at, 70 + 1000);
            assert_eq!(ranger.decoder.lock().await.port().triggers(), 2);
        });
    }

    #[test]
    fn test_start_reopens_port_after_sleep() {
        let clock = VirtualClock::default();
        let ranger = ranger(&clock, OutputMode::AutoContinuous);

        block_on(async {
            ranger.before_sleep().await.unwrap();
            assert!(!ranger.decoder.lock().await.port().is_open());

            ranger.after_wake().await.unwrap();
            ranger.start_updating(None).await.unwrap();
            assert!(ranger.decoder.lock().await.port().is_open());
        });
    }

    #[test]
    fn test_start_reports_unavailable_port() {
        let clock = VirtualClock::default();
        let ranger = ranger(&clock, OutputMode::AutoContinuous);

        block_on(async {
            ranger.before_sleep().await.unwrap();
            ranger.decoder.lock().await.port_mut().fail_open = true;

            assert_eq!(
                ranger.start_updating(None).await,
                Err(RangeError::TransportUnavailable)
            );
            assert!(!ranger.is_updating().await);
        });
    }
}
