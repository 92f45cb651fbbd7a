//! Transmit channel
//!
//! Owns the pulse output hardware and plays encoded frames one at a time.
//! Producers hold a [`Submitter`] and push frames into a bounded queue
//! without waiting for the hardware. When the queue is full the new frame is
//! refused with [`TransmitError::Busy`] and everything already queued plays
//! untouched, in submission order.

use core::fmt::Debug;

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel, signal::Signal};

use crate::waveform::{PulseSequence, PulseSpec, Symbol, TimingError};

/// Queue depth of the reference configuration
pub const TRANSMIT_QUEUE_DEPTH: usize = 4;

/// Symbols in one hardware memory block
pub const DEFAULT_MEM_BLOCK_SYMBOLS: usize = 64;

/// Pending frames between the producers and the hardware
pub type TransmitQueue<const CAP: usize, const DEPTH: usize> =
    Channel<CriticalSectionRawMutex, PulseSequence<CAP>, DEPTH>;

/// Completion signal, holds the outcome of the latest transmission
pub type TransmitSignal = Signal<CriticalSectionRawMutex, TransmitReport>;

/// Hardware that plays pulse symbols on the data line
pub trait PulseWriter {
    type Error: Debug;

    /// Play `pulses` to completion, then leave the line idle low
    fn write_pulses(&mut self, pulses: &[Symbol]) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitConfig {
    /// GPIO number of the data line
    pub pin: u8,
    /// Tick rate of the pulse clock
    pub resolution_hz: u32,
    /// Pending frames accepted before [`TransmitError::Busy`]
    pub queue_depth: usize,
    /// Hardware memory reserved for the channel, in symbols
    pub mem_block_symbols: usize,
}

impl TransmitConfig {
    pub const fn new(pin: u8, resolution_hz: u32, queue_depth: usize) -> Self {
        Self {
            pin,
            resolution_hz,
            queue_depth,
            mem_block_symbols: DEFAULT_MEM_BLOCK_SYMBOLS,
        }
    }

    /// WS2812B symbols for the configured resolution
    pub fn pulse_spec(&self) -> Result<PulseSpec, TimingError> {
        PulseSpec::ws2812b(self.resolution_hz)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Requested depth is zero or above the queue capacity
    QueueDepth { requested: usize, max: usize },
    /// Resolution cannot produce valid symbols
    Timing(TimingError),
    /// Output hardware could not be acquired
    Resource,
}

impl From<TimingError> for ConfigError {
    fn from(err: TimingError) -> Self {
        Self::Timing(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitError {
    /// Queue is full, the frame was dropped
    Busy,
    /// Frame was encoded for another clock resolution
    ResolutionMismatch { expected: u32, actual: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitReport {
    Completed { symbols: usize },
    Failed { symbols: usize },
    /// Frame dequeued after teardown
    Discarded,
}

/// Producer side of the transmit queue
#[derive(Clone, Copy)]
pub struct Submitter<'q, const CAP: usize, const DEPTH: usize> {
    queue: &'q TransmitQueue<CAP, DEPTH>,
    depth: usize,
    resolution_hz: u32,
}

impl<'q, const CAP: usize, const DEPTH: usize> Submitter<'q, CAP, DEPTH> {
    /// Producer for a queue served elsewhere. `depth` is capped to `DEPTH`.
    pub const fn new(queue: &'q TransmitQueue<CAP, DEPTH>, depth: usize, resolution_hz: u32) -> Self {
        Self {
            queue,
            depth: if depth < DEPTH { depth } else { DEPTH },
            resolution_hz,
        }
    }

    /// Queue a frame for transmission. Never waits for the hardware.
    pub fn submit(&self, sequence: PulseSequence<CAP>) -> Result<(), TransmitError> {
        if sequence.resolution_hz() != self.resolution_hz {
            return Err(TransmitError::ResolutionMismatch {
                expected: self.resolution_hz,
                actual: sequence.resolution_hz(),
            });
        }
        if self.queue.len() >= self.depth {
            return Err(TransmitError::Busy);
        }
        self.queue.try_send(sequence).map_err(|_| TransmitError::Busy)
    }

    /// Frames waiting for the hardware
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub const fn resolution_hz(&self) -> u32 {
        self.resolution_hz
    }
}

/// Consumer side, owns the hardware writer
pub struct TransmitChannel<'q, W: PulseWriter, const CAP: usize, const DEPTH: usize> {
    writer: Option<W>,
    queue: &'q TransmitQueue<CAP, DEPTH>,
    config: TransmitConfig,
    spec: PulseSpec,
    reports: Option<&'q TransmitSignal>,
}

impl<'q, W: PulseWriter, const CAP: usize, const DEPTH: usize> TransmitChannel<'q, W, CAP, DEPTH> {
    /// Validate `config`, derive the pulse symbols and acquire the hardware.
    ///
    /// Any failure here leaves nothing acquired.
    pub fn configure<F, E>(
        queue: &'q TransmitQueue<CAP, DEPTH>,
        config: TransmitConfig,
        acquire: F,
    ) -> Result<Self, ConfigError>
    where
        F: FnOnce(&TransmitConfig) -> Result<W, E>,
        E: Debug,
    {
        if config.queue_depth == 0 || config.queue_depth > DEPTH {
            return Err(ConfigError::QueueDepth {
                requested: config.queue_depth,
                max: DEPTH,
            });
        }
        let spec = config.pulse_spec()?;

        let writer = acquire(&config).map_err(|err| {
            log::error!(
                "transmit: failed to acquire output on GPIO {}: {:?}",
                config.pin,
                err
            );
            ConfigError::Resource
        })?;

        queue.clear();
        log::info!(
            "transmit: configured GPIO {} at {} Hz, queue depth {}",
            config.pin,
            config.resolution_hz,
            config.queue_depth
        );

        Ok(Self {
            writer: Some(writer),
            queue,
            config,
            spec,
            reports: None,
        })
    }

    /// Publish every transmission outcome on `signal`
    #[must_use]
    pub fn with_reports(mut self, signal: &'q TransmitSignal) -> Self {
        self.reports = Some(signal);
        self
    }

    pub const fn config(&self) -> &TransmitConfig {
        &self.config
    }

    /// Symbols matching this channel's resolution
    pub const fn pulse_spec(&self) -> PulseSpec {
        self.spec
    }

    pub fn submitter(&self) -> Submitter<'q, CAP, DEPTH> {
        Submitter {
            queue: self.queue,
            depth: self.config.queue_depth,
            resolution_hz: self.spec.resolution_hz(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.writer.is_some()
    }

    /// Play the oldest queued frame, if any
    pub fn try_transmit_next(&mut self) -> Option<TransmitReport> {
        let sequence = self.queue.try_receive().ok()?;
        Some(self.play(&sequence))
    }

    /// Wait for the next frame and play it
    pub async fn transmit_next(&mut self) -> TransmitReport {
        let sequence = self.queue.receive().await;
        self.play(&sequence)
    }

    /// Serve the queue until the channel is torn down
    pub async fn run(&mut self) {
        while self.is_configured() {
            self.transmit_next().await;
        }
    }

    /// Release the hardware and drop pending frames. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if let Some(writer) = self.writer.take() {
            drop(writer);
            self.queue.clear();
            log::info!("transmit: released GPIO {}", self.config.pin);
        }
    }

    fn play(&mut self, sequence: &PulseSequence<CAP>) -> TransmitReport {
        let symbols = sequence.len();
        let report = match self.writer.as_mut() {
            None => TransmitReport::Discarded,
            Some(writer) => match writer.write_pulses(sequence.as_slice()) {
                Ok(()) => TransmitReport::Completed { symbols },
                Err(err) => {
                    log::warn!("transmit: write of {} symbols failed: {:?}", symbols, err);
                    TransmitReport::Failed { symbols }
                }
            },
        };

        if let Some(signal) = self.reports {
            signal.signal(report);
        }
        report
    }
}

impl<W: PulseWriter, const CAP: usize, const DEPTH: usize> Drop for TransmitChannel<'_, W, CAP, DEPTH> {
    fn drop(&mut self) {
        self.teardown();
    }
}
