//! Waveform encoder
//!
//! The strip is clocked by the data line itself: every bit is a high period
//! followed by a low period, and the ratio between the two tells a `0` from a
//! `1`. Durations are expressed in ticks of the transmit clock and are derived
//! once from its resolution.
//!
//! WS2812B reference timings:
//! - `0` bit: 400 ns high, 850 ns low
//! - `1` bit: 800 ns high, 450 ns low
//! - tolerance: ±150 ns per level
//!
//! Frames are encoded MSB first, byte after byte, with no gap between pixels.
//! The reset period that ends a frame is the line idling low after the
//! transmission, which is the transmitter's business.

use heapless::Vec;

use crate::frame::LedFrame;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Largest tick count a single level can hold
pub const MAX_SYMBOL_TICKS: u16 = 0x7FFF;

/// Reference transmit clock: 10 MHz, 100 ns per tick
pub const REFERENCE_RESOLUTION_HZ: u32 = 10_000_000;

/// Symbols needed to encode `pixels` pixels
pub const fn pulse_capacity(pixels: usize) -> usize {
    pixels * crate::frame::BYTES_PER_PIXEL * 8
}

/// High / low duration pair in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTiming {
    pub high_ns: u32,
    pub low_ns: u32,
}

/// Nominal timings of both symbols for one LED family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolTimings {
    pub zero: PulseTiming,
    pub one: PulseTiming,
    /// Allowed deviation of every level once quantized to ticks
    pub tolerance_ns: u32,
}

pub const WS2812B_TIMINGS: SymbolTimings = SymbolTimings {
    zero: PulseTiming {
        high_ns: 400,
        low_ns: 850,
    },
    one: PulseTiming {
        high_ns: 800,
        low_ns: 450,
    },
    tolerance_ns: 150,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingError {
    /// Resolution of 0 Hz
    ZeroResolution,
    /// Quantized duration misses the nominal one by more than the tolerance
    OutOfTolerance { nominal_ns: u32, actual_ns: u64 },
    /// Duration does not fit a single level
    TooLong { nominal_ns: u32, ticks: u64 },
    /// Duration quantizes to zero ticks, which the transmitter reads as an end marker
    ZeroLength { nominal_ns: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// Pulse sequence capacity is smaller than the frame needs
    CapacityExceeded { required: usize, capacity: usize },
}

/// One bit on the wire: `high` ticks high, then `low` ticks low
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Symbol {
    pub high: u16,
    pub low: u16,
}

/// Both bit symbols, derived together for one clock resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseSpec {
    resolution_hz: u32,
    zero: Symbol,
    one: Symbol,
}

impl PulseSpec {
    /// Quantize `timings` to ticks of a `resolution_hz` clock.
    ///
    /// Every duration is `round(seconds * resolution_hz)` and must stay
    /// within the timing tolerance.
    pub fn derive(resolution_hz: u32, timings: &SymbolTimings) -> Result<Self, TimingError> {
        if resolution_hz == 0 {
            return Err(TimingError::ZeroResolution);
        }

        let symbol = |pulse: PulseTiming| -> Result<Symbol, TimingError> {
            Ok(Symbol {
                high: ticks_for(pulse.high_ns, resolution_hz, timings.tolerance_ns)?,
                low: ticks_for(pulse.low_ns, resolution_hz, timings.tolerance_ns)?,
            })
        };

        Ok(Self {
            resolution_hz,
            zero: symbol(timings.zero)?,
            one: symbol(timings.one)?,
        })
    }

    /// WS2812B symbols for a `resolution_hz` clock
    pub fn ws2812b(resolution_hz: u32) -> Result<Self, TimingError> {
        Self::derive(resolution_hz, &WS2812B_TIMINGS)
    }

    pub const fn resolution_hz(&self) -> u32 {
        self.resolution_hz
    }

    pub const fn zero(&self) -> Symbol {
        self.zero
    }

    pub const fn one(&self) -> Symbol {
        self.one
    }

    pub const fn symbol(&self, bit: bool) -> Symbol {
        if bit { self.one } else { self.zero }
    }
}

fn ticks_for(nominal_ns: u32, resolution_hz: u32, tolerance_ns: u32) -> Result<u16, TimingError> {
    let hz = u64::from(resolution_hz);
    let ticks = (u64::from(nominal_ns) * hz + NANOS_PER_SECOND / 2) / NANOS_PER_SECOND;
    if ticks > u64::from(MAX_SYMBOL_TICKS) {
        return Err(TimingError::TooLong { nominal_ns, ticks });
    }

    let actual_ns = (ticks * NANOS_PER_SECOND + hz / 2) / hz;
    if actual_ns.abs_diff(u64::from(nominal_ns)) > u64::from(tolerance_ns) {
        return Err(TimingError::OutOfTolerance {
            nominal_ns,
            actual_ns,
        });
    }
    if ticks == 0 {
        return Err(TimingError::ZeroLength { nominal_ns });
    }

    #[allow(clippy::cast_possible_truncation)]
    Ok(ticks as u16)
}

/// Encoded symbols for one frame, tagged with the resolution they were
/// derived for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseSequence<const CAP: usize> {
    resolution_hz: u32,
    symbols: Vec<Symbol, CAP>,
}

impl<const CAP: usize> PulseSequence<CAP> {
    pub fn resolution_hz(&self) -> u32 {
        self.resolution_hz
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Symbols for `bytes`, MSB first
pub fn symbols<'a>(bytes: &'a [u8], spec: &'a PulseSpec) -> impl Iterator<Item = Symbol> + 'a {
    bytes
        .iter()
        .flat_map(move |&byte| (0..8).rev().map(move |bit| spec.symbol((byte >> bit) & 1 == 1)))
}

/// Encode raw frame bytes with `spec`
pub fn encode<const CAP: usize>(
    bytes: &[u8],
    spec: &PulseSpec,
) -> Result<PulseSequence<CAP>, EncodeError> {
    let required = bytes.len() * 8;
    if required > CAP {
        return Err(EncodeError::CapacityExceeded {
            required,
            capacity: CAP,
        });
    }

    let mut sequence = PulseSequence {
        resolution_hz: spec.resolution_hz(),
        symbols: Vec::new(),
    };
    for symbol in symbols(bytes, spec) {
        sequence
            .symbols
            .push(symbol)
            .map_err(|_| EncodeError::CapacityExceeded {
                required,
                capacity: CAP,
            })?;
    }
    Ok(sequence)
}

/// Stateless encoder bound to one [`PulseSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformEncoder {
    spec: PulseSpec,
}

impl WaveformEncoder {
    pub const fn new(spec: PulseSpec) -> Self {
        Self { spec }
    }

    pub const fn spec(&self) -> &PulseSpec {
        &self.spec
    }

    pub fn encode<const N: usize, const CAP: usize>(
        &self,
        frame: &LedFrame<N>,
    ) -> Result<PulseSequence<CAP>, EncodeError> {
        encode(frame.as_bytes(), &self.spec)
    }
}
