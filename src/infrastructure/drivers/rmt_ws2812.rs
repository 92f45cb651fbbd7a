use esp_hal::xtensa_lx::interrupt;
use esp_hal::{
    Blocking,
    gpio::{Level, interconnect::PeripheralOutput},
    peripherals::RMT,
    rmt::{self, Channel, PulseCode, Rmt, Tx, TxChannelConfig, TxChannelCreator},
    time::Rate,
};

use ble_led_core::{PulseWriter, Symbol, TransmitConfig, transmit::DEFAULT_MEM_BLOCK_SYMBOLS};

use crate::config::PULSE_CAPACITY;

/// RMT source clock on the ESP32
const RMT_SOURCE_MHZ: u32 = 80;

#[derive(Debug)]
pub enum RmtError {
    /// Resolution is not an integer division of the source clock
    Divider { resolution_hz: u32 },
    Config(rmt::ConfigError),
    Transmit(rmt::Error),
    /// Frame does not fit the pulse buffer
    Overflow { len: usize },
}

/// WS2812 pulse writer on RMT channel 0.
///
/// Symbols are copied into a pulse code buffer with an end marker and played
/// in one blocking transaction. The channel idles low, which provides the
/// reset period between frames.
pub struct EspPulseWriter<'ch> {
    channel: Channel<'ch, Blocking, Tx>,
    buffer: [PulseCode; PULSE_CAPACITY + 1],
}

impl<'ch> EspPulseWriter<'ch> {
    pub fn new(
        rmt: RMT<'ch>,
        pin: impl PeripheralOutput<'ch>,
        config: &TransmitConfig,
    ) -> Result<Self, RmtError> {
        let source_hz = RMT_SOURCE_MHZ * 1_000_000;
        if config.resolution_hz == 0 || source_hz % config.resolution_hz != 0 {
            return Err(RmtError::Divider {
                resolution_hz: config.resolution_hz,
            });
        }
        let divider = u8::try_from(source_hz / config.resolution_hz).map_err(|_| {
            RmtError::Divider {
                resolution_hz: config.resolution_hz,
            }
        })?;
        let memsize = u8::try_from(config.mem_block_symbols.div_ceil(DEFAULT_MEM_BLOCK_SYMBOLS))
            .unwrap_or(1)
            .max(1);

        let rmt = Rmt::new(rmt, Rate::from_mhz(RMT_SOURCE_MHZ)).map_err(RmtError::Config)?;
        let tx_config = TxChannelConfig::default()
            .with_clk_divider(divider)
            .with_idle_output_level(Level::Low)
            .with_idle_output(true)
            .with_carrier_modulation(false)
            .with_memsize(memsize);

        let channel = rmt
            .channel0
            .configure_tx(&tx_config)
            .map_err(RmtError::Config)?
            .with_pin(pin);

        Ok(Self {
            channel,
            buffer: [PulseCode::default(); PULSE_CAPACITY + 1],
        })
    }
}

impl PulseWriter for EspPulseWriter<'_> {
    type Error = RmtError;

    fn write_pulses(&mut self, pulses: &[Symbol]) -> Result<(), Self::Error> {
        if pulses.len() > PULSE_CAPACITY {
            return Err(RmtError::Overflow { len: pulses.len() });
        }

        for (code, symbol) in self.buffer.iter_mut().zip(pulses) {
            *code = PulseCode::new(Level::High, symbol.high, Level::Low, symbol.low);
        }
        self.buffer[pulses.len()] = PulseCode::end_marker();

        // The RMT memory is refilled by polling, an interrupt here underruns it
        let (channel, buffer) = (&mut self.channel, &self.buffer[..=pulses.len()]);
        interrupt::free(|| {
            let transaction = channel
                .reborrow()
                .transmit(buffer)
                .map_err(|(e, _)| RmtError::Transmit(e))?;
            transaction.wait().map_err(|(e, _)| RmtError::Transmit(e))?;
            Ok(())
        })
    }
}
