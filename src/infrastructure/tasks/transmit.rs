use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use esp_hal::{gpio::interconnect::PeripheralOutput, peripherals::RMT};
use esp_println::println;

use ble_led_core::{
    ConfigError, TransmitChannel, TransmitConfig, TransmitReport, TransmitSignal,
};

use crate::{
    config::QUEUE_DEPTH,
    infrastructure::{
        config,
        drivers::EspPulseWriter,
        types::{StripChannel, StripQueue},
    },
};

static TRANSMIT_QUEUE: StripQueue = Channel::new();
static TRANSMIT_REPORTS: TransmitSignal = Signal::new();

/// Acquire the RMT channel and bind it to the transmit queue
pub fn init_transmit_channel(
    rmt: RMT<'static>,
    pin: impl PeripheralOutput<'static>,
) -> Result<StripChannel, ConfigError> {
    let transmit_config = TransmitConfig::new(
        config::LIGHT.data_pin,
        config::LIGHT.resolution_hz,
        QUEUE_DEPTH,
    );
    let channel = TransmitChannel::configure(&TRANSMIT_QUEUE, transmit_config, |cfg| {
        EspPulseWriter::new(rmt, pin, cfg)
    })?;

    Ok(channel.with_reports(&TRANSMIT_REPORTS))
}

/// Task that owns the RMT channel and plays queued frames in order
#[embassy_executor::task]
pub async fn transmit_task(mut channel: StripChannel) {
    channel.run().await;
    println!("transmit: channel closed");
}

/// Task that reports failed transmissions
#[embassy_executor::task]
pub async fn transmit_report_task() {
    loop {
        match TRANSMIT_REPORTS.wait().await {
            TransmitReport::Completed { .. } => {}
            TransmitReport::Failed { symbols } => {
                println!("transmit: frame of {} symbols failed", symbols);
            }
            TransmitReport::Discarded => println!("transmit: frame discarded"),
        }
    }
}
