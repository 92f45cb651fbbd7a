use ble_led_core::{CommandRouter, TransmitChannel, TransmitQueue};

use crate::{
    config::{PIXEL_COUNT, PULSE_CAPACITY, QUEUE_DEPTH},
    infrastructure::drivers::{EspPulseWriter, PowerLine},
};

pub type StripQueue = TransmitQueue<PULSE_CAPACITY, QUEUE_DEPTH>;
pub type StripChannel = TransmitChannel<'static, EspPulseWriter<'static>, PULSE_CAPACITY, QUEUE_DEPTH>;
pub type StripRouter = CommandRouter<'static, PowerLine, PIXEL_COUNT, PULSE_CAPACITY, QUEUE_DEPTH>;
