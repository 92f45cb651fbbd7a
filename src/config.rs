//! Strip geometry shared by the firmware types

use ble_led_core::{REFERENCE_PIXEL_COUNT, transmit::TRANSMIT_QUEUE_DEPTH, waveform};

pub const PIXEL_COUNT: usize = REFERENCE_PIXEL_COUNT;
pub const PULSE_CAPACITY: usize = waveform::pulse_capacity(PIXEL_COUNT);
pub const QUEUE_DEPTH: usize = TRANSMIT_QUEUE_DEPTH;

pub(crate) const BUILD_VERSION: &str = env!("BUILD_VERSION");
