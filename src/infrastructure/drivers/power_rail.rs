use esp_hal::gpio::{Level, Output, OutputConfig, OutputPin};

use ble_led_core::PowerRail;

pub type PowerLine = PowerRail<Output<'static>>;

/// Take the strip power pin, starting with the strip unpowered
pub fn init_power_line(pin: impl OutputPin + 'static) -> PowerLine {
    PowerRail::new(Output::new(pin, Level::Low, OutputConfig::default()))
}
