mod ble;
mod power_rail;
mod rmt_ws2812;

pub use ble::{BleController, BleInitError, device_address, init_ble_controller};
pub use power_rail::{PowerLine, init_power_line};
pub use rmt_ws2812::{EspPulseWriter, RmtError};
