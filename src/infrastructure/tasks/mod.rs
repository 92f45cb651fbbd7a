mod ble_session;
mod transmit;

pub use ble_session::{StripServer, ble_session_task, init_gatt_server};
pub use transmit::{init_transmit_channel, transmit_report_task, transmit_task};
