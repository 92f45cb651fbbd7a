use bt_hci::controller::ExternalController;
use esp_hal::{efuse::Efuse, peripherals::BT};
use esp_radio::ble::controller::BleConnector;

use ble_led_core::DeviceAddress;

use crate::mk_static;

/// HCI command slots shared with the controller
const HCI_SLOTS: usize = 20;

pub type BleController = ExternalController<BleConnector<'static>, HCI_SLOTS>;

#[derive(Debug)]
pub enum BleInitError {
    Radio(esp_radio::InitializationError),
    Connector,
    /// Attribute table of the strip service could not be built
    Gatt(&'static str),
}

pub fn init_ble_controller(bt: BT<'static>) -> Result<BleController, BleInitError> {
    let radio = esp_radio::init().map_err(BleInitError::Radio)?;
    let radio = &*mk_static!(esp_radio::Controller<'static>, radio);
    let connector =
        BleConnector::new(radio, bt, Default::default()).map_err(|_| BleInitError::Connector)?;

    Ok(ExternalController::new(connector))
}

/// Random static address derived from the factory MAC
pub fn device_address() -> DeviceAddress {
    DeviceAddress::random_static(Efuse::read_base_mac_address())
}
