use ble_led_core::ColorCommand;

pub(crate) struct DeviceConfig {
    pub name: &'static str,
}

pub(crate) struct LightConfig {
    pub data_pin: u8,
    pub power_pin: u8,
    pub resolution_hz: u32,
    pub default_color: ColorCommand,
    pub fault_color: ColorCommand,
}

pub(crate) struct BleConfig {
    /// Advertised when the controller does not report its tx power
    pub fallback_tx_power_dbm: i8,
}

pub(crate) struct FirmwareConfig {
    pub version: &'static str,
}

pub(crate) const DEVICE: DeviceConfig = DeviceConfig {
    name: "LedsPhilipp",
};

pub(crate) const LIGHT: LightConfig = LightConfig {
    data_pin: 18,
    power_pin: 13,
    resolution_hz: ble_led_core::waveform::REFERENCE_RESOLUTION_HZ,
    default_color: ColorCommand::new(255, 100, 30),
    fault_color: ColorCommand::new(32, 0, 0),
};

pub(crate) const BLE: BleConfig = BleConfig {
    fallback_tx_power_dbm: 0,
};

pub(crate) const FIRMWARE: FirmwareConfig = FirmwareConfig {
    version: crate::config::BUILD_VERSION,
};

/// Strip data line, must match `LIGHT.data_pin`
#[macro_export]
macro_rules! led_gpio {
    ($p:expr) => {
        $p.GPIO18
    };
}

/// Strip power switch, must match `LIGHT.power_pin`
#[macro_export]
macro_rules! power_gpio {
    ($p:expr) => {
        $p.GPIO13
    };
}
