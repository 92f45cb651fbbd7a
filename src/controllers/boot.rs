use embassy_time::{Duration, Timer};
use esp_println::println;

use ble_led_core::{ColorCommand, ConfigError, PowerSwitch};

use crate::infrastructure::{
    config,
    drivers::{BleInitError, PowerLine},
    types::StripRouter,
};

const FAULT_REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Startup state of the strip and visible boot failures
#[derive(Clone, Copy)]
pub struct BootController {
    default_color: ColorCommand,
    fault_color: ColorCommand,
}

impl BootController {
    pub(crate) const fn new() -> Self {
        Self {
            default_color: config::LIGHT.default_color,
            fault_color: config::LIGHT.fault_color,
        }
    }

    /// Power the strip and show the default color
    pub fn on_boot(&self, router: &mut StripRouter) {
        println!(
            "boot: firmware {}, showing default color",
            config::FIRMWARE.version
        );
        if let Err(e) = router.start(self.default_color) {
            println!("boot: failed to show default color: {:?}", e);
        }
    }

    /// No pulse output. The rail is held low so the strip stays dark.
    pub async fn on_transmit_fault(&self, mut power: PowerLine, err: ConfigError) -> ! {
        power.set_power(false);
        loop {
            println!("boot: transmit channel unavailable: {:?}", err);
            Timer::after(FAULT_REPORT_INTERVAL).await;
        }
    }

    /// Strip works but nobody can reach it, show the fault color
    pub async fn on_ble_fault(&self, mut router: StripRouter, err: BleInitError) -> ! {
        if let Err(e) = router.start(self.fault_color) {
            println!("boot: failed to show fault color: {:?}", e);
        }
        loop {
            println!("boot: bluetooth unavailable: {:?}", err);
            Timer::after(FAULT_REPORT_INTERVAL).await;
        }
    }
}

impl Default for BootController {
    fn default() -> Self {
        Self::new()
    }
}
