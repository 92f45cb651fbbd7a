//! Strip power rail

use embedded_hal::digital::OutputPin;

/// Switches the strip supply on and off
pub trait PowerSwitch {
    fn set_power(&mut self, on: bool);

    fn is_powered(&self) -> bool;
}

/// Power rail behind a single push-pull output, high = on.
///
/// There is no read back from the rail, the last driven level is the state.
pub struct PowerRail<P: OutputPin> {
    pin: P,
    powered: bool,
}

impl<P: OutputPin> PowerRail<P> {
    /// Take the pin and drive it low
    pub fn new(mut pin: P) -> Self {
        if pin.set_low().is_err() {
            log::error!("power: failed to drive rail low");
        }
        Self {
            pin,
            powered: false,
        }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> PowerSwitch for PowerRail<P> {
    fn set_power(&mut self, on: bool) {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => {
                log::info!("power: {}", if on { "ON" } else { "OFF" });
                self.powered = on;
            }
            Err(_) => log::error!("power: failed to switch rail"),
        }
    }

    fn is_powered(&self) -> bool {
        self.powered
    }
}
