//! Domain commands produced by the decoder

use smart_leds::RGB8;

/// Requested strip color, one value per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorCommand {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ColorCommand {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Build a command from parsed integers, clamping each channel to `0..=255`
    pub fn from_clamped(red: i32, green: i32, blue: i32) -> Self {
        Self {
            red: clamp_channel(red),
            green: clamp_channel(green),
            blue: clamp_channel(blue),
        }
    }

    pub const fn to_rgb(self) -> RGB8 {
        RGB8 {
            r: self.red,
            g: self.green,
            b: self.blue,
        }
    }
}

/// Requested state of the strip power rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PowerCommand {
    pub on: bool,
}

impl PowerCommand {
    pub const ON: Self = Self { on: true };
    pub const OFF: Self = Self { on: false };
}

/// A validated command ready for the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Color(ColorCommand),
    Power(PowerCommand),
}

fn clamp_channel(value: i32) -> u8 {
    // The clamp keeps the value inside u8 range
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let channel = value.clamp(0, i32::from(u8::MAX)) as u8;
    channel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_each_channel_independently() {
        assert_eq!(
            ColorCommand::from_clamped(-10, 300, 50),
            ColorCommand::new(0, 255, 50)
        );
        assert_eq!(
            ColorCommand::from_clamped(i32::MIN, i32::MAX, 255),
            ColorCommand::new(0, 255, 255)
        );
    }

    #[test]
    fn converts_to_rgb() {
        let rgb = ColorCommand::new(1, 2, 3).to_rgb();
        assert_eq!((rgb.r, rgb.g, rgb.b), (1, 2, 3));
    }
}
