//! Wire frame for the strip

use smart_leds::RGB8;

use crate::command::ColorCommand;

/// Bytes per pixel record
pub const BYTES_PER_PIXEL: usize = 3;

/// One frame for an `N` pixel strip.
///
/// Every pixel record is stored in wire order: green, red, blue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedFrame<const N: usize> {
    pixels: [[u8; BYTES_PER_PIXEL]; N],
}

impl<const N: usize> LedFrame<N> {
    /// All pixels off
    pub const fn dark() -> Self {
        Self {
            pixels: [[0; BYTES_PER_PIXEL]; N],
        }
    }

    /// Broadcast one color to every pixel
    pub const fn broadcast(color: ColorCommand) -> Self {
        Self {
            pixels: [wire_record(color.to_rgb()); N],
        }
    }

    pub const fn pixel_count(&self) -> usize {
        N
    }

    /// Wire record of pixel `index`
    pub fn pixel(&self, index: usize) -> Option<[u8; BYTES_PER_PIXEL]> {
        self.pixels.get(index).copied()
    }

    /// Frame bytes in transmission order, `N * 3` long
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_flattened()
    }
}

impl<const N: usize> Default for LedFrame<N> {
    fn default() -> Self {
        Self::dark()
    }
}

const fn wire_record(color: RGB8) -> [u8; BYTES_PER_PIXEL] {
    [color.g, color.r, color.b]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_reorders_to_grb() {
        let frame = LedFrame::<4>::broadcast(ColorCommand::new(1, 2, 3));
        assert_eq!(frame.as_bytes(), &[2, 1, 3, 2, 1, 3, 2, 1, 3, 2, 1, 3]);
        assert_eq!(frame.pixel(3), Some([2, 1, 3]));
        assert_eq!(frame.pixel(4), None);
    }

    #[test]
    fn dark_frame_is_zeroed() {
        let frame = LedFrame::<2>::default();
        assert_eq!(frame.as_bytes(), &[0; 6]);
    }
}
