//! Command decoder
//!
//! Turns raw characteristic writes into validated [`Command`]s. Payloads are
//! untrusted: the length is checked against the characteristic bounds before
//! anything is copied, then the bytes are staged in a fixed scratch buffer and
//! parsed from there.
//!
//! Color payloads are ASCII `"R,G,B"` with signed decimal integers of any
//! width. Each channel is clamped to `0..=255`. Power payloads are a single
//! byte where `'1'` means on and anything else means off.

use crate::command::{ColorCommand, Command, PowerCommand};

/// Smallest accepted color payload
pub const COLOR_PAYLOAD_MIN_LEN: usize = 1;
/// Largest accepted color payload
pub const COLOR_PAYLOAD_MAX_LEN: usize = 10;
/// Color scratch capacity, one byte more than the payload for the terminator
pub const COLOR_SCRATCH_LEN: usize = COLOR_PAYLOAD_MAX_LEN + 1;
/// Power payloads are exactly one byte
pub const POWER_PAYLOAD_LEN: usize = 1;

/// Scratch buffer used by [`decode_color_with`]
pub type ColorScratch = ParseBuffer<COLOR_SCRATCH_LEN>;
/// Scratch buffer used by [`decode_power_with`]
pub type PowerScratch = ParseBuffer<POWER_PAYLOAD_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload length is outside the characteristic bounds
    InvalidLength { len: usize, min: usize, max: usize },
    /// Payload does not contain a full `R,G,B` triplet
    MalformedPayload,
}

/// Fixed capacity staging buffer for incoming payloads.
///
/// Bytes past the staged length are always zero, so the staged data reads as
/// a terminated string. A payload that does not fit is rejected, never
/// truncated.
#[derive(Debug, Clone)]
pub struct ParseBuffer<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> ParseBuffer<N> {
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Staged bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Copy `payload` into the buffer if `min_len <= len <= max_len`.
    ///
    /// `max_len` is capped to the buffer capacity.
    pub fn stage(
        &mut self,
        payload: &[u8],
        min_len: usize,
        max_len: usize,
    ) -> Result<&[u8], DecodeError> {
        let max = max_len.min(N);
        let len = payload.len();
        if len < min_len || len > max {
            return Err(DecodeError::InvalidLength {
                len,
                min: min_len,
                max,
            });
        }

        self.bytes = [0; N];
        self.bytes[..len].copy_from_slice(payload);
        self.len = len;
        Ok(self.as_bytes())
    }
}

impl<const N: usize> Default for ParseBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a color characteristic write
pub fn decode_color(payload: &[u8]) -> Result<ColorCommand, DecodeError> {
    let mut scratch = ColorScratch::new();
    decode_color_with(&mut scratch, payload)
}

/// Decode a color characteristic write using a caller supplied scratch buffer
pub fn decode_color_with(
    scratch: &mut ColorScratch,
    payload: &[u8],
) -> Result<ColorCommand, DecodeError> {
    let staged = scratch.stage(payload, COLOR_PAYLOAD_MIN_LEN, COLOR_PAYLOAD_MAX_LEN)?;

    // Staged data is read as a terminated string
    let text = staged
        .iter()
        .position(|&b| b == 0)
        .map_or(staged, |end| &staged[..end]);

    match parse_triplet(text) {
        Some((red, green, blue)) => Ok(ColorCommand::from_clamped(red, green, blue)),
        None => {
            log::warn!("decoder: failed to parse color from {:?}", text);
            Err(DecodeError::MalformedPayload)
        }
    }
}

/// Decode a power characteristic write
pub fn decode_power(payload: &[u8]) -> Result<PowerCommand, DecodeError> {
    let mut scratch = PowerScratch::new();
    decode_power_with(&mut scratch, payload)
}

/// Decode a power characteristic write using a caller supplied scratch buffer
pub fn decode_power_with(
    scratch: &mut PowerScratch,
    payload: &[u8],
) -> Result<PowerCommand, DecodeError> {
    let staged = scratch.stage(payload, POWER_PAYLOAD_LEN, POWER_PAYLOAD_LEN)?;
    Ok(PowerCommand {
        on: staged.first() == Some(&b'1'),
    })
}

/// Decode either payload into a [`Command`]
pub fn decode_color_command(payload: &[u8]) -> Result<Command, DecodeError> {
    decode_color(payload).map(Command::Color)
}

/// See [`decode_color_command`]
pub fn decode_power_command(payload: &[u8]) -> Result<Command, DecodeError> {
    decode_power(payload).map(Command::Power)
}

/// Parse `<int>,<int>,<int>`. Whitespace is allowed before each integer,
/// commas must follow the previous integer directly. Anything after the
/// third integer is ignored.
fn parse_triplet(text: &[u8]) -> Option<(i32, i32, i32)> {
    let mut scanner = Scanner::new(text);
    let red = scanner.integer()?;
    scanner.literal(b',')?;
    let green = scanner.integer()?;
    scanner.literal(b',')?;
    let blue = scanner.integer()?;
    Some((red, green, blue))
}

struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_space) {
            self.pos += 1;
        }
    }

    fn literal(&mut self, expected: u8) -> Option<()> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    /// Signed decimal integer, saturating at the `i32` bounds
    fn integer(&mut self) -> Option<i32> {
        self.skip_whitespace();

        let negative = match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                true
            }
            Some(b'+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };

        let start = self.pos;
        let mut magnitude: i64 = 0;
        while let Some(digit) = self.peek().filter(u8::is_ascii_digit) {
            magnitude = magnitude
                .saturating_mul(10)
                .saturating_add(i64::from(digit - b'0'));
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }

        let value = if negative { -magnitude } else { magnitude };
        #[allow(clippy::cast_possible_truncation)]
        let value = value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        Some(value)
    }
}

const fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_triplet() {
        assert_eq!(parse_triplet(b"1,2,3"), Some((1, 2, 3)));
        assert_eq!(parse_triplet(b"-1,+2,003"), Some((-1, 2, 3)));
    }

    #[test]
    fn whitespace_only_before_integers() {
        assert_eq!(parse_triplet(b" 1, 2,\t3"), Some((1, 2, 3)));
        assert_eq!(parse_triplet(b"1 ,2,3"), None);
    }

    #[test]
    fn ignores_trailing_data() {
        assert_eq!(parse_triplet(b"1,2,3,4"), Some((1, 2, 3)));
        assert_eq!(parse_triplet(b"1,2,3xyz"), Some((1, 2, 3)));
    }

    #[test]
    fn rejects_incomplete_triplets() {
        assert_eq!(parse_triplet(b"1,2"), None);
        assert_eq!(parse_triplet(b"1,2,"), None);
        assert_eq!(parse_triplet(b"1,,3"), None);
        assert_eq!(parse_triplet(b"-,2,3"), None);
        assert_eq!(parse_triplet(b""), None);
    }

    #[test]
    fn saturates_huge_integers() {
        assert_eq!(
            parse_triplet(b"9999999999999,0,-9999999999999"),
            Some((i32::MAX, 0, i32::MIN))
        );
    }

    #[test]
    fn stage_rejects_instead_of_truncating() {
        let mut buffer = ParseBuffer::<4>::new();
        assert_eq!(
            buffer.stage(b"12345", 1, 10),
            Err(DecodeError::InvalidLength {
                len: 5,
                min: 1,
                max: 4
            })
        );
        assert!(buffer.as_bytes().is_empty());
    }

    #[test]
    fn stage_clears_previous_payload() {
        let mut buffer = ColorScratch::new();
        buffer.stage(b"255,255,25", 1, 10).unwrap();
        let staged = buffer.stage(b"1,2,3", 1, 10).unwrap();
        assert_eq!(staged, b"1,2,3");
        assert_eq!(buffer.bytes[5..], [0; 6]);
    }

    #[test]
    fn nul_terminates_color_text() {
        assert_eq!(decode_color(b"1,2\x003,4"), Err(DecodeError::MalformedPayload));
        assert_eq!(decode_color(b"1,2,3\x009"), Ok(ColorCommand::new(1, 2, 3)));
    }
}
