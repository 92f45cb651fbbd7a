//! Integration tests for frame building and waveform encoding.

use ble_led_core::{
    ColorCommand, LedFrame, PulseSequence, PulseSpec, REFERENCE_PIXEL_COUNT,
    REFERENCE_PULSE_CAPACITY, Symbol, WaveformEncoder, decode_color,
    waveform::{EncodeError, REFERENCE_RESOLUTION_HZ},
};

fn reference_encoder() -> WaveformEncoder {
    WaveformEncoder::new(PulseSpec::ws2812b(REFERENCE_RESOLUTION_HZ).unwrap())
}

/// Rebuild the bytes carried by a pulse sequence
fn decode_bits(symbols: &[Symbol], spec: &PulseSpec) -> Vec<u8> {
    symbols
        .chunks(8)
        .map(|bits| {
            bits.iter().fold(0u8, |byte, symbol| {
                let bit = if *symbol == spec.one() {
                    1
                } else {
                    assert_eq!(*symbol, spec.zero());
                    0
                };
                (byte << 1) | bit
            })
        })
        .collect()
}

// -----------------------------------------------------------------------------
// Frames
// -----------------------------------------------------------------------------

#[test]
fn decoded_color_reaches_pixels_in_grb_order() {
    let color = decode_color(b"255,0,128").unwrap();
    let frame = LedFrame::<REFERENCE_PIXEL_COUNT>::broadcast(color);

    assert_eq!(frame.pixel(0), Some([0, 255, 128]));
    assert_eq!(frame.as_bytes().len(), REFERENCE_PIXEL_COUNT * 3);
    assert!(frame.as_bytes().chunks(3).all(|pixel| pixel == [0, 255, 128]));
}

#[test]
fn clamped_color_is_broadcast() {
    let color = decode_color(b"-10,300,50").unwrap();
    let frame = LedFrame::<3>::broadcast(color);
    assert_eq!(frame.as_bytes(), &[255, 0, 50, 255, 0, 50, 255, 0, 50]);
}

// -----------------------------------------------------------------------------
// Waveform
// -----------------------------------------------------------------------------

#[test]
fn reference_frame_fills_pulse_capacity() {
    let encoder = reference_encoder();
    let frame = LedFrame::<REFERENCE_PIXEL_COUNT>::broadcast(ColorCommand::new(255, 100, 30));
    let sequence: PulseSequence<REFERENCE_PULSE_CAPACITY> = encoder.encode(&frame).unwrap();

    assert_eq!(sequence.len(), 52 * 24);
    assert_eq!(sequence.resolution_hz(), REFERENCE_RESOLUTION_HZ);
    assert_eq!(
        decode_bits(sequence.as_slice(), encoder.spec()),
        frame.as_bytes()
    );
}

#[test]
fn first_pixel_starts_with_green_msb() {
    let encoder = reference_encoder();
    let spec = *encoder.spec();
    let frame = LedFrame::<1>::broadcast(ColorCommand::new(0, 0x80, 0x01));
    let sequence: PulseSequence<24> = encoder.encode(&frame).unwrap();
    let symbols = sequence.as_slice();

    assert_eq!(symbols[0], spec.one());
    assert!(symbols[1..23].iter().all(|s| *s == spec.zero()));
    assert_eq!(symbols[23], spec.one());
}

#[test]
fn encoding_is_idempotent() {
    let encoder = reference_encoder();
    let frame = LedFrame::<8>::broadcast(ColorCommand::new(12, 34, 56));
    let first: PulseSequence<192> = encoder.encode(&frame).unwrap();
    let second: PulseSequence<192> = encoder.encode(&frame).unwrap();
    assert_eq!(first, second);
}

#[test]
fn resolution_change_rederives_both_symbols() {
    let slow = PulseSpec::ws2812b(REFERENCE_RESOLUTION_HZ).unwrap();
    let fast = PulseSpec::ws2812b(80_000_000).unwrap();
    assert_ne!(slow.zero(), fast.zero());
    assert_ne!(slow.one(), fast.one());

    let frame = LedFrame::<1>::broadcast(ColorCommand::new(1, 2, 3));
    let sequence: PulseSequence<24> = WaveformEncoder::new(fast).encode(&frame).unwrap();
    assert_eq!(sequence.resolution_hz(), 80_000_000);
}

#[test]
fn undersized_sequence_is_rejected() {
    let frame = LedFrame::<2>::dark();
    let result: Result<PulseSequence<47>, _> = reference_encoder().encode(&frame);
    assert_eq!(
        result,
        Err(EncodeError::CapacityExceeded {
            required: 48,
            capacity: 47
        })
    );
}
