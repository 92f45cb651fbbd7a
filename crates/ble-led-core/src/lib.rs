#![no_std]

//! BLE LED strip core
//!
//! Hardware independent half of the strip firmware:
//! - `decoder` - GATT payloads into validated [`Command`]s
//! - `frame` - per-pixel wire frame (GRB order)
//! - `waveform` - pulse symbols and the MSB-first bit-stream encoder
//! - `transmit` - bounded transmit queue in front of a [`PulseWriter`]
//! - `gatt` - typed characteristic table of the strip service
//! - `advertising` - advertisement parameters and payload encoding
//! - `session` - advertise / connect / disconnect state machine
//! - `power` - power rail switch abstraction
//! - `router` - binds decoded commands to the strip
//!
//! Hardware backends implement [`PulseWriter`] and [`PowerSwitch`].

pub mod advertising;
pub mod command;
pub mod decoder;
pub mod frame;
pub mod gatt;
pub mod power;
pub mod router;
pub mod session;
pub mod transmit;
pub mod waveform;

pub use advertising::{AdvertisingError, AdvertisingParams, DeviceAddress};
pub use command::{ColorCommand, Command, PowerCommand};
pub use decoder::{DecodeError, decode_color, decode_power};
pub use frame::LedFrame;
pub use gatt::{AttError, CharacteristicId, STRIP_SERVICE, WriteResponse};
pub use power::{PowerRail, PowerSwitch};
pub use router::{CommandRouter, RouterError};
pub use session::{CommandHandler, ProtocolSession, SessionEvent, SessionOutcome, SessionState};
pub use transmit::{
    ConfigError, PulseWriter, Submitter, TransmitChannel, TransmitConfig, TransmitError,
    TransmitQueue, TransmitReport, TransmitSignal,
};
pub use waveform::{PulseSequence, PulseSpec, Symbol, WaveformEncoder};

/// Pixel count of the reference strip
pub const REFERENCE_PIXEL_COUNT: usize = 52;

/// Pulse capacity needed for the reference strip (24 symbols per pixel)
pub const REFERENCE_PULSE_CAPACITY: usize = waveform::pulse_capacity(REFERENCE_PIXEL_COUNT);
