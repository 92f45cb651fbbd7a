//! Strip GATT service
//!
//! The service is described by an explicit table of write-only
//! characteristics. Each entry carries its UUID and the decoder for its
//! payload, so routing a write is a lookup instead of a UUID comparison chain.

use crate::{
    command::Command,
    decoder::{DecodeError, decode_color_command, decode_power_command},
};

pub const STRIP_SERVICE_UUID: &str = "e2cfbe98-68fe-33cf-da9a-0464bc340004";
pub const COLOR_CHARACTERISTIC_UUID: &str = "f3dfcfa9-79ef-44bf-ebab-0575cd450005";
pub const POWER_CHARACTERISTIC_UUID: &str = "d1bfad87-57ed-22de-c989-0353ab210003";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacteristicId {
    Color,
    Power,
}

/// ATT error codes the strip answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AttError {
    InvalidAttributeValueLength = 0x0D,
    Unlikely = 0x0E,
}

impl AttError {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Status returned to the peer for a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResponse {
    Accepted,
    Rejected(AttError),
}

impl WriteResponse {
    /// Transport status for a decode result.
    ///
    /// Length violations are reported to the peer. An unparsable color is
    /// acknowledged and dropped.
    pub fn for_decode<T>(result: &Result<T, DecodeError>) -> Self {
        match result {
            Ok(_) | Err(DecodeError::MalformedPayload) => Self::Accepted,
            Err(DecodeError::InvalidLength { .. }) => {
                Self::Rejected(AttError::InvalidAttributeValueLength)
            }
        }
    }
}

pub type PayloadDecoder = fn(&[u8]) -> Result<Command, DecodeError>;

pub struct CharacteristicDescriptor {
    pub id: CharacteristicId,
    pub uuid: &'static str,
    pub name: &'static str,
    /// Largest accepted payload in bytes
    pub max_len: usize,
    pub decode: PayloadDecoder,
}

impl core::fmt::Debug for CharacteristicDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CharacteristicDescriptor")
            .field("id", &self.id)
            .field("uuid", &self.uuid)
            .field("max_len", &self.max_len)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct GattService {
    pub uuid: &'static str,
    pub characteristics: &'static [CharacteristicDescriptor],
}

impl GattService {
    pub fn characteristic(&self, id: CharacteristicId) -> Option<&'static CharacteristicDescriptor> {
        self.characteristics.iter().find(|c| c.id == id)
    }
}

pub static STRIP_SERVICE: GattService = GattService {
    uuid: STRIP_SERVICE_UUID,
    characteristics: &[
        CharacteristicDescriptor {
            id: CharacteristicId::Color,
            uuid: COLOR_CHARACTERISTIC_UUID,
            name: "color",
            max_len: crate::decoder::COLOR_PAYLOAD_MAX_LEN,
            decode: decode_color_command,
        },
        CharacteristicDescriptor {
            id: CharacteristicId::Power,
            uuid: POWER_CHARACTERISTIC_UUID,
            name: "power",
            max_len: crate::decoder::POWER_PAYLOAD_LEN,
            decode: decode_power_command,
        },
    ],
};
