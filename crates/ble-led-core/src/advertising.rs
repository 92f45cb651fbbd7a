//! Advertisement parameters and legacy advertising payload
//!
//! The payload is a sequence of AD structures, each `[len, type, data..]`
//! where `len` counts the type byte and the data. Legacy advertising caps the
//! whole payload at 31 bytes.

/// Legacy advertising payload limit
pub const MAX_ADV_PAYLOAD_LEN: usize = 31;

const AD_TYPE_FLAGS: u8 = 0x01;
const AD_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;
const AD_TYPE_TX_POWER_LEVEL: u8 = 0x0A;

/// LE General Discoverable Mode
pub const FLAG_GENERAL_DISCOVERABLE: u8 = 0x02;
/// BR/EDR Not Supported
pub const FLAG_BR_EDR_NOT_SUPPORTED: u8 = 0x04;

/// Own random static address, bytes in the order they are printed (most
/// significant first)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceAddress {
    pub bytes: [u8; 6],
}

impl DeviceAddress {
    /// The two top bits are forced to `0b11`.
    pub const fn random_static(mut bytes: [u8; 6]) -> Self {
        bytes[0] |= 0xC0;
        Self { bytes }
    }

    /// Bytes in over-the-air order (least significant first)
    pub fn to_le_bytes(&self) -> [u8; 6] {
        let mut bytes = self.bytes;
        bytes.reverse();
        bytes
    }
}

impl core::fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [a, b, c, d, e, g] = self.bytes;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertisingError {
    /// Payload would exceed the legacy limit
    PayloadTooLong { required: usize, max: usize },
    /// Output buffer is smaller than the payload
    BufferTooSmall { required: usize, available: usize },
}

/// Parameters for one advertising run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertisingParams {
    pub name: &'static str,
    pub flags: u8,
    /// Advertised tx power level in dBm
    pub tx_power_dbm: i8,
    /// `None` advertises until a peer connects
    pub duration_ms: Option<u32>,
    pub address: DeviceAddress,
}

impl AdvertisingParams {
    /// General discoverable, BR/EDR unsupported, no time limit
    pub const fn connectable(name: &'static str, tx_power_dbm: i8, address: DeviceAddress) -> Self {
        Self {
            name,
            flags: FLAG_GENERAL_DISCOVERABLE | FLAG_BR_EDR_NOT_SUPPORTED,
            tx_power_dbm,
            duration_ms: None,
            address,
        }
    }

    pub const fn payload_len(&self) -> usize {
        3 + (2 + self.name.len()) + 3
    }

    /// Write flags, complete local name and tx power into `buf`.
    ///
    /// Returns the number of bytes written.
    pub fn encode_payload(&self, buf: &mut [u8]) -> Result<usize, AdvertisingError> {
        let required = self.payload_len();
        if required > MAX_ADV_PAYLOAD_LEN {
            return Err(AdvertisingError::PayloadTooLong {
                required,
                max: MAX_ADV_PAYLOAD_LEN,
            });
        }
        if required > buf.len() {
            return Err(AdvertisingError::BufferTooSmall {
                required,
                available: buf.len(),
            });
        }

        let mut pos = 0;
        let mut put = |ad_type: u8, data: &[u8]| {
            #[allow(clippy::cast_possible_truncation)]
            let len = (data.len() + 1) as u8;
            buf[pos] = len;
            buf[pos + 1] = ad_type;
            buf[pos + 2..pos + 2 + data.len()].copy_from_slice(data);
            pos += 2 + data.len();
        };

        put(AD_TYPE_FLAGS, &[self.flags]);
        put(AD_TYPE_COMPLETE_LOCAL_NAME, self.name.as_bytes());
        #[allow(clippy::cast_sign_loss)]
        put(AD_TYPE_TX_POWER_LEVEL, &[self.tx_power_dbm as u8]);

        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: DeviceAddress = DeviceAddress::random_static([0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC]);

    #[test]
    fn encodes_flags_name_and_tx_power() {
        let params = AdvertisingParams::connectable("LedsPhilipp", -3, ADDRESS);
        let mut buf = [0u8; MAX_ADV_PAYLOAD_LEN];
        let len = params.encode_payload(&mut buf).unwrap();

        assert_eq!(len, 19);
        assert_eq!(&buf[..3], &[0x02, 0x01, 0x06]);
        assert_eq!(&buf[3..5], &[12, 0x09]);
        assert_eq!(&buf[5..16], b"LedsPhilipp");
        assert_eq!(&buf[16..19], &[0x02, 0x0A, 0xFD]);
    }

    #[test]
    fn long_name_does_not_fit() {
        let params = AdvertisingParams::connectable("a-name-that-is-way-too-long-for-adv", 0, ADDRESS);
        let mut buf = [0u8; 64];
        assert!(matches!(
            params.encode_payload(&mut buf),
            Err(AdvertisingError::PayloadTooLong { max: 31, .. })
        ));
    }

    #[test]
    fn random_static_address_sets_top_bits() {
        assert_eq!(ADDRESS.bytes[0], 0xD2);
        assert_eq!(ADDRESS.to_le_bytes()[5], 0xD2);
    }
}
