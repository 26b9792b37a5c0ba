//! Application-level MAC addresses

use std::fmt;

use crate::mt::{EXT_ADDR_LEN, ExtAddr, MtAddress, addr_mode};
use crate::protocol::{Error, Result};

/// A MAC address as the application sees it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Address {
    /// No address
    #[default]
    None,
    /// 16-bit short address
    Short(u16),
    /// 64-bit extended address
    Extended(ExtAddr),
}

impl Address {
    /// Address mode byte for this address.
    #[must_use]
    pub const fn mode(&self) -> u8 {
        match self {
            Self::None => addr_mode::NONE,
            Self::Short(_) => addr_mode::SHORT,
            Self::Extended(_) => addr_mode::EXTENDED,
        }
    }

    /// Encode as an MT mode byte and address field.
    ///
    /// Short addresses occupy the first two bytes, little-endian; unused
    /// bytes are zero.
    #[must_use]
    pub fn to_mt(&self) -> MtAddress {
        let mut addr = [0u8; EXT_ADDR_LEN];
        match self {
            Self::None => {}
            Self::Short(short) => addr[..2].copy_from_slice(&short.to_le_bytes()),
            Self::Extended(ext) => addr = *ext,
        }
        MtAddress {
            mode: self.mode(),
            addr,
        }
    }

    /// Decode an MT mode byte and address field.
    ///
    /// Nothing is read for [`addr_mode::NONE`].
    pub fn from_mt(mode: u8, addr: &[u8; EXT_ADDR_LEN]) -> Result<Self> {
        match mode {
            addr_mode::NONE => Ok(Self::None),
            addr_mode::SHORT => Ok(Self::Short(u16::from_le_bytes([addr[0], addr[1]]))),
            addr_mode::EXTENDED => Ok(Self::Extended(*addr)),
            mode => Err(Error::InvalidAddressMode { mode }),
        }
    }
}

impl From<Address> for MtAddress {
    fn from(address: Address) -> Self {
        address.to_mt()
    }
}

impl TryFrom<MtAddress> for Address {
    type Error = Error;

    fn try_from(address: MtAddress) -> Result<Self> {
        Self::from_mt(address.mode, &address.addr)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Short(short) => write!(f, "{short:#06x}"),
            Self::Extended(ext) => {
                // Most significant byte first, as printed on device labels.
                for (i, byte) in ext.iter().rev().enumerate() {
                    if i > 0 {
                        f.write_str(":")?;
                    }
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_is_little_endian() {
        let mt = Address::Short(0x1234).to_mt();
        assert_eq!(mt.mode, addr_mode::SHORT);
        assert_eq!(mt.addr, [0x34, 0x12, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_none_reads_nothing() {
        let garbage = [0xAA; EXT_ADDR_LEN];
        assert_eq!(Address::from_mt(addr_mode::NONE, &garbage).unwrap(), Address::None);
        assert_eq!(Address::None.to_mt().addr, [0; EXT_ADDR_LEN]);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert_eq!(
            Address::from_mt(1, &[0; EXT_ADDR_LEN]),
            Err(Error::InvalidAddressMode { mode: 1 })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Address::Short(0xBEEF).to_string(), "0xbeef");
        assert_eq!(
            Address::Extended([1, 2, 3, 4, 5, 6, 7, 8]).to_string(),
            "08:07:06:05:04:03:02:01"
        );
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        fn address() -> impl Strategy<Value = Address> {
            prop_oneof![
                Just(Address::None),
                any::<u16>().prop_map(Address::Short),
                any::<[u8; 8]>().prop_map(Address::Extended),
            ]
        }

        proptest! {
            #[test]
            fn address_survives_mt(address in address()) {
                let mt = address.to_mt();
                prop_assert_eq!(Address::try_from(mt).unwrap(), address);
            }
        }
    }
}
