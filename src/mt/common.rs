//! Field types shared by MT MAC requests and indications

use crate::protocol::{Reader, Result, Writer};

/// Length of an IEEE extended address
pub const EXT_ADDR_LEN: usize = 8;

/// Length of a security key source
pub const KEY_SOURCE_LEN: usize = 8;

/// Length of the 802.15.4g channel bitmap
pub const CHANNEL_MASK_LEN: usize = 17;

/// Length of a security key
pub const KEY_LEN: usize = 16;

/// Length of key lookup data
pub const KEY_LOOKUP_LEN: usize = 9;

/// Length of [`Security`] on the wire
pub const SECURITY_LEN: usize = KEY_SOURCE_LEN + 3;

/// IEEE extended (64-bit) address, in wire order
pub type ExtAddr = [u8; EXT_ADDR_LEN];

/// Key source bytes
pub type KeySource = [u8; KEY_SOURCE_LEN];

/// Channel bitmap, one bit per channel
pub type ChannelMask = [u8; CHANNEL_MASK_LEN];

/// Security parameters attached to requests and indications
///
/// Carried verbatim between the application and the co-processor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Security {
    /// Originator of the key
    pub key_source: KeySource,
    /// Security level
    pub security_level: u8,
    /// Key identifier mode
    pub key_id_mode: u8,
    /// Key index
    pub key_index: u8,
}

impl Security {
    /// Security disabled
    pub const NONE: Self = Self {
        key_source: [0; KEY_SOURCE_LEN],
        security_level: 0,
        key_id_mode: 0,
        key_index: 0,
    };

    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            key_source: reader.array()?,
            security_level: reader.u8()?,
            key_id_mode: reader.u8()?,
            key_index: reader.u8()?,
        })
    }

    pub(crate) fn write(&self, writer: &mut Writer) {
        writer
            .bytes(&self.key_source)
            .u8(self.security_level)
            .u8(self.key_id_mode)
            .u8(self.key_index);
    }
}

/// Address mode byte
pub mod addr_mode {
    /// No address present
    pub const NONE: u8 = 0;
    /// 16-bit short address
    pub const SHORT: u8 = 2;
    /// 64-bit extended address
    pub const EXTENDED: u8 = 3;
}

/// Raw address as carried by MT frames: a mode byte and an 8-byte field
///
/// Only the bytes selected by `mode` are meaningful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MtAddress {
    /// One of [`addr_mode`]
    pub mode: u8,
    /// Address bytes; short addresses use the low two, little-endian
    pub addr: [u8; EXT_ADDR_LEN],
}

impl MtAddress {
    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            mode: reader.u8()?,
            addr: reader.array()?,
        })
    }

    pub(crate) fn write(&self, writer: &mut Writer) {
        writer.u8(self.mode).bytes(&self.addr);
    }
}
