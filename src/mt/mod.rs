//! MT command tables
//!
//! Each subsystem module pairs typed request structs with the decoders for
//! its synchronous responses and asynchronous indications. Requests are
//! issued through any [`MtLink`](crate::transport::MtLink).

pub mod common;
pub mod mac;
pub mod sys;
pub mod util;

use bytes::Bytes;

use crate::protocol::{CommandType, MtFrame, Result, Subsystem, Writer};
use crate::transport::TransportError;

pub use common::{
    CHANNEL_MASK_LEN, ChannelMask, EXT_ADDR_LEN, ExtAddr, KEY_LEN, KEY_LOOKUP_LEN,
    KEY_SOURCE_LEN, KeySource, MtAddress, SECURITY_LEN, Security, addr_mode,
};
pub use mac::{MacIndication, MacStatus, MtMac};
pub use sys::{MtSys, SysIndication};
pub use util::MtUtil;

/// A request with a fixed subsystem and command id
pub trait MtRequest {
    /// Subsystem the command belongs to
    const SUBSYSTEM: Subsystem;
    /// Command id
    const CMD1: u8;

    /// Encoded payload length
    fn payload_len(&self) -> usize;

    /// Append the payload to `writer`.
    fn encode_payload(&self, writer: &mut Writer);

    /// Build the synchronous request frame.
    fn sreq(&self) -> Result<MtFrame> {
        self.frame(CommandType::Sreq)
    }

    /// Build a frame of the given type around the payload.
    fn frame(&self, kind: CommandType) -> Result<MtFrame> {
        let mut writer = Writer::with_capacity(self.payload_len());
        self.encode_payload(&mut writer);
        debug_assert_eq!(writer.len(), self.payload_len());
        MtFrame::build(kind, Self::SUBSYSTEM, Self::CMD1, writer.finish())
    }
}

/// Status byte that leads a synchronous response
pub(crate) fn srsp_status(frame: &MtFrame) -> std::result::Result<u8, TransportError> {
    frame
        .attrs()
        .first()
        .copied()
        .ok_or(TransportError::EmptyResponse {
            cmd0: frame.cmd0(),
            cmd1: frame.cmd1(),
        })
}

/// Asynchronous message from the co-processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MtIndication {
    /// System subsystem
    Sys(SysIndication),
    /// MAC subsystem
    Mac(MacIndication),
    /// Subsystem this crate does not handle
    Unknown {
        /// cmd0 of the frame
        cmd0: u8,
        /// cmd1 of the frame
        cmd1: u8,
        /// Raw payload
        attrs: Bytes,
    },
}

impl MtIndication {
    /// Whether the command id was not recognised
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(
            self,
            Self::Unknown { .. }
                | Self::Mac(MacIndication::Unknown { .. })
                | Self::Sys(SysIndication::Unknown { .. })
        )
    }
}

/// Decode an AREQ frame into a typed indication.
pub fn decode_indication(frame: &MtFrame) -> Result<MtIndication> {
    let indication = match frame.subsystem() {
        Some(Subsystem::Mac) => {
            MtIndication::Mac(MacIndication::decode(frame.cmd1(), frame.attrs())?)
        }
        Some(Subsystem::Sys) => {
            MtIndication::Sys(SysIndication::decode(frame.cmd1(), frame.attrs())?)
        }
        _ => MtIndication::Unknown {
            cmd0: frame.cmd0(),
            cmd1: frame.cmd1(),
            attrs: frame.attrs().clone(),
        },
    };
    Ok(indication)
}
