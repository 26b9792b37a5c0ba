//! MT UTIL subsystem

use super::{ExtAddr, MtRequest, srsp_status};
use crate::protocol::{Reader, Subsystem, Writer};
use crate::transport::{MtLink, TransportError};

/// UTIL command ids (cmd1)
pub mod cmd {
    /// Enable or disable callbacks per subsystem
    pub const CALLBACK_SUB_CMD: u8 = 0x06;
    /// Random number
    pub const RANDOM: u8 = 0x12;
    /// Read an extended address
    pub const GET_EXT_ADDR: u8 = 0xEE;
}

/// Which extended address to read
pub mod ext_addr_type {
    /// Address in use by the MAC
    pub const MAC_PIB: u8 = 0;
    /// Primary (factory) address
    pub const PRIMARY: u8 = 1;
    /// User-configured address
    pub const USER_CFG: u8 = 2;
}

/// Read an extended address from the co-processor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetExtAddrReq {
    /// One of [`ext_addr_type`]
    pub addr_type: u8,
}

impl MtRequest for GetExtAddrReq {
    const SUBSYSTEM: Subsystem = Subsystem::Util;
    const CMD1: u8 = cmd::GET_EXT_ADDR;

    fn payload_len(&self) -> usize {
        1
    }

    fn encode_payload(&self, writer: &mut Writer) {
        writer.u8(self.addr_type);
    }
}

/// Random number request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomReq;

impl MtRequest for RandomReq {
    const SUBSYSTEM: Subsystem = Subsystem::Util;
    const CMD1: u8 = cmd::RANDOM;

    fn payload_len(&self) -> usize {
        0
    }

    fn encode_payload(&self, _writer: &mut Writer) {}
}

/// Select which callbacks a subsystem reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallbackSubCmd {
    /// Subsystem id
    pub subsystem_id: u8,
    /// Callback enable bitmap
    pub enables: u32,
}

impl MtRequest for CallbackSubCmd {
    const SUBSYSTEM: Subsystem = Subsystem::Util;
    const CMD1: u8 = cmd::CALLBACK_SUB_CMD;

    fn payload_len(&self) -> usize {
        5
    }

    fn encode_payload(&self, writer: &mut Writer) {
        writer.u8(self.subsystem_id).u32_le(self.enables);
    }
}

/// Response to [`CallbackSubCmd`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackSubRsp {
    /// MT status
    pub status: u8,
    /// Enable bitmap now in effect
    pub enables: u32,
}

/// UTIL requests over an MT link
#[derive(Debug)]
pub struct MtUtil<'a, L: ?Sized> {
    link: &'a L,
}

impl<'a, L: MtLink + ?Sized> MtUtil<'a, L> {
    /// Issue UTIL requests over `link`.
    pub const fn new(link: &'a L) -> Self {
        Self { link }
    }

    /// Read an extended address; returns the type echoed back and the address.
    pub fn get_ext_addr(&self, addr_type: u8) -> Result<(u8, ExtAddr), TransportError> {
        let rsp = self.link.request(GetExtAddrReq { addr_type }.sreq()?)?;
        let mut reader = Reader::new(rsp.attrs());
        Ok((reader.u8()?, reader.array()?))
    }

    /// Random 16-bit value from the co-processor's RNG.
    pub fn random(&self) -> Result<u16, TransportError> {
        let rsp = self.link.request(RandomReq.sreq()?)?;
        Ok(Reader::new(rsp.attrs()).u16_le()?)
    }

    /// Change a subsystem's callback enables.
    pub fn callback_sub_cmd(&self, req: &CallbackSubCmd) -> Result<CallbackSubRsp, TransportError> {
        let rsp = self.link.request(req.sreq()?)?;
        let status = srsp_status(&rsp)?;
        let mut reader = Reader::new(&rsp.attrs()[1..]);
        Ok(CallbackSubRsp {
            status,
            enables: reader.u32_le()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_frames() {
        let frame = GetExtAddrReq {
            addr_type: ext_addr_type::PRIMARY,
        }
        .sreq()
        .unwrap();
        assert_eq!(frame.cmd0(), 0x27);
        assert_eq!(frame.cmd1(), 0xEE);
        assert_eq!(frame.attrs().as_ref(), &[1]);

        let frame = CallbackSubCmd {
            subsystem_id: 2,
            enables: 0xFFFF_FFFF,
        }
        .sreq()
        .unwrap();
        assert_eq!(frame.attrs().len(), 5);

        assert!(RandomReq.sreq().unwrap().is_empty());
    }
}
