//! MT MAC subsystem
//!
//! Requests are typed structs sent through [`MtMac`]; confirms and
//! indications arrive as [`MacIndication`].

mod indication;
mod request;
mod status;

use bytes::Bytes;

use super::{MtRequest, srsp_status};
use crate::protocol::{MtFrame, Reader};
use crate::transport::{MtLink, TransportError};

pub use indication::{
    AssociateCnf, AssociateInd, BeaconNotifyInd, CommStatusInd, DataCnf, DataInd,
    DisassociateCnf, DisassociateInd, MacIndication, OrphanInd, PanDescriptor, PollCnf, PollInd,
    PurgeCnf, ScanCnf, ScanResult, SyncLossInd, WsAsyncInd, scan_type,
};
pub use request::{
    AddDeviceReq, AssociateReq, AssociateRsp, DataReq, DeleteAllDevicesReq, DeleteDeviceReq,
    DeleteKeyReq, DisassociateReq, FhEnableReq, FhGetReq, FhSetReq, FhStartReq, GetReq, InitReq,
    OrphanRsp, PIB_VALUE_LEN, PollReq, PurgeReq, ReadKeyReq, ResetReq, ScanReq, SecurityGetReq,
    SecuritySetReq, SetReq, SetRxGainReq, StartReq, SyncReq, UpdatePanIdReq, WriteKeyReq,
    WsAsyncReq,
};
pub use status::MacStatus;

/// MAC command ids (cmd1)
pub mod cmd {
    /// Reset request
    pub const RESET_REQ: u8 = 0x01;
    /// Init
    pub const INIT_REQ: u8 = 0x02;
    /// Start request
    pub const START_REQ: u8 = 0x03;
    /// Sync request
    pub const SYNC_REQ: u8 = 0x04;
    /// Data request
    pub const DATA_REQ: u8 = 0x05;
    /// Associate request
    pub const ASSOCIATE_REQ: u8 = 0x06;
    /// Disassociate request
    pub const DISASSOCIATE_REQ: u8 = 0x07;
    /// PIB get
    pub const GET_REQ: u8 = 0x08;
    /// PIB set
    pub const SET_REQ: u8 = 0x09;
    /// Scan request
    pub const SCAN_REQ: u8 = 0x0C;
    /// Poll request
    pub const POLL_REQ: u8 = 0x0D;
    /// Purge request
    pub const PURGE_REQ: u8 = 0x0E;
    /// Receive gain
    pub const SET_RX_GAIN_REQ: u8 = 0x0F;
    /// Security PIB get
    pub const SECURITY_GET_REQ: u8 = 0x30;
    /// Security PIB set
    pub const SECURITY_SET_REQ: u8 = 0x31;
    /// PAN id update
    pub const UPDATE_PANID_REQ: u8 = 0x32;
    /// Add device
    pub const ADD_DEVICE_REQ: u8 = 0x33;
    /// Delete device
    pub const DELETE_DEVICE_REQ: u8 = 0x34;
    /// Delete all devices
    pub const DELETE_ALL_DEVICES_REQ: u8 = 0x35;
    /// Delete key
    pub const DELETE_KEY_REQ: u8 = 0x36;
    /// Read key frame counter
    pub const READ_KEY_REQ: u8 = 0x37;
    /// Write key
    pub const WRITE_KEY_REQ: u8 = 0x38;
    /// Frequency hopping enable
    pub const FH_ENABLE_REQ: u8 = 0x40;
    /// Frequency hopping start
    pub const FH_START_REQ: u8 = 0x41;
    /// Frequency hopping PIB get
    pub const FH_GET_REQ: u8 = 0x42;
    /// Frequency hopping PIB set
    pub const FH_SET_REQ: u8 = 0x43;
    /// Wi-SUN async request
    pub const WS_ASYNC_REQ: u8 = 0x44;
    /// Associate response
    pub const ASSOCIATE_RSP: u8 = 0x50;
    /// Orphan response
    pub const ORPHAN_RSP: u8 = 0x51;

    /// Sync loss indication
    pub const SYNC_LOSS_IND: u8 = 0x80;
    /// Associate indication
    pub const ASSOCIATE_IND: u8 = 0x81;
    /// Associate confirm
    pub const ASSOCIATE_CNF: u8 = 0x82;
    /// Beacon notify indication
    pub const BEACON_NOTIFY_IND: u8 = 0x83;
    /// Data confirm
    pub const DATA_CNF: u8 = 0x84;
    /// Data indication
    pub const DATA_IND: u8 = 0x85;
    /// Disassociate indication
    pub const DISASSOCIATE_IND: u8 = 0x86;
    /// Disassociate confirm
    pub const DISASSOCIATE_CNF: u8 = 0x87;
    /// Orphan indication
    pub const ORPHAN_IND: u8 = 0x8A;
    /// Poll confirm
    pub const POLL_CNF: u8 = 0x8B;
    /// Scan confirm
    pub const SCAN_CNF: u8 = 0x8C;
    /// Comm status indication
    pub const COMM_STATUS_IND: u8 = 0x8D;
    /// Start confirm
    pub const START_CNF: u8 = 0x8E;
    /// Purge confirm
    pub const PURGE_CNF: u8 = 0x90;
    /// Poll indication
    pub const POLL_IND: u8 = 0x91;
    /// Wi-SUN async confirm
    pub const WS_ASYNC_CNF: u8 = 0x92;
    /// Wi-SUN async indication
    pub const WS_ASYNC_IND: u8 = 0x93;
}

/// Response to a MAC or frequency hopping PIB get
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRsp {
    /// Status
    pub status: MacStatus,
    /// Attribute value, as many bytes as the co-processor returned
    pub value: Bytes,
}

/// Response to a security PIB get
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGetRsp {
    /// Status
    pub status: MacStatus,
    /// First table index
    pub index1: u8,
    /// Second table index
    pub index2: u8,
    /// Attribute value
    pub value: Bytes,
}

/// Response to a key frame counter read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadKeyRsp {
    /// Status
    pub status: MacStatus,
    /// Outgoing frame counter of the key
    pub frame_counter: u32,
}

/// Split a synchronous response into its status and the bytes after it.
///
/// A failed request may answer with the status alone.
fn srsp_body(frame: &MtFrame) -> Result<(MacStatus, Bytes), TransportError> {
    let status = MacStatus::from(srsp_status(frame)?);
    Ok((status, frame.attrs().slice(1..)))
}

/// MAC requests over an MT link
///
/// Every call sends one SREQ and blocks until its SRSP arrives.
#[derive(Debug)]
pub struct MtMac<'a, L: ?Sized> {
    link: &'a L,
}

impl<'a, L: MtLink + ?Sized> MtMac<'a, L> {
    /// Issue MAC requests over `link`.
    pub const fn new(link: &'a L) -> Self {
        Self { link }
    }

    fn exchange<R: MtRequest>(&self, req: &R) -> Result<MtFrame, TransportError> {
        self.link.request(req.sreq()?)
    }

    fn status<R: MtRequest>(&self, req: &R) -> Result<MacStatus, TransportError> {
        let rsp = self.exchange(req)?;
        Ok(srsp_status(&rsp)?.into())
    }

    /// Initialise the MAC.
    pub fn init(&self) -> Result<MacStatus, TransportError> {
        self.status(&InitReq)
    }

    /// Queue a data frame.
    pub fn data_req(&self, req: &DataReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Purge a queued data frame.
    pub fn purge_req(&self, req: &PurgeReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Ask a coordinator to associate.
    pub fn associate_req(&self, req: &AssociateReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Answer an associate indication.
    pub fn associate_rsp(&self, req: &AssociateRsp) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Disassociate.
    pub fn disassociate_req(&self, req: &DisassociateReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Read a MAC PIB attribute.
    pub fn get_req(&self, req: &GetReq) -> Result<GetRsp, TransportError> {
        let (status, value) = srsp_body(&self.exchange(req)?)?;
        Ok(GetRsp { status, value })
    }

    /// Write a MAC PIB attribute.
    pub fn set_req(&self, req: &SetReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Read a security PIB attribute.
    pub fn security_get_req(&self, req: &SecurityGetReq) -> Result<SecurityGetRsp, TransportError> {
        let (status, body) = srsp_body(&self.exchange(req)?)?;
        if body.is_empty() && !status.is_success() {
            return Ok(SecurityGetRsp {
                status,
                index1: req.index1,
                index2: req.index2,
                value: Bytes::new(),
            });
        }
        let mut reader = Reader::new(&body);
        let index1 = reader.u8()?;
        let index2 = reader.u8()?;
        Ok(SecurityGetRsp {
            status,
            index1,
            index2,
            value: body.slice(2..),
        })
    }

    /// Write a security PIB attribute.
    pub fn security_set_req(&self, req: &SecuritySetReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Change the PAN id.
    pub fn update_pan_id_req(&self, req: &UpdatePanIdReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Add a device table entry.
    pub fn add_device_req(&self, req: &AddDeviceReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Remove a device table entry.
    pub fn delete_device_req(&self, req: &DeleteDeviceReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Clear the device table.
    pub fn delete_all_devices_req(&self) -> Result<MacStatus, TransportError> {
        self.status(&DeleteAllDevicesReq)
    }

    /// Remove a key and its devices.
    pub fn delete_key_req(&self, req: &DeleteKeyReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Read the outgoing frame counter of a key.
    pub fn read_key_req(&self, req: &ReadKeyReq) -> Result<ReadKeyRsp, TransportError> {
        let (status, body) = srsp_body(&self.exchange(req)?)?;
        let frame_counter = if body.is_empty() && !status.is_success() {
            0
        } else {
            Reader::new(&body).u32_le()?
        };
        Ok(ReadKeyRsp {
            status,
            frame_counter,
        })
    }

    /// Add or replace a key.
    pub fn write_key_req(&self, req: &WriteKeyReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Answer an orphan indication.
    pub fn orphan_rsp(&self, req: &OrphanRsp) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Poll the coordinator.
    pub fn poll_req(&self, req: &PollReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Reset the MAC.
    pub fn reset_req(&self, req: &ResetReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Start a scan.
    pub fn scan_req(&self, req: &ScanReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Start a network.
    pub fn start_req(&self, req: &StartReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Synchronise with a coordinator.
    pub fn sync_req(&self, req: &SyncReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Select the receiver gain.
    pub fn set_rx_gain_req(&self, req: &SetRxGainReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Send a Wi-SUN async frame.
    pub fn ws_async_req(&self, req: &WsAsyncReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }

    /// Enable frequency hopping.
    pub fn fh_enable_req(&self) -> Result<MacStatus, TransportError> {
        self.status(&FhEnableReq)
    }

    /// Start frequency hopping.
    pub fn fh_start_req(&self) -> Result<MacStatus, TransportError> {
        self.status(&FhStartReq)
    }

    /// Read a frequency hopping PIB attribute.
    pub fn fh_get_req(&self, req: &FhGetReq) -> Result<GetRsp, TransportError> {
        let (status, value) = srsp_body(&self.exchange(req)?)?;
        Ok(GetRsp { status, value })
    }

    /// Write a frequency hopping PIB attribute.
    pub fn fh_set_req(&self, req: &FhSetReq) -> Result<MacStatus, TransportError> {
        self.status(req)
    }
}
