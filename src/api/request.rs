//! Application-level request parameters
//!
//! Requests that carry addresses, capability flags or transmit options
//! have their own types here; they convert into the MT request structs.
//! Requests without such fields use the MT structs directly.

use bytes::Bytes;

use super::{Address, CapabilityInfo, TxOptions};
use crate::mt::Security;
use crate::mt::mac::{AssociateReq, DataReq, DisassociateReq, PollReq};

/// MCPS data request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataRequest {
    /// Destination address
    pub dst_addr: Address,
    /// Destination PAN id
    pub dst_pan_id: u16,
    /// Source address mode
    pub src_addr_mode: u8,
    /// Handle echoed in the data confirm
    pub msdu_handle: u8,
    /// Transmit options
    pub tx_options: TxOptions,
    /// Channel, with [`TxOptions::use_power_and_channel`]
    pub channel: u8,
    /// Power, with [`TxOptions::use_power_and_channel`]
    pub power: u8,
    /// Security parameters
    pub sec: Security,
    /// Frequency hopping IE bitmap
    pub include_fh_ies: u32,
    /// MSDU
    pub msdu: Bytes,
    /// Payload IEs
    pub payload_ie: Bytes,
}

impl From<&DataRequest> for DataReq {
    fn from(req: &DataRequest) -> Self {
        Self {
            dst: req.dst_addr.to_mt(),
            dst_pan_id: req.dst_pan_id,
            src_addr_mode: req.src_addr_mode,
            msdu_handle: req.msdu_handle,
            tx_options: req.tx_options.to_u8(),
            channel: req.channel,
            power: req.power,
            sec: req.sec,
            include_fh_ies: req.include_fh_ies,
            data: req.msdu.clone(),
            ie: req.payload_ie.clone(),
        }
    }
}

/// MLME associate request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssociateRequest {
    /// Logical channel
    pub logical_channel: u8,
    /// Channel page
    pub channel_page: u8,
    /// PHY id
    pub phy_id: u8,
    /// Coordinator address
    pub coord_address: Address,
    /// Coordinator PAN id
    pub coord_pan_id: u16,
    /// Capabilities of this device
    pub capability_information: CapabilityInfo,
    /// Security parameters
    pub sec: Security,
}

impl From<&AssociateRequest> for AssociateReq {
    fn from(req: &AssociateRequest) -> Self {
        Self {
            logical_channel: req.logical_channel,
            channel_page: req.channel_page,
            phy_id: req.phy_id,
            coord: req.coord_address.to_mt(),
            coord_pan_id: req.coord_pan_id,
            capability_information: req.capability_information.to_u8(),
            sec: req.sec,
        }
    }
}

/// MLME disassociate request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisassociateRequest {
    /// Device address
    pub device_address: Address,
    /// Device PAN id
    pub device_pan_id: u16,
    /// Reason code
    pub disassociate_reason: u8,
    /// Send indirectly
    pub tx_indirect: bool,
    /// Security parameters
    pub sec: Security,
}

impl From<&DisassociateRequest> for DisassociateReq {
    fn from(req: &DisassociateRequest) -> Self {
        Self {
            device: req.device_address.to_mt(),
            device_pan_id: req.device_pan_id,
            reason: req.disassociate_reason,
            tx_indirect: req.tx_indirect,
            sec: req.sec,
        }
    }
}

/// MLME poll request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollRequest {
    /// Coordinator address
    pub coord_address: Address,
    /// Coordinator PAN id
    pub coord_pan_id: u16,
    /// Security parameters
    pub sec: Security,
}

impl From<&PollRequest> for PollReq {
    fn from(req: &PollRequest) -> Self {
        Self {
            coord: req.coord_address.to_mt(),
            coord_pan_id: req.coord_pan_id,
            sec: req.sec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mt::addr_mode;

    #[test]
    fn test_associate_request_capability_byte() {
        let req = AssociateRequest {
            coord_address: Address::Short(0xAABB),
            capability_information: CapabilityInfo {
                ffd: true,
                rx_on_when_idle: true,
                ..CapabilityInfo::default()
            },
            ..AssociateRequest::default()
        };
        let mt = AssociateReq::from(&req);
        assert_eq!(mt.capability_information, 0x0A);
        assert_eq!(mt.coord.mode, addr_mode::SHORT);
        assert_eq!(mt.coord.addr[..2], [0xBB, 0xAA]);
    }

    #[test]
    fn test_data_request_options() {
        let req = DataRequest {
            dst_addr: Address::Extended([1, 2, 3, 4, 5, 6, 7, 8]),
            tx_options: TxOptions {
                ack: true,
                ..TxOptions::default()
            },
            msdu: Bytes::from_static(b"hi"),
            ..DataRequest::default()
        };
        let mt = DataReq::from(&req);
        assert_eq!(mt.tx_options, 0x01);
        assert_eq!(mt.dst.addr, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(mt.data.as_ref(), b"hi");
    }
}
