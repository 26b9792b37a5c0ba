//! MAC synchronous requests
//!
//! One struct per opcode. Field order and widths follow the co-processor's
//! MT MAC interface exactly.

use bytes::Bytes;

use super::cmd;
use crate::mt::MtRequest;
use crate::mt::common::{
    ChannelMask, ExtAddr, KEY_LEN, KEY_LOOKUP_LEN, MtAddress, SECURITY_LEN, Security,
};
use crate::protocol::{Subsystem, Writer};

macro_rules! mac_request {
    ($ty:ty, $cmd1:expr) => {
        impl MtRequest for $ty {
            const SUBSYSTEM: Subsystem = Subsystem::Mac;
            const CMD1: u8 = $cmd1;

            fn payload_len(&self) -> usize {
                self.len()
            }

            fn encode_payload(&self, writer: &mut Writer) {
                self.write(writer);
            }
        }
    };
}

/// Requests with no payload
macro_rules! empty_mac_request {
    ($(#[$doc:meta])* $name:ident, $cmd1:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl MtRequest for $name {
            const SUBSYSTEM: Subsystem = Subsystem::Mac;
            const CMD1: u8 = $cmd1;

            fn payload_len(&self) -> usize {
                0
            }

            fn encode_payload(&self, _writer: &mut Writer) {}
        }
    };
}

empty_mac_request!(
    /// Initialise the MAC on the co-processor
    InitReq,
    cmd::INIT_REQ
);
empty_mac_request!(
    /// Remove every entry from the MAC device table
    DeleteAllDevicesReq,
    cmd::DELETE_ALL_DEVICES_REQ
);
empty_mac_request!(
    /// Enable frequency hopping
    FhEnableReq,
    cmd::FH_ENABLE_REQ
);
empty_mac_request!(
    /// Start frequency hopping
    FhStartReq,
    cmd::FH_START_REQ
);

/// MCPS data request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataReq {
    /// Destination address
    pub dst: MtAddress,
    /// Destination PAN id
    pub dst_pan_id: u16,
    /// Source address mode to use
    pub src_addr_mode: u8,
    /// Handle echoed in the data confirm
    pub msdu_handle: u8,
    /// Transmit option bits
    pub tx_options: u8,
    /// Channel, when the power-and-channel option is set
    pub channel: u8,
    /// Power, when the power-and-channel option is set
    pub power: u8,
    /// Security parameters
    pub sec: Security,
    /// Frequency hopping IEs to include
    pub include_fh_ies: u32,
    /// MSDU
    pub data: Bytes,
    /// Payload IEs
    pub ie: Bytes,
}

impl DataReq {
    /// Payload length before the trailing MSDU and IEs
    pub const FIXED_LEN: usize = 0x23;

    fn len(&self) -> usize {
        Self::FIXED_LEN + self.data.len() + self.ie.len()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write(&self, writer: &mut Writer) {
        self.dst.write(writer);
        writer
            .u16_le(self.dst_pan_id)
            .u8(self.src_addr_mode)
            .u8(self.msdu_handle)
            .u8(self.tx_options)
            .u8(self.channel)
            .u8(self.power);
        self.sec.write(writer);
        // Lengths are bounded by the frame payload limit.
        writer
            .u32_le(self.include_fh_ies)
            .u16_le(self.data.len() as u16)
            .u16_le(self.ie.len() as u16)
            .bytes(&self.data)
            .bytes(&self.ie);
    }
}

mac_request!(DataReq, cmd::DATA_REQ);

/// Purge a queued data request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReq {
    /// Handle of the request to purge
    pub msdu_handle: u8,
}

impl PurgeReq {
    fn len(&self) -> usize {
        1
    }

    fn write(&self, writer: &mut Writer) {
        writer.u8(self.msdu_handle);
    }
}

mac_request!(PurgeReq, cmd::PURGE_REQ);

/// Associate with a coordinator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssociateReq {
    /// Logical channel
    pub logical_channel: u8,
    /// Channel page
    pub channel_page: u8,
    /// PHY id
    pub phy_id: u8,
    /// Coordinator address
    pub coord: MtAddress,
    /// Coordinator PAN id
    pub coord_pan_id: u16,
    /// Capability information bitmask
    pub capability_information: u8,
    /// Security parameters
    pub sec: Security,
}

impl AssociateReq {
    fn len(&self) -> usize {
        0x1A
    }

    fn write(&self, writer: &mut Writer) {
        writer
            .u8(self.logical_channel)
            .u8(self.channel_page)
            .u8(self.phy_id);
        self.coord.write(writer);
        writer
            .u16_le(self.coord_pan_id)
            .u8(self.capability_information);
        self.sec.write(writer);
    }
}

mac_request!(AssociateReq, cmd::ASSOCIATE_REQ);

/// Answer an associate indication
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssociateRsp {
    /// Device requesting association
    pub ext_addr: ExtAddr,
    /// Short address allocated to the device
    pub assoc_short_address: u16,
    /// Association status
    pub status: u8,
    /// Security parameters
    pub sec: Security,
}

impl AssociateRsp {
    fn len(&self) -> usize {
        0x16
    }

    fn write(&self, writer: &mut Writer) {
        writer
            .bytes(&self.ext_addr)
            .u16_le(self.assoc_short_address)
            .u8(self.status);
        self.sec.write(writer);
    }
}

mac_request!(AssociateRsp, cmd::ASSOCIATE_RSP);

/// Leave, or ask a device to leave, the PAN
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisassociateReq {
    /// Device address
    pub device: MtAddress,
    /// Device PAN id
    pub device_pan_id: u16,
    /// Disassociate reason
    pub reason: u8,
    /// Send indirectly
    pub tx_indirect: bool,
    /// Security parameters
    pub sec: Security,
}

impl DisassociateReq {
    fn len(&self) -> usize {
        0x18
    }

    fn write(&self, writer: &mut Writer) {
        self.device.write(writer);
        writer
            .u16_le(self.device_pan_id)
            .u8(self.reason)
            .bool(self.tx_indirect);
        self.sec.write(writer);
    }
}

mac_request!(DisassociateReq, cmd::DISASSOCIATE_REQ);

/// Read a MAC PIB attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetReq {
    /// Attribute id
    pub attribute_id: u8,
}

impl GetReq {
    fn len(&self) -> usize {
        1
    }

    fn write(&self, writer: &mut Writer) {
        writer.u8(self.attribute_id);
    }
}

mac_request!(GetReq, cmd::GET_REQ);

/// Size of the value field of [`SetReq`]
pub const PIB_VALUE_LEN: usize = 16;

/// Write a MAC PIB attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetReq {
    /// Attribute id
    pub attribute_id: u8,
    /// Little-endian value, zero padded
    pub value: [u8; PIB_VALUE_LEN],
}

impl SetReq {
    /// Build a request from a value shorter than the field; the rest is zero.
    #[must_use]
    pub fn padded(attribute_id: u8, value: &[u8]) -> Self {
        let mut field = [0u8; PIB_VALUE_LEN];
        let take = value.len().min(PIB_VALUE_LEN);
        field[..take].copy_from_slice(&value[..take]);
        Self {
            attribute_id,
            value: field,
        }
    }

    fn len(&self) -> usize {
        1 + PIB_VALUE_LEN
    }

    fn write(&self, writer: &mut Writer) {
        writer.u8(self.attribute_id).bytes(&self.value);
    }
}

mac_request!(SetReq, cmd::SET_REQ);

/// Read a security PIB attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityGetReq {
    /// Attribute id
    pub attribute_id: u8,
    /// First table index
    pub index1: u8,
    /// Second table index
    pub index2: u8,
}

impl SecurityGetReq {
    fn len(&self) -> usize {
        3
    }

    fn write(&self, writer: &mut Writer) {
        writer
            .u8(self.attribute_id)
            .u8(self.index1)
            .u8(self.index2);
    }
}

mac_request!(SecurityGetReq, cmd::SECURITY_GET_REQ);

/// Write a security PIB attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecuritySetReq {
    /// Attribute id
    pub attribute_id: u8,
    /// First table index
    pub index1: u8,
    /// Second table index
    pub index2: u8,
    /// Attribute value
    pub value: Bytes,
}

impl SecuritySetReq {
    fn len(&self) -> usize {
        3 + self.value.len()
    }

    fn write(&self, writer: &mut Writer) {
        writer
            .u8(self.attribute_id)
            .u8(self.index1)
            .u8(self.index2)
            .bytes(&self.value);
    }
}

mac_request!(SecuritySetReq, cmd::SECURITY_SET_REQ);

/// Change the PAN id in the device table and PIB
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdatePanIdReq {
    /// New PAN id
    pub pan_id: u16,
}

impl UpdatePanIdReq {
    fn len(&self) -> usize {
        2
    }

    fn write(&self, writer: &mut Writer) {
        writer.u16_le(self.pan_id);
    }
}

mac_request!(UpdatePanIdReq, cmd::UPDATE_PANID_REQ);

/// Add a device table entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddDeviceReq {
    /// Device PAN id
    pub pan_id: u16,
    /// Device short address
    pub short_addr: u16,
    /// Device extended address
    pub ext_addr: ExtAddr,
    /// Initial incoming frame counter
    pub frame_counter: u32,
    /// Device may override the minimum security level
    pub exempt: bool,
    /// Key is unique to this device
    pub unique: bool,
    /// Allow an entry that duplicates an existing one
    pub duplicate: bool,
    /// Key id lookup data size code
    pub data_size: u8,
    /// Key id lookup data
    pub lookup_data: [u8; KEY_LOOKUP_LEN],
}

impl AddDeviceReq {
    fn len(&self) -> usize {
        0x1D
    }

    fn write(&self, writer: &mut Writer) {
        writer
            .u16_le(self.pan_id)
            .u16_le(self.short_addr)
            .bytes(&self.ext_addr)
            .u32_le(self.frame_counter)
            .bool(self.exempt)
            .bool(self.unique)
            .bool(self.duplicate)
            .u8(self.data_size)
            .bytes(&self.lookup_data);
    }
}

mac_request!(AddDeviceReq, cmd::ADD_DEVICE_REQ);

/// Remove a device table entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteDeviceReq {
    /// Device extended address
    pub ext_addr: ExtAddr,
}

impl DeleteDeviceReq {
    fn len(&self) -> usize {
        8
    }

    fn write(&self, writer: &mut Writer) {
        writer.bytes(&self.ext_addr);
    }
}

mac_request!(DeleteDeviceReq, cmd::DELETE_DEVICE_REQ);

/// Remove a key and every device that uses it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteKeyReq {
    /// Key table index
    pub index: u8,
}

impl DeleteKeyReq {
    fn len(&self) -> usize {
        1
    }

    fn write(&self, writer: &mut Writer) {
        writer.u8(self.index);
    }
}

mac_request!(DeleteKeyReq, cmd::DELETE_KEY_REQ);

/// Read the outgoing frame counter of a key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadKeyReq {
    /// Key table index
    pub index: u8,
}

impl ReadKeyReq {
    fn len(&self) -> usize {
        1
    }

    fn write(&self, writer: &mut Writer) {
        writer.u8(self.index);
    }
}

mac_request!(ReadKeyReq, cmd::READ_KEY_REQ);

/// Add or replace a key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteKeyReq {
    /// Add a new key rather than replace
    pub new: bool,
    /// Key table index
    pub index: u8,
    /// Key material
    pub key: [u8; KEY_LEN],
    /// Initial outgoing frame counter
    pub frame_counter: u32,
    /// Key id lookup data size code
    pub data_size: u8,
    /// Key id lookup data
    pub lookup_data: [u8; KEY_LOOKUP_LEN],
}

impl WriteKeyReq {
    fn len(&self) -> usize {
        0x20
    }

    fn write(&self, writer: &mut Writer) {
        writer
            .bool(self.new)
            .u8(self.index)
            .bytes(&self.key)
            .u32_le(self.frame_counter)
            .u8(self.data_size)
            .bytes(&self.lookup_data);
    }
}

mac_request!(WriteKeyReq, cmd::WRITE_KEY_REQ);

/// Answer an orphan indication
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrphanRsp {
    /// Orphaned device
    pub ext_addr: ExtAddr,
    /// Short address of the orphan
    pub assoc_short_address: u16,
    /// Device was associated with this coordinator
    pub associated_member: bool,
    /// Security parameters
    pub sec: Security,
}

impl OrphanRsp {
    fn len(&self) -> usize {
        8 + 2 + 1 + SECURITY_LEN
    }

    fn write(&self, writer: &mut Writer) {
        writer
            .bytes(&self.ext_addr)
            .u16_le(self.assoc_short_address)
            .bool(self.associated_member);
        self.sec.write(writer);
    }
}

mac_request!(OrphanRsp, cmd::ORPHAN_RSP);

/// Poll the coordinator for pending data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReq {
    /// Coordinator address
    pub coord: MtAddress,
    /// Coordinator PAN id
    pub coord_pan_id: u16,
    /// Security parameters
    pub sec: Security,
}

impl PollReq {
    fn len(&self) -> usize {
        0x16
    }

    fn write(&self, writer: &mut Writer) {
        self.coord.write(writer);
        writer.u16_le(self.coord_pan_id);
        self.sec.write(writer);
    }
}

mac_request!(PollReq, cmd::POLL_REQ);

/// Reset the MAC
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetReq {
    /// Restore PIB defaults
    pub set_default: bool,
}

impl ResetReq {
    fn len(&self) -> usize {
        1
    }

    fn write(&self, writer: &mut Writer) {
        writer.bool(self.set_default);
    }
}

mac_request!(ResetReq, cmd::RESET_REQ);

/// Start an energy-detect, active, passive or orphan scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReq {
    /// Scan type
    pub scan_type: u8,
    /// Per-channel scan duration exponent
    pub scan_duration: u8,
    /// Channel page
    pub channel_page: u8,
    /// PHY id
    pub phy_id: u8,
    /// Maximum results to report
    pub max_results: u8,
    /// Only report PANs that permit joining
    pub permit_join: bool,
    /// Minimum link quality
    pub link_quality: u8,
    /// Percentage response filter
    pub rsp_filter: u8,
    /// Multi-PHY-layer management scan
    pub mpm_scan: bool,
    /// MPM scan type
    pub mpm_type: u8,
    /// MPM scan duration
    pub mpm_duration: u16,
    /// Security parameters
    pub sec: Security,
    /// Channels to scan
    pub channels: ChannelMask,
}

impl ScanReq {
    fn len(&self) -> usize {
        0x28
    }

    fn write(&self, writer: &mut Writer) {
        writer
            .u8(self.scan_type)
            .u8(self.scan_duration)
            .u8(self.channel_page)
            .u8(self.phy_id)
            .u8(self.max_results)
            .bool(self.permit_join)
            .u8(self.link_quality)
            .u8(self.rsp_filter)
            .bool(self.mpm_scan)
            .u8(self.mpm_type)
            .u16_le(self.mpm_duration);
        self.sec.write(writer);
        writer.bytes(&self.channels);
    }
}

mac_request!(ScanReq, cmd::SCAN_REQ);

/// Start or reconfigure a network
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartReq {
    /// Start time
    pub start_time: u32,
    /// PAN id
    pub pan_id: u16,
    /// Logical channel
    pub logical_channel: u8,
    /// Channel page
    pub channel_page: u8,
    /// PHY id
    pub phy_id: u8,
    /// Beacon order
    pub beacon_order: u8,
    /// Superframe order
    pub superframe_order: u8,
    /// Act as PAN coordinator
    pub pan_coordinator: bool,
    /// Battery life extension
    pub battery_life_ext: bool,
    /// Send a coordinator realignment
    pub coord_realignment: bool,
    /// Realignment security
    pub realign_sec: Security,
    /// Beacon security
    pub beacon_sec: Security,
    /// Start frequency hopping
    pub start_fh: bool,
    /// Enhanced beacon order
    pub enh_beacon_order: u8,
    /// Offset time slot
    pub ofs_time_slot: u8,
    /// Non-beacon-enabled PAN enhanced beacon order
    pub non_beacon_order: u16,
    /// Payload IE ids for the enhanced beacon
    pub ie_ids: Bytes,
}

impl StartReq {
    /// Payload length before the IE id list
    pub const FIXED_LEN: usize = 0x2A;

    fn len(&self) -> usize {
        Self::FIXED_LEN + self.ie_ids.len()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write(&self, writer: &mut Writer) {
        writer
            .u32_le(self.start_time)
            .u16_le(self.pan_id)
            .u8(self.logical_channel)
            .u8(self.channel_page)
            .u8(self.phy_id)
            .u8(self.beacon_order)
            .u8(self.superframe_order)
            .bool(self.pan_coordinator)
            .bool(self.battery_life_ext)
            .bool(self.coord_realignment);
        self.realign_sec.write(writer);
        self.beacon_sec.write(writer);
        writer
            .bool(self.start_fh)
            .u8(self.enh_beacon_order)
            .u8(self.ofs_time_slot)
            .u16_le(self.non_beacon_order)
            .u8(self.ie_ids.len() as u8)
            .bytes(&self.ie_ids);
    }
}

mac_request!(StartReq, cmd::START_REQ);

/// Synchronise with the coordinator's beacons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReq {
    /// Logical channel
    pub logical_channel: u8,
    /// Channel page
    pub channel_page: u8,
    /// Keep tracking beacons
    pub track_beacon: bool,
    /// PHY id
    pub phy_id: u8,
}

impl SyncReq {
    fn len(&self) -> usize {
        4
    }

    fn write(&self, writer: &mut Writer) {
        writer
            .u8(self.logical_channel)
            .u8(self.channel_page)
            .bool(self.track_beacon)
            .u8(self.phy_id);
    }
}

mac_request!(SyncReq, cmd::SYNC_REQ);

/// Select the receiver gain mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetRxGainReq {
    /// Gain mode
    pub mode: u8,
}

impl SetRxGainReq {
    fn len(&self) -> usize {
        1
    }

    fn write(&self, writer: &mut Writer) {
        writer.u8(self.mode);
    }
}

mac_request!(SetRxGainReq, cmd::SET_RX_GAIN_REQ);

/// Send a Wi-SUN asynchronous frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WsAsyncReq {
    /// Start or stop
    pub operation: u8,
    /// Async frame type
    pub frame_type: u8,
    /// Security parameters
    pub sec: Security,
    /// Channels to send on
    pub channels: ChannelMask,
}

impl WsAsyncReq {
    fn len(&self) -> usize {
        0x1E
    }

    fn write(&self, writer: &mut Writer) {
        writer.u8(self.operation).u8(self.frame_type);
        self.sec.write(writer);
        writer.bytes(&self.channels);
    }
}

mac_request!(WsAsyncReq, cmd::WS_ASYNC_REQ);

/// Read a frequency hopping PIB attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FhGetReq {
    /// Attribute id
    pub attribute_id: u16,
}

impl FhGetReq {
    fn len(&self) -> usize {
        2
    }

    fn write(&self, writer: &mut Writer) {
        writer.u16_le(self.attribute_id);
    }
}

mac_request!(FhGetReq, cmd::FH_GET_REQ);

/// Write a frequency hopping PIB attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FhSetReq {
    /// Attribute id
    pub attribute_id: u16,
    /// Attribute value
    pub value: Bytes,
}

impl FhSetReq {
    fn len(&self) -> usize {
        2 + self.value.len()
    }

    fn write(&self, writer: &mut Writer) {
        writer.u16_le(self.attribute_id).bytes(&self.value);
    }
}

mac_request!(FhSetReq, cmd::FH_SET_REQ);
