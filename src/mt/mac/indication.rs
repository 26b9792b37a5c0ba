//! MAC asynchronous confirms and indications

use bytes::Bytes;

use super::{MacStatus, cmd};
use crate::mt::common::{ChannelMask, ExtAddr, MtAddress, Security};
use crate::protocol::{Reader, Result};

/// Scan types whose confirm carries PAN descriptors
pub mod scan_type {
    /// Energy detect
    pub const ENERGY_DETECT: u8 = 0;
    /// Active
    pub const ACTIVE: u8 = 1;
    /// Passive
    pub const PASSIVE: u8 = 2;
    /// Orphan
    pub const ORPHAN: u8 = 3;
    /// Enhanced active
    pub const ACTIVE_ENHANCED: u8 = 5;
}

/// MCPS data confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataCnf {
    /// Transmit status
    pub status: MacStatus,
    /// Handle from the data request
    pub msdu_handle: u8,
    /// Transmit timestamp in backoffs
    pub timestamp: u32,
    /// Transmit timestamp in radio ticks
    pub timestamp2: u16,
    /// Retries used
    pub retries: u8,
    /// Link quality of the ack
    pub mpdu_link_quality: u8,
    /// Raw correlation value
    pub correlation: u8,
    /// RSSI of the ack
    pub rssi: i8,
    /// Frame counter used
    pub frame_cntr: u32,
}

impl DataCnf {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            status: reader.u8()?.into(),
            msdu_handle: reader.u8()?,
            timestamp: reader.u32_le()?,
            timestamp2: reader.u16_le()?,
            retries: reader.u8()?,
            mpdu_link_quality: reader.u8()?,
            correlation: reader.u8()?,
            rssi: i8::from_le_bytes([reader.u8()?]),
            frame_cntr: reader.u32_le()?,
        })
    }
}

/// MCPS data indication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataInd {
    /// Source address
    pub src: MtAddress,
    /// Destination address
    pub dst: MtAddress,
    /// Receive timestamp in backoffs
    pub timestamp: u32,
    /// Receive timestamp in radio ticks
    pub timestamp2: u16,
    /// Source PAN id
    pub src_pan_id: u16,
    /// Destination PAN id
    pub dst_pan_id: u16,
    /// Link quality
    pub mpdu_link_quality: u8,
    /// Raw correlation value
    pub correlation: u8,
    /// RSSI
    pub rssi: i8,
    /// Data sequence number
    pub dsn: u8,
    /// Security parameters
    pub sec: Security,
    /// Frame counter
    pub frame_cntr: u32,
    /// MSDU
    pub msdu: Bytes,
    /// Payload IEs, unparsed
    pub payload_ie: Bytes,
}

/// Wi-SUN asynchronous frame indication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsAsyncInd {
    /// Common data indication fields
    pub data: DataInd,
    /// Async frame type
    pub frame_type: u8,
}

/// Data and async indications share one layout; async frames insert a
/// frame type byte after the frame counter.
fn read_data_ind(reader: &mut Reader<'_>, async_frame: bool) -> Result<(DataInd, u8)> {
    let src = MtAddress::read(reader)?;
    let dst = MtAddress::read(reader)?;
    let timestamp = reader.u32_le()?;
    let timestamp2 = reader.u16_le()?;
    let src_pan_id = reader.u16_le()?;
    let dst_pan_id = reader.u16_le()?;
    let mpdu_link_quality = reader.u8()?;
    let correlation = reader.u8()?;
    let rssi = i8::from_le_bytes([reader.u8()?]);
    let dsn = reader.u8()?;
    let sec = Security::read(reader)?;
    let frame_cntr = reader.u32_le()?;
    let frame_type = if async_frame { reader.u8()? } else { 0 };
    let data_len = usize::from(reader.u16_le()?);
    let ie_len = usize::from(reader.u16_le()?);
    let msdu = Bytes::copy_from_slice(reader.bytes(data_len)?);
    let payload_ie = Bytes::copy_from_slice(reader.bytes(ie_len)?);

    Ok((
        DataInd {
            src,
            dst,
            timestamp,
            timestamp2,
            src_pan_id,
            dst_pan_id,
            mpdu_link_quality,
            correlation,
            rssi,
            dsn,
            sec,
            frame_cntr,
            msdu,
            payload_ie,
        },
        frame_type,
    ))
}

/// Purge confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeCnf {
    /// Purge status
    pub status: MacStatus,
    /// Handle of the purged request
    pub msdu_handle: u8,
}

/// Loss of synchronisation with the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncLossInd {
    /// Loss reason
    pub reason: MacStatus,
    /// PAN id
    pub pan_id: u16,
    /// Logical channel
    pub logical_channel: u8,
    /// Channel page
    pub channel_page: u8,
    /// PHY id
    pub phy_id: u8,
    /// Security parameters
    pub sec: Security,
}

/// A device asks to associate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociateInd {
    /// Device extended address
    pub device_address: ExtAddr,
    /// Capability information byte
    pub capability_information: u8,
    /// Security parameters
    pub sec: Security,
}

/// Association result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociateCnf {
    /// Association status
    pub status: MacStatus,
    /// Short address allocated by the coordinator
    pub assoc_short_address: u16,
    /// Security parameters
    pub sec: Security,
}

/// Received beacon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconNotifyInd {
    /// Beacon type
    pub beacon_type: u8,
    /// Beacon sequence number
    pub bsn: u8,
    /// Receive timestamp
    pub timestamp: u32,
    /// Coordinator address
    pub coord: MtAddress,
    /// PAN id
    pub pan_id: u16,
    /// Superframe specification
    pub superframe_spec: u16,
    /// Logical channel
    pub logical_channel: u8,
    /// Channel page
    pub channel_page: u8,
    /// GTS permit
    pub gts_permit: bool,
    /// Link quality
    pub link_quality: u8,
    /// Security processing failed
    pub security_failure: bool,
    /// Security parameters
    pub sec: Security,
    /// Short addresses with pending data
    pub pend_short_addrs: Vec<u16>,
    /// Extended addresses with pending data
    pub pend_ext_addrs: Vec<ExtAddr>,
    /// Beacon payload
    pub sdu: Bytes,
}

impl BeaconNotifyInd {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let beacon_type = reader.u8()?;
        let bsn = reader.u8()?;
        let timestamp = reader.u32_le()?;
        let coord = MtAddress::read(reader)?;
        let pan_id = reader.u16_le()?;
        let superframe_spec = reader.u16_le()?;
        let logical_channel = reader.u8()?;
        let channel_page = reader.u8()?;
        let gts_permit = reader.bool()?;
        let link_quality = reader.u8()?;
        let security_failure = reader.bool()?;
        let sec = Security::read(reader)?;
        let short_count = reader.u8()?;
        let ext_count = reader.u8()?;
        let sdu_len = usize::from(reader.u8()?);

        let pend_short_addrs = (0..short_count)
            .map(|_| reader.u16_le())
            .collect::<Result<Vec<_>>>()?;
        let pend_ext_addrs = (0..ext_count)
            .map(|_| reader.array())
            .collect::<Result<Vec<_>>>()?;
        let sdu = Bytes::copy_from_slice(reader.bytes(sdu_len)?);

        Ok(Self {
            beacon_type,
            bsn,
            timestamp,
            coord,
            pan_id,
            superframe_spec,
            logical_channel,
            channel_page,
            gts_permit,
            link_quality,
            security_failure,
            sec,
            pend_short_addrs,
            pend_ext_addrs,
            sdu,
        })
    }
}

/// A device has left, or been asked to leave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisassociateInd {
    /// Device extended address
    pub device_address: ExtAddr,
    /// Disassociate reason
    pub disassociate_reason: u8,
    /// Security parameters
    pub sec: Security,
}

/// Disassociation result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisassociateCnf {
    /// Status
    pub status: MacStatus,
    /// Device address
    pub device: MtAddress,
    /// Device PAN id
    pub pan_id: u16,
}

/// An orphaned device is looking for its coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrphanInd {
    /// Orphan's extended address
    pub orphan_address: ExtAddr,
    /// Security parameters
    pub sec: Security,
}

/// Poll result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollCnf {
    /// Status
    pub status: MacStatus,
    /// More data is pending
    pub frame_pending: bool,
}

/// A device polled this coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollInd {
    /// Polling device
    pub src: MtAddress,
    /// PAN id
    pub pan_id: u16,
    /// The MAC did not answer the poll
    pub no_response: bool,
}

/// PAN descriptor carried by a scan confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanDescriptor {
    /// Coordinator address
    pub coord: MtAddress,
    /// PAN id
    pub coord_pan_id: u16,
    /// Superframe specification
    pub superframe_spec: u16,
    /// Logical channel
    pub logical_channel: u8,
    /// Channel page
    pub channel_page: u8,
    /// GTS permit
    pub gts_permit: bool,
    /// Link quality
    pub link_quality: u8,
    /// Receive timestamp
    pub timestamp: u32,
    /// Security processing failed
    pub security_failure: bool,
    /// Security parameters
    pub sec: Security,
}

impl PanDescriptor {
    /// Bytes per descriptor on the wire
    pub const WIRE_LEN: usize = 33;

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            coord: MtAddress::read(reader)?,
            coord_pan_id: reader.u16_le()?,
            superframe_spec: reader.u16_le()?,
            logical_channel: reader.u8()?,
            channel_page: reader.u8()?,
            gts_permit: reader.bool()?,
            link_quality: reader.u8()?,
            timestamp: reader.u32_le()?,
            security_failure: reader.bool()?,
            sec: Security::read(reader)?,
        })
    }
}

/// Scan results, by scan type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
    /// Active, passive and enhanced active scans
    PanDescriptors(Vec<PanDescriptor>),
    /// Energy detect per channel; empty for orphan scans
    EnergyDetect(Bytes),
}

/// Scan confirm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCnf {
    /// Status
    pub status: MacStatus,
    /// Scan type
    pub scan_type: u8,
    /// Channel page
    pub channel_page: u8,
    /// PHY id
    pub phy_id: u8,
    /// Channels not scanned
    pub unscanned_channels: ChannelMask,
    /// Number of results
    pub result_list_size: u8,
    /// Results
    pub result: ScanResult,
}

impl ScanCnf {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let status = reader.u8()?.into();
        let kind = reader.u8()?;
        let channel_page = reader.u8()?;
        let phy_id = reader.u8()?;
        let unscanned_channels = reader.array()?;
        let result_list_size = reader.u8()?;

        let result = match kind {
            scan_type::ACTIVE | scan_type::PASSIVE | scan_type::ACTIVE_ENHANCED => {
                ScanResult::PanDescriptors(
                    (0..result_list_size)
                        .map(|_| PanDescriptor::read(reader))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            _ => ScanResult::EnergyDetect(Bytes::copy_from_slice(reader.rest())),
        };

        Ok(Self {
            status,
            scan_type: kind,
            channel_page,
            phy_id,
            unscanned_channels,
            result_list_size,
            result,
        })
    }
}

/// Communication status for frames the MAC handled on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommStatusInd {
    /// Status
    pub status: MacStatus,
    /// Source address
    pub src: MtAddress,
    /// Destination address
    pub dst: MtAddress,
    /// PAN id
    pub pan_id: u16,
    /// Reason code
    pub reason: u8,
    /// Security parameters
    pub sec: Security,
}

/// MAC asynchronous message from the co-processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacIndication {
    /// Sync loss
    SyncLoss(SyncLossInd),
    /// Associate indication
    AssociateInd(AssociateInd),
    /// Associate confirm
    AssociateCnf(AssociateCnf),
    /// Beacon notify
    BeaconNotify(BeaconNotifyInd),
    /// Data confirm
    DataCnf(DataCnf),
    /// Data indication
    DataInd(DataInd),
    /// Disassociate indication
    DisassociateInd(DisassociateInd),
    /// Disassociate confirm
    DisassociateCnf(DisassociateCnf),
    /// Orphan indication
    OrphanInd(OrphanInd),
    /// Poll confirm
    PollCnf(PollCnf),
    /// Scan confirm
    ScanCnf(ScanCnf),
    /// Comm status indication
    CommStatus(CommStatusInd),
    /// Start confirm
    StartCnf(MacStatus),
    /// Purge confirm
    PurgeCnf(PurgeCnf),
    /// Poll indication
    PollInd(PollInd),
    /// Wi-SUN async confirm
    WsAsyncCnf(MacStatus),
    /// Wi-SUN async indication
    WsAsyncInd(WsAsyncInd),
    /// Command this crate does not know
    Unknown {
        /// Command id
        cmd1: u8,
        /// Raw payload
        attrs: Bytes,
    },
}

impl MacIndication {
    /// Decode an AREQ payload by command id.
    pub fn decode(cmd1: u8, attrs: &Bytes) -> Result<Self> {
        let mut reader = Reader::new(attrs);
        let r = &mut reader;
        let indication = match cmd1 {
            cmd::SYNC_LOSS_IND => Self::SyncLoss(SyncLossInd {
                reason: r.u8()?.into(),
                pan_id: r.u16_le()?,
                logical_channel: r.u8()?,
                channel_page: r.u8()?,
                phy_id: r.u8()?,
                sec: Security::read(r)?,
            }),
            cmd::ASSOCIATE_IND => Self::AssociateInd(AssociateInd {
                device_address: r.array()?,
                capability_information: r.u8()?,
                sec: Security::read(r)?,
            }),
            cmd::ASSOCIATE_CNF => Self::AssociateCnf(AssociateCnf {
                status: r.u8()?.into(),
                assoc_short_address: r.u16_le()?,
                sec: Security::read(r)?,
            }),
            cmd::BEACON_NOTIFY_IND => Self::BeaconNotify(BeaconNotifyInd::read(r)?),
            cmd::DATA_CNF => Self::DataCnf(DataCnf::read(r)?),
            cmd::DATA_IND => Self::DataInd(read_data_ind(r, false)?.0),
            cmd::DISASSOCIATE_IND => Self::DisassociateInd(DisassociateInd {
                device_address: r.array()?,
                disassociate_reason: r.u8()?,
                sec: Security::read(r)?,
            }),
            cmd::DISASSOCIATE_CNF => Self::DisassociateCnf(DisassociateCnf {
                status: r.u8()?.into(),
                device: MtAddress::read(r)?,
                pan_id: r.u16_le()?,
            }),
            cmd::ORPHAN_IND => Self::OrphanInd(OrphanInd {
                orphan_address: r.array()?,
                sec: Security::read(r)?,
            }),
            cmd::POLL_CNF => Self::PollCnf(PollCnf {
                status: r.u8()?.into(),
                frame_pending: r.bool()?,
            }),
            cmd::SCAN_CNF => Self::ScanCnf(ScanCnf::read(r)?),
            cmd::COMM_STATUS_IND => Self::CommStatus(CommStatusInd {
                status: r.u8()?.into(),
                src: MtAddress::read(r)?,
                dst: MtAddress::read(r)?,
                pan_id: r.u16_le()?,
                reason: r.u8()?,
                sec: Security::read(r)?,
            }),
            cmd::START_CNF => Self::StartCnf(r.u8()?.into()),
            cmd::PURGE_CNF => Self::PurgeCnf(PurgeCnf {
                status: r.u8()?.into(),
                msdu_handle: r.u8()?,
            }),
            cmd::POLL_IND => Self::PollInd(PollInd {
                src: MtAddress::read(r)?,
                pan_id: r.u16_le()?,
                no_response: r.bool()?,
            }),
            cmd::WS_ASYNC_CNF => Self::WsAsyncCnf(r.u8()?.into()),
            cmd::WS_ASYNC_IND => {
                let (data, frame_type) = read_data_ind(r, true)?;
                Self::WsAsyncInd(WsAsyncInd { data, frame_type })
            }
            _ => Self::Unknown {
                cmd1,
                attrs: attrs.clone(),
            },
        };
        Ok(indication)
    }

    /// Command id this indication arrived with
    #[must_use]
    pub fn cmd1(&self) -> u8 {
        match self {
            Self::SyncLoss(_) => cmd::SYNC_LOSS_IND,
            Self::AssociateInd(_) => cmd::ASSOCIATE_IND,
            Self::AssociateCnf(_) => cmd::ASSOCIATE_CNF,
            Self::BeaconNotify(_) => cmd::BEACON_NOTIFY_IND,
            Self::DataCnf(_) => cmd::DATA_CNF,
            Self::DataInd(_) => cmd::DATA_IND,
            Self::DisassociateInd(_) => cmd::DISASSOCIATE_IND,
            Self::DisassociateCnf(_) => cmd::DISASSOCIATE_CNF,
            Self::OrphanInd(_) => cmd::ORPHAN_IND,
            Self::PollCnf(_) => cmd::POLL_CNF,
            Self::ScanCnf(_) => cmd::SCAN_CNF,
            Self::CommStatus(_) => cmd::COMM_STATUS_IND,
            Self::StartCnf(_) => cmd::START_CNF,
            Self::PurgeCnf(_) => cmd::PURGE_CNF,
            Self::PollInd(_) => cmd::POLL_IND,
            Self::WsAsyncCnf(_) => cmd::WS_ASYNC_CNF,
            Self::WsAsyncInd(_) => cmd::WS_ASYNC_IND,
            Self::Unknown { cmd1, .. } => *cmd1,
        }
    }
}
