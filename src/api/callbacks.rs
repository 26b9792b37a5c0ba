//! Indication structs and the application callback table
//!
//! MT indications are translated into the types below (addresses become
//! [`Address`], capability bytes become [`CapabilityInfo`]) and handed to
//! the matching callback. Indications with no registered callback are
//! discarded without translation.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use super::{Address, CapabilityInfo};
use crate::mt::mac::{
    self, AssociateCnf, DataCnf, DisassociateInd, MacStatus, OrphanInd, PollCnf, PurgeCnf,
    ScanResult, SyncLossInd,
};
use crate::mt::sys::ResetInd;
use crate::mt::{ChannelMask, ExtAddr, MacIndication, MtIndication, Security, SysIndication};
use crate::protocol::Result;

/// MCPS data indication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataInd {
    /// Source address
    pub src_addr: Address,
    /// Destination address
    pub dst_addr: Address,
    /// Receive timestamp, backoffs
    pub timestamp: u32,
    /// Receive timestamp, radio ticks
    pub timestamp2: u16,
    /// Source PAN id
    pub src_pan_id: u16,
    /// Destination PAN id
    pub dst_pan_id: u16,
    /// Link quality
    pub mpdu_link_quality: u8,
    /// Correlation
    pub correlation: u8,
    /// Received signal strength, dBm
    pub rssi: i8,
    /// Data sequence number
    pub dsn: u8,
    /// Security parameters
    pub sec: Security,
    /// Frame counter
    pub frame_cntr: u32,
    /// MSDU
    pub msdu: Bytes,
    /// Payload IEs; see [`parse_payload_group_ies`](super::parse_payload_group_ies)
    pub payload_ie: Bytes,
}

impl TryFrom<mac::DataInd> for DataInd {
    type Error = crate::protocol::Error;

    fn try_from(ind: mac::DataInd) -> Result<Self> {
        Ok(Self {
            src_addr: ind.src.try_into()?,
            dst_addr: ind.dst.try_into()?,
            timestamp: ind.timestamp,
            timestamp2: ind.timestamp2,
            src_pan_id: ind.src_pan_id,
            dst_pan_id: ind.dst_pan_id,
            mpdu_link_quality: ind.mpdu_link_quality,
            correlation: ind.correlation,
            rssi: ind.rssi,
            dsn: ind.dsn,
            sec: ind.sec,
            frame_cntr: ind.frame_cntr,
            msdu: ind.msdu,
            payload_ie: ind.payload_ie,
        })
    }
}

/// Wi-SUN async frame indication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsAsyncInd {
    /// Frame contents
    pub data: DataInd,
    /// Frequency hopping frame type
    pub fh_frame_type: u8,
}

/// A device asks to associate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociateInd {
    /// Device extended address
    pub device_address: ExtAddr,
    /// Device capabilities
    pub capability_information: CapabilityInfo,
    /// Security parameters
    pub sec: Security,
}

/// PAN descriptor from a beacon or scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanDesc {
    /// Coordinator address
    pub coord_address: Address,
    /// Coordinator PAN id
    pub coord_pan_id: u16,
    /// Superframe specification
    pub superframe_spec: u16,
    /// Logical channel
    pub logical_channel: u8,
    /// Channel page
    pub channel_page: u8,
    /// GTS permitted
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

impl TryFrom<&mac::PanDescriptor> for PanDesc {
    type Error = crate::protocol::Error;

    fn try_from(desc: &mac::PanDescriptor) -> Result<Self> {
        Ok(Self {
            coord_address: desc.coord.try_into()?,
            coord_pan_id: desc.coord_pan_id,
            superframe_spec: desc.superframe_spec,
            logical_channel: desc.logical_channel,
            channel_page: desc.channel_page,
            gts_permit: desc.gts_permit,
            link_quality: desc.link_quality,
            timestamp: desc.timestamp,
            security_failure: desc.security_failure,
            sec: desc.sec,
        })
    }
}

/// Beacon received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconNotifyInd {
    /// Normal or enhanced beacon
    pub beacon_type: u8,
    /// Beacon sequence number
    pub bsn: u8,
    /// PAN the beacon describes
    pub pan_desc: PanDesc,
    /// Short addresses with pending data
    pub pend_short_addrs: Vec<u16>,
    /// Extended addresses with pending data
    pub pend_ext_addrs: Vec<ExtAddr>,
    /// Beacon payload
    pub sdu: Bytes,
}

impl TryFrom<mac::BeaconNotifyInd> for BeaconNotifyInd {
    type Error = crate::protocol::Error;

    fn try_from(ind: mac::BeaconNotifyInd) -> Result<Self> {
        Ok(Self {
            beacon_type: ind.beacon_type,
            bsn: ind.bsn,
            pan_desc: PanDesc {
                coord_address: ind.coord.try_into()?,
                coord_pan_id: ind.pan_id,
                superframe_spec: ind.superframe_spec,
                logical_channel: ind.logical_channel,
                channel_page: ind.channel_page,
                gts_permit: ind.gts_permit,
                link_quality: ind.link_quality,
                timestamp: ind.timestamp,
                security_failure: ind.security_failure,
                sec: ind.sec,
            },
            pend_short_addrs: ind.pend_short_addrs,
            pend_ext_addrs: ind.pend_ext_addrs,
            sdu: ind.sdu,
        })
    }
}

/// Disassociate confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisassociateCnf {
    /// Status
    pub status: MacStatus,
    /// Device that was disassociated
    pub device_address: Address,
    /// Device PAN id
    pub pan_id: u16,
}

/// A device polled for data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollInd {
    /// Polling device
    pub src_addr: Address,
    /// Polling device's PAN id
    pub src_pan_id: u16,
    /// No data frame will answer the poll
    pub no_rsp: bool,
}

/// Result list of a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanCnfResult {
    /// Active, passive and enhanced active scans
    ///
    /// The facade drops its reference when the callback returns.
    PanDescriptors(Arc<[PanDesc]>),
    /// Energy detect scans: one reading per channel
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
    pub result: ScanCnfResult,
}

impl TryFrom<mac::ScanCnf> for ScanCnf {
    type Error = crate::protocol::Error;

    fn try_from(cnf: mac::ScanCnf) -> Result<Self> {
        let result = match cnf.result {
            ScanResult::PanDescriptors(list) => ScanCnfResult::PanDescriptors(
                list.iter()
                    .map(PanDesc::try_from)
                    .collect::<Result<Arc<[_]>>>()?,
            ),
            ScanResult::EnergyDetect(energy) => ScanCnfResult::EnergyDetect(energy),
        };
        Ok(Self {
            status: cnf.status,
            scan_type: cnf.scan_type,
            channel_page: cnf.channel_page,
            phy_id: cnf.phy_id,
            unscanned_channels: cnf.unscanned_channels,
            result_list_size: cnf.result_list_size,
            result,
        })
    }
}

/// Communication status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommStatusInd {
    /// Status
    pub status: MacStatus,
    /// Source address
    pub src_addr: Address,
    /// Destination address
    pub dst_addr: Address,
    /// PAN id
    pub pan_id: u16,
    /// What triggered the indication
    pub reason: u8,
    /// Security parameters
    pub sec: Security,
}

/// Start confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartCnf {
    /// Status
    pub status: MacStatus,
}

/// Wi-SUN async confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WsAsyncCnf {
    /// Status
    pub status: MacStatus,
}

/// A boxed application callback
pub type Callback<T> = Box<dyn FnMut(&T) + Send>;

macro_rules! callback_table {
    ($($(#[$doc:meta])* $slot:ident: $ty:ty,)*) => {
        /// Application callbacks, one optional slot per indication
        ///
        /// Callbacks run on the dispatcher thread, one at a time, in
        /// arrival order. They must not call
        /// [`ApiMac::register_callbacks`](super::ApiMac::register_callbacks).
        #[derive(Default)]
        pub struct ApiMacCallbacks {
            $($(#[$doc])* pub $slot: Option<Callback<$ty>>,)*
        }

        impl fmt::Debug for ApiMacCallbacks {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct("ApiMacCallbacks")
                    $(.field(stringify!($slot), &self.$slot.is_some()))*
                    .finish()
            }
        }
    };
}

callback_table! {
    /// Associate indication
    associate_ind: AssociateInd,
    /// Associate confirm
    associate_cnf: AssociateCnf,
    /// Disassociate indication
    disassociate_ind: DisassociateInd,
    /// Disassociate confirm
    disassociate_cnf: DisassociateCnf,
    /// Beacon notify indication
    beacon_notify_ind: BeaconNotifyInd,
    /// Orphan indication
    orphan_ind: OrphanInd,
    /// Scan confirm
    scan_cnf: ScanCnf,
    /// Start confirm
    start_cnf: StartCnf,
    /// Sync loss indication
    sync_loss_ind: SyncLossInd,
    /// Poll confirm
    poll_cnf: PollCnf,
    /// Poll indication
    poll_ind: PollInd,
    /// Comm status indication
    comm_status_ind: CommStatusInd,
    /// Data confirm
    data_cnf: DataCnf,
    /// Data indication
    data_ind: DataInd,
    /// Purge confirm
    purge_cnf: PurgeCnf,
    /// Wi-SUN async indication
    ws_async_ind: WsAsyncInd,
    /// Wi-SUN async confirm
    ws_async_cnf: WsAsyncCnf,
    /// Co-processor reset indication
    reset_ind: ResetInd,
}

/// Translate only when a callback is registered.
fn deliver<T, F>(slot: &mut Option<Callback<T>>, translate: F) -> Result<()>
where
    F: FnOnce() -> Result<T>,
{
    if let Some(callback) = slot.as_mut() {
        let value = translate()?;
        callback(&value);
    }
    Ok(())
}

impl ApiMacCallbacks {
    /// Translate `indication` and pass it to its callback.
    pub(crate) fn dispatch(&mut self, indication: MtIndication) -> Result<()> {
        match indication {
            MtIndication::Mac(mac) => self.dispatch_mac(mac),
            MtIndication::Sys(SysIndication::Reset(ind)) => {
                deliver(&mut self.reset_ind, || Ok(ind))
            }
            MtIndication::Sys(SysIndication::Unknown { .. }) | MtIndication::Unknown { .. } => {
                Ok(())
            }
        }
    }

    fn dispatch_mac(&mut self, indication: MacIndication) -> Result<()> {
        match indication {
            MacIndication::SyncLoss(ind) => deliver(&mut self.sync_loss_ind, || Ok(ind)),
            MacIndication::AssociateInd(ind) => deliver(&mut self.associate_ind, || {
                Ok(AssociateInd {
                    device_address: ind.device_address,
                    capability_information: ind.capability_information.into(),
                    sec: ind.sec,
                })
            }),
            MacIndication::AssociateCnf(cnf) => deliver(&mut self.associate_cnf, || Ok(cnf)),
            MacIndication::BeaconNotify(ind) => {
                deliver(&mut self.beacon_notify_ind, || ind.try_into())
            }
            MacIndication::DataCnf(cnf) => deliver(&mut self.data_cnf, || Ok(cnf)),
            MacIndication::DataInd(ind) => deliver(&mut self.data_ind, || ind.try_into()),
            MacIndication::DisassociateInd(ind) => {
                deliver(&mut self.disassociate_ind, || Ok(ind))
            }
            MacIndication::DisassociateCnf(cnf) => deliver(&mut self.disassociate_cnf, || {
                Ok(DisassociateCnf {
                    status: cnf.status,
                    device_address: cnf.device.try_into()?,
                    pan_id: cnf.pan_id,
                })
            }),
            MacIndication::OrphanInd(ind) => deliver(&mut self.orphan_ind, || Ok(ind)),
            MacIndication::PollCnf(cnf) => deliver(&mut self.poll_cnf, || Ok(cnf)),
            MacIndication::ScanCnf(cnf) => deliver(&mut self.scan_cnf, || cnf.try_into()),
            MacIndication::CommStatus(ind) => deliver(&mut self.comm_status_ind, || {
                Ok(CommStatusInd {
                    status: ind.status,
                    src_addr: ind.src.try_into()?,
                    dst_addr: ind.dst.try_into()?,
                    pan_id: ind.pan_id,
                    reason: ind.reason,
                    sec: ind.sec,
                })
            }),
            MacIndication::StartCnf(status) => {
                deliver(&mut self.start_cnf, || Ok(StartCnf { status }))
            }
            MacIndication::PurgeCnf(cnf) => deliver(&mut self.purge_cnf, || Ok(cnf)),
            MacIndication::PollInd(ind) => deliver(&mut self.poll_ind, || {
                Ok(PollInd {
                    src_addr: ind.src.try_into()?,
                    src_pan_id: ind.pan_id,
                    no_rsp: ind.no_response,
                })
            }),
            MacIndication::WsAsyncCnf(status) => {
                deliver(&mut self.ws_async_cnf, || Ok(WsAsyncCnf { status }))
            }
            MacIndication::WsAsyncInd(ind) => deliver(&mut self.ws_async_ind, || {
                Ok(WsAsyncInd {
                    data: ind.data.try_into()?,
                    fh_frame_type: ind.frame_type,
                })
            }),
            MacIndication::Unknown { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::mt::{MtAddress, addr_mode};
    use crate::protocol::Error;

    fn captured<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, Callback<T>) {
        let store = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&store);
        let callback: Callback<T> =
            Box::new(move |value: &T| sink.lock().unwrap().push(value.clone()));
        (store, callback)
    }

    #[test]
    fn test_unset_slot_is_skipped() {
        let mut callbacks = ApiMacCallbacks::default();
        let ind = MtIndication::Mac(MacIndication::StartCnf(MacStatus::SUCCESS));
        assert!(callbacks.dispatch(ind).is_ok());
    }

    #[test]
    fn test_associate_ind_capability() {
        let (seen, callback) = captured();
        let mut callbacks = ApiMacCallbacks {
            associate_ind: Some(callback),
            ..ApiMacCallbacks::default()
        };
        callbacks
            .dispatch(MtIndication::Mac(MacIndication::AssociateInd(
                mac::AssociateInd {
                    device_address: [8, 7, 6, 5, 4, 3, 2, 1],
                    capability_information: 0x8E,
                    sec: Security::NONE,
                },
            )))
            .unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let cap = seen[0].capability_information;
        assert!(cap.ffd && cap.mains_power && cap.rx_on_when_idle && cap.alloc_addr);
        assert!(!cap.pan_coord && !cap.security);
    }

    #[test]
    fn test_poll_ind_address_translated() {
        let (seen, callback) = captured();
        let mut callbacks = ApiMacCallbacks {
            poll_ind: Some(callback),
            ..ApiMacCallbacks::default()
        };
        let mut addr = [0u8; 8];
        addr[..2].copy_from_slice(&0x0001u16.to_le_bytes());
        callbacks
            .dispatch(MtIndication::Mac(MacIndication::PollInd(mac::PollInd {
                src: MtAddress {
                    mode: addr_mode::SHORT,
                    addr,
                },
                pan_id: 0xACDC,
                no_response: true,
            })))
            .unwrap();
        assert_eq!(
            seen.lock().unwrap()[0],
            PollInd {
                src_addr: Address::Short(0x0001),
                src_pan_id: 0xACDC,
                no_rsp: true,
            }
        );
    }

    #[test]
    fn test_bad_address_mode_is_an_error() {
        let (seen, callback) = captured::<PollInd>();
        let mut callbacks = ApiMacCallbacks {
            poll_ind: Some(callback),
            ..ApiMacCallbacks::default()
        };
        let result = callbacks.dispatch(MtIndication::Mac(MacIndication::PollInd(mac::PollInd {
            src: MtAddress { mode: 7, addr: [0; 8] },
            pan_id: 0,
            no_response: false,
        })));
        assert_eq!(result, Err(Error::InvalidAddressMode { mode: 7 }));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_debug_lists_registered_slots() {
        let callbacks = ApiMacCallbacks {
            start_cnf: Some(Box::new(|_: &StartCnf| {})),
            ..ApiMacCallbacks::default()
        };
        let text = format!("{callbacks:?}");
        assert!(text.contains("start_cnf: true"));
        assert!(text.contains("scan_cnf: false"));
    }
}
