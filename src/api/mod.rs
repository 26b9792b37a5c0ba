//! API_MAC: the application-facing MAC interface
//!
//! [`ApiMac`] wraps an [`NpiHandle`](crate::transport::NpiHandle) with typed
//! requests, PIB accessors and a callback table for indications. The
//! conversion helpers (capability flags, addresses, transmit options,
//! payload IE parsing) are usable on their own.

mod address;
mod callbacks;
mod capability;
mod ie;
mod mac;
pub mod pib;
mod request;
mod tx_options;

pub use address::Address;
pub use callbacks::{
    ApiMacCallbacks, AssociateInd, BeaconNotifyInd, Callback, CommStatusInd, DataInd,
    DisassociateCnf, PanDesc, PollInd, ScanCnf, ScanCnfResult, StartCnf, WsAsyncCnf, WsAsyncInd,
};
pub use capability::{
    CAPABLE_ALLOC_ADDR, CAPABLE_FFD, CAPABLE_MAINS_POWER, CAPABLE_PAN_COORD, CAPABLE_RX_ON_IDLE,
    CAPABLE_SECURITY, CapabilityInfo, build_msg_cap_info, convert_capability_info,
    mt_cap_inf_to_api_mac_cap_inf,
};
pub use ie::{
    PAYLOAD_IE_GROUP_TERM, PAYLOAD_IE_HEADER_LEN, PayloadIe, free_ie_list,
    parse_payload_group_ies, parse_payload_sub_ies,
};
pub use mac::ApiMac;
pub use pib::SecurityLevelEntry;
pub use request::{AssociateRequest, DataRequest, DisassociateRequest, PollRequest};
pub use tx_options::{
    TXOPTION_ACK, TXOPTION_ALT_BE, TXOPTION_INDIRECT, TXOPTION_NO_CNF, TXOPTION_NO_RETRANS,
    TXOPTION_PEND_BIT, TXOPTION_PWR_CHAN, TxOptions,
};

// Callback payloads and requests that need no translation
pub use crate::mt::mac::{
    AddDeviceReq, AssociateCnf, AssociateRsp, DataCnf, DisassociateInd, MacStatus, OrphanInd,
    OrphanRsp, PollCnf, PurgeCnf, ScanReq, StartReq, SyncLossInd, SyncReq, WriteKeyReq,
    WsAsyncReq, scan_type,
};
pub use crate::mt::sys::ResetInd;
