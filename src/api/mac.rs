//! The `ApiMac` facade

use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use tracing::{debug, info, instrument, warn};

use super::callbacks::ApiMacCallbacks;
use super::pib::{SecurityLevelEntry, mac_attr, security_attr};
use super::request::{AssociateRequest, DataRequest, DisassociateRequest, PollRequest};
use crate::mt::mac::{
    AddDeviceReq, AssociateRsp, DeleteDeviceReq, DeleteKeyReq, FhGetReq, FhSetReq, GetReq,
    OrphanRsp, PIB_VALUE_LEN, PurgeReq, ReadKeyReq, ResetReq, ScanReq, SecurityGetReq,
    SecuritySetReq, SetReq, SetRxGainReq, StartReq, SyncReq, UpdatePanIdReq, WriteKeyReq,
    WsAsyncReq,
};
use crate::mt::util::ext_addr_type;
use crate::mt::{ExtAddr, MacStatus, MtIndication, MtMac, MtUtil};
use crate::protocol::metrics::Metrics;
use crate::transport::{Dispatcher, NpiHandle, TransportError};

type Result<T> = std::result::Result<T, TransportError>;

/// Copy up to `N` little-endian bytes, zero-filling the rest.
fn le_array<const N: usize>(value: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let take = value.len().min(N);
    out[..take].copy_from_slice(&value[..take]);
    out
}

/// Truncate or zero-pad `value` to exactly `len` bytes.
fn fit(value: &[u8], len: usize) -> Bytes {
    let mut out = vec![0u8; len];
    let take = value.len().min(len);
    out[..take].copy_from_slice(&value[..take]);
    Bytes::from(out)
}

/// MAC API over an NPI link
///
/// Owns the link, the indication dispatcher and the callback table.
/// Requests block until the co-processor answers; MAC failures come back
/// as [`MacStatus`] values, link failures as [`TransportError`].
#[derive(Debug)]
pub struct ApiMac {
    npi: NpiHandle,
    callbacks: Arc<Mutex<ApiMacCallbacks>>,
    dispatcher: Option<Dispatcher>,
    ext_addr: Option<ExtAddr>,
}

impl ApiMac {
    /// Take over `npi` and start delivering its indications to callbacks.
    pub fn new(npi: NpiHandle) -> Result<Self> {
        let callbacks = Arc::new(Mutex::new(ApiMacCallbacks::default()));
        let table = Arc::clone(&callbacks);
        let dispatcher = Dispatcher::spawn(npi.indications(), move |indication: MtIndication| {
            let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(err) = table.dispatch(indication) {
                warn!(error = %err, "indication could not be translated");
                Metrics::record_areq_dropped();
            }
        })?;
        Ok(Self {
            npi,
            callbacks,
            dispatcher: Some(dispatcher),
            ext_addr: None,
        })
    }

    /// The underlying link.
    #[must_use]
    pub const fn npi(&self) -> &NpiHandle {
        &self.npi
    }

    /// Extended address learned by [`init`](Self::init).
    #[must_use]
    pub const fn ext_addr(&self) -> Option<ExtAddr> {
        self.ext_addr
    }

    fn mac(&self) -> MtMac<'_, NpiHandle> {
        MtMac::new(&self.npi)
    }

    /// Bring the MAC to a known state.
    ///
    /// Optionally enables frequency hopping, resets the MAC to its default
    /// PIB, reads the primary extended address and programs it into the
    /// PIB. Returns the extended address.
    #[instrument(level = "info", skip(self))]
    pub fn init(&mut self, enable_fh: bool) -> Result<ExtAddr> {
        if enable_fh {
            let status = self.enable_fh()?;
            if !status.is_success() {
                warn!(%status, "frequency hopping enable failed");
            }
        }

        let status = self.mlme_reset_req(true)?;
        if !status.is_success() {
            warn!(%status, "MAC reset failed");
        }

        let (_, ext_addr) = MtUtil::new(&self.npi).get_ext_addr(ext_addr_type::PRIMARY)?;
        self.ext_addr = Some(ext_addr);

        let status = self.mlme_set_req_array(mac_attr::EXTENDED_ADDRESS, &ext_addr)?;
        if !status.is_success() {
            warn!(%status, "extended address not accepted");
        }
        info!(ext_addr = ?ext_addr, "MAC initialised");
        Ok(ext_addr)
    }

    /// Replace the callback table.
    ///
    /// Must not be called from inside a callback.
    pub fn register_callbacks(&self, callbacks: ApiMacCallbacks) {
        debug!(?callbacks, "callbacks registered");
        *self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = callbacks;
    }

    /// Stop indication delivery and close the link. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut dispatcher) = self.dispatcher.take() {
            dispatcher.stop();
            self.npi.close();
        }
    }

    // Data service

    /// Send a data frame.
    pub fn mcps_data_req(&self, req: &DataRequest) -> Result<MacStatus> {
        self.mac().data_req(&req.into())
    }

    /// Purge a queued data frame.
    pub fn mcps_purge_req(&self, msdu_handle: u8) -> Result<MacStatus> {
        self.mac().purge_req(&PurgeReq { msdu_handle })
    }

    // Management service

    /// Ask a coordinator to associate.
    pub fn mlme_associate_req(&self, req: &AssociateRequest) -> Result<MacStatus> {
        self.mac().associate_req(&req.into())
    }

    /// Answer an associate indication.
    pub fn mlme_associate_rsp(&self, rsp: &AssociateRsp) -> Result<MacStatus> {
        self.mac().associate_rsp(rsp)
    }

    /// Disassociate from, or disassociate a device from, the PAN.
    pub fn mlme_disassociate_req(&self, req: &DisassociateRequest) -> Result<MacStatus> {
        self.mac().disassociate_req(&req.into())
    }

    /// Answer an orphan indication.
    pub fn mlme_orphan_rsp(&self, rsp: &OrphanRsp) -> Result<MacStatus> {
        self.mac().orphan_rsp(rsp)
    }

    /// Poll the coordinator for pending data.
    pub fn mlme_poll_req(&self, req: &PollRequest) -> Result<MacStatus> {
        self.mac().poll_req(&req.into())
    }

    /// Reset the MAC, optionally restoring the default PIB.
    pub fn mlme_reset_req(&self, set_default_pib: bool) -> Result<MacStatus> {
        self.mac().reset_req(&ResetReq {
            set_default: set_default_pib,
        })
    }

    /// Start a scan. The result arrives in the scan confirm callback.
    pub fn mlme_scan_req(&self, req: &ScanReq) -> Result<MacStatus> {
        self.mac().scan_req(req)
    }

    /// Start or reconfigure a network.
    pub fn mlme_start_req(&self, req: &StartReq) -> Result<MacStatus> {
        self.mac().start_req(req)
    }

    /// Synchronise with the coordinator's beacons.
    pub fn mlme_sync_req(&self, req: &SyncReq) -> Result<MacStatus> {
        self.mac().sync_req(req)
    }

    /// Send a Wi-SUN async frame.
    pub fn mlme_ws_async_req(&self, req: &WsAsyncReq) -> Result<MacStatus> {
        self.mac().ws_async_req(req)
    }

    /// Start frequency hopping.
    pub fn start_fh(&self) -> Result<MacStatus> {
        self.mac().fh_start_req()
    }

    /// Enable frequency hopping.
    pub fn enable_fh(&self) -> Result<MacStatus> {
        self.mac().fh_enable_req()
    }

    /// Change the PAN id in the device table and PIB.
    pub fn update_pan_id(&self, pan_id: u16) -> Result<MacStatus> {
        self.mac().update_pan_id_req(&UpdatePanIdReq { pan_id })
    }

    /// Select the receiver gain mode.
    pub fn set_rx_gain(&self, mode: u8) -> Result<MacStatus> {
        self.mac().set_rx_gain_req(&SetRxGainReq { mode })
    }

    /// Random byte from the co-processor's generator.
    pub fn random_byte(&self) -> Result<u8> {
        let [low, _] = MtUtil::new(&self.npi).random()?.to_le_bytes();
        Ok(low)
    }

    // MAC PIB

    fn get(&self, attribute_id: u8) -> Result<(MacStatus, Bytes)> {
        let rsp = self.mac().get_req(&GetReq { attribute_id })?;
        Ok((rsp.status, rsp.value))
    }

    /// Read a boolean MAC PIB attribute.
    pub fn mlme_get_req_bool(&self, attribute_id: u8) -> Result<(MacStatus, bool)> {
        let (status, value) = self.get(attribute_id)?;
        Ok((status, value.first().is_some_and(|b| *b != 0)))
    }

    /// Read an 8-bit MAC PIB attribute.
    pub fn mlme_get_req_u8(&self, attribute_id: u8) -> Result<(MacStatus, u8)> {
        let (status, value) = self.get(attribute_id)?;
        Ok((status, u8::from_le_bytes(le_array(&value))))
    }

    /// Read a 16-bit MAC PIB attribute.
    pub fn mlme_get_req_u16(&self, attribute_id: u8) -> Result<(MacStatus, u16)> {
        let (status, value) = self.get(attribute_id)?;
        Ok((status, u16::from_le_bytes(le_array(&value))))
    }

    /// Read a 32-bit MAC PIB attribute.
    pub fn mlme_get_req_u32(&self, attribute_id: u8) -> Result<(MacStatus, u32)> {
        let (status, value) = self.get(attribute_id)?;
        Ok((status, u32::from_le_bytes(le_array(&value))))
    }

    /// Read an array MAC PIB attribute.
    pub fn mlme_get_req_array(&self, attribute_id: u8) -> Result<(MacStatus, Bytes)> {
        self.get(attribute_id)
    }

    /// Length in bytes of an array MAC PIB attribute.
    pub fn mlme_get_req_array_len(&self, attribute_id: u8) -> Result<(MacStatus, usize)> {
        let (status, value) = self.get(attribute_id)?;
        Ok((status, value.len()))
    }

    /// Write a boolean MAC PIB attribute.
    pub fn mlme_set_req_bool(&self, attribute_id: u8, value: bool) -> Result<MacStatus> {
        self.mlme_set_req_array(attribute_id, &[u8::from(value)])
    }

    /// Write an 8-bit MAC PIB attribute.
    pub fn mlme_set_req_u8(&self, attribute_id: u8, value: u8) -> Result<MacStatus> {
        self.mlme_set_req_array(attribute_id, &[value])
    }

    /// Write a 16-bit MAC PIB attribute.
    pub fn mlme_set_req_u16(&self, attribute_id: u8, value: u16) -> Result<MacStatus> {
        self.mlme_set_req_array(attribute_id, &value.to_le_bytes())
    }

    /// Write a 32-bit MAC PIB attribute.
    pub fn mlme_set_req_u32(&self, attribute_id: u8, value: u32) -> Result<MacStatus> {
        self.mlme_set_req_array(attribute_id, &value.to_le_bytes())
    }

    /// Write an array MAC PIB attribute.
    ///
    /// The value field is sixteen bytes; shorter values are zero padded and
    /// longer ones truncated.
    pub fn mlme_set_req_array(&self, attribute_id: u8, value: &[u8]) -> Result<MacStatus> {
        if value.len() > PIB_VALUE_LEN {
            debug!(attribute_id, len = value.len(), "PIB value truncated");
        }
        self.mac().set_req(&SetReq::padded(attribute_id, value))
    }

    // Frequency hopping PIB

    fn get_fh(&self, attribute_id: u16) -> Result<(MacStatus, Bytes)> {
        let rsp = self.mac().fh_get_req(&FhGetReq { attribute_id })?;
        Ok((rsp.status, rsp.value))
    }

    fn set_fh(&self, attribute_id: u16, value: Bytes) -> Result<MacStatus> {
        self.mac().fh_set_req(&FhSetReq {
            attribute_id,
            value,
        })
    }

    /// Read an 8-bit frequency hopping attribute.
    pub fn mlme_get_fh_req_u8(&self, attribute_id: u16) -> Result<(MacStatus, u8)> {
        let (status, value) = self.get_fh(attribute_id)?;
        Ok((status, u8::from_le_bytes(le_array(&value))))
    }

    /// Read a 16-bit frequency hopping attribute.
    pub fn mlme_get_fh_req_u16(&self, attribute_id: u16) -> Result<(MacStatus, u16)> {
        let (status, value) = self.get_fh(attribute_id)?;
        Ok((status, u16::from_le_bytes(le_array(&value))))
    }

    /// Read a 32-bit frequency hopping attribute.
    pub fn mlme_get_fh_req_u32(&self, attribute_id: u16) -> Result<(MacStatus, u32)> {
        let (status, value) = self.get_fh(attribute_id)?;
        Ok((status, u32::from_le_bytes(le_array(&value))))
    }

    /// Read an array frequency hopping attribute.
    pub fn mlme_get_fh_req_array(&self, attribute_id: u16) -> Result<(MacStatus, Bytes)> {
        self.get_fh(attribute_id)
    }

    /// Length in bytes of an array frequency hopping attribute.
    pub fn mlme_get_fh_req_array_len(&self, attribute_id: u16) -> Result<(MacStatus, usize)> {
        let (status, value) = self.get_fh(attribute_id)?;
        Ok((status, value.len()))
    }

    /// Write an 8-bit frequency hopping attribute.
    pub fn mlme_set_fh_req_u8(&self, attribute_id: u16, value: u8) -> Result<MacStatus> {
        self.set_fh(attribute_id, Bytes::copy_from_slice(&[value]))
    }

    /// Write a 16-bit frequency hopping attribute.
    pub fn mlme_set_fh_req_u16(&self, attribute_id: u16, value: u16) -> Result<MacStatus> {
        self.set_fh(attribute_id, Bytes::copy_from_slice(&value.to_le_bytes()))
    }

    /// Write a 32-bit frequency hopping attribute.
    pub fn mlme_set_fh_req_u32(&self, attribute_id: u16, value: u32) -> Result<MacStatus> {
        self.set_fh(attribute_id, Bytes::copy_from_slice(&value.to_le_bytes()))
    }

    /// Write an array frequency hopping attribute.
    ///
    /// The attribute is read first to learn its length; `value` is
    /// truncated or zero padded to match.
    pub fn mlme_set_fh_req_array(&self, attribute_id: u16, value: &[u8]) -> Result<MacStatus> {
        let (_, len) = self.mlme_get_fh_req_array_len(attribute_id)?;
        self.set_fh(attribute_id, fit(value, len))
    }

    // Security PIB

    fn get_security(&self, attribute_id: u8) -> Result<(MacStatus, Bytes)> {
        let rsp = self.mac().security_get_req(&SecurityGetReq {
            attribute_id,
            index1: 0,
            index2: 0,
        })?;
        Ok((rsp.status, rsp.value))
    }

    fn set_security(&self, attribute_id: u8, index1: u8, value: Bytes) -> Result<MacStatus> {
        self.mac().security_set_req(&SecuritySetReq {
            attribute_id,
            index1,
            index2: 0,
            value,
        })
    }

    /// Read an 8-bit security attribute.
    pub fn mlme_get_security_req_u8(&self, attribute_id: u8) -> Result<(MacStatus, u8)> {
        let (status, value) = self.get_security(attribute_id)?;
        Ok((status, u8::from_le_bytes(le_array(&value))))
    }

    /// Read a 16-bit security attribute.
    pub fn mlme_get_security_req_u16(&self, attribute_id: u8) -> Result<(MacStatus, u16)> {
        let (status, value) = self.get_security(attribute_id)?;
        Ok((status, u16::from_le_bytes(le_array(&value))))
    }

    /// Read an array security attribute.
    pub fn mlme_get_security_req_array(&self, attribute_id: u8) -> Result<(MacStatus, Bytes)> {
        self.get_security(attribute_id)
    }

    /// Length in bytes of an array or struct security attribute.
    pub fn mlme_get_security_req_array_len(&self, attribute_id: u8) -> Result<(MacStatus, usize)> {
        let (status, value) = self.get_security(attribute_id)?;
        Ok((status, value.len()))
    }

    /// Read a struct security attribute as raw bytes.
    ///
    /// See [`SecurityLevelEntry::from_entry`] for the security level entry.
    pub fn mlme_get_security_req_struct(&self, attribute_id: u8) -> Result<(MacStatus, Bytes)> {
        self.get_security(attribute_id)
    }

    /// Write an 8-bit security attribute.
    pub fn mlme_set_security_req_u8(&self, attribute_id: u8, value: u8) -> Result<MacStatus> {
        self.set_security(attribute_id, 0, Bytes::copy_from_slice(&[value]))
    }

    /// Write a 16-bit security attribute.
    pub fn mlme_set_security_req_u16(&self, attribute_id: u8, value: u16) -> Result<MacStatus> {
        self.set_security(attribute_id, 0, Bytes::copy_from_slice(&value.to_le_bytes()))
    }

    /// Write an array security attribute, sized by a prior length read.
    pub fn mlme_set_security_req_array(&self, attribute_id: u8, value: &[u8]) -> Result<MacStatus> {
        let (_, len) = self.mlme_get_security_req_array_len(attribute_id)?;
        self.set_security(attribute_id, 0, fit(value, len))
    }

    /// Write a struct security attribute, sized by a prior length read.
    ///
    /// For [`security_attr::SECURITY_LEVEL_ENTRY`] the first byte of
    /// `value` is the table index (see [`SecurityLevelEntry::to_bytes`]);
    /// it is sent as the first index and only the entry follows.
    pub fn mlme_set_security_req_struct(
        &self,
        attribute_id: u8,
        value: &[u8],
    ) -> Result<MacStatus> {
        let (_, len) = self.mlme_get_security_req_array_len(attribute_id)?;
        match (attribute_id, value.split_first()) {
            (security_attr::SECURITY_LEVEL_ENTRY, Some((&level_index, entry))) => {
                self.set_security(attribute_id, level_index, fit(entry, len))
            }
            _ => self.set_security(attribute_id, 0, fit(value, len)),
        }
    }

    /// Write a security level table entry.
    pub fn mlme_set_security_level_entry(&self, entry: &SecurityLevelEntry) -> Result<MacStatus> {
        self.mlme_set_security_req_struct(security_attr::SECURITY_LEVEL_ENTRY, &entry.to_bytes())
    }

    // Security helpers

    /// Add a device table entry.
    pub fn sec_add_device(&self, req: &AddDeviceReq) -> Result<MacStatus> {
        self.mac().add_device_req(req)
    }

    /// Remove the device table entry for `ext_addr`.
    pub fn sec_delete_device(&self, ext_addr: &ExtAddr) -> Result<MacStatus> {
        self.mac().delete_device_req(&DeleteDeviceReq {
            ext_addr: *ext_addr,
        })
    }

    /// Remove a key and every device entry that uses it.
    pub fn sec_delete_key_and_assoc_devices(&self, key_index: u8) -> Result<MacStatus> {
        self.mac().delete_key_req(&DeleteKeyReq { index: key_index })
    }

    /// Remove every device table entry.
    pub fn sec_delete_all_devices(&self) -> Result<MacStatus> {
        self.mac().delete_all_devices_req()
    }

    /// Outgoing frame counter of the key with the default key source.
    pub fn sec_get_default_source_key(&self, key_id: u8) -> Result<(MacStatus, u32)> {
        let rsp = self.mac().read_key_req(&ReadKeyReq { index: key_id })?;
        Ok((rsp.status, rsp.frame_counter))
    }

    /// Add or replace a key and set its frame counter.
    pub fn sec_add_key_init_frame_counter(&self, req: &WriteKeyReq) -> Result<MacStatus> {
        self.mac().write_key_req(req)
    }
}

impl Drop for ApiMac {
    fn drop(&mut self) {
        self.close();
    }
}
