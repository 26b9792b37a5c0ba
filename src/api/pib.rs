//! PIB attribute identifiers
//!
//! Three attribute spaces exist, each with its own get/set commands: the
//! MAC PIB (8-bit ids), the frequency hopping PIB (16-bit ids) and the
//! security PIB (8-bit ids).

/// MAC PIB attribute ids
pub mod mac_attr {
    /// Ack wait duration (u8)
    pub const ACK_WAIT_DURATION: u8 = 0x40;
    /// Association permitted (bool)
    pub const ASSOCIATION_PERMIT: u8 = 0x41;
    /// Auto request on beacon (bool)
    pub const AUTO_REQUEST: u8 = 0x42;
    /// Battery life extension (bool)
    pub const BATT_LIFE_EXT: u8 = 0x43;
    /// Battery life extension periods (u8)
    pub const BATT_LIFE_EXT_PERIODS: u8 = 0x44;
    /// Beacon payload (array)
    pub const BEACON_PAYLOAD: u8 = 0x45;
    /// Beacon payload length (u8)
    pub const BEACON_PAYLOAD_LENGTH: u8 = 0x46;
    /// Beacon order (u8)
    pub const BEACON_ORDER: u8 = 0x47;
    /// Beacon transmit time (u32)
    pub const BEACON_TX_TIME: u8 = 0x48;
    /// Beacon sequence number (u8)
    pub const BSN: u8 = 0x49;
    /// Coordinator extended address (array)
    pub const COORD_EXTENDED_ADDRESS: u8 = 0x4A;
    /// Coordinator short address (u16)
    pub const COORD_SHORT_ADDRESS: u8 = 0x4B;
    /// Data sequence number (u8)
    pub const DSN: u8 = 0x4C;
    /// GTS permitted (bool)
    pub const GTS_PERMIT: u8 = 0x4D;
    /// Maximum CSMA backoffs (u8)
    pub const MAX_CSMA_BACKOFFS: u8 = 0x4E;
    /// Minimum backoff exponent (u8)
    pub const MIN_BE: u8 = 0x4F;
    /// PAN id (u16)
    pub const PAN_ID: u8 = 0x50;
    /// Promiscuous mode (bool)
    pub const PROMISCUOUS_MODE: u8 = 0x51;
    /// Receiver on when idle (bool)
    pub const RX_ON_WHEN_IDLE: u8 = 0x52;
    /// Short address (u16)
    pub const SHORT_ADDRESS: u8 = 0x53;
    /// Superframe order (u8)
    pub const SUPERFRAME_ORDER: u8 = 0x54;
    /// Transaction persistence time (u16)
    pub const TRANSACTION_PERSISTENCE_TIME: u8 = 0x55;
    /// Associated with the PAN coordinator (bool)
    pub const ASSOCIATED_PAN_COORD: u8 = 0x56;
    /// Maximum backoff exponent (u8)
    pub const MAX_BE: u8 = 0x57;
    /// Maximum frame total wait time (u16)
    pub const MAX_FRAME_TOTAL_WAIT_TIME: u8 = 0x58;
    /// Maximum frame retries (u8)
    pub const MAX_FRAME_RETRIES: u8 = 0x59;
    /// Response wait time (u8)
    pub const RESPONSE_WAIT_TIME: u8 = 0x5A;
    /// Sync symbol offset (u8)
    pub const SYNC_SYMBOL_OFFSET: u8 = 0x5B;
    /// Timestamps supported (bool)
    pub const TIMESTAMP_SUPPORTED: u8 = 0x5C;
    /// Security enabled (bool)
    pub const SECURITY_ENABLED: u8 = 0x5D;
    /// Signed transmit power (u8)
    pub const PHY_TRANSMIT_POWER_SIGNED: u8 = 0xE0;
    /// Logical channel (u8)
    pub const LOGICAL_CHANNEL: u8 = 0xE1;
    /// Extended address (array)
    pub const EXTENDED_ADDRESS: u8 = 0xE2;
    /// Alternate backoff exponent (u8)
    pub const ALT_BE: u8 = 0xE3;
    /// Device beacon order (u8)
    pub const DEVICE_BEACON_ORDER: u8 = 0xE4;
    /// RF4CE power savings (bool)
    pub const RF4CE_POWER_SAVINGS: u8 = 0xE5;
    /// Frame version support (u8)
    pub const FRAME_VERSION_SUPPORT: u8 = 0xE6;
    /// Channel page (u8)
    pub const CHANNEL_PAGE: u8 = 0xE7;
    /// Current PHY descriptor (u8)
    pub const PHY_CURRENT_DESCRIPTOR_ID: u8 = 0xE8;
}

/// Frequency hopping PIB attribute ids
pub mod fh_attr {
    /// Parent EUI to track (array, 8)
    pub const TRACK_PARENT_EUI: u16 = 0x2000;
    /// Broadcast interval (u32)
    pub const BC_INTERVAL: u16 = 0x2001;
    /// Unicast excluded channels (array)
    pub const UC_EXCLUDED_CHANNELS: u16 = 0x2002;
    /// Broadcast excluded channels (array)
    pub const BC_EXCLUDED_CHANNELS: u16 = 0x2003;
    /// Unicast dwell interval (u8)
    pub const UC_DWELL_INTERVAL: u16 = 0x2004;
    /// Broadcast dwell interval (u8)
    pub const BC_DWELL_INTERVAL: u16 = 0x2005;
    /// Clock drift (u8)
    pub const CLOCK_DRIFT: u16 = 0x2006;
    /// Timing accuracy (u8)
    pub const TIMING_ACCURACY: u16 = 0x2007;
    /// Unicast channel function (u8)
    pub const UC_CHANNEL_FUNCTION: u16 = 0x2008;
    /// Broadcast channel function (u8)
    pub const BC_CHANNEL_FUNCTION: u16 = 0x2009;
    /// Use the parent's broadcast schedule (u8)
    pub const USE_PARENT_BS_IE: u16 = 0x200A;
    /// Broadcast schedule id (u16)
    pub const BROADCAST_SCHED_ID: u16 = 0x200B;
    /// Unicast fixed channel (u16)
    pub const UC_FIXED_CHANNEL: u16 = 0x200C;
    /// Broadcast fixed channel (u16)
    pub const BC_FIXED_CHANNEL: u16 = 0x200D;
    /// PAN size (u16)
    pub const PAN_SIZE: u16 = 0x200E;
    /// Routing cost (u8)
    pub const ROUTING_COST: u16 = 0x200F;
    /// Routing method (u8)
    pub const ROUTING_METHOD: u16 = 0x2010;
    /// EAPOL ready (u8)
    pub const EAPOL_READY: u16 = 0x2011;
    /// FAN TPS version (u8)
    pub const FAN_TPS_VERSION: u16 = 0x2012;
    /// Network name (array, 32)
    pub const NET_NAME: u16 = 0x2013;
    /// PAN version (u16)
    pub const PAN_VERSION: u16 = 0x2014;
}

/// Security PIB attribute ids
pub mod security_attr {
    /// Key table (array)
    pub const KEY_TABLE: u8 = 0x71;
    /// Key table entries (u16)
    pub const KEY_TABLE_ENTRIES: u8 = 0x81;
    /// Device table entries (u16)
    pub const DEVICE_TABLE_ENTRIES: u8 = 0x82;
    /// Security level table entries (u8)
    pub const SECURITY_LEVEL_TABLE_ENTRIES: u8 = 0x83;
    /// Outgoing frame counter (u32)
    pub const FRAME_COUNTER: u8 = 0x84;
    /// Auto request security level (u8)
    pub const AUTO_REQUEST_SECURITY_LEVEL: u8 = 0x85;
    /// Auto request key id mode (u8)
    pub const AUTO_REQUEST_KEY_ID_MODE: u8 = 0x86;
    /// Auto request key source (array, 8)
    pub const AUTO_REQUEST_KEY_SOURCE: u8 = 0x87;
    /// Auto request key index (u8)
    pub const AUTO_REQUEST_KEY_INDEX: u8 = 0x88;
    /// Default key source (array, 8)
    pub const DEFAULT_KEY_SOURCE: u8 = 0x89;
    /// PAN coordinator extended address (array, 8)
    pub const PAN_COORD_EXTENDED_ADDRESS: u8 = 0x8A;
    /// PAN coordinator short address (u16)
    pub const PAN_COORD_SHORT_ADDRESS: u8 = 0x8B;
    /// Key id lookup entry (struct)
    pub const KEY_ID_LOOKUP_ENTRY: u8 = 0xD0;
    /// Key device entry (struct)
    pub const KEY_DEVICE_ENTRY: u8 = 0xD1;
    /// Key usage entry (struct)
    pub const KEY_USAGE_ENTRY: u8 = 0xD2;
    /// Key entry (struct)
    pub const KEY_ENTRY: u8 = 0xD3;
    /// Device entry (struct)
    pub const DEVICE_ENTRY: u8 = 0xD4;
    /// Security level entry (struct)
    pub const SECURITY_LEVEL_ENTRY: u8 = 0xD5;
}

/// Security level table entry with its table index
///
/// The byte form puts `level_index` first, followed by the entry itself;
/// only the entry bytes travel in the set request, the index goes in the
/// first index field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SecurityLevelEntry {
    /// Index in the security level table
    pub level_index: u8,
    /// Frame type the entry applies to
    pub frame_type: u8,
    /// Command frame identifier, for command frames
    pub command_frame_identifier: u8,
    /// Minimum security level
    pub security_minimum: u8,
    /// Devices flagged exempt may override the minimum
    pub security_override_minimum: bool,
}

impl SecurityLevelEntry {
    /// Length of the entry without its index
    pub const ENTRY_LEN: usize = 4;

    /// Index followed by the entry.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 1 + Self::ENTRY_LEN] {
        [
            self.level_index,
            self.frame_type,
            self.command_frame_identifier,
            self.security_minimum,
            u8::from(self.security_override_minimum),
        ]
    }

    /// Parse entry bytes read back for `level_index`.
    #[must_use]
    pub fn from_entry(level_index: u8, entry: &[u8]) -> Option<Self> {
        let [frame_type, command_frame_identifier, security_minimum, override_minimum, ..] =
            *entry
        else {
            return None;
        };
        Some(Self {
            level_index,
            frame_type,
            command_frame_identifier,
            security_minimum,
            security_override_minimum: override_minimum != 0,
        })
    }
}
