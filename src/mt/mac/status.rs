//! MAC status codes

use std::fmt;

/// Status returned by MAC requests, confirms and indications
///
/// Values are the TI-15.4 `ApiMac_status_t` codes. Codes this crate does not
/// name are preserved unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacStatus(u8);

macro_rules! mac_statuses {
    ($($(#[$doc:meta])* $name:ident = $value:literal;)*) => {
        impl MacStatus {
            $($(#[$doc])* pub const $name: Self = Self($value);)*

            fn name(self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some(stringify!($name)),)*
                    _ => None,
                }
            }
        }
    };
}

mac_statuses! {
    /// Operation successful
    SUCCESS = 0x00;
    /// MAC co-processor subsystem error
    SUBSYSTEM_ERROR = 0x25;
    /// MAC co-processor command id error
    COMMAND_ID_ERROR = 0x26;
    /// MAC co-processor length error
    LENGTH_ERROR = 0x27;
    /// Unsupported extended type
    UNSUPPORTED_TYPE = 0x28;
    /// Operation not supported in the current configuration
    UNSUPPORTED = 0x18;
    /// Operation could not be performed in the current state
    BAD_STATE = 0x19;
    /// Operation failed for lack of memory
    NO_RESOURCES = 0x1A;
    /// Data request is pending acknowledgement
    ACK_PENDING = 0x1B;
    /// No time to perform the operation
    NO_TIME = 0x1C;
    /// Transmission aborted
    TX_ABORTED = 0x1D;
    /// Duplicate entry
    DUPLICATE_ENTRY = 0x1E;
    /// Frequency hopping general error
    FH_ERROR = 0x61;
    /// Frequency hopping IE not supported
    FH_IE_NOT_SUPPORTED = 0x62;
    /// Not in an async frequency hopping period
    FH_NOT_IN_ASYNC = 0x63;
    /// Destination not in the neighbour table
    FH_NOT_IN_NEIGHBOR_TABLE = 0x64;
    /// Not in the UC or BC dwell slot
    FH_OUT_SLOT = 0x65;
    /// Invalid frequency hopping address
    FH_INVALID_ADDRESS = 0x66;
    /// Invalid frequency hopping IE format
    FH_IE_FORMAT_INVALID = 0x67;
    /// Frequency hopping PIB not supported
    FH_PIB_NOT_SUPPORTED = 0x68;
    /// Frequency hopping PIB is read-only
    FH_PIB_READ_ONLY = 0x69;
    /// Invalid frequency hopping PIB parameter
    FH_PIB_INVALID_PARAMETER = 0x6A;
    /// Invalid frequency hopping frame type
    FH_INVALID_FRAME_TYPE = 0x6B;
    /// Frequency hopping node expired
    FH_EXPIRED_NODE = 0x6C;
    /// Frame counter reached its maximum
    COUNTER_ERROR = 0xDB;
    /// Key not permitted for this frame type
    IMPROPER_KEY_TYPE = 0xDC;
    /// Security level below the required minimum
    IMPROPER_SECURITY_LEVEL = 0xDD;
    /// Secured frame received with a legacy security version
    UNSUPPORTED_LEGACY = 0xDE;
    /// Unsupported security operation
    UNSUPPORTED_SECURITY = 0xDF;
    /// Beacon lost after synchronisation
    BEACON_LOSS = 0xE0;
    /// CSMA-CA failed to find a clear channel
    CHANNEL_ACCESS_FAILURE = 0xE1;
    /// GTS request denied
    DENIED = 0xE2;
    /// Transmitter could not be disabled
    DISABLE_TRX_FAILURE = 0xE3;
    /// Cryptographic processing of a secured frame failed
    SECURITY_ERROR = 0xE4;
    /// Frame exceeds the maximum size
    FRAME_TOO_LONG = 0xE5;
    /// Invalid GTS
    INVALID_GTS = 0xE6;
    /// Purge handle not found
    INVALID_HANDLE = 0xE7;
    /// Parameter out of range
    INVALID_PARAMETER = 0xE8;
    /// No acknowledgement received
    NO_ACK = 0xE9;
    /// Scan found no beacon
    NO_BEACON = 0xEA;
    /// No response data after a data request
    NO_DATA = 0xEB;
    /// No short address allocated
    NO_SHORT_ADDRESS = 0xEC;
    /// Receiver enable outside the CAP
    OUT_OF_CAP = 0xED;
    /// PAN identifier conflict detected
    PAN_ID_CONFLICT = 0xEE;
    /// Coordinator realignment received
    REALIGNMENT = 0xEF;
    /// Transaction expired before delivery
    TRANSACTION_EXPIRED = 0xF0;
    /// Transaction queue full
    TRANSACTION_OVERFLOW = 0xF1;
    /// Transmitter busy
    TX_ACTIVE = 0xF2;
    /// Key not found
    UNAVAILABLE_KEY = 0xF3;
    /// PIB attribute not supported
    UNSUPPORTED_ATTRIBUTE = 0xF4;
    /// Invalid address
    INVALID_ADDRESS = 0xF5;
    /// Receiver on-time too long
    ON_TIME_TOO_LONG = 0xF6;
    /// Receiver enable time already past
    PAST_TIME = 0xF7;
    /// Beacon tracking is off
    TRACKING_OFF = 0xF8;
    /// Table index out of range
    INVALID_INDEX = 0xF9;
    /// Scan stopped at the result limit
    LIMIT_REACHED = 0xFA;
    /// PIB attribute is read-only
    READ_ONLY = 0xFB;
    /// Scan already in progress
    SCAN_IN_PROGRESS = 0xFC;
    /// Superframe overlap
    SUPERFRAME_OVERLAP = 0xFD;
}

impl MacStatus {
    /// Wrap a raw status byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        Self(value)
    }

    /// Raw status byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Whether this is [`MacStatus::SUCCESS`]
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }
}

impl From<u8> for MacStatus {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<MacStatus> for u8 {
    fn from(status: MacStatus) -> Self {
        status.0
    }
}

impl fmt::Display for MacStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "STATUS({:#04x})", self.0),
        }
    }
}
