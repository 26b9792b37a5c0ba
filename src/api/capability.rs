//! Device capability information

/// Device can act as a PAN coordinator
pub const CAPABLE_PAN_COORD: u8 = 0x01;
/// Device is a full-function device
pub const CAPABLE_FFD: u8 = 0x02;
/// Device is mains powered
pub const CAPABLE_MAINS_POWER: u8 = 0x04;
/// Receiver stays on when idle
pub const CAPABLE_RX_ON_IDLE: u8 = 0x08;
/// Device supports MAC security
pub const CAPABLE_SECURITY: u8 = 0x40;
/// Device wants a short address allocated
pub const CAPABLE_ALLOC_ADDR: u8 = 0x80;

/// Capability information carried in associate requests and indications
///
/// Bits 4 and 5 of the wire byte are reserved and not represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct CapabilityInfo {
    /// Can act as a PAN coordinator
    pub pan_coord: bool,
    /// Full-function device
    pub ffd: bool,
    /// Mains powered
    pub mains_power: bool,
    /// Receiver on when idle
    pub rx_on_when_idle: bool,
    /// Supports MAC security
    pub security: bool,
    /// Requests short address allocation
    pub alloc_addr: bool,
}

impl CapabilityInfo {
    /// Pack into the wire byte.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        let mut bits = 0;
        if self.pan_coord {
            bits |= CAPABLE_PAN_COORD;
        }
        if self.ffd {
            bits |= CAPABLE_FFD;
        }
        if self.mains_power {
            bits |= CAPABLE_MAINS_POWER;
        }
        if self.rx_on_when_idle {
            bits |= CAPABLE_RX_ON_IDLE;
        }
        if self.security {
            bits |= CAPABLE_SECURITY;
        }
        if self.alloc_addr {
            bits |= CAPABLE_ALLOC_ADDR;
        }
        bits
    }

    /// Unpack the wire byte. Reserved bits are ignored.
    #[must_use]
    pub const fn from_u8(bits: u8) -> Self {
        Self {
            pan_coord: bits & CAPABLE_PAN_COORD != 0,
            ffd: bits & CAPABLE_FFD != 0,
            mains_power: bits & CAPABLE_MAINS_POWER != 0,
            rx_on_when_idle: bits & CAPABLE_RX_ON_IDLE != 0,
            security: bits & CAPABLE_SECURITY != 0,
            alloc_addr: bits & CAPABLE_ALLOC_ADDR != 0,
        }
    }
}

impl From<u8> for CapabilityInfo {
    fn from(bits: u8) -> Self {
        Self::from_u8(bits)
    }
}

impl From<CapabilityInfo> for u8 {
    fn from(info: CapabilityInfo) -> Self {
        info.to_u8()
    }
}

/// Convert capability flags to the wire byte.
#[must_use]
pub fn convert_capability_info(info: &CapabilityInfo) -> u8 {
    info.to_u8()
}

/// Convert a wire byte to capability flags.
#[must_use]
pub fn build_msg_cap_info(bits: u8) -> CapabilityInfo {
    CapabilityInfo::from_u8(bits)
}

/// Convert the capability byte of an MT indication to capability flags.
#[must_use]
pub fn mt_cap_inf_to_api_mac_cap_inf(bits: u8) -> CapabilityInfo {
    CapabilityInfo::from_u8(bits)
}
