//! MT frame types, subsystems and RPC error codes

use std::fmt;

/// Mask selecting the frame type bits of cmd0
pub const CMD_TYPE_MASK: u8 = 0xE0;

/// Mask selecting the subsystem bits of cmd0
pub const SUBSYSTEM_MASK: u8 = 0x1F;

/// MT frame type (upper three bits of cmd0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CommandType {
    /// Poll for queued data
    Poll = 0x00,
    /// Synchronous request
    Sreq = 0x20,
    /// Asynchronous request or indication
    Areq = 0x40,
    /// Synchronous response
    Srsp = 0x60,
    /// Extended header
    Extn = 0x80,
}

impl CommandType {
    /// Extract the frame type from cmd0
    #[must_use]
    pub fn from_cmd0(cmd0: u8) -> Option<Self> {
        match cmd0 & CMD_TYPE_MASK {
            0x00 => Some(Self::Poll),
            0x20 => Some(Self::Sreq),
            0x40 => Some(Self::Areq),
            0x60 => Some(Self::Srsp),
            0x80 => Some(Self::Extn),
            _ => None,
        }
    }

    /// Convert to the cmd0 type bits
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Poll => "POLL",
            Self::Sreq => "SREQ",
            Self::Areq => "AREQ",
            Self::Srsp => "SRSP",
            Self::Extn => "EXTN",
        };
        write!(f, "{name}")
    }
}

/// MT subsystem (lower five bits of cmd0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Subsystem {
    /// RPC error reports
    RpcError = 0,
    /// System commands
    Sys = 1,
    /// 802.15.4 MAC
    Mac = 2,
    /// Network layer
    Nwk = 3,
    /// Application framework
    Af = 4,
    /// ZigBee device objects
    Zdo = 5,
    /// Simple API
    Sapi = 6,
    /// Utilities
    Util = 7,
    /// Debug
    Dbg = 8,
    /// Application
    App = 9,
    /// Over-the-air update
    Ota = 10,
    /// ZNP configuration
    Znp = 11,
    /// Serial bootloader
    Sbl = 13,
}

impl Subsystem {
    /// Extract the subsystem from cmd0
    #[must_use]
    pub fn from_cmd0(cmd0: u8) -> Option<Self> {
        match cmd0 & SUBSYSTEM_MASK {
            0 => Some(Self::RpcError),
            1 => Some(Self::Sys),
            2 => Some(Self::Mac),
            3 => Some(Self::Nwk),
            4 => Some(Self::Af),
            5 => Some(Self::Zdo),
            6 => Some(Self::Sapi),
            7 => Some(Self::Util),
            8 => Some(Self::Dbg),
            9 => Some(Self::App),
            10 => Some(Self::Ota),
            11 => Some(Self::Znp),
            13 => Some(Self::Sbl),
            _ => None,
        }
    }

    /// Convert to the cmd0 subsystem bits
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RpcError => "RPC_ERR",
            Self::Sys => "SYS",
            Self::Mac => "MAC",
            Self::Nwk => "NWK",
            Self::Af => "AF",
            Self::Zdo => "ZDO",
            Self::Sapi => "SAPI",
            Self::Util => "UTIL",
            Self::Dbg => "DBG",
            Self::App => "APP",
            Self::Ota => "OTA",
            Self::Znp => "ZNP",
            Self::Sbl => "SBL",
        };
        write!(f, "{name}")
    }
}

/// Build a cmd0 byte from its parts
#[must_use]
pub const fn cmd0(kind: CommandType, subsystem: Subsystem) -> u8 {
    kind.as_u8() | subsystem.as_u8()
}

/// Error codes carried by an RPC_ERR response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MtError(u8);

impl MtError {
    /// No error
    pub const SUCCESS: Self = Self(0x00);
    /// Subsystem id not supported by the co-processor
    pub const SUBSYSTEM: Self = Self(0x01);
    /// Command id not supported by the subsystem
    pub const COMMAND_ID: Self = Self(0x02);
    /// Malformed parameter
    pub const PARAMETER: Self = Self(0x03);
    /// Length field does not match the command
    pub const LENGTH: Self = Self(0x04);
    /// Unsupported extended header type
    pub const UNSUP_HEADER_TYPE: Self = Self(0x05);
    /// Co-processor ran out of memory
    pub const MEM_ALLOC_FAIL: Self = Self(0x06);

    /// Wrap a raw error byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        Self(value)
    }

    /// Raw error byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Display for MtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::SUCCESS => "SUCCESS",
            Self::SUBSYSTEM => "SUBSYSTEM",
            Self::COMMAND_ID => "COMMAND_ID",
            Self::PARAMETER => "PARAMETER",
            Self::LENGTH => "LENGTH",
            Self::UNSUP_HEADER_TYPE => "UNSUP_HEADER_TYPE",
            Self::MEM_ALLOC_FAIL => "MEM_ALLOC_FAIL",
            Self(other) => return write!(f, "MT_ERROR({other:#04x})"),
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd0_split() {
        let byte = cmd0(CommandType::Srsp, Subsystem::Mac);
        assert_eq!(byte, 0x62);
        assert_eq!(CommandType::from_cmd0(byte), Some(CommandType::Srsp));
        assert_eq!(Subsystem::from_cmd0(byte), Some(Subsystem::Mac));
    }

    #[test]
    fn test_unknown_type_and_subsystem() {
        assert_eq!(CommandType::from_cmd0(0xA2), None);
        assert_eq!(Subsystem::from_cmd0(0x4C), None);
        assert_eq!(Subsystem::from_cmd0(0x5F), None);
    }

    #[test]
    fn test_subsystem_roundtrip() {
        for raw in 0u8..=0x1F {
            if let Some(subsystem) = Subsystem::from_cmd0(raw) {
                assert_eq!(subsystem.as_u8(), raw);
            }
        }
    }

    #[test]
    fn test_mt_error_display() {
        assert_eq!(MtError::COMMAND_ID.to_string(), "COMMAND_ID");
        assert_eq!(MtError::from_u8(0x42).to_string(), "MT_ERROR(0x42)");
    }
}
