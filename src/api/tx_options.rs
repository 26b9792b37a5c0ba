//! Data request transmit options

/// Request an acknowledgement
pub const TXOPTION_ACK: u8 = 0x01;
/// Hold the frame for the destination to poll
pub const TXOPTION_INDIRECT: u8 = 0x04;
/// Set the frame pending bit
pub const TXOPTION_PEND_BIT: u8 = 0x08;
/// Do not retransmit
pub const TXOPTION_NO_RETRANS: u8 = 0x10;
/// Suppress the data confirm
pub const TXOPTION_NO_CNF: u8 = 0x20;
/// Use the alternate backoff exponent
pub const TXOPTION_ALT_BE: u8 = 0x40;
/// Use the power and channel given in the request
pub const TXOPTION_PWR_CHAN: u8 = 0x80;

/// Transmit options for a data request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct TxOptions {
    /// Acknowledged transmission
    pub ack: bool,
    /// Indirect transmission
    pub indirect: bool,
    /// Frame pending bit
    pub pending_bit: bool,
    /// No retransmissions
    pub no_retransmits: bool,
    /// No data confirm
    pub no_confirm: bool,
    /// Alternate backoff exponent
    pub use_alt_be: bool,
    /// Use the request's power and channel
    pub use_power_and_channel: bool,
}

impl TxOptions {
    /// Pack into the wire byte.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        let mut bits = 0;
        if self.ack {
            bits |= TXOPTION_ACK;
        }
        if self.indirect {
            bits |= TXOPTION_INDIRECT;
        }
        if self.pending_bit {
            bits |= TXOPTION_PEND_BIT;
        }
        if self.no_retransmits {
            bits |= TXOPTION_NO_RETRANS;
        }
        if self.no_confirm {
            bits |= TXOPTION_NO_CNF;
        }
        if self.use_alt_be {
            bits |= TXOPTION_ALT_BE;
        }
        if self.use_power_and_channel {
            bits |= TXOPTION_PWR_CHAN;
        }
        bits
    }
}

impl From<TxOptions> for u8 {
    fn from(options: TxOptions) -> Self {
        options.to_u8()
    }
}
