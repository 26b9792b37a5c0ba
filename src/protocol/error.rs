//! MT protocol error types

use thiserror::Error;

/// MT framing and decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Attempted to read past the end of a frame payload
    #[error("unexpected end of payload: need {needed} bytes, {remaining} remaining")]
    UnexpectedEnd {
        /// Bytes the field required
        needed: usize,
        /// Bytes left in the payload
        remaining: usize,
    },

    /// Payload does not fit in a single MT frame
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Payload size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Buffer too small to hold a frame header
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },

    /// Frame type bits of cmd0 are not a known MT type
    #[error("invalid frame type in cmd0 {cmd0:#04x}")]
    InvalidFrameType {
        /// Offending cmd0
        cmd0: u8,
    },

    /// Subsystem bits of cmd0 are not a known MT subsystem
    #[error("unknown subsystem in cmd0 {cmd0:#04x}")]
    UnknownSubsystem {
        /// Offending cmd0
        cmd0: u8,
    },

    /// UART frame check sequence mismatch
    #[error("FCS mismatch: expected {expected:#04x}, got {found:#04x}")]
    ChecksumMismatch {
        /// Computed FCS
        expected: u8,
        /// FCS carried by the frame
        found: u8,
    },

    /// UART frame did not begin with the start-of-frame byte
    #[error("invalid start of frame: {found:#04x}")]
    InvalidStartOfFrame {
        /// Byte found in place of SOF
        found: u8,
    },

    /// Address mode byte is not none, short or extended
    #[error("invalid address mode: {mode}")]
    InvalidAddressMode {
        /// Mode byte from the wire
        mode: u8,
    },

    /// Frame does not carry the expected command
    #[error("unexpected command cmd0={cmd0:#04x} cmd1={cmd1:#04x}")]
    UnexpectedCommand {
        /// Received cmd0
        cmd0: u8,
        /// Received cmd1
        cmd1: u8,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
