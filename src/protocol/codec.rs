//! UART framing for MT frames
//!
//! On a UART link every frame is wrapped in a start-of-frame byte and a
//! trailing frame check sequence:
//!
//! ```text
//! [SOF 0xFE] [len] [cmd0] [cmd1] [attrs (len)] [FCS]
//! ```
//!
//! The FCS is the XOR of every byte from `len` through the last attr.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{trace, warn};

use super::frame::HexSlice;
use super::metrics::Metrics;
use super::{Error, FCS_LEN, FRAME_HEADER_LEN, MtFrame, Result, SOF, SOF_LEN};

/// XOR frame check sequence over `bytes`
#[must_use]
pub fn fcs(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, byte| acc ^ byte)
}

/// Wrap a frame for a UART link
#[must_use]
pub fn encode_uart(frame: &MtFrame) -> Bytes {
    let total = SOF_LEN + FRAME_HEADER_LEN + frame.attrs().len() + FCS_LEN;
    let mut buf = BytesMut::with_capacity(total);
    buf.put_u8(SOF);
    buf.put_u8(frame.len());
    buf.put_u8(frame.cmd0());
    buf.put_u8(frame.cmd1());
    buf.put_slice(frame.attrs());
    let check = fcs(&buf[SOF_LEN..]);
    buf.put_u8(check);
    buf.freeze()
}

/// Decode exactly one UART-framed MT frame
///
/// # Errors
///
/// Returns an error if:
/// - The first byte is not SOF
/// - The buffer is shorter than the declared length
/// - The FCS does not match
pub fn decode_uart(bytes: &[u8]) -> Result<MtFrame> {
    let Some((&first, rest)) = bytes.split_first() else {
        return Err(Error::BufferTooSmall {
            needed: SOF_LEN + FRAME_HEADER_LEN + FCS_LEN,
            got: 0,
        });
    };
    if first != SOF {
        return Err(Error::InvalidStartOfFrame { found: first });
    }
    let (len, cmd0, cmd1) = super::decode_frame_header(rest)?;
    let body = FRAME_HEADER_LEN + usize::from(len);
    if rest.len() < body + FCS_LEN {
        return Err(Error::BufferTooSmall {
            needed: SOF_LEN + body + FCS_LEN,
            got: bytes.len(),
        });
    }
    let expected = fcs(&rest[..body]);
    let found = rest[body];
    if expected != found {
        return Err(Error::ChecksumMismatch { expected, found });
    }
    MtFrame::new(cmd0, cmd1, Bytes::copy_from_slice(&rest[FRAME_HEADER_LEN..body]))
}

/// Receive state of [`FrameParser`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxState {
    /// Hunting for the start-of-frame byte
    WaitingSof,
    /// Collecting `len`, `cmd0` and `cmd1`
    WaitingHeader,
    /// Collecting the payload and FCS
    WaitingData,
}

/// Incremental UART receive state machine
///
/// Bytes may arrive in arbitrary chunks; only complete frames with a valid
/// FCS are ever produced.
#[derive(Debug)]
pub struct FrameParser {
    state: RxState,
    pending: BytesMut,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a parser waiting for SOF.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RxState::WaitingSof,
            pending: BytesMut::with_capacity(SOF_LEN + FRAME_HEADER_LEN + 256),
        }
    }

    /// Current receive state.
    #[must_use]
    pub const fn state(&self) -> RxState {
        self.state
    }

    /// Number of bytes the current state still needs.
    #[must_use]
    pub fn bytes_wanted(&self) -> usize {
        match self.state {
            RxState::WaitingSof => SOF_LEN,
            RxState::WaitingHeader => FRAME_HEADER_LEN - self.pending.len(),
            RxState::WaitingData => {
                let len = usize::from(self.pending[0]);
                FRAME_HEADER_LEN + len + FCS_LEN - self.pending.len()
            }
        }
    }

    /// Drop any partial frame and return to hunting for SOF.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.state = RxState::WaitingSof;
    }

    /// Feed received bytes, returning every frame they complete.
    pub fn push(&mut self, mut data: &[u8]) -> Vec<MtFrame> {
        let mut frames = Vec::new();
        while !data.is_empty() {
            match self.state {
                RxState::WaitingSof => {
                    match data.iter().position(|&byte| byte == SOF) {
                        Some(pos) => {
                            if pos > 0 {
                                trace!(skipped = pos, "discarding bytes before SOF");
                            }
                            data = &data[pos + SOF_LEN..];
                            self.state = RxState::WaitingHeader;
                        }
                        None => {
                            trace!(skipped = data.len(), "discarding bytes before SOF");
                            data = &[];
                        }
                    }
                }
                RxState::WaitingHeader | RxState::WaitingData => {
                    let take = self.bytes_wanted().min(data.len());
                    self.pending.extend_from_slice(&data[..take]);
                    data = &data[take..];
                    if self.bytes_wanted() > 0 {
                        continue;
                    }
                    if self.state == RxState::WaitingHeader {
                        self.state = RxState::WaitingData;
                        // A zero-length payload still needs its FCS byte.
                        continue;
                    }
                    if let Some(frame) = self.complete() {
                        frames.push(frame);
                    }
                    self.reset();
                }
            }
        }
        frames
    }

    fn complete(&mut self) -> Option<MtFrame> {
        let body = self.pending.len() - FCS_LEN;
        let expected = fcs(&self.pending[..body]);
        let found = self.pending[body];
        if expected != found {
            Metrics::record_fcs_error();
            warn!(
                expected = format_args!("{expected:#04x}"),
                found = format_args!("{found:#04x}"),
                "dropping frame with bad FCS"
            );
            return None;
        }
        let cmd0 = self.pending[1];
        let cmd1 = self.pending[2];
        let attrs = Bytes::copy_from_slice(&self.pending[FRAME_HEADER_LEN..body]);
        trace!(
            len = attrs.len(),
            cmd0 = format_args!("{cmd0:#04x}"),
            cmd1 = format_args!("{cmd1:#04x}"),
            data = %HexSlice(&attrs),
            "frame in"
        );
        match MtFrame::new(cmd0, cmd1, attrs) {
            Ok(frame) => Some(frame),
            Err(err) => {
                warn!(error = %err, "dropping oversized frame");
                None
            }
        }
    }
}
