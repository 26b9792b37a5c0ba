//! MT protocol core
//!
//! This module provides the frame model, UART framing, bounds-checked payload
//! cursors and link counters.

mod codec;
mod cursor;
mod error;
mod frame;
pub mod metrics;
mod types;

pub use codec::{FrameParser, RxState, decode_uart, encode_uart, fcs};
pub use cursor::{Reader, Writer};
pub use error::{Error, Result};
pub use frame::{MtFrame, decode_frame, decode_frame_header, encode_frame};
pub(crate) use frame::HexSlice;
pub use types::{CMD_TYPE_MASK, CommandType, MtError, SUBSYSTEM_MASK, Subsystem, cmd0};

/// UART start-of-frame byte
pub const SOF: u8 = 0xFE;

/// Length of the start-of-frame field
pub const SOF_LEN: usize = 1;

/// Length of `len`, `cmd0` and `cmd1`
pub const FRAME_HEADER_LEN: usize = 3;

/// Length of the UART frame check sequence
pub const FCS_LEN: usize = 1;

/// Largest payload a co-processor accepts in one frame
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// Largest UART frame on the wire
pub const MAX_UART_FRAME: usize = SOF_LEN + FRAME_HEADER_LEN + MAX_PAYLOAD_SIZE + FCS_LEN;
