//! Transport-level error types covering link I/O, correlation, and worker failures.

use core::fmt;
use std::io;
use std::time::Duration;

use crate::protocol::{self, MtError};

/// Unified error type for NPI transport operations.
#[derive(Debug)]
pub enum TransportError {
    /// Underlying device or socket failure.
    Io(io::Error),
    /// The link has been closed.
    Closed,
    /// Write accepted fewer bytes than the frame holds, after retries.
    ShortWrite {
        /// Bytes the link accepted.
        written: usize,
        /// Bytes in the encoded frame.
        expected: usize,
    },
    /// A synchronous request is already outstanding.
    Busy {
        /// cmd0 of the outstanding request.
        outstanding_cmd0: u8,
        /// cmd1 of the outstanding request.
        outstanding_cmd1: u8,
    },
    /// No synchronous response arrived in time.
    Timeout {
        /// cmd0 of the request.
        cmd0: u8,
        /// cmd1 of the request.
        cmd1: u8,
        /// How long the caller waited.
        waited: Duration,
    },
    /// Frame encoding or decoding failure.
    Protocol(protocol::Error),
    /// The NPI worker threads have stopped.
    WorkerStopped,
    /// Synchronous response carried no status byte.
    EmptyResponse {
        /// cmd0 of the response.
        cmd0: u8,
        /// cmd1 of the response.
        cmd1: u8,
    },
    /// The co-processor rejected the request with an RPC error.
    Rejected {
        /// MT error code.
        error: MtError,
        /// cmd0 of the rejected request.
        cmd0: u8,
        /// cmd1 of the rejected request.
        cmd1: u8,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "link I/O error: {err}"),
            Self::Closed => write!(f, "link closed"),
            Self::ShortWrite { written, expected } => {
                write!(f, "short write: {written} of {expected} bytes")
            }
            Self::Busy {
                outstanding_cmd0,
                outstanding_cmd1,
            } => write!(
                f,
                "request {outstanding_cmd0:#04x}/{outstanding_cmd1:#04x} still outstanding"
            ),
            Self::Timeout { cmd0, cmd1, waited } => write!(
                f,
                "no response to {cmd0:#04x}/{cmd1:#04x} after {}ms",
                waited.as_millis()
            ),
            Self::Protocol(err) => write!(f, "protocol error: {err}"),
            Self::WorkerStopped => write!(f, "NPI worker stopped"),
            Self::EmptyResponse { cmd0, cmd1 } => {
                write!(f, "empty response {cmd0:#04x}/{cmd1:#04x}")
            }
            Self::Rejected { error, cmd0, cmd1 } => {
                write!(f, "request {cmd0:#04x}/{cmd1:#04x} rejected: {error}")
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<protocol::Error> for TransportError {
    fn from(err: protocol::Error) -> Self {
        Self::Protocol(err)
    }
}
