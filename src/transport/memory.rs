//! In-memory duplex link.

use std::time::Duration;

use bytes::{Buf, Bytes};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use super::error::TransportError;
use super::link::{Transport, TransportRead, TransportWrite};

const DEFAULT_POLL: Duration = Duration::from_millis(20);

/// One end of an in-memory byte pipe.
///
/// Writes on one end are read, in order and possibly split differently, on
/// the other. Closing or dropping an end ends the peer's stream.
#[derive(Debug)]
pub struct MemoryTransport {
    tx: Sender<Bytes>,
    rx: Receiver<Bytes>,
    poll: Duration,
}

impl MemoryTransport {
    /// Create two connected ends.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = unbounded();
        let (b_tx, a_rx) = unbounded();
        (
            Self {
                tx: a_tx,
                rx: a_rx,
                poll: DEFAULT_POLL,
            },
            Self {
                tx: b_tx,
                rx: b_rx,
                poll: DEFAULT_POLL,
            },
        )
    }

    /// How long a read waits before reporting no data.
    #[must_use]
    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    /// Send bytes to the peer.
    pub fn write_all(&self, bytes: &[u8]) -> Result<(), TransportError> {
        self.tx
            .send(Bytes::copy_from_slice(bytes))
            .map_err(|_| TransportError::Closed)
    }

    /// Wait for the next chunk the peer wrote.
    pub fn read_chunk(&self, timeout: Duration) -> Result<Option<Bytes>, TransportError> {
        match self.rx.recv_timeout(timeout) {
            Ok(chunk) => Ok(Some(chunk)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Closed),
        }
    }
}

impl Transport for MemoryTransport {
    fn split(self) -> (Box<dyn TransportRead>, Box<dyn TransportWrite>) {
        (
            Box::new(MemoryReader {
                rx: self.rx,
                pending: Bytes::new(),
                poll: self.poll,
            }),
            Box::new(MemoryWriter { tx: Some(self.tx) }),
        )
    }
}

struct MemoryReader {
    rx: Receiver<Bytes>,
    pending: Bytes,
    poll: Duration,
}

impl TransportRead for MemoryReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if self.pending.is_empty() {
            match self.rx.recv_timeout(self.poll) {
                Ok(chunk) => self.pending = chunk,
                Err(RecvTimeoutError::Timeout) => return Ok(0),
                Err(RecvTimeoutError::Disconnected) => return Err(TransportError::Closed),
            }
        }
        let len = self.pending.len().min(buf.len());
        buf[..len].copy_from_slice(&self.pending[..len]);
        self.pending.advance(len);
        Ok(len)
    }
}

struct MemoryWriter {
    tx: Option<Sender<Bytes>>,
}

impl TransportWrite for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Closed)?;
        tx.send(Bytes::copy_from_slice(buf))
            .map_err(|_| TransportError::Closed)?;
        Ok(buf.len())
    }

    fn close(&mut self) {
        self.tx = None;
    }
}
