//! Byte links to the co-processor and the MT request seam above them.

use crate::protocol::MtFrame;

use super::error::TransportError;

/// Receive half of a link.
///
/// `Ok(0)` means no bytes arrived within the link's poll interval; the
/// caller checks for shutdown and reads again. End of stream is reported as
/// [`TransportError::Closed`].
pub trait TransportRead: Send {
    /// Read available bytes into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

/// Transmit half of a link.
pub trait TransportWrite: Send {
    /// Write some prefix of `buf`, returning how many bytes were accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError>;

    /// Release the link.
    fn close(&mut self) {}
}

/// A full-duplex byte link, such as a UART device or a socket to a bridge.
pub trait Transport: Send {
    /// Prepare the link for use.
    fn open(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Split into halves owned by the reader and writer threads.
    fn split(self) -> (Box<dyn TransportRead>, Box<dyn TransportWrite>)
    where
        Self: Sized;
}

/// Anything that can carry MT requests to the co-processor.
pub trait MtLink {
    /// Send a synchronous request and wait for its response.
    fn request(&self, frame: MtFrame) -> Result<MtFrame, TransportError>;

    /// Send a frame that has no response.
    fn send(&self, frame: MtFrame) -> Result<(), TransportError>;
}

impl<L: MtLink + ?Sized> MtLink for &L {
    fn request(&self, frame: MtFrame) -> Result<MtFrame, TransportError> {
        (**self).request(frame)
    }

    fn send(&self, frame: MtFrame) -> Result<(), TransportError> {
        (**self).send(frame)
    }
}
