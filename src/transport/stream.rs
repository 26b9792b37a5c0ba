//! Links over `std::io` streams: serial device files and TCP bridges.

use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use super::error::TransportError;
use super::link::{Transport, TransportRead, TransportWrite};

/// Link over any reader/writer pair.
///
/// Reads that time out or are interrupted report no data, so a stream with a
/// read timeout lets the NPI reader notice shutdown promptly.
#[derive(Debug)]
pub struct StreamTransport<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> StreamTransport<R, W>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    /// Wrap an existing pair.
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl StreamTransport<File, File> {
    /// Open a character device, such as a UART already configured for the
    /// co-processor's baud rate.
    pub fn open_device(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let writer = file.try_clone()?;
        Ok(Self {
            reader: file,
            writer,
        })
    }
}

impl StreamTransport<TcpStream, TcpStream> {
    /// Connect to a co-processor bridge that forwards the UART byte stream.
    pub fn connect(addr: impl ToSocketAddrs, read_timeout: Duration) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(read_timeout))?;
        let writer = stream.try_clone()?;
        Ok(Self {
            reader: stream,
            writer,
        })
    }
}

impl<R, W> Transport for StreamTransport<R, W>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    fn split(self) -> (Box<dyn TransportRead>, Box<dyn TransportWrite>) {
        (
            Box::new(StreamReader(self.reader)),
            Box::new(StreamWriter(Some(self.writer))),
        )
    }
}

struct StreamReader<R>(R);

impl<R: Read + Send> TransportRead for StreamReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.0.read(buf) {
            Ok(0) => Err(TransportError::Closed),
            Ok(len) => Ok(len),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(0)
            }
            Err(err) => Err(err.into()),
        }
    }
}

struct StreamWriter<W>(Option<W>);

impl<W: Write + Send> TransportWrite for StreamWriter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        let writer = self.0.as_mut().ok_or(TransportError::Closed)?;
        let written = match writer.write(buf) {
            Ok(len) => len,
            Err(err) if err.kind() == ErrorKind::Interrupted => 0,
            Err(err) => return Err(err.into()),
        };
        writer.flush()?;
        Ok(written)
    }

    fn close(&mut self) {
        if let Some(mut writer) = self.0.take() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_stream_halves() {
        let sink = Sink::default();
        let transport = StreamTransport::new(Cursor::new(vec![0xFE, 0x00]), sink.clone());
        let (mut reader, mut writer) = transport.split();

        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert!(matches!(reader.read(&mut buf), Err(TransportError::Closed)));

        assert_eq!(writer.write(&[1, 2]).unwrap(), 2);
        assert_eq!(*sink.0.lock().unwrap(), vec![1, 2]);
        writer.close();
        assert!(matches!(writer.write(&[3]), Err(TransportError::Closed)));
    }
}
