//! NPI worker threads and the handle callers use to reach the co-processor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytes::Bytes;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};
use tracing::{debug, info, instrument, trace, warn};

use crate::protocol::metrics::{FrameDirection, Metrics};
use crate::protocol::{FrameParser, HexSlice, MtFrame, encode_uart};

use super::correlator::Correlator;
use super::error::TransportError;
use super::link::{MtLink, Transport, TransportRead, TransportWrite};
use super::router::{DropReason, Route, Router};

/// How long `close` waits for a reader blocked in the link.
const READER_JOIN_GRACE: Duration = Duration::from_secs(1);
const READER_JOIN_POLL: Duration = Duration::from_millis(5);

/// NPI worker configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NpiConfig {
    /// How long a synchronous request waits for its response.
    pub srsp_timeout: Duration,
    /// Indications buffered for the consumer before new ones are dropped.
    pub queue_depth: usize,
    /// Bytes requested from the link per read.
    pub read_chunk: usize,
    /// Extra write attempts after a short write.
    pub write_retries: u8,
}

impl Default for NpiConfig {
    fn default() -> Self {
        Self {
            srsp_timeout: Duration::from_secs(5),
            queue_depth: 30,
            read_chunk: 256,
            write_retries: 1,
        }
    }
}

/// Message to the writer thread.
#[derive(Debug)]
pub enum NpiEvent {
    /// Write an encoded frame and report the outcome.
    Tx {
        /// UART-framed bytes
        bytes: Bytes,
        /// Completion
        done: Sender<Result<(), TransportError>>,
    },
    /// Close the link and exit.
    Shutdown,
}

/// Entry point for bringing up an NPI link.
#[derive(Debug)]
pub struct Npi;

impl Npi {
    /// Open `transport` and start the reader and writer threads.
    #[instrument(level = "info", skip_all)]
    pub fn start<T: Transport>(
        mut transport: T,
        config: NpiConfig,
    ) -> Result<NpiHandle, TransportError> {
        transport.open()?;
        let (reader, writer) = transport.split();

        let (event_tx, event_rx) = unbounded::<NpiEvent>();
        let (srsp_tx, srsp_rx) = unbounded::<MtFrame>();
        let (ind_tx, ind_rx) = bounded::<MtFrame>(config.queue_depth.max(1));
        let shutdown = Arc::new(AtomicBool::new(false));

        let retries = config.write_retries;
        let writer = thread::Builder::new()
            .name("npi-writer".to_string())
            .spawn(move || run_writer(writer, &event_rx, retries))?;

        let flag = Arc::clone(&shutdown);
        let chunk = config.read_chunk.max(1);
        let reader = thread::Builder::new()
            .name("npi-reader".to_string())
            .spawn(move || run_reader(reader, &srsp_tx, &ind_tx, &flag, chunk))?;

        info!(
            srsp_timeout_ms = config.srsp_timeout.as_millis(),
            queue_depth = config.queue_depth,
            "NPI started"
        );

        Ok(NpiHandle {
            inner: Arc::new(NpiInner {
                events: event_tx,
                correlator: Correlator::new(srsp_rx),
                indications: ind_rx,
                config,
                shutdown,
                workers: Mutex::new(Some(Workers { writer, reader })),
            }),
        })
    }
}

fn write_frame(
    writer: &mut dyn TransportWrite,
    bytes: &[u8],
    retries: u8,
) -> Result<(), TransportError> {
    let mut written = 0;
    for attempt in 0..=retries {
        written += writer.write(&bytes[written..])?;
        if written == bytes.len() {
            return Ok(());
        }
        debug!(attempt, written, expected = bytes.len(), "short write");
    }
    Err(TransportError::ShortWrite {
        written,
        expected: bytes.len(),
    })
}

fn run_writer(mut writer: Box<dyn TransportWrite>, events: &Receiver<NpiEvent>, retries: u8) {
    while let Ok(event) = events.recv() {
        match event {
            NpiEvent::Tx { bytes, done } => {
                trace!(data = %HexSlice(&bytes), "frame out");
                let result = write_frame(writer.as_mut(), &bytes, retries);
                if let Err(err) = &result {
                    warn!(error = %err, "link write failed");
                }
                let _ = done.send(result);
            }
            NpiEvent::Shutdown => break,
        }
    }
    writer.close();
    debug!("NPI writer stopped");
}

fn run_reader(
    mut reader: Box<dyn TransportRead>,
    srsp: &Sender<MtFrame>,
    indications: &Sender<MtFrame>,
    shutdown: &AtomicBool,
    chunk: usize,
) {
    let mut parser = FrameParser::new();
    let mut buf = vec![0u8; chunk];
    while !shutdown.load(Ordering::Acquire) {
        let len = match reader.read(&mut buf) {
            Ok(0) => continue,
            Ok(len) => len,
            Err(TransportError::Closed) => {
                debug!("link closed by peer");
                break;
            }
            Err(err) => {
                warn!(error = %err, "link read failed");
                break;
            }
        };
        for frame in parser.push(&buf[..len]) {
            Metrics::record_frame(FrameDirection::Received, frame.command_type());
            match Router::route(frame) {
                Route::Srsp(frame) => {
                    if srsp.send(frame).is_err() {
                        return;
                    }
                }
                Route::Indication(frame) => match indications.try_send(frame) {
                    Ok(()) => {}
                    Err(TrySendError::Full(frame)) => {
                        Metrics::record_areq_dropped();
                        warn!(
                            cmd0 = frame.cmd0(),
                            cmd1 = frame.cmd1(),
                            "indication queue full, dropping"
                        );
                    }
                    Err(TrySendError::Disconnected(_)) => return,
                },
                Route::Drop(DropReason::UnhandledSubsystem) => Metrics::record_areq_dropped(),
                Route::Drop(DropReason::UnexpectedType) => {}
            }
        }
    }
    debug!("NPI reader stopped");
}

#[derive(Debug)]
struct Workers {
    writer: JoinHandle<()>,
    reader: JoinHandle<()>,
}

#[derive(Debug)]
struct NpiInner {
    events: Sender<NpiEvent>,
    correlator: Correlator,
    indications: Receiver<MtFrame>,
    config: NpiConfig,
    shutdown: Arc<AtomicBool>,
    workers: Mutex<Option<Workers>>,
}

impl NpiInner {
    fn close(&self) {
        self.shutdown.store(true, Ordering::Release);
        let _ = self.events.send(NpiEvent::Shutdown);

        let workers = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(Workers { writer, reader }) = workers else {
            return;
        };

        if writer.join().is_err() {
            warn!("NPI writer panicked");
        }

        let deadline = Instant::now() + READER_JOIN_GRACE;
        while !reader.is_finished() && Instant::now() < deadline {
            thread::sleep(READER_JOIN_POLL);
        }
        if reader.is_finished() {
            if reader.join().is_err() {
                warn!("NPI reader panicked");
            }
        } else {
            warn!("NPI reader still blocked in link read, detaching");
        }
        info!("NPI closed");
    }
}

impl Drop for NpiInner {
    fn drop(&mut self) {
        self.close();
    }
}

/// Handle to a running NPI link.
///
/// Clones share the link. The link closes on [`NpiHandle::close`] or when
/// the last clone is dropped.
#[derive(Clone, Debug)]
pub struct NpiHandle {
    inner: Arc<NpiInner>,
}

impl NpiHandle {
    /// Configuration the link was started with.
    #[must_use]
    pub fn config(&self) -> &NpiConfig {
        &self.inner.config
    }

    /// Send an asynchronous frame.
    #[instrument(
        level = "debug",
        skip(self, frame),
        fields(cmd0 = frame.cmd0(), cmd1 = frame.cmd1())
    )]
    pub fn send_areq(&self, frame: MtFrame) -> Result<(), TransportError> {
        self.transmit(frame)
    }

    /// Send a synchronous request and wait for its response.
    pub fn request(&self, frame: MtFrame) -> Result<MtFrame, TransportError> {
        self.request_timeout(frame, self.inner.config.srsp_timeout)
    }

    /// Send a synchronous request, waiting at most `timeout`.
    #[instrument(
        level = "debug",
        skip(self, frame),
        fields(cmd0 = frame.cmd0(), cmd1 = frame.cmd1())
    )]
    pub fn request_timeout(
        &self,
        frame: MtFrame,
        timeout: Duration,
    ) -> Result<MtFrame, TransportError> {
        self.inner
            .correlator
            .request(frame, timeout, |frame| self.transmit(frame))
    }

    /// Queue of inbound asynchronous frames, in arrival order.
    #[must_use]
    pub fn indications(&self) -> Receiver<MtFrame> {
        self.inner.indications.clone()
    }

    /// Whether `close` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Stop the worker threads and release the link. Idempotent.
    pub fn close(&self) {
        self.inner.close();
    }

    fn transmit(&self, frame: MtFrame) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let (done_tx, done_rx) = bounded(1);
        self.inner
            .events
            .send(NpiEvent::Tx {
                bytes: encode_uart(&frame),
                done: done_tx,
            })
            .map_err(|_| TransportError::WorkerStopped)?;
        done_rx.recv().map_err(|_| TransportError::WorkerStopped)??;
        Metrics::record_frame(FrameDirection::Sent, frame.command_type());
        Ok(())
    }
}

impl MtLink for NpiHandle {
    fn request(&self, frame: MtFrame) -> Result<MtFrame, TransportError> {
        Self::request(self, frame)
    }

    fn send(&self, frame: MtFrame) -> Result<(), TransportError> {
        self.send_areq(frame)
    }
}
