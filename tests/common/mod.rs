//! Scripted co-processor on the far end of an in-memory link.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use npi154::protocol::{CommandType, FrameParser, MtFrame, SUBSYSTEM_MASK, Subsystem, encode_uart};
use npi154::transport::{MemoryTransport, Npi, NpiConfig, NpiHandle};
use tracing_subscriber::EnvFilter;

const POLL: Duration = Duration::from_millis(10);

/// Device end of the link
pub struct Device {
    link: MemoryTransport,
    parser: FrameParser,
    pending: VecDeque<MtFrame>,
}

impl Device {
    /// Next frame from the host, `None` on timeout or once the host closed.
    pub fn next_frame(&mut self, timeout: Duration) -> Option<MtFrame> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Some(frame);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            match self.link.read_chunk(remaining.min(POLL)) {
                Ok(Some(chunk)) => self.pending.extend(self.parser.push(&chunk)),
                Ok(None) => {}
                Err(_) => return None,
            }
        }
    }

    /// Next frame if one arrived within a poll; `Err` once the host closed.
    fn read_until_closed(&mut self) -> Result<Option<MtFrame>, ()> {
        if let Some(frame) = self.pending.pop_front() {
            return Ok(Some(frame));
        }
        match self.link.read_chunk(POLL) {
            Ok(Some(chunk)) => {
                self.pending.extend(self.parser.push(&chunk));
                Ok(self.pending.pop_front())
            }
            Ok(None) => Ok(None),
            Err(_) => Err(()),
        }
    }

    /// Write raw bytes to the host.
    pub fn write_raw(&self, bytes: &[u8]) {
        self.link.write_all(bytes).expect("host end open");
    }

    /// Write a frame to the host.
    pub fn send(&self, frame: &MtFrame) {
        self.write_raw(&encode_uart(frame));
    }

    /// Answer `request` with an SRSP carrying `attrs`.
    pub fn reply(&self, request: &MtFrame, attrs: &[u8]) {
        self.send(&srsp_for(request, attrs));
    }

    /// Send an asynchronous indication.
    pub fn indicate(&self, subsystem: Subsystem, cmd1: u8, attrs: &[u8]) {
        let frame = MtFrame::build(CommandType::Areq, subsystem, cmd1, attrs.to_vec())
            .expect("indication fits");
        self.send(&frame);
    }
}

/// SRSP answering `request`.
pub fn srsp_for(request: &MtFrame, attrs: &[u8]) -> MtFrame {
    let cmd0 = CommandType::Srsp.as_u8() | (request.cmd0() & SUBSYSTEM_MASK);
    MtFrame::new(cmd0, request.cmd1(), attrs.to_vec()).expect("response fits")
}

/// Route link logs to the test output, filtered by `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Start an NPI link whose far end is a scripted device.
pub fn connect(config: NpiConfig) -> (NpiHandle, Device) {
    init_tracing();
    let (host, device) = MemoryTransport::pair();
    let npi = Npi::start(host.with_poll_interval(POLL), config).expect("npi starts");
    let device = Device {
        link: device,
        parser: FrameParser::new(),
        pending: VecDeque::new(),
    };
    (npi, device)
}

/// Answer every request with `handler` until the host closes the link.
///
/// The handler writes its own replies, so it can also emit indications or
/// stay silent. Returns every frame the host sent.
pub fn serve<F>(mut device: Device, mut handler: F) -> JoinHandle<Vec<MtFrame>>
where
    F: FnMut(&Device, &MtFrame) + Send + 'static,
{
    thread::spawn(move || {
        let mut seen = Vec::new();
        loop {
            match device.read_until_closed() {
                Ok(Some(frame)) => {
                    handler(&device, &frame);
                    seen.push(frame);
                }
                Ok(None) => {}
                Err(()) => return seen,
            }
        }
    })
}

/// Reply with a single success status byte.
pub fn ok_status(device: &Device, request: &MtFrame) {
    device.reply(request, &[0x00]);
}
