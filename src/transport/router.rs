//! Inbound frame routing and in-order indication dispatch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, warn};

use crate::mt::{MtIndication, decode_indication};
use crate::protocol::metrics::Metrics;
use crate::protocol::{CommandType, MtFrame, Subsystem};

/// Why a frame was not delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Frame type the co-processor should never send to the host
    UnexpectedType,
    /// Subsystem the host does not handle
    UnhandledSubsystem,
}

/// Destination of an inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Completes the outstanding synchronous request
    Srsp(MtFrame),
    /// Asynchronous message for the indication handler
    Indication(MtFrame),
    /// Not deliverable
    Drop(DropReason),
}

/// Classifies inbound frames by type and subsystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct Router;

impl Router {
    /// Decide where `frame` goes.
    #[must_use]
    pub fn route(frame: MtFrame) -> Route {
        match frame.command_type() {
            Some(CommandType::Srsp) => Route::Srsp(frame),
            Some(CommandType::Areq) => match frame.subsystem() {
                Some(Subsystem::Sys | Subsystem::Mac | Subsystem::Util) => {
                    Route::Indication(frame)
                }
                _ => {
                    debug!(
                        cmd0 = frame.cmd0(),
                        cmd1 = frame.cmd1(),
                        "AREQ for unhandled subsystem"
                    );
                    Route::Drop(DropReason::UnhandledSubsystem)
                }
            },
            _ => {
                warn!(
                    cmd0 = frame.cmd0(),
                    cmd1 = frame.cmd1(),
                    "unexpected frame type from co-processor"
                );
                Route::Drop(DropReason::UnexpectedType)
            }
        }
    }
}

/// Consumer of decoded indications
pub trait IndicationHandler: Send {
    /// Handle one indication. Called in arrival order from a single thread.
    fn handle(&mut self, indication: MtIndication);
}

impl<F: FnMut(MtIndication) + Send> IndicationHandler for F {
    fn handle(&mut self, indication: MtIndication) {
        self(indication);
    }
}

const DISPATCH_POLL: Duration = Duration::from_millis(50);

/// Thread that drains the indication queue into a handler.
#[derive(Debug)]
pub struct Dispatcher {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Start draining `frames` into `handler`.
    pub fn spawn<H>(frames: Receiver<MtFrame>, mut handler: H) -> std::io::Result<Self>
    where
        H: IndicationHandler + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("npi-dispatch".into())
            .spawn(move || {
                while !flag.load(Ordering::Acquire) {
                    let frame = match frames.recv_timeout(DISPATCH_POLL) {
                        Ok(frame) => frame,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    };
                    match decode_indication(&frame) {
                        Ok(indication) if indication.is_unknown() => {
                            debug!(
                                cmd0 = frame.cmd0(),
                                cmd1 = frame.cmd1(),
                                "unknown indication dropped"
                            );
                            Metrics::record_areq_dropped();
                        }
                        Ok(indication) => handler.handle(indication),
                        Err(err) => {
                            warn!(
                                cmd0 = frame.cmd0(),
                                cmd1 = frame.cmd1(),
                                error = %err,
                                "malformed indication dropped"
                            );
                            Metrics::record_areq_dropped();
                        }
                    }
                }
                debug!("dispatcher stopped");
            })?;
        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }

    /// Stop after the indication in progress and wait for the thread.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.thread().id() == thread::current().id() {
                return;
            }
            if thread.join().is_err() {
                warn!("dispatcher thread panicked");
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
