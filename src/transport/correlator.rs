//! Single-outstanding SREQ/SRSP correlation.
//!
//! The co-processor answers synchronous requests one at a time. The
//! correlator admits one request, hands it to the writer, and waits on the
//! SRSP channel fed by the reader thread until the matching response arrives.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, warn};

use crate::protocol::metrics::Metrics;
use crate::protocol::{HexSlice, MtError, MtFrame, SUBSYSTEM_MASK, Subsystem};

use super::error::TransportError;

/// Correlator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelatorState {
    /// No request outstanding
    Idle,
    /// Waiting for the response to this command
    AwaitingSrsp {
        /// cmd0 of the request
        cmd0: u8,
        /// cmd1 of the request
        cmd1: u8,
    },
}

/// Matches synchronous responses to the one outstanding request.
#[derive(Debug)]
pub struct Correlator {
    state: Mutex<CorrelatorState>,
    srsp: Receiver<MtFrame>,
}

/// Returns the correlator to idle however the request ends.
struct Outstanding<'a> {
    state: &'a Mutex<CorrelatorState>,
}

impl Drop for Outstanding<'_> {
    fn drop(&mut self) {
        *lock(self.state) = CorrelatorState::Idle;
    }
}

fn lock(state: &Mutex<CorrelatorState>) -> MutexGuard<'_, CorrelatorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What an inbound SRSP means for the outstanding request
enum Verdict {
    Matched,
    Rejected(MtError),
    Stray,
}

fn judge(request: &MtFrame, response: &MtFrame) -> Verdict {
    let req_subsystem = request.cmd0() & SUBSYSTEM_MASK;
    let rsp_subsystem = response.cmd0() & SUBSYSTEM_MASK;
    if rsp_subsystem == req_subsystem && response.cmd1() == request.cmd1() {
        return Verdict::Matched;
    }
    if rsp_subsystem == Subsystem::RpcError.as_u8() {
        if let [error, cmd0, cmd1, ..] = response.attrs()[..] {
            if cmd0 == request.cmd0() && cmd1 == request.cmd1() {
                return Verdict::Rejected(MtError::from_u8(error));
            }
        }
    }
    Verdict::Stray
}

impl Correlator {
    /// Correlate responses arriving on `srsp`.
    #[must_use]
    pub fn new(srsp: Receiver<MtFrame>) -> Self {
        Self {
            state: Mutex::new(CorrelatorState::Idle),
            srsp,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CorrelatorState {
        *lock(&self.state)
    }

    /// Send `frame` with `send` and wait up to `timeout` for its response.
    ///
    /// Fails with [`TransportError::Busy`] without sending if another
    /// request is outstanding.
    pub fn request<F>(
        &self,
        frame: MtFrame,
        timeout: Duration,
        send: F,
    ) -> Result<MtFrame, TransportError>
    where
        F: FnOnce(MtFrame) -> Result<(), TransportError>,
    {
        let (cmd0, cmd1) = (frame.cmd0(), frame.cmd1());
        let _outstanding = {
            let mut state = lock(&self.state);
            if let CorrelatorState::AwaitingSrsp {
                cmd0: outstanding_cmd0,
                cmd1: outstanding_cmd1,
            } = *state
            {
                return Err(TransportError::Busy {
                    outstanding_cmd0,
                    outstanding_cmd1,
                });
            }
            *state = CorrelatorState::AwaitingSrsp { cmd0, cmd1 };
            Outstanding { state: &self.state }
        };

        self.drain_stale();
        let request = frame.clone();
        send(frame)?;

        let started = Instant::now();
        let deadline = started + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.srsp.recv_timeout(remaining) {
                Ok(response) => match judge(&request, &response) {
                    Verdict::Matched => {
                        Metrics::record_request(started.elapsed());
                        debug!(cmd0, cmd1, len = response.attrs().len(), "SRSP matched");
                        return Ok(response);
                    }
                    Verdict::Rejected(error) => {
                        warn!(cmd0, cmd1, %error, "request rejected by co-processor");
                        return Err(TransportError::Rejected { error, cmd0, cmd1 });
                    }
                    Verdict::Stray => {
                        Metrics::record_srsp_discarded();
                        warn!(
                            cmd0,
                            cmd1,
                            got_cmd0 = response.cmd0(),
                            got_cmd1 = response.cmd1(),
                            attrs = %HexSlice(response.attrs()),
                            "discarding SRSP for another request"
                        );
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    Metrics::record_srsp_timeout();
                    warn!(cmd0, cmd1, waited_ms = timeout.as_millis(), "SRSP timeout");
                    return Err(TransportError::Timeout {
                        cmd0,
                        cmd1,
                        waited: timeout,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => return Err(TransportError::WorkerStopped),
            }
        }
    }

    /// Discard responses left over from requests that timed out.
    fn drain_stale(&self) {
        while let Ok(stale) = self.srsp.try_recv() {
            Metrics::record_srsp_discarded();
            debug!(
                cmd0 = stale.cmd0(),
                cmd1 = stale.cmd1(),
                "discarding stale SRSP"
            );
        }
    }
}
