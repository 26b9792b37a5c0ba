//! Process-wide NPI counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::CommandType;

/// Track NPI link metrics without external dependencies.
pub(crate) struct Metrics;

static SENT_FRAMES: AtomicU64 = AtomicU64::new(0);
static RECEIVED_FRAMES: AtomicU64 = AtomicU64::new(0);
static FCS_ERRORS: AtomicU64 = AtomicU64::new(0);
static SRSP_TIMEOUTS: AtomicU64 = AtomicU64::new(0);
static SRSP_DISCARDED: AtomicU64 = AtomicU64::new(0);
static AREQ_DROPPED: AtomicU64 = AtomicU64::new(0);
static REQUESTS_COMPLETED: AtomicU64 = AtomicU64::new(0);
static SRSP_LATENCY_TOTAL_NS: AtomicU64 = AtomicU64::new(0);
static SRSP_LATENCY_MAX_NS: AtomicU64 = AtomicU64::new(0);

const NANOSECONDS_PER_MICROSECOND: u128 = 1_000;

struct FrameTypeCounters {
    poll: AtomicU64,
    sreq: AtomicU64,
    areq: AtomicU64,
    srsp: AtomicU64,
    extn: AtomicU64,
}

static RECEIVED_BY_TYPE: FrameTypeCounters = FrameTypeCounters::new();

impl FrameTypeCounters {
    const fn new() -> Self {
        Self {
            poll: AtomicU64::new(0),
            sreq: AtomicU64::new(0),
            areq: AtomicU64::new(0),
            srsp: AtomicU64::new(0),
            extn: AtomicU64::new(0),
        }
    }

    fn increment(&self, kind: CommandType) {
        let counter = match kind {
            CommandType::Poll => &self.poll,
            CommandType::Sreq => &self.sreq,
            CommandType::Areq => &self.areq,
            CommandType::Srsp => &self.srsp,
            CommandType::Extn => &self.extn,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Direction of frame flow for counting.
#[derive(Clone, Copy)]
pub(crate) enum FrameDirection {
    Sent,
    Received,
}

impl Metrics {
    #[inline]
    pub(crate) fn record_frame(direction: FrameDirection, kind: Option<CommandType>) {
        match direction {
            FrameDirection::Sent => {
                SENT_FRAMES.fetch_add(1, Ordering::Relaxed);
            }
            FrameDirection::Received => {
                RECEIVED_FRAMES.fetch_add(1, Ordering::Relaxed);
                if let Some(kind) = kind {
                    RECEIVED_BY_TYPE.increment(kind);
                }
            }
        }
    }

    #[inline]
    pub(crate) fn record_fcs_error() {
        FCS_ERRORS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_srsp_timeout() {
        SRSP_TIMEOUTS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_srsp_discarded() {
        SRSP_DISCARDED.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_areq_dropped() {
        AREQ_DROPPED.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_request(duration: Duration) {
        let nanos = duration
            .as_nanos()
            .min(u128::from(u64::MAX))
            .try_into()
            .unwrap_or(u64::MAX);
        REQUESTS_COMPLETED.fetch_add(1, Ordering::Relaxed);
        SRSP_LATENCY_TOTAL_NS.fetch_add(nanos, Ordering::Relaxed);
        update_max(&SRSP_LATENCY_MAX_NS, nanos);
    }

    #[inline]
    pub(crate) fn totals() -> MetricsSnapshot {
        MetricsSnapshot {
            sent_frames: SENT_FRAMES.load(Ordering::Relaxed),
            received_frames: RECEIVED_FRAMES.load(Ordering::Relaxed),
            received_poll: RECEIVED_BY_TYPE.poll.load(Ordering::Relaxed),
            received_sreq: RECEIVED_BY_TYPE.sreq.load(Ordering::Relaxed),
            received_areq: RECEIVED_BY_TYPE.areq.load(Ordering::Relaxed),
            received_srsp: RECEIVED_BY_TYPE.srsp.load(Ordering::Relaxed),
            received_extn: RECEIVED_BY_TYPE.extn.load(Ordering::Relaxed),
            fcs_errors: FCS_ERRORS.load(Ordering::Relaxed),
            srsp_timeouts: SRSP_TIMEOUTS.load(Ordering::Relaxed),
            srsp_discarded: SRSP_DISCARDED.load(Ordering::Relaxed),
            areq_dropped: AREQ_DROPPED.load(Ordering::Relaxed),
            requests_completed: REQUESTS_COMPLETED.load(Ordering::Relaxed),
            srsp_latency_total_ns: SRSP_LATENCY_TOTAL_NS.load(Ordering::Relaxed),
            srsp_latency_max_ns: SRSP_LATENCY_MAX_NS.load(Ordering::Relaxed),
        }
    }
}

fn update_max(target: &AtomicU64, candidate: u64) {
    let mut current = target.load(Ordering::Relaxed);
    while candidate > current {
        match target.compare_exchange_weak(
            current,
            candidate,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return,
            Err(old) => current = old,
        }
    }
}

/// Read the process-wide NPI counters.
#[must_use]
pub fn snapshot() -> MetricsSnapshot {
    Metrics::totals()
}

/// Lightweight snapshot of NPI counters.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSnapshot {
    /// Frames handed to the transport
    pub sent_frames: u64,
    /// Frames that passed the FCS check
    pub received_frames: u64,
    /// Received POLL frames
    pub received_poll: u64,
    /// Received SREQ frames
    pub received_sreq: u64,
    /// Received AREQ frames
    pub received_areq: u64,
    /// Received SRSP frames
    pub received_srsp: u64,
    /// Received EXTN frames
    pub received_extn: u64,
    /// Frames dropped for a bad FCS
    pub fcs_errors: u64,
    /// Synchronous requests that never saw their response
    pub srsp_timeouts: u64,
    /// Responses that matched no outstanding request
    pub srsp_discarded: u64,
    /// Indications no handler consumed
    pub areq_dropped: u64,
    /// Synchronous requests that completed
    pub requests_completed: u64,
    /// Sum of request round-trip times
    pub srsp_latency_total_ns: u64,
    /// Slowest request round trip
    pub srsp_latency_max_ns: u64,
}

impl MetricsSnapshot {
    /// Average request round trip in microseconds.
    #[must_use]
    pub fn avg_srsp_latency_us(&self) -> Option<u64> {
        average_microseconds(self.srsp_latency_total_ns, self.requests_completed)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn average_microseconds(total_ns: u64, count: u64) -> Option<u64> {
    if count == 0 {
        return None;
    }

    let total_ns_u128 = u128::from(total_ns);
    Some((total_ns_u128 / (u128::from(count) * NANOSECONDS_PER_MICROSECOND)) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_monotonic() {
        let before = snapshot();
        Metrics::record_frame(FrameDirection::Received, Some(CommandType::Areq));
        Metrics::record_frame(FrameDirection::Sent, Some(CommandType::Sreq));
        Metrics::record_fcs_error();
        let after = snapshot();
        assert!(after.received_frames > before.received_frames);
        assert!(after.received_areq > before.received_areq);
        assert!(after.sent_frames > before.sent_frames);
        assert!(after.fcs_errors > before.fcs_errors);
    }

    #[test]
    fn test_average_latency() {
        let snapshot = MetricsSnapshot {
            requests_completed: 4,
            srsp_latency_total_ns: 8_000,
            ..MetricsSnapshot::default()
        };
        assert_eq!(snapshot.avg_srsp_latency_us(), Some(2));
        assert_eq!(MetricsSnapshot::default().avg_srsp_latency_us(), None);
    }

    #[test]
    fn test_update_max_keeps_largest() {
        let target = AtomicU64::new(10);
        update_max(&target, 5);
        assert_eq!(target.load(Ordering::Relaxed), 10);
        update_max(&target, 50);
        assert_eq!(target.load(Ordering::Relaxed), 50);
    }
}
