// Session metrics
//
// Lock-free counters for what the client did during one run. Logged once on
// shutdown.

use crate::state::RequestKind;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Metrics {
    /// Requests started, indexed by `RequestKind`
    requests_started: [AtomicU64; 5],

    pub requests_succeeded: AtomicU64,

    pub requests_failed: AtomicU64,

    /// Analyses answered locally because the backend was unavailable
    pub local_fallbacks: AtomicU64,

    /// Responses dropped because their slot had moved on
    pub stale_discards: AtomicU64,

    /// Calls ignored because the same request was still pending
    pub pending_repeats: AtomicU64,

    pub remote_save_failures: AtomicU64,

    /// Total request time in milliseconds
    pub total_request_time_ms: AtomicU64,

    start_time: Instant,
}

fn slot_index(kind: RequestKind) -> usize {
    match kind {
        RequestKind::Analysis => 0,
        RequestKind::Flashcards => 1,
        RequestKind::Quiz => 2,
        RequestKind::ReportCard => 3,
        RequestKind::Syllabus => 4,
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests_started: Default::default(),
            requests_succeeded: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            local_fallbacks: AtomicU64::new(0),
            stale_discards: AtomicU64::new(0),
            pending_repeats: AtomicU64::new(0),
            remote_save_failures: AtomicU64::new(0),
            total_request_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_request_started(&self, kind: RequestKind) {
        self.requests_started[slot_index(kind)].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_succeeded(&self) {
        self.requests_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_local_fallback(&self) {
        self.local_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_discard(&self) {
        self.stale_discards.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pending_repeat(&self) {
        self.pending_repeats.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_save_failure(&self) {
        self.remote_save_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_time(&self, duration: Duration) {
        self.total_request_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn requests_started(&self, kind: RequestKind) -> u64 {
        self.requests_started[slot_index(kind)].load(Ordering::Relaxed)
    }

    pub fn total_requests(&self) -> u64 {
        RequestKind::ALL
            .into_iter()
            .map(|kind| self.requests_started(kind))
            .sum()
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average time per finished request in milliseconds.
    pub fn avg_request_time_ms(&self) -> f64 {
        let total = self.total_request_time_ms.load(Ordering::Relaxed);
        let count = self.requests_succeeded.load(Ordering::Relaxed)
            + self.requests_failed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Session Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        for kind in RequestKind::ALL {
            let started = self.requests_started(kind);
            if started > 0 {
                tracing::info!("{} requests: {}", kind, started);
            }
        }
        tracing::info!(
            "Requests: {} succeeded, {} failed (avg {:.0}ms)",
            self.requests_succeeded.load(Ordering::Relaxed),
            self.requests_failed.load(Ordering::Relaxed),
            self.avg_request_time_ms()
        );
        tracing::info!(
            "Local fallbacks: {}, stale discards: {}, repeats while pending: {}",
            self.local_fallbacks.load(Ordering::Relaxed),
            self.stale_discards.load(Ordering::Relaxed),
            self.pending_repeats.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Remote preference save failures: {}",
            self.remote_save_failures.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
