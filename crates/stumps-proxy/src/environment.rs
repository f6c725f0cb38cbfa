//! Per-instance proxy state.

use crate::recording::Recordings;
use crate::stump::StumpStore;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// State shared by every request served by one proxy instance.
///
/// Counters only move forward through the `increment_*` methods, and
/// `stumps_served` never exceeds `requests_served`. The listener counts a
/// request before running the pipeline; a hit reported without one counts
/// its own request.
pub struct ProxyEnvironment {
    external_host_name: String,
    stumps: StumpStore,
    recordings: Recordings,
    record_traffic: AtomicBool,
    requests_served: AtomicU64,
    stumps_served: AtomicU64,
}

impl ProxyEnvironment {
    pub fn new(external_host_name: impl Into<String>) -> Self {
        Self {
            external_host_name: external_host_name.into(),
            stumps: StumpStore::new(),
            recordings: Recordings::new(),
            record_traffic: AtomicBool::new(false),
            requests_served: AtomicU64::new(0),
            stumps_served: AtomicU64::new(0),
        }
    }

    pub fn external_host_name(&self) -> &str {
        &self.external_host_name
    }

    pub fn stumps(&self) -> &StumpStore {
        &self.stumps
    }

    pub fn recordings(&self) -> &Recordings {
        &self.recordings
    }

    pub fn record_traffic(&self) -> bool {
        self.record_traffic.load(Ordering::SeqCst)
    }

    pub fn set_record_traffic(&self, enabled: bool) {
        self.record_traffic.store(enabled, Ordering::SeqCst);
    }

    pub fn increment_requests_served(&self) -> u64 {
        self.requests_served.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Count a Stump hit, returning the new total.
    ///
    /// A hit is always a served request too. When a handler runs without the
    /// listener having counted its request, `requests_served` is raised to
    /// cover the hit before `stumps_served` moves.
    pub fn increment_stumps_served(&self) -> u64 {
        let mut current = self.stumps_served.load(Ordering::SeqCst);
        loop {
            let next = current + 1;
            self.requests_served.fetch_max(next, Ordering::SeqCst);
            match self.stumps_served.compare_exchange_weak(
                current,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::SeqCst)
    }

    pub fn stumps_served(&self) -> u64 {
        self.stumps_served.load(Ordering::SeqCst)
    }

    /// Read both counters as `(requests_served, stumps_served)`.
    ///
    /// `stumps_served` is read first so the pair never shows more Stump hits
    /// than requests.
    pub fn counters(&self) -> (u64, u64) {
        let stumps = self.stumps_served.load(Ordering::SeqCst);
        let requests = self.requests_served.load(Ordering::SeqCst);
        (requests, stumps)
    }
}
