//! Validation counters
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for validator outcomes.
///
/// Uses Relaxed ordering; counters are independent and only read for reporting.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    validations_accepted: AtomicU64,
    validations_rejected: AtomicU64,
    patches_authorized: AtomicU64,
    patches_rejected: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_validations_accepted(&self) {
        self.validations_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_validations_rejected(&self) {
        self.validations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_patches_authorized(&self) {
        self.patches_authorized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_patches_rejected(&self) {
        self.patches_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            validations_accepted: self.validations_accepted.load(Ordering::Relaxed),
            validations_rejected: self.validations_rejected.load(Ordering::Relaxed),
            patches_authorized: self.patches_authorized.load(Ordering::Relaxed),
            patches_rejected: self.patches_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of the counters, suitable for serialization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub validations_accepted: u64,
    pub validations_rejected: u64,
    pub patches_authorized: u64,
    pub patches_rejected: u64,
}

impl MetricsSnapshot {
    pub fn total_requests(&self) -> u64 {
        self.validations_accepted + self.validations_rejected + self.patches_authorized + self.patches_rejected
    }
}
