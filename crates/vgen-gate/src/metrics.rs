//! Gate metrics.

use metrics::counter;

pub mod names {
    /// Admissions that had to wait for a permit.
    pub const QUEUED_TOTAL: &str = "vgen_gate_queued_total";

    /// Requests rejected by the sliding window.
    pub const RATE_LIMITED_TOTAL: &str = "vgen_rate_limited_total";
}

pub fn record_queued() {
    counter!(names::QUEUED_TOTAL).increment(1);
}

pub fn record_rate_limited() {
    counter!(names::RATE_LIMITED_TOTAL).increment(1);
}
