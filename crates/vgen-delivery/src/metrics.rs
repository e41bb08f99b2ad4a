//! Delivery metrics.

use metrics::counter;

pub mod names {
    /// Delivery attempts by classified reason.
    pub const DELIVERY_TOTAL: &str = "vgen_delivery_total";
}

pub fn record_delivery(reason: &str) {
    counter!(
        names::DELIVERY_TOTAL,
        "reason" => reason.to_string()
    )
    .increment(1);
}
