//! Metric helpers for `amqp-ingress`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. With the
//! `metrics` feature disabled the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking deliveries handed to the broker.
pub const DELIVERIES_SETTLED: &str = "amqp_ingress_deliveries_settled_total";
/// Name of the counter tracking deliveries rejected by the context.
pub const DELIVERIES_REJECTED: &str = "amqp_ingress_deliveries_rejected_total";
/// Name of the counter tracking credit top-ups placed on the wire.
pub const CREDIT_TOPUPS: &str = "amqp_ingress_credit_topups_total";

/// Record a delivery handed to the broker.
pub fn inc_settled() {
    #[cfg(feature = "metrics")]
    counter!(DELIVERIES_SETTLED).increment(1);
}

/// Record a delivery settled with a `Rejected` outcome.
pub fn inc_rejected() {
    #[cfg(feature = "metrics")]
    counter!(DELIVERIES_REJECTED).increment(1);
}

/// Record a credit replenishment that produced a wire flow frame.
pub fn inc_credit_topups() {
    #[cfg(feature = "metrics")]
    counter!(CREDIT_TOPUPS).increment(1);
}
