//! Metric helpers for `defrag`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the counter tracking datagrams pulled from the packet source.
pub const DATAGRAMS_RECEIVED: &str = "defrag_datagrams_received_total";
/// Name of the counter tracking discarded datagrams, labelled by `kind`.
pub const DATAGRAMS_REJECTED: &str = "defrag_datagrams_rejected_total";
/// Name of the counter tracking frames handed to the reader.
pub const FRAMES_DELIVERED: &str = "defrag_frames_delivered_total";
/// Name of the gauge tracking frames buffered in the fragment cache.
pub const FRAMES_PENDING: &str = "defrag_frames_pending";

/// Record a datagram received from the source.
pub fn inc_datagrams() {
    #[cfg(feature = "metrics")]
    counter!(DATAGRAMS_RECEIVED).increment(1);
}

/// Record a rejected datagram of the given kind.
pub fn inc_rejected(kind: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(DATAGRAMS_REJECTED, "kind" => kind).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Record a delivered frame.
pub fn inc_delivered() {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_DELIVERED).increment(1);
}

/// Publish the number of frames currently buffered.
#[cfg_attr(
    feature = "metrics",
    expect(
        clippy::cast_precision_loss,
        reason = "gauge values are f64; pending counts stay far below 2^52"
    )
)]
pub fn set_pending(pending: usize) {
    #[cfg(feature = "metrics")]
    gauge!(FRAMES_PENDING).set(pending as f64);
    #[cfg(not(feature = "metrics"))]
    let _ = pending;
}
