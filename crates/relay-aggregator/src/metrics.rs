//! # Aggregator Metrics
//!
//! Prometheus metrics for monitoring relay throughput and health.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! relay-aggregator = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `relay_messages_posted_total` - Counter of messages fanned out
//! - `relay_confirmations_total` - Counter of gateway confirmations recorded
//! - `relay_executions_total` - Counter of successful executions
//! - `relay_execution_failures_total` - Counter of failed downstream executions
//! - `relay_active_gateways` - Gauge of active gateway set size (M)
//! - `relay_threshold` - Gauge of the quorum threshold (N)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_gauge, register_int_counter, Gauge, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total messages fanned out through the gateway set
    pub static ref MESSAGES_POSTED: IntCounter = register_int_counter!(
        "relay_messages_posted_total",
        "Total number of messages fanned out"
    )
    .expect("Failed to create MESSAGES_POSTED metric");

    /// Total distinct gateway confirmations recorded
    pub static ref CONFIRMATIONS: IntCounter = register_int_counter!(
        "relay_confirmations_total",
        "Total number of gateway confirmations recorded"
    )
    .expect("Failed to create CONFIRMATIONS metric");

    /// Total successful downstream executions
    pub static ref EXECUTIONS: IntCounter = register_int_counter!(
        "relay_executions_total",
        "Total number of successful executions"
    )
    .expect("Failed to create EXECUTIONS metric");

    /// Total failed downstream executions (rolled back, retryable)
    pub static ref EXECUTION_FAILURES: IntCounter = register_int_counter!(
        "relay_execution_failures_total",
        "Total number of failed downstream executions"
    )
    .expect("Failed to create EXECUTION_FAILURES metric");

    /// Active gateway set size (M)
    pub static ref ACTIVE_GATEWAYS: Gauge = register_gauge!(
        "relay_active_gateways",
        "Current number of active gateways"
    )
    .expect("Failed to create ACTIVE_GATEWAYS metric");

    /// Quorum threshold (N)
    pub static ref THRESHOLD: Gauge = register_gauge!(
        "relay_threshold",
        "Current quorum threshold"
    )
    .expect("Failed to create THRESHOLD metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a message fanned out
#[cfg(feature = "metrics")]
pub fn inc_messages_posted() {
    MESSAGES_POSTED.inc();
}

/// Record a gateway confirmation
#[cfg(feature = "metrics")]
pub fn inc_confirmations() {
    CONFIRMATIONS.inc();
}

/// Record a successful execution
#[cfg(feature = "metrics")]
pub fn inc_executions() {
    EXECUTIONS.inc();
}

/// Record a failed downstream execution
#[cfg(feature = "metrics")]
pub fn inc_execution_failures() {
    EXECUTION_FAILURES.inc();
}

/// Update the active gateway gauge
#[cfg(feature = "metrics")]
pub fn set_active_gateways(count: usize) {
    ACTIVE_GATEWAYS.set(count as f64);
}

/// Update the threshold gauge
#[cfg(feature = "metrics")]
pub fn set_threshold(threshold: usize) {
    THRESHOLD.set(threshold as f64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn inc_messages_posted() {}

#[cfg(not(feature = "metrics"))]
pub fn inc_confirmations() {}

#[cfg(not(feature = "metrics"))]
pub fn inc_executions() {}

#[cfg(not(feature = "metrics"))]
pub fn inc_execution_failures() {}

#[cfg(not(feature = "metrics"))]
pub fn set_active_gateways(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn set_threshold(_threshold: usize) {}
