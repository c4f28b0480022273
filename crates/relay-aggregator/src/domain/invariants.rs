//! # Domain Invariants
//!
//! Checks the structural invariants the aggregator must preserve across
//! every state transition. The service debug-asserts these after
//! mutations; tests assert them directly.

use super::gateway_set::GatewaySet;
use super::tracker::ReceptionTracker;
use thiserror::Error;

/// A violated domain invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Threshold configured outside `1..=|gateways|`.
    #[error("Threshold {threshold} unreachable with {gateways} gateways")]
    ThresholdUnreachable {
        /// Configured threshold.
        threshold: usize,
        /// Active gateway count.
        gateways: usize,
    },

    /// A tracker is marked executed with fewer confirmations than quorum.
    #[error("Executed with {confirmations} confirmations, threshold {threshold}")]
    PrematureExecution {
        /// Recorded confirmations.
        confirmations: usize,
        /// Quorum threshold.
        threshold: usize,
    },
}

/// Threshold is either unconfigured (zero) or within `1..=|gateways|`.
#[must_use]
pub fn invariant_threshold_reachable(gateways: &GatewaySet) -> bool {
    gateways.threshold() == 0 || gateways.threshold() <= gateways.len()
}

/// No tracker may be executed below quorum.
///
/// Holds for the current threshold; an admin lowering N after execution
/// does not retroactively violate it because the check is monotone in N.
#[must_use]
pub fn invariant_no_premature_execution(tracker: &ReceptionTracker, threshold: usize) -> bool {
    !tracker.executed() || (threshold > 0 && tracker.count_received() >= threshold)
}

/// Check every structural invariant over the gateway set and trackers.
pub fn check_invariants<'a>(
    gateways: &GatewaySet,
    trackers: impl Iterator<Item = &'a ReceptionTracker>,
) -> Result<(), InvariantViolation> {
    if !invariant_threshold_reachable(gateways) {
        return Err(InvariantViolation::ThresholdUnreachable {
            threshold: gateways.threshold(),
            gateways: gateways.len(),
        });
    }
    for tracker in trackers {
        if !invariant_no_premature_execution(tracker, gateways.threshold()) {
            return Err(InvariantViolation::PrematureExecution {
                confirmations: tracker.count_received(),
                threshold: gateways.threshold(),
            });
        }
    }
    Ok(())
}
