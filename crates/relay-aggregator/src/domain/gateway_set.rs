//! # Gateway Set & Threshold
//!
//! Registry of the M active transport gateways and the quorum size N.
//! Gateways are unordered; only set membership matters.
//!
//! Invariant once configured: `1 <= threshold <= |gateways|`. Every mutation
//! that would break it is rejected.

use crate::error::{AggregatorError, AggregatorResult};
use relay_types::GatewayId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The active gateway set and its quorum threshold.
///
/// A freshly created set has no members and a threshold of zero, meaning
/// quorum is unreachable until the deployment is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySet {
    members: BTreeSet<GatewayId>,
    threshold: usize,
}

impl GatewaySet {
    /// Create an empty, unconfigured set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a gateway to the active set.
    pub fn add(&mut self, gateway: GatewayId) -> AggregatorResult<()> {
        if !self.members.insert(gateway.clone()) {
            return Err(AggregatorError::GatewayAlreadyRegistered { gateway });
        }
        Ok(())
    }

    /// Remove a gateway from the active set.
    ///
    /// Rejected if the gateway is unknown or if removal would leave fewer
    /// members than the current threshold.
    pub fn remove(&mut self, gateway: &GatewayId) -> AggregatorResult<()> {
        if !self.members.contains(gateway) {
            return Err(AggregatorError::GatewayNotRegistered {
                gateway: gateway.clone(),
            });
        }
        let remaining = self.members.len() - 1;
        if remaining < self.threshold {
            return Err(AggregatorError::ThresholdViolation {
                gateways: remaining,
                threshold: self.threshold,
            });
        }
        self.members.remove(gateway);
        Ok(())
    }

    /// Set the quorum threshold N.
    ///
    /// Rejected when `n == 0` or `n > |gateways|`.
    pub fn set_threshold(&mut self, threshold: usize) -> AggregatorResult<()> {
        if threshold == 0 || threshold > self.members.len() {
            return Err(AggregatorError::InvalidThreshold {
                requested: threshold,
                gateways: self.members.len(),
            });
        }
        self.threshold = threshold;
        Ok(())
    }

    /// Check set membership.
    #[must_use]
    pub fn contains(&self, gateway: &GatewayId) -> bool {
        self.members.contains(gateway)
    }

    /// Number of active gateways (M).
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when no gateway is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Current quorum threshold (N); zero while unconfigured.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// The member ids, in stable order.
    #[must_use]
    pub fn members(&self) -> Vec<GatewayId> {
        self.members.iter().cloned().collect()
    }

    /// Whether `confirmations` distinct gateways satisfy the quorum.
    ///
    /// An unconfigured set (threshold zero) never reaches quorum.
    #[must_use]
    pub fn quorum_met(&self, confirmations: usize) -> bool {
        self.threshold > 0 && confirmations >= self.threshold
    }
}
