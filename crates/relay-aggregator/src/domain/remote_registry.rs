//! # Remote Registry
//!
//! Write-once mapping from a chain to the peer aggregator instance trusted
//! on that chain. Bindings are immutable once set so a compromised admin key
//! cannot silently redirect trust after the fact.

use crate::error::{AggregatorError, AggregatorResult};
use relay_types::{ChainRef, InteropAddress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chain-to-peer-aggregator bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRegistry {
    bindings: BTreeMap<ChainRef, InteropAddress>,
}

impl RemoteRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a remote aggregator for a chain. Write-once per chain.
    pub fn register(
        &mut self,
        chain: ChainRef,
        aggregator: InteropAddress,
    ) -> AggregatorResult<()> {
        if self.bindings.contains_key(&chain) {
            return Err(AggregatorError::RemoteAlreadyRegistered { chain });
        }
        self.bindings.insert(chain, aggregator);
        Ok(())
    }

    /// Get the registered remote aggregator for a chain.
    pub fn get(&self, chain: &ChainRef) -> AggregatorResult<&InteropAddress> {
        self.bindings
            .get(chain)
            .ok_or_else(|| AggregatorError::UnknownChain {
                chain: chain.clone(),
            })
    }

    /// True when the chain has a binding.
    #[must_use]
    pub fn contains(&self, chain: &ChainRef) -> bool {
        self.bindings.contains_key(chain)
    }

    /// Number of registered chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when no chain is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
