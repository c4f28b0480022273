//! # Chain-Qualified Identities
//!
//! Structured forms of the CAIP-2 chain identifier and CAIP-10 account
//! identifier, plus the opaque handles used for gateways and operators.
//!
//! The string forms (`"eip155:1"`, `"eip155:1:0xabc..."`) are strictly a
//! wire-boundary concern; everything inside the workspace manipulates the
//! tagged values.

use crate::errors::RelayTypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 32-byte hash (Keccak-256).
pub type Hash = [u8; 32];

/// CAIP-2 chain identifier: `"namespace:reference"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainRef {
    /// Chain namespace (e.g. `eip155`).
    pub namespace: String,
    /// Chain reference within the namespace (e.g. `1` for Ethereum mainnet).
    pub reference: String,
}

impl ChainRef {
    /// Create a chain reference from its parts.
    ///
    /// Fails if either part is empty or contains the `:` separator.
    pub fn new(
        namespace: impl Into<String>,
        reference: impl Into<String>,
    ) -> Result<Self, RelayTypesError> {
        let namespace = namespace.into();
        let reference = reference.into();
        if namespace.is_empty()
            || reference.is_empty()
            || namespace.contains(':')
            || reference.contains(':')
        {
            return Err(RelayTypesError::InvalidChainRef {
                value: format!("{namespace}:{reference}"),
            });
        }
        Ok(Self {
            namespace,
            reference,
        })
    }
}

impl fmt::Display for ChainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

impl FromStr for ChainRef {
    type Err = RelayTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((namespace, reference)) => Self::new(namespace, reference),
            None => Err(RelayTypesError::InvalidChainRef {
                value: s.to_string(),
            }),
        }
    }
}

/// CAIP-10 chain-qualified account: `"namespace:reference:account"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InteropAddress {
    /// Chain the account lives on.
    pub chain: ChainRef,
    /// Account identity within that chain (opaque, chain-specific format).
    pub account: String,
}

impl InteropAddress {
    /// Create a chain-qualified account.
    ///
    /// The account part must be non-empty; its internal format is opaque.
    pub fn new(chain: ChainRef, account: impl Into<String>) -> Result<Self, RelayTypesError> {
        let account = account.into();
        if account.is_empty() {
            return Err(RelayTypesError::InvalidInteropAddress {
                value: format!("{chain}:"),
            });
        }
        Ok(Self { chain, account })
    }
}

impl fmt::Display for InteropAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.account)
    }
}

impl FromStr for InteropAddress {
    type Err = RelayTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // namespace : reference : account (account may itself contain colons)
        let (namespace, rest) = s.split_once(':').ok_or_else(|| {
            RelayTypesError::InvalidInteropAddress {
                value: s.to_string(),
            }
        })?;
        let (reference, account) = rest.split_once(':').ok_or_else(|| {
            RelayTypesError::InvalidInteropAddress {
                value: s.to_string(),
            }
        })?;
        let chain =
            ChainRef::new(namespace, reference).map_err(|_| RelayTypesError::InvalidInteropAddress {
                value: s.to_string(),
            })?;
        Self::new(chain, account).map_err(|_| RelayTypesError::InvalidInteropAddress {
            value: s.to_string(),
        })
    }
}

/// Opaque identity of a transport gateway.
///
/// Gateways are members of an unordered active set; the id is whatever the
/// deployment uses to name the adapter (e.g. `"axelar"`, `"layerzero"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GatewayId(pub String);

impl GatewayId {
    /// Create a gateway id from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for GatewayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of an administrative caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorId(pub String);

impl OperatorId {
    /// Create an operator id from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex-encode a hash for display and logging.
pub fn hash_hex(hash: &Hash) -> String {
    hex::encode(hash)
}
