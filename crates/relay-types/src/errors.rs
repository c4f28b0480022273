//! Error types for the shared relay types.

use thiserror::Error;

/// Errors produced while parsing identities or decoding wire bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayTypesError {
    /// Not a valid CAIP-2 `"namespace:reference"` string.
    #[error("Invalid chain reference: {value:?}")]
    InvalidChainRef {
        /// The rejected input.
        value: String,
    },

    /// Not a valid CAIP-10 `"namespace:reference:account"` string.
    #[error("Invalid interop address: {value:?}")]
    InvalidInteropAddress {
        /// The rejected input.
        value: String,
    },

    /// Wire envelope bytes are truncated, carry trailing data, or contain
    /// non-UTF-8 identity fields.
    #[error("Malformed envelope: {reason}")]
    MalformedEnvelope {
        /// What the decoder rejected.
        reason: String,
    },
}
