//! # Relay Types
//!
//! Shared domain types for the quorum-relay workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Tagged Identities**: Chain-qualified identities are structured values
//!   (`ChainRef`, `InteropAddress`); CAIP-2 / CAIP-10 strings exist only at
//!   the wire boundary.
//! - **Deterministic Codec**: The wire envelope and message-id derivation use
//!   an explicit length-prefixed byte layout so ids are stable across
//!   versions and implementations.

pub mod envelope;
pub mod errors;
pub mod identity;
pub mod message;

pub use envelope::Envelope;
pub use errors::RelayTypesError;
pub use identity::{hash_hex, ChainRef, GatewayId, Hash, InteropAddress, OperatorId};
pub use message::{message_id, outbox_id, Message};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
