//! # Ports Module
//!
//! Hexagonal architecture ports: the inbound API traits driven by callers
//! and the outbound traits for transports and the destination receiver.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
