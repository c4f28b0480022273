//! Adapter implementations of the outbound ports.

pub mod loopback;

pub use loopback::LoopbackGateway;
