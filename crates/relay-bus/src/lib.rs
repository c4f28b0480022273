//! # Relay Bus - Observable Protocol Events
//!
//! In-memory broadcast bus carrying every externally observable transition
//! of the aggregator: posted messages, per-gateway receptions, execution
//! outcomes, and administrative mutations.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Aggregator  │                    │  Observer /  │
//! │   service    │    publish()       │    test      │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Off-chain observers use `MessagePosted` as their stable correlation
//! anchor on the source side and `MessageReceived` / `ExecutionSuccess` /
//! `ExecutionFailed` on the destination side.

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, RelayEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
