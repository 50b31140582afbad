//! Cross-instance relay.
//!
//! ```text
//!  publish(id, msg)                       every instance
//!  ┌──────────────┐    bus channel    ┌─────────────────┐   ┌─────────────────┐
//!  │RelayPublisher│ ────────────────► │ RelaySubscriber │──►│ LocalDispatcher │──► sessions
//!  └──────────────┘                   └─────────────────┘   └─────────────────┘
//! ```
//!
//! The publisher never delivers locally: the publishing instance receives its
//! own message back through its subscription, so local and remote delivery
//! share one path. The subscriber must never publish what it receives,
//! otherwise every message would bounce between instances forever.

mod dispatcher;
mod error;
mod publisher;
mod subscriber;

pub use dispatcher::{DeliveryReport, LocalDispatcher};
pub use error::RelayError;
pub use publisher::RelayPublisher;
pub use subscriber::{RelaySubscriber, RelaySubscriberHandle};

/// Channel shared by every instance's publisher and subscriber.
pub const DEFAULT_CHANNEL: &str = "onMessage";
