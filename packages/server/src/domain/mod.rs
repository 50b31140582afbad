//! Domain layer: sessions, the relay envelope and the interfaces
//! (registry, bus) that the infrastructure layer implements.

mod bus;
mod envelope;
mod error;
mod model;
mod repository;

pub use bus::{BusStream, MessageBus};
#[cfg(test)]
pub use bus::MockMessageBus;
pub use envelope::RelayEnvelope;
pub use error::{BusError, EnvelopeError, RepositoryError, SendError};
pub use model::{ClientId, PusherChannel, Session, SessionId, SessionState, Timestamp};
pub use repository::{ConnectionCounts, ConnectionRepository};
