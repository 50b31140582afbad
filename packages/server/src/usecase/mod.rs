//! UseCase layer: application operations on top of the registry and relay.

mod broadcast_client_message;
mod connect_session;
mod disconnect_session;
mod error;
mod get_connection_stats;
mod publish_message;

pub use broadcast_client_message::BroadcastClientMessageUseCase;
pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::{DisconnectReason, DisconnectSessionUseCase};
pub use error::ConnectError;
pub use get_connection_stats::{ClientStats, GetConnectionStatsUseCase};
pub use publish_message::PublishMessageUseCase;
