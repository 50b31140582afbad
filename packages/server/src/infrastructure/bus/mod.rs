//! Pub/sub bus implementations.
//!
//! - `memory`: in-process `tokio::sync::broadcast` bus (single node, tests)
//! - `redis`: Redis PUBLISH / SUBSCRIBE (multi-instance deployments)

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::InMemoryMessageBus;
#[cfg(feature = "redis")]
pub use self::redis::RedisMessageBus;
