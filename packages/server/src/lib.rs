//! Real-time push server library.
//!
//! Delivers text messages to WebSocket sessions addressed by a logical client
//! identifier. Any instance can originate a message for any identifier: the
//! message is relayed through a shared pub/sub bus and every instance
//! delivers it to the sessions it holds locally.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod bootstrap;
pub mod config;
