//! Data Transfer Objects (DTOs) for the HTTP API.
//!
//! The WebSocket protocol carries plain text frames and needs no DTO. The
//! relay wire format is `domain::RelayEnvelope`.

pub mod conversion;
pub mod http;
