//! Infrastructure layer: concrete registry, bus and relay implementations.

pub mod bus;
pub mod dto;
pub mod relay;
pub mod repository;
