//! Shared utilities for Dengon packages.

pub mod logger;
pub mod time;
