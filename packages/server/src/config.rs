//! Server configuration.

use std::time::Duration;

use crate::infrastructure::relay::DEFAULT_CHANNEL;

/// Default idle timeout for silent sessions (10 minutes).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to (e.g., "127.0.0.1")
    pub host: String,
    /// Port number to bind to (e.g., 8080)
    pub port: u16,
    /// Redis URL of the shared bus. `None` runs a single instance on an
    /// in-process bus.
    pub redis_url: Option<String>,
    /// Bus channel shared by all instances
    pub channel: String,
    /// Sessions silent for this long are closed
    pub idle_timeout: Duration,
}

impl ServerConfig {
    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            redis_url: None,
            channel: DEFAULT_CHANNEL.to_string(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}
