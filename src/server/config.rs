//! Server Configuration

use std::time::Duration;

/// Admin listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub bind: String,

    /// Port number
    pub port: u16,

    /// Keep-alive connections with no new request for this long are closed
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8088,
            idle_timeout: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Create a new config with custom bind address
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// `bind:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
