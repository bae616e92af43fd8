//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::health::DEFAULT_PROBE_URL;
use crate::status::DEFAULT_LIGHTHOUSE_ID;

/// Default listening port
pub const DEFAULT_PORT: u16 = 9876;

/// Greeting written once to every new listener
pub const DEFAULT_WELCOME_MESSAGE: &str =
    "Welcome to PUBLIC LIGHTHOUSE BEACON!\nYou are now receiving live lighthouse data\n\n";

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Listen backlog
    pub backlog: u32,

    /// Enable TCP_NODELAY on accepted sockets
    pub tcp_nodelay: bool,

    /// Identifier advertised in every status block
    pub lighthouse_id: String,

    /// Greeting sent once on connect
    pub welcome_message: String,

    /// Interval between status broadcasts
    pub broadcast_interval: Duration,

    /// Interval between health probes
    pub health_interval: Duration,

    /// URL probed by the health monitor
    pub probe_url: String,

    /// Upper bound on a single health probe
    pub probe_timeout: Duration,

    /// A write to one listener that takes longer than this drops the listener
    pub write_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            backlog: 50,
            tcp_nodelay: true,
            lighthouse_id: DEFAULT_LIGHTHOUSE_ID.to_string(),
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            broadcast_interval: Duration::from_secs(5),
            health_interval: Duration::from_secs(10),
            probe_url: DEFAULT_PROBE_URL.to_string(),
            probe_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(2),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the listen backlog (at least 1)
    pub fn backlog(mut self, backlog: u32) -> Self {
        self.backlog = backlog.max(1);
        self
    }

    /// Set the advertised lighthouse identifier
    pub fn lighthouse_id(mut self, id: impl Into<String>) -> Self {
        self.lighthouse_id = id.into();
        self
    }

    /// Set the welcome message
    pub fn welcome_message(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = message.into();
        self
    }

    /// Set the broadcast interval
    pub fn broadcast_interval(mut self, interval: Duration) -> Self {
        self.broadcast_interval = interval;
        self
    }

    /// Set the health probe interval
    pub fn health_interval(mut self, interval: Duration) -> Self {
        self.health_interval = interval;
        self
    }

    /// Set the probed URL
    pub fn probe_url(mut self, url: impl Into<String>) -> Self {
        self.probe_url = url.into();
        self
    }

    /// Set the probe timeout
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the per-listener write timeout
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 9876);
        assert!(config.bind_addr.ip().is_unspecified());
        assert_eq!(config.backlog, 50);
        assert!(config.tcp_nodelay);
        assert_eq!(config.lighthouse_id, "public-lighthouse-001");
        assert_eq!(config.broadcast_interval, Duration::from_secs(5));
        assert_eq!(config.health_interval, Duration::from_secs(10));
        assert_eq!(config.probe_timeout, Duration::from_secs(10));
        assert_eq!(config.probe_url, "http://httpbin.org/ip");
    }

    #[test]
    fn test_welcome_ends_with_blank_line() {
        assert!(ServerConfig::default().welcome_message.ends_with("\n\n"));
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9877".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr.port(), 9877);
    }

    #[test]
    fn test_builder_backlog_floor() {
        let config = ServerConfig::default().backlog(0);

        assert_eq!(config.backlog, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .backlog(128)
            .lighthouse_id("lh-eu-1")
            .welcome_message("hi\n\n")
            .broadcast_interval(Duration::from_secs(1))
            .health_interval(Duration::from_secs(2))
            .probe_url("http://127.0.0.1:8080/health")
            .probe_timeout(Duration::from_millis(500))
            .write_timeout(Duration::from_millis(250));

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.backlog, 128);
        assert_eq!(config.lighthouse_id, "lh-eu-1");
        assert_eq!(config.welcome_message, "hi\n\n");
        assert_eq!(config.broadcast_interval, Duration::from_secs(1));
        assert_eq!(config.health_interval, Duration::from_secs(2));
        assert_eq!(config.probe_url, "http://127.0.0.1:8080/health");
        assert_eq!(config.probe_timeout, Duration::from_millis(500));
        assert_eq!(config.write_timeout, Duration::from_millis(250));
    }
}
