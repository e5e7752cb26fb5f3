//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};

use numstream_store::StoreConfig;
use numstream_stream::EngineConfig;

/// Port the server listens on by default.
pub const DEFAULT_PORT: u16 = 50051;

/// Configuration for a [`NumberServer`](crate::NumberServer).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub addr: SocketAddr,
    /// Emission cadence and count cap.
    pub engine: EngineConfig,
    /// Session expiry.
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            engine: EngineConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.to_string(), "127.0.0.1:50051");
        assert_eq!(config.engine.emit_interval, Duration::from_secs(1));
        assert_eq!(config.engine.max_count, 65535);
        assert_eq!(config.store.inactivity_timeout, Duration::from_secs(30));
    }
}
