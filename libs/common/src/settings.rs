//! Service settings loaded through the `config` crate
//!
//! Each binary reads its listen address and log level from built-in
//! defaults overridden by `<PREFIX>_*` environment variables.

use serde::Deserialize;
use std::net::SocketAddr;

/// Listen address and logging settings for one service
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSettings {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl ServiceSettings {
    /// Load settings for the service identified by `prefix`
    ///
    /// # Environment Variables
    /// - `<PREFIX>_HOST`: bind host (default: "0.0.0.0")
    /// - `<PREFIX>_PORT`: bind port (default: `default_port`)
    /// - `<PREFIX>_LOG_LEVEL`: tracing filter directive (default: "info")
    pub fn load(prefix: &str, default_port: u16) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", i64::from(default_port))?
            .set_default("log_level", "info")?
            .add_source(config::Environment::with_prefix(prefix).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
