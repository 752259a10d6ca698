use serde::Deserialize;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::OnceLock;
use thiserror::Error;

/// Port used when `SERVER_PORT` is not set.
pub const DEFAULT_PORT: u16 = 5000;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Configured host is not an IP address.
    #[error("Invalid server host: {0}")]
    InvalidHost(String),
    /// Configuration was installed twice.
    #[error("Configuration already initialized")]
    AlreadyInitialized,
}

/// Runtime configuration for the user registry server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Interface the HTTP server binds to.
    pub server_host: String,
    /// TCP port the HTTP server binds to.
    pub server_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: Ipv4Addr::UNSPECIFIED.to_string(),
            server_port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            server_host: load_env_optional("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?
                .unwrap_or(defaults.server_port),
        })
    }

    /// Apply command-line overrides on top of the loaded values.
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.server_host = host;
        }
        if let Some(port) = port {
            self.server_port = port;
        }
        self
    }

    /// Socket address the server should listen on.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .server_host
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server_host.clone()))?;
        Ok(SocketAddr::new(ip, self.server_port))
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, if [`init_config`] has run.
pub fn get_config() -> Option<&'static Config> {
    CONFIG.get()
}

/// Load configuration from `.env` and the environment, apply overrides, and cache it.
pub fn init_config(
    host: Option<String>,
    port: Option<u16>,
) -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?.with_overrides(host, port);
    tracing::debug!(
        server_host = %config.server_host,
        server_port = config.server_port,
        "Loaded configuration"
    );
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    CONFIG.get().ok_or(ConfigError::AlreadyInitialized)
}
