//! Server configuration values and parsing helpers.

use std::fmt::{Display, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8000";
pub const DEFAULT_DB_PATH: &str = "daybook.sqlite3";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub db_path: PathBuf,
    pub cors_origin: String,
    /// Serve requests without a bearer token as the dev user.
    pub allow_anonymous: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            allow_anonymous: true,
        }
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidListen(String),
    InvalidCorsOrigin(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidListen(value) => write!(
                f,
                "invalid listen address `{value}`; expected ip:port, ip or localhost:port"
            ),
            Self::InvalidCorsOrigin(value) => write!(f, "invalid CORS origin `{value}`"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parses `ip:port`, a bare `ip` (default port) or `localhost:port`.
pub fn parse_listen(input: &str) -> Result<SocketAddr, ConfigError> {
    let input = input.trim();
    if let Ok(addr) = input.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = input.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }
    if let Some((host, port)) = input.rsplit_once(':') {
        if host.eq_ignore_ascii_case("localhost") {
            let port = port
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidListen(input.to_string()))?;
            return Ok(SocketAddr::from(([127, 0, 0, 1], port)));
        }
    }
    Err(ConfigError::InvalidListen(input.to_string()))
}
