use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value for {name}: '{value}'")]
    InvalidVar { name: &'static str, value: String },
}

/// Server settings. Every field has a default; [`Config::from_env`]
/// overrides them from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub rate_limit_max: usize,
    pub rate_limit_window: Duration,
    /// CSV request log. `None` disables the file sink.
    pub log_file: Option<PathBuf>,
    pub public_dir: PathBuf,
    /// Directory of the persistence mirror. `None` runs memory-only.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 10_000,
            rate_limit_max: 20,
            rate_limit_window: Duration::from_secs(60),
            log_file: Some(PathBuf::from("./logs/log.csv")),
            public_dir: PathBuf::from("public"),
            data_dir: None,
        }
    }
}

impl Config {
    pub const PORT: &'static str = "PORT";
    pub const HOST: &'static str = "DECKHOUSE_HOST";
    pub const RATE_LIMIT_MAX: &'static str = "DECKHOUSE_RATE_LIMIT_MAX";
    pub const RATE_LIMIT_WINDOW_SECS: &'static str = "DECKHOUSE_RATE_LIMIT_WINDOW_SECS";
    pub const LOG_FILE: &'static str = "DECKHOUSE_LOG_FILE";
    pub const PUBLIC_DIR: &'static str = "DECKHOUSE_PUBLIC_DIR";
    pub const DATA_DIR: &'static str = "DECKHOUSE_DATA_DIR";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup(Self::PORT) {
            cfg.port = parse_var(Self::PORT, &v)?;
        }
        if let Some(v) = lookup(Self::HOST) {
            cfg.host = parse_var(Self::HOST, &v)?;
        }
        if let Some(v) = lookup(Self::RATE_LIMIT_MAX) {
            cfg.rate_limit_max = parse_var(Self::RATE_LIMIT_MAX, &v)?;
        }
        if let Some(v) = lookup(Self::RATE_LIMIT_WINDOW_SECS) {
            cfg.rate_limit_window =
                Duration::from_secs(parse_var(Self::RATE_LIMIT_WINDOW_SECS, &v)?);
        }
        if let Some(v) = lookup(Self::LOG_FILE) {
            cfg.log_file = (!v.is_empty()).then(|| PathBuf::from(v));
        }
        if let Some(v) = lookup(Self::PUBLIC_DIR) {
            cfg.public_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(Self::DATA_DIR) {
            cfg.data_dir = (!v.is_empty()).then(|| PathBuf::from(v));
        }
        Ok(cfg)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidVar { name, value: value.to_string() })
}
