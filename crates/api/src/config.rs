//! Process configuration for the API binary.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use userbase_infra::{ConfigError, StoreConfig};

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `BIND_ADDR` (full socket address) wins over `PORT`, which binds on
    /// all interfaces.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = match (lookup("BIND_ADDR"), lookup("PORT")) {
            (Some(addr), _) => addr
                .trim()
                .parse::<SocketAddr>()
                .map_err(|_| ConfigError::Invalid { key: "BIND_ADDR", value: addr })?,
            (None, Some(port)) => {
                let port = port
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::Invalid { key: "PORT", value: port })?;
                SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)
            }
            (None, None) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
        };

        Ok(Self {
            bind_addr,
            store: StoreConfig::from_lookup(&lookup)?,
        })
    }
}
