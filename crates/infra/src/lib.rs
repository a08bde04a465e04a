//! Infrastructure layer: user storage backends and configuration.

pub mod config;
pub mod store;

pub use config::{ConfigError, StoreBackend, StoreConfig};
pub use store::{connect, parse_id, InMemoryUserStore, PostgresUserStore, StoreError, StoreResult, UserStore};
