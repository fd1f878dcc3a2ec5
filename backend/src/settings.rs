//! Order store configuration loaded via OrthoConfig.
//!
//! Values come from `ORDERS_*` environment variables or an optional
//! configuration file, with defaults for everything except the database URL.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

/// Connection and deadline settings for the order store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ORDERS")]
pub struct OrderStoreSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Per-call deadline for order operations, in milliseconds.
    #[ortho_config(default = 5_000)]
    pub query_timeout_ms: u64,
    /// Upper bound on pooled connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Idle connections kept open.
    pub pool_min_idle: Option<u32>,
    /// Wait for a pooled connection, in milliseconds.
    #[ortho_config(default = 30_000)]
    pub pool_connection_timeout_ms: u64,
}

impl OrderStoreSettings {
    /// Deadline applied to each service call.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// Wait for a pooled connection.
    pub fn pool_connection_timeout(&self) -> Duration {
        Duration::from_millis(self.pool_connection_timeout_ms)
    }

    /// Build pool configuration for `database_url`.
    pub fn pool_config(&self, database_url: impl Into<String>) -> PoolConfig {
        PoolConfig::new(database_url)
            .with_max_size(self.pool_max_size)
            .with_min_idle(self.pool_min_idle)
            .with_connection_timeout(self.pool_connection_timeout())
    }
}
