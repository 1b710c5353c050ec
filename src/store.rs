use std::time::{Duration, Instant};

use log::{debug, info, warn};
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::StoreConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store connection error: {0}")]
    ConnectionError(#[from] redis::RedisError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Represents an established connection to the durable key-value store
#[derive(Clone)]
pub struct Store {
    manager: ConnectionManager,
}

/// Store health status
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreHealthStatus {
    Healthy,
    Unhealthy,
}

/// Complete store health check result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreHealth {
    pub status: StoreHealthStatus,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Store {
    /// Create a new store connection from configuration
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        info!("Initializing key-value store connection");
        debug!(
            "Store configuration: timeout={}s",
            config.connect_timeout_seconds
        );

        let client = redis::Client::open(config.url.as_str())?;

        // The connection manager reconnects on its own after transient drops
        let manager_config = ConnectionManagerConfig::new()
            .set_connection_timeout(Duration::from_secs(config.connect_timeout_seconds));

        let manager = ConnectionManager::new_with_config(client, manager_config)
            .await
            .map_err(|e| {
                warn!("Failed to connect to key-value store: {}", e);
                StoreError::ConnectionError(e)
            })?;

        info!("Successfully connected to key-value store");

        Ok(Self { manager })
    }

    /// Get a handle to the managed connection (cheap clone)
    pub fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Check if the store connection is healthy
    pub async fn health_check(&self) -> StoreHealth {
        // Measure round-trip time of a PING
        let start = Instant::now();

        let mut conn = self.connection();
        let result: Result<String, redis::RedisError> =
            redis::cmd("PING").query_async(&mut conn).await;

        let elapsed = start.elapsed();

        match result {
            Ok(_) => StoreHealth {
                status: StoreHealthStatus::Healthy,
                response_time_ms: elapsed.as_millis() as u64,
                message: None,
            },
            Err(e) => StoreHealth {
                status: StoreHealthStatus::Unhealthy,
                response_time_ms: elapsed.as_millis() as u64,
                message: Some(format!("Store ping failed: {}", e)),
            },
        }
    }
}
