// src/repositories/cooldown.rs - Data access
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::errors::RepositoryError;
use crate::store::Store;

type Result<T> = std::result::Result<T, RepositoryError>;

const COOLDOWN_KEY_PREFIX: &str = "cooldown:";

// Lookup key for a visitor's cooldown record
fn cooldown_key(sid: &str) -> String {
    format!("{}{}", COOLDOWN_KEY_PREFIX, sid)
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CooldownRepositoryTrait {
    /// Reads the visitor's last-submission record
    ///
    /// ### Arguments
    /// * `sid` - The opaque visitor identifier the record is keyed by
    ///
    /// ### Returns
    /// * `Result<Option<String>>` - The raw stored timestamp (milliseconds
    ///   since epoch, decimal string) if a record exists, or `None` when the
    ///   visitor never submitted or the record expired
    ///
    /// ### Errors
    /// * `RepositoryError::Store` - If a store error occurs
    async fn find_last_submission(&self, sid: &str) -> Result<Option<String>>;

    /// Writes the visitor's last-submission timestamp
    ///
    /// Overwrites any previous record and resets its time-to-live; records
    /// are never deleted explicitly, the store prunes them on expiry.
    ///
    /// ### Arguments
    /// * `sid` - The opaque visitor identifier to key the record by
    /// * `ts_ms` - Submission instant, milliseconds since epoch
    /// * `retention` - Time-to-live applied to the record
    ///
    /// ### Errors
    /// * `RepositoryError::Store` - If a store error occurs
    async fn record_submission(&self, sid: &str, ts_ms: i64, retention: Duration) -> Result<()>;
}

// Implementation using the actual key-value store
pub struct CooldownRepository {
    store: Store,
}

impl CooldownRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CooldownRepositoryTrait for CooldownRepository {
    async fn find_last_submission(&self, sid: &str) -> Result<Option<String>> {
        let mut conn = self.store.connection();

        let value: Option<String> = conn.get(cooldown_key(sid)).await.map_err(|e| {
            log::error!("Failed to read cooldown record: {}", e);
            RepositoryError::Store(e)
        })?;

        Ok(value)
    }

    async fn record_submission(&self, sid: &str, ts_ms: i64, retention: Duration) -> Result<()> {
        let mut conn = self.store.connection();

        let _: () = conn
            .set_ex(cooldown_key(sid), ts_ms.to_string(), retention.as_secs())
            .await
            .map_err(|e| {
                log::error!("Failed to write cooldown record: {}", e);
                RepositoryError::Store(e)
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_key_is_prefixed_with_namespace() {
        assert_eq!(cooldown_key("abc-123"), "cooldown:abc-123");
    }
}
