use redis::RedisError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Store connection or command errors
    #[error("Store error: {0}")]
    Store(#[from] RedisError),
}
