use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::errors::AppError;
use crate::store::{Store, StoreHealth};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub store_health: Option<StoreHealth>,
    pub uptime_seconds: u64,
}

// Define an AppState struct to hold shared application state
pub struct AppState {
    pub start_time: Instant,
    pub store: Store,
    pub version: String,
}
