// src/models/cooldown.rs - Pure data structures
use serde::{Deserialize, Serialize};

/// Cooldown state reported for a single visitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownStatus {
    /// Whether the visitor is currently barred from submitting again
    pub active: bool,

    /// Whole minutes until the window reopens (rounded up), 0 when inactive
    pub retry_after: u64,
}

impl CooldownStatus {
    /// Status for a visitor with no live cooldown record
    pub fn inactive() -> Self {
        Self {
            active: false,
            retry_after: 0,
        }
    }
}
