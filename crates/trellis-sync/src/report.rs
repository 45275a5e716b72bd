//! Sync outcome reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What one sync pass did. Serializable, so embedders can log or ship it
/// as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// Commands linked into the target, in batch order.
    pub synced: Vec<String>,
    /// Names the host refused, commands and aliases alike.
    pub refused: Vec<String>,
    /// Node names unlinked from the target before relinking.
    pub removed: Vec<String>,
    /// When the pass started.
    pub timestamp: DateTime<Utc>,
}

impl SyncReport {
    pub fn new() -> Self {
        Self {
            synced: Vec::new(),
            refused: Vec::new(),
            removed: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// True when the host vetoed nothing.
    pub fn is_clean(&self) -> bool {
        self.refused.is_empty()
    }
}

impl Default for SyncReport {
    fn default() -> Self {
        Self::new()
    }
}
