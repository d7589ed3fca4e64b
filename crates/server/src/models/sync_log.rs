//! Sync audit log domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storepulse_core::{StoreId, SyncEntity, SyncLogId, SyncStatus};

/// One entry in the append-only sync audit log.
///
/// Written exactly once per sync run; never updated or deleted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLog {
    /// Unique log entry ID.
    pub id: SyncLogId,
    /// Store the sync run was for.
    pub store_id: StoreId,
    /// Which entity kind the run covered.
    pub entity: SyncEntity,
    /// Outcome of the run.
    pub status: SyncStatus,
    /// Human-readable outcome message.
    pub message: String,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}
