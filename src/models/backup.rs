//! Application snapshot and backup index models.

use serde::{Deserialize, Serialize};

use super::{AdminData, CommissionDetail, CommissionSummary};

/// The entire application state, as exported to JSON and stored in backup
/// snapshots. Matches the frontend ApplicationData shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationData {
    pub commissions: Vec<CommissionSummary>,
    pub commission_details: Vec<CommissionDetail>,
    /// Missing admin data in an imported snapshot falls back to the seed.
    #[serde(default)]
    pub admin_data: Option<AdminData>,
}

/// Index entry for one stored snapshot, addressed by creation timestamp
/// (milliseconds). The snapshot blob itself is stored separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRecord {
    pub timestamp: i64,
    pub description: String,
}

/// Request body for creating a backup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBackupRequest {
    /// Optional label; defaults to the localized creation timestamp.
    #[serde(default)]
    pub description: Option<String>,
}
