//! Backup API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::models::{ApplicationData, BackupRecord, CreateBackupRequest};
use crate::AppState;

/// GET /api/backups - List the backup index, newest first.
pub async fn list_backups(State(state): State<AppState>) -> ApiResult<Vec<BackupRecord>> {
    let backups = state.repo.list_backups().await?;
    success(backups)
}

/// POST /api/backups - Snapshot the current store.
pub async fn create_backup(
    State(state): State<AppState>,
    Json(request): Json<CreateBackupRequest>,
) -> ApiResult<BackupRecord> {
    let record = state.repo.create_backup(request.description).await?;
    tracing::info!(timestamp = record.timestamp, "backup created");
    success(record)
}

/// POST /api/backups/{timestamp}/restore - Replace the store with a snapshot.
pub async fn restore_backup(
    State(state): State<AppState>,
    Path(timestamp): Path<i64>,
) -> ApiResult<ApplicationData> {
    let data = state.repo.restore_backup(timestamp).await?;
    tracing::info!(timestamp, "backup restored");
    success(data)
}

/// DELETE /api/backups/{timestamp} - Delete a snapshot.
pub async fn delete_backup(
    State(state): State<AppState>,
    Path(timestamp): Path<i64>,
) -> ApiResult<BackupRecord> {
    let record = state.repo.delete_backup(timestamp).await?;
    success(record)
}
