//! Admin reference list API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    AdminItem, AdminListKey, CreateAdminItemRequest, UpdateAdminItemRequest,
};
use crate::AppState;

/// Import result: the merged list plus whether anything changed.
#[derive(Debug, Serialize)]
pub struct ImportResult<T: Serialize> {
    pub records: Vec<T>,
    pub changed: bool,
}

fn parse_list_key(list: &str) -> Result<AdminListKey, AppError> {
    AdminListKey::from_str(list)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown admin list: {list}")))
}

fn validate_item(key: AdminListKey, name: &str, email: &Option<String>) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("El nom és obligatori".to_string()));
    }
    // Technicians and councillors are email recipients.
    let email_required = matches!(key, AdminListKey::Tecnics | AdminListKey::Regidors);
    if email_required && email.as_deref().map(str::trim).unwrap_or("").is_empty() {
        return Err(AppError::Validation(
            "El correu electrònic és obligatori".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/admin/{list} - List one reference list.
pub async fn list_admin_items(
    State(state): State<AppState>,
    Path(list): Path<String>,
) -> ApiResult<Vec<AdminItem>> {
    let key = parse_list_key(&list)?;
    let items = state.repo.list_admin_items(key).await?;
    success(items)
}

/// POST /api/admin/{list} - Create an item.
pub async fn create_admin_item(
    State(state): State<AppState>,
    Path(list): Path<String>,
    Json(request): Json<CreateAdminItemRequest>,
) -> ApiResult<AdminItem> {
    let key = parse_list_key(&list)?;
    validate_item(key, &request.name, &request.email)?;
    let item = state.repo.create_admin_item(key, &request).await?;
    success(item)
}

/// PUT /api/admin/{list}/{id} - Update an item.
pub async fn update_admin_item(
    State(state): State<AppState>,
    Path((list, id)): Path<(String, String)>,
    Json(request): Json<UpdateAdminItemRequest>,
) -> ApiResult<AdminItem> {
    let key = parse_list_key(&list)?;
    validate_item(key, &request.name, &request.email)?;
    let item = state.repo.update_admin_item(key, &id, &request).await?;
    success(item)
}

/// DELETE /api/admin/{list}/{id} - Delete an item, returning it for undo.
pub async fn delete_admin_item(
    State(state): State<AppState>,
    Path((list, id)): Path<(String, String)>,
) -> ApiResult<AdminItem> {
    let key = parse_list_key(&list)?;
    let item = state.repo.delete_admin_item(key, &id).await?;
    success(item)
}

/// POST /api/admin/{list}/restore - Reinsert a previously deleted item with
/// its original id.
pub async fn restore_admin_item(
    State(state): State<AppState>,
    Path(list): Path<String>,
    Json(item): Json<AdminItem>,
) -> ApiResult<AdminItem> {
    let key = parse_list_key(&list)?;
    if item.id.trim().is_empty() || item.name.trim().is_empty() {
        return Err(AppError::Validation(
            "L'identificador i el nom són obligatoris".to_string(),
        ));
    }
    let item = state.repo.restore_admin_item(key, &item).await?;
    success(item)
}

/// POST /api/admin/{list}/import - Merge a batch of imported items.
pub async fn import_admin_items(
    State(state): State<AppState>,
    Path(list): Path<String>,
    Json(incoming): Json<Vec<AdminItem>>,
) -> ApiResult<ImportResult<AdminItem>> {
    let key = parse_list_key(&list)?;
    let (records, changed) = state.repo.import_admin_items(key, incoming).await?;
    if changed {
        tracing::info!(list = key.as_str(), count = records.len(), "admin list import merged");
    }
    success(ImportResult { records, changed })
}
