//! User roster API endpoints.
//!
//! Responses never carry passwords; full snapshots (backups, exports) do.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::{success, ApiResult, ImportResult};
use crate::domain::csv;
use crate::errors::AppError;
use crate::models::{CreateUserRequest, UpdateUserRequest, User};
use crate::AppState;

fn validate_user_fields(name: &str, email: &str) -> Result<(), AppError> {
    if name.trim().is_empty() || email.trim().is_empty() {
        return Err(AppError::Validation(
            "El nom i el correu electrònic són obligatoris".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/users - List all users, passwords stripped.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.repo.list_users().await?;
    success(users.iter().map(User::without_password).collect())
}

/// POST /api/users - Create a user.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<User> {
    validate_user_fields(&request.name, &request.email)?;
    let user = state.repo.create_user(&request).await?;
    success(user.without_password())
}

/// PUT /api/users/{id} - Update a user.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    validate_user_fields(&request.name, &request.email)?;
    let user = state.repo.update_user(&id, &request).await?;
    success(user.without_password())
}

/// DELETE /api/users/{id} - Delete a user, returning it for undo.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    let user = state.repo.delete_user(&id).await?;
    success(user.without_password())
}

/// POST /api/users/restore - Reinsert a previously deleted user.
pub async fn restore_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> ApiResult<User> {
    if user.id.trim().is_empty() {
        return Err(AppError::Validation(
            "L'identificador és obligatori".to_string(),
        ));
    }
    validate_user_fields(&user.name, &user.email)?;
    let user = state.repo.restore_user(&user).await?;
    success(user.without_password())
}

/// POST /api/users/import - Merge a batch of imported users.
pub async fn import_users(
    State(state): State<AppState>,
    Json(incoming): Json<Vec<User>>,
) -> ApiResult<ImportResult<User>> {
    let (records, changed) = state.repo.import_users(incoming).await?;
    if changed {
        tracing::info!(count = records.len(), "user import merged");
    }
    success(ImportResult {
        records: records.iter().map(User::without_password).collect(),
        changed,
    })
}

/// POST /api/users/import-csv - Merge a CSV document of users.
pub async fn import_users_csv(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<ImportResult<User>> {
    let incoming = csv::users_from_csv(&body)?;
    let (records, changed) = state.repo.import_users(incoming).await?;
    if changed {
        tracing::info!(count = records.len(), "user CSV import merged");
    }
    success(ImportResult {
        records: records.iter().map(User::without_password).collect(),
        changed,
    })
}

/// GET /api/users/export-csv - Export the roster as CSV, passwords omitted.
pub async fn export_users_csv(State(state): State<AppState>) -> Result<Response, AppError> {
    let users = state.repo.list_users().await?;
    let body = csv::users_to_csv(&users);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"usuaris.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}
