//! Whole-store export/import API endpoints.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::models::ApplicationData;
use crate::AppState;

/// GET /api/application-data - Export the entire store as one JSON document.
pub async fn get_application_data(State(state): State<AppState>) -> ApiResult<ApplicationData> {
    let data = state.repo.get_application_data().await?;
    success(data)
}

/// PUT /api/application-data - Replace the entire store with an imported
/// snapshot. Stored backups are not touched.
pub async fn replace_application_data(
    State(state): State<AppState>,
    Json(data): Json<ApplicationData>,
) -> ApiResult<ApplicationData> {
    let stored = state.repo.replace_application_data(&data).await?;
    tracing::info!(
        commissions = stored.commissions.len(),
        details = stored.commission_details.len(),
        "application data replaced"
    );
    success(stored)
}
