//! Commission calendar API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{date_from_path, success, ApiResult};
use crate::domain::{dates, generator};
use crate::errors::AppError;
use crate::models::{
    CommissionSummary, CreateCommissionRequest, DeletedCommission, PatchCommissionRequest,
    RekeyCommissionRequest,
};
use crate::AppState;

/// GET /api/commissions - List all commissions ordered by date.
pub async fn list_commissions(State(state): State<AppState>) -> ApiResult<Vec<CommissionSummary>> {
    let commissions = state.repo.list_commissions().await?;
    success(commissions)
}

/// POST /api/commissions - Create a commission.
pub async fn create_commission(
    State(state): State<AppState>,
    Json(request): Json<CreateCommissionRequest>,
) -> ApiResult<CommissionSummary> {
    if request.num_acta <= 0 {
        return Err(AppError::Validation(
            "El número d'acta ha de ser positiu".to_string(),
        ));
    }
    let data_comissio = dates::normalize(&request.data_comissio).ok_or_else(|| {
        AppError::Validation(format!("Data invàlida: {}", request.data_comissio))
    })?;

    let commission = state
        .repo
        .create_commission(request.num_acta, &data_comissio)
        .await?;
    success(commission)
}

/// POST /api/commissions/generate - Generate the biweekly sessions for the
/// year after the latest one on record.
pub async fn generate_next_year(
    State(state): State<AppState>,
) -> ApiResult<Vec<CommissionSummary>> {
    let existing = state.repo.list_commissions().await?;
    let generated = generator::generate_next_year(&existing)?;
    state.repo.add_commissions(&generated).await?;
    tracing::info!(count = generated.len(), "generated next-year commissions");
    success(generated)
}

/// GET /api/commissions/{numActa}/{dataComissio} - Get a single commission.
pub async fn get_commission(
    State(state): State<AppState>,
    Path((num_acta, date)): Path<(i64, String)>,
) -> ApiResult<CommissionSummary> {
    let data_comissio = date_from_path(&date);
    let commission = state
        .repo
        .get_commission(num_acta, &data_comissio)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Commission {num_acta} not found")))?;
    success(commission)
}

/// PUT /api/commissions/{numActa}/{dataComissio} - Change a commission's key
/// (acta number and/or date), cascading to its detail.
pub async fn rekey_commission(
    State(state): State<AppState>,
    Path((num_acta, date)): Path<(i64, String)>,
    Json(request): Json<RekeyCommissionRequest>,
) -> ApiResult<CommissionSummary> {
    if request.num_acta <= 0 {
        return Err(AppError::Validation(
            "El número d'acta ha de ser positiu".to_string(),
        ));
    }
    let data_comissio = date_from_path(&date);
    let new_data_comissio = dates::normalize(&request.data_comissio).ok_or_else(|| {
        AppError::Validation(format!("Data invàlida: {}", request.data_comissio))
    })?;

    let commission = state
        .repo
        .rekey_commission(num_acta, &data_comissio, request.num_acta, &new_data_comissio)
        .await?;
    success(commission)
}

/// PATCH /api/commissions/{numActa}/{dataComissio} - Partial field update.
pub async fn patch_commission(
    State(state): State<AppState>,
    Path((num_acta, date)): Path<(i64, String)>,
    Json(request): Json<PatchCommissionRequest>,
) -> ApiResult<CommissionSummary> {
    let data_comissio = date_from_path(&date);
    let commission = state
        .repo
        .patch_commission(num_acta, &data_comissio, &request)
        .await?;
    success(commission)
}

/// PUT /api/commissions/{numActa}/{dataComissio}/mark-sent - Record that the
/// convocation email went out today.
pub async fn mark_commission_sent(
    State(state): State<AppState>,
    Path((num_acta, date)): Path<(i64, String)>,
) -> ApiResult<CommissionSummary> {
    let data_comissio = date_from_path(&date);
    let commission = state
        .repo
        .mark_commission_sent(num_acta, &data_comissio)
        .await?;
    success(commission)
}

/// DELETE /api/commissions/{numActa}/{dataComissio} - Delete a commission and
/// return the removed records for undo.
pub async fn delete_commission(
    State(state): State<AppState>,
    Path((num_acta, date)): Path<(i64, String)>,
) -> ApiResult<DeletedCommission> {
    let data_comissio = date_from_path(&date);
    let deleted = state.repo.delete_commission(num_acta, &data_comissio).await?;
    success(deleted)
}

/// POST /api/commissions/restore - Reinsert a previously deleted commission.
pub async fn restore_commission(
    State(state): State<AppState>,
    Json(payload): Json<DeletedCommission>,
) -> ApiResult<CommissionSummary> {
    let commission = state.repo.restore_commission(&payload).await?;
    success(commission)
}
