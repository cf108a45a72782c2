//! Commission detail (session agenda) API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{date_from_path, success, ApiResult};
use crate::domain::dates;
use crate::errors::AppError;
use crate::models::CommissionDetail;
use crate::AppState;

/// GET /api/commissions/{numActa}/{dataComissio}/detail - Fetch a session's
/// detail. Open sessions without one yet get a synthesized empty detail.
pub async fn get_commission_detail(
    State(state): State<AppState>,
    Path((num_acta, date)): Path<(i64, String)>,
) -> ApiResult<CommissionDetail> {
    let data_comissio = date_from_path(&date);
    let detail = state
        .repo
        .get_commission_detail(num_acta, &data_comissio)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Detail for commission {num_acta} not found"))
        })?;
    success(detail)
}

/// POST /api/commission-details - Save a session detail with its expedients.
pub async fn save_commission_detail(
    State(state): State<AppState>,
    Json(mut detail): Json<CommissionDetail>,
) -> ApiResult<CommissionDetail> {
    if detail.num_acta <= 0 {
        return Err(AppError::Validation(
            "El número d'acta ha de ser positiu".to_string(),
        ));
    }
    detail.sessio = dates::normalize(&detail.sessio)
        .ok_or_else(|| AppError::Validation(format!("Data invàlida: {}", detail.sessio)))?;

    let saved = state.repo.save_commission_detail(&detail).await?;
    success(saved)
}
