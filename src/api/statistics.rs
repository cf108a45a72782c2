//! Statistics API endpoint.

use axum::extract::{Path, State};

use super::{success, ApiResult};
use crate::domain::stats;
use crate::models::AdminListKey;
use crate::AppState;

/// GET /api/statistics/{year} - Compute the dashboard statistics for one
/// calendar year.
pub async fn get_statistics(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> ApiResult<stats::StatisticsData> {
    let commissions = state.repo.list_commissions().await?;
    let details = state.repo.list_all_details().await?;
    let tecnics = state.repo.list_admin_items(AdminListKey::Tecnics).await?;

    let data = stats::compute(&commissions, &details, &tecnics, year);
    success(data)
}
