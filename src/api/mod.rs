//! REST API module.
//!
//! Contains all API routes and handlers following the frontend contract.

mod admin;
mod application_data;
mod backups;
mod commissions;
mod details;
mod session;
mod statistics;
mod users;

pub use admin::*;
pub use application_data::*;
pub use backups::*;
pub use commissions::*;
pub use details::*;
pub use session::*;
pub use statistics::*;
pub use users::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Commission path segments use dashes in place of the slashes of the
/// D/M/YYYY form ("17-12-2025" for "17/12/2025").
pub(crate) fn date_from_path(segment: &str) -> String {
    segment.replace('-', "/")
}
