//! Credential check endpoint.
//!
//! Passwords are stored in plain text by the legacy data model, so the check
//! is a direct comparison; the PSK layer is the transport-level gate.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{LoginRequest, SessionUser};
use crate::AppState;

/// POST /api/login - Validate credentials and return the session identity.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<SessionUser> {
    let user = state
        .repo
        .find_user_by_email(&request.email)
        .await?
        .filter(|u| u.password.as_deref() == Some(request.password.as_str()))
        .ok_or_else(|| AppError::Unauthorized("Credencials incorrectes".to_string()))?;

    success(SessionUser {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    })
}
