use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::{LoginRequest, LoginResponse};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /api/auth/login - exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let response = state.auth.login(request).await?;
    Ok(ApiResponse::success(response))
}

/// POST /api/auth/logout - tokens are stateless and simply expire
pub async fn logout() -> ApiResult<&'static str> {
    Ok(ApiResponse::message("Logged out successfully"))
}
