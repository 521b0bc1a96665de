use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use crate::api::{CreateUserRequest, UpdateUserRequest, UserDto};
use crate::database::{Page, PageQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Caller;
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<UserDto> {
    let Json(request) = payload?;
    let user = state.users.create(request, &caller).await?;
    Ok(ApiResponse::created(user))
}

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Page<UserDto>> {
    let Query(query) = query?;
    let page = state.users.list(&caller, state.page(query)).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/users/me
pub async fn current(State(state): State<AppState>, caller: Caller) -> ApiResult<UserDto> {
    Ok(ApiResponse::success(state.users.current(&caller).await?))
}

pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<UserDto> {
    let Path(id) = id?;
    Ok(ApiResponse::success(state.users.get_by_id(id, &caller).await?))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<UserDto> {
    let Path(id) = id?;
    let Json(request) = payload?;
    Ok(ApiResponse::success(state.users.update(id, request, &caller).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<&'static str> {
    let Path(id) = id?;
    state.users.delete(id, &caller).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}
