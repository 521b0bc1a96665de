use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use crate::api::{CreateProjectRequest, ProjectDto, ProjectStatusRequest, UpdateProjectRequest};
use crate::database::{Page, PageQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Caller;
use crate::state::AppState;

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<ProjectDto> {
    let Json(request) = payload?;
    let project = state.projects.create(request, &caller).await?;
    Ok(ApiResponse::created(project))
}

/// GET /api/projects - everything for managers, own assignments otherwise
pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Page<ProjectDto>> {
    let Query(query) = query?;
    let page = state.projects.list_all(&caller, state.page(query)).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/projects/my
pub async fn list_mine(
    State(state): State<AppState>,
    caller: Caller,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Page<ProjectDto>> {
    let Query(query) = query?;
    let page = state.projects.list_mine(&caller, state.page(query)).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/projects/:id
pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<ProjectDto> {
    let Path(id) = id?;
    Ok(ApiResponse::success(state.projects.get_by_id(id, &caller).await?))
}

/// PUT /api/projects/:id - only the fields present in the body change
pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> ApiResult<ProjectDto> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let project = state.projects.update(id, request, &caller).await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/projects/:id
pub async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<&'static str> {
    let Path(id) = id?;
    state.projects.delete(id, &caller).await?;
    Ok(ApiResponse::message("Project deleted successfully"))
}

/// PATCH /api/projects/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ProjectStatusRequest>, JsonRejection>,
) -> ApiResult<ProjectDto> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let project = state.projects.update_status(id, request, &caller).await?;
    Ok(ApiResponse::success(project))
}
