/// Task endpoints (authenticated)
///
/// Bodies carry the full parent chain
/// `projectID, listID, featureID, userStoryID`; create and update also
/// accept `content` and `completed`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use planboard_shared::{auth::middleware::AuthContext, models::Task};

use super::accept;
use crate::{
    app::AppState,
    error::ApiResult,
    services::tasks::{
        CreateTaskRequest, DeleteTaskRequest, ReorderTasksRequest, UpdateTaskRequest,
    },
};

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vec<Task>>)> {
    let request = accept(payload)?;
    let siblings = state.services.tasks.create(auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(siblings)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let request = accept(payload)?;
    Ok(Json(state.services.tasks.update(auth.user_id, request).await?))
}

/// Same gap semantics as list reordering
pub async fn reorder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<ReorderTasksRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let request = accept(payload)?;
    Ok(Json(state.services.tasks.reorder(auth.user_id, request).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<DeleteTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let request = accept(payload)?;
    Ok(Json(state.services.tasks.delete(auth.user_id, request).await?))
}
