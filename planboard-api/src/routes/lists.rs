/// List endpoints (authenticated)
///
/// Every body names the owning project as `projectID`. Collection responses
/// are a project's lists in board order, each with its nested features.
///
/// - `POST /api/lists/create`
/// - `POST /api/lists/update`
/// - `POST /api/lists/reorder`
/// - `POST /api/lists/delete`

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use planboard_shared::{
    auth::middleware::AuthContext,
    models::{List, ListNode},
};

use super::accept;
use crate::{
    app::AppState,
    error::ApiResult,
    services::lists::{CreateListRequest, DeleteListRequest, ReorderListsRequest, UpdateListRequest},
};

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateListRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vec<ListNode>>)> {
    let request = accept(payload)?;
    let siblings = state.services.lists.create(auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(siblings)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<UpdateListRequest>, JsonRejection>,
) -> ApiResult<Json<List>> {
    let request = accept(payload)?;
    Ok(Json(state.services.lists.update(auth.user_id, request).await?))
}

/// Moves a list by drag-and-drop
///
/// `destinationIndex` is the gap the list was dropped into (`0..=len`).
/// Dropping a list right before or after itself changes nothing.
///
/// # Errors
///
/// `400 Bad Request` when either index is out of range.
pub async fn reorder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<ReorderListsRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<ListNode>>> {
    let request = accept(payload)?;
    Ok(Json(state.services.lists.reorder(auth.user_id, request).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<DeleteListRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<ListNode>>> {
    let request = accept(payload)?;
    Ok(Json(state.services.lists.delete(auth.user_id, request).await?))
}
