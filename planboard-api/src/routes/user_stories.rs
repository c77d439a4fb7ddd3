/// User story endpoints (authenticated), mounted at `/api/user-stories`

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use planboard_shared::{
    auth::middleware::AuthContext,
    models::{UserStory, UserStoryNode},
};

use super::accept;
use crate::{
    app::AppState,
    error::ApiResult,
    services::user_stories::{
        CreateUserStoryRequest, DeleteUserStoryRequest, ReorderUserStoriesRequest,
        UpdateUserStoryRequest,
    },
};

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateUserStoryRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vec<UserStoryNode>>)> {
    let request = accept(payload)?;
    let siblings = state.services.user_stories.create(auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(siblings)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<UpdateUserStoryRequest>, JsonRejection>,
) -> ApiResult<Json<UserStory>> {
    let request = accept(payload)?;
    Ok(Json(state.services.user_stories.update(auth.user_id, request).await?))
}

pub async fn reorder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<ReorderUserStoriesRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<UserStoryNode>>> {
    let request = accept(payload)?;
    Ok(Json(state.services.user_stories.reorder(auth.user_id, request).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<DeleteUserStoryRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<UserStoryNode>>> {
    let request = accept(payload)?;
    Ok(Json(state.services.user_stories.delete(auth.user_id, request).await?))
}
