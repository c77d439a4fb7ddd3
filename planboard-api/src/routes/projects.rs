/// Project endpoints (authenticated)
///
/// - `GET /api/projects` - the caller's projects
/// - `GET /api/projects/:id` - one project with its whole board
/// - `POST /api/projects/create` - new project with a "To Do" list
/// - `POST /api/projects/update` - rename or re-describe
/// - `POST /api/projects/delete` - delete, returns the remaining projects

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use planboard_shared::{
    auth::middleware::AuthContext,
    models::{Project, ProjectTree},
};
use uuid::Uuid;

use super::accept;
use crate::{
    app::AppState,
    error::ApiResult,
    services::projects::{CreateProjectRequest, DeleteProjectRequest, UpdateProjectRequest},
};

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(state.services.projects.list(auth.user_id).await?))
}

/// # Errors
///
/// `400 Bad Request` with "Project not found" for unknown ids and for
/// projects owned by someone else.
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectTree>> {
    Ok(Json(state.services.projects.get(auth.user_id, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProjectTree>)> {
    let request = accept(payload)?;
    let tree = state.services.projects.create(auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(tree)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> ApiResult<Json<Project>> {
    let request = accept(payload)?;
    Ok(Json(state.services.projects.update(auth.user_id, request).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<DeleteProjectRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<Project>>> {
    let request = accept(payload)?;
    Ok(Json(state.services.projects.delete(auth.user_id, request).await?))
}
