/// Feature endpoints (authenticated)
///
/// Bodies carry the parent chain `projectID, listID`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use planboard_shared::{
    auth::middleware::AuthContext,
    models::{Feature, FeatureNode},
};

use super::accept;
use crate::{
    app::AppState,
    error::ApiResult,
    services::features::{
        CreateFeatureRequest, DeleteFeatureRequest, ReorderFeaturesRequest, UpdateFeatureRequest,
    },
};

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateFeatureRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vec<FeatureNode>>)> {
    let request = accept(payload)?;
    let siblings = state.services.features.create(auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(siblings)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<UpdateFeatureRequest>, JsonRejection>,
) -> ApiResult<Json<Feature>> {
    let request = accept(payload)?;
    Ok(Json(state.services.features.update(auth.user_id, request).await?))
}

pub async fn reorder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<ReorderFeaturesRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<FeatureNode>>> {
    let request = accept(payload)?;
    Ok(Json(state.services.features.reorder(auth.user_id, request).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<DeleteFeatureRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<FeatureNode>>> {
    let request = accept(payload)?;
    Ok(Json(state.services.features.delete(auth.user_id, request).await?))
}
