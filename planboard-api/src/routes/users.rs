/// Account endpoints
///
/// - `POST /api/users/create` - sign up (public)
/// - `GET /api/users/account` - the caller's account
/// - `POST /api/users/update` - update the caller's account

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use planboard_shared::{auth::middleware::AuthContext, models::User};

use super::accept;
use crate::{
    app::AppState,
    error::ApiResult,
    services::users::{CreateUserRequest, UpdateUserRequest},
};

/// Sign up
///
/// ```text
/// POST /api/users/create
///
/// { "firstName": "Dan", "lastName": "Neri", "email": "dan@example.com",
///   "username": "dneri", "password": "..." }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: username or email already in use
/// - `422 Unprocessable Entity`: missing field or invalid email
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let request = accept(payload)?;
    let user = state.services.users.create(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.services.users.account(auth.user_id).await?))
}

/// Updates any of `firstName`, `lastName`, `email`, `username`, `password`
///
/// Unknown fields are rejected with 422.
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let request = accept(payload)?;
    Ok(Json(state.services.users.update(auth.user_id, request).await?))
}
