/// Authentication endpoints
///
/// - `POST /api/auth/login` - exchange username and password for an access token
/// - `GET /api/auth/profile` - identity of the bearer token (authenticated)
/// - `POST /api/auth/reset-email` - email a password-reset link
/// - `POST /api/auth/pw-reset` - set a new password with a reset token

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use planboard_shared::{auth::middleware::AuthContext, models::User};
use tracing::warn;

use super::{accept, MessageResponse};
use crate::{
    app::AppState,
    error::ApiResult,
    services::auth::{
        LoginRequest, PasswordResetRequest, Profile, ResetEmailRequest, TokenResponse,
    },
};

pub const RESET_EMAIL_ACCEPTED: &str =
    "If an account uses this address, a password reset link has been sent";

/// Sign in
///
/// ```text
/// POST /api/auth/login
///
/// { "username": "dneri", "password": "..." }
/// ```
///
/// Responds with `{ "access_token": "eyJ..." }`, valid for one hour.
///
/// # Errors
///
/// - `401 Unauthorized`: unknown username or wrong password
/// - `422 Unprocessable Entity`: empty username or password
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let request = accept(payload)?;
    Ok(Json(state.services.auth.sign_in(request).await?))
}

/// Returns `{ "sub": "<user id>", "username": "..." }` from the token
pub async fn profile(Extension(auth): Extension<AuthContext>) -> Json<Profile> {
    Json(auth.into())
}

/// Requests a password-reset email
///
/// Always answers `202 Accepted` with the same message so the endpoint
/// can't be used to probe which addresses have accounts.
pub async fn reset_email(
    State(state): State<AppState>,
    payload: Result<Json<ResetEmailRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let request = accept(payload)?;

    if let Err(e) = state.services.auth.send_reset_email(request).await {
        warn!(error = %e, "Password reset email not sent");
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: RESET_EMAIL_ACCEPTED.to_string(),
        }),
    ))
}

/// Completes a password reset
///
/// ```text
/// POST /api/auth/pw-reset
///
/// { "userID": "...", "token": "eyJ...", "password": "..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: unknown user, or the new password equals the old one
/// - `401 Unauthorized`: invalid, expired or already used token
pub async fn password_reset(
    State(state): State<AppState>,
    payload: Result<Json<PasswordResetRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let request = accept(payload)?;
    Ok(Json(state.services.auth.reset_password(request).await?))
}
