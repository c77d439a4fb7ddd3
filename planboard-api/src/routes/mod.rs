/// API route handlers
///
/// Handlers are thin: they take the authenticated user from the request
/// extensions, accept the body, and call into [`crate::services`].
///
/// - `health`: liveness and database check
/// - `auth`: sign-in, profile, password reset
/// - `users`: sign-up and the caller's account
/// - `projects`, `lists`, `features`, `user_stories`, `tasks`: the board

use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{error::ApiResult, sanitize::Sanitize};

pub mod auth;
pub mod features;
pub mod health;
pub mod lists;
pub mod projects;
pub mod tasks;
pub mod user_stories;
pub mod users;

/// Plain `{ "message": ... }` response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Unwraps a JSON body, strips markup from its text fields, then validates it
///
/// Malformed JSON and validation failures come back as [`crate::error::ApiError`].
pub(crate) fn accept<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T>
where
    T: Sanitize + Validate,
{
    let Json(mut body) = payload?;
    body.sanitize();
    body.validate()?;
    Ok(body)
}
